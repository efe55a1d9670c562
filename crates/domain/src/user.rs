//! User: an account that can administer or own parking lots.

use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::parking_lot::GlobalStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Owner,
    User,
}

/// Personal details attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub names: Option<String>,
    #[serde(default)]
    pub last_names: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub global_status: Option<GlobalStatus>,
    #[serde(default)]
    pub person: Option<Person>,
}

impl User {
    /// Whether the user may be assigned as a parking lot owner.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// "Names LastNames" when a person is attached, otherwise the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let Some(person) = &self.person else {
            return self.email.clone();
        };
        let full = [person.names.as_deref(), person.last_names.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.email.clone()
        } else {
            full
        }
    }
}
