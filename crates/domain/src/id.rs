//! Typed identifier newtypes for backend-assigned keys.
//!
//! The backend owns identity: every id arrives as an opaque string and the
//! client never generates one.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a backend-provided identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`ParkingLot`](crate::parking_lot::ParkingLot).
    ParkingLotId
);

define_id!(
    /// Unique identifier for a [`ParkingLotHistory`](crate::history::ParkingLotHistory) record.
    HistoryId
);

define_id!(
    /// Unique identifier for a [`Node`](crate::node::Node).
    NodeId
);

define_id!(
    /// Unique identifier for a [`User`](crate::user::User).
    UserId
);
