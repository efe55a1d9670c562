//! Parking lot: the managed facility record.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ParkHubError, ValidationError};
use crate::id::{NodeId, ParkingLotId, UserId};
use crate::image::Image;
use crate::node::Node;
use crate::time::Timestamp;
use crate::user::User;

/// Whether the facility currently accepts vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParkingLotStatus {
    Open,
    #[default]
    Closed,
}

/// Coarse count of free spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    MoreThanFive,
    LessThanFive,
    #[default]
    NoAvailability,
}

/// Record lifecycle status shared by every managed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalStatus {
    #[default]
    Active,
    Inactive,
    Archived,
    Deleted,
}

/// Backend-defined payment method code (e.g. `CASH`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(pub String);

/// Backend-defined service code (e.g. `VALET`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Service(pub String);

/// A physical parking facility as the backend describes it.
///
/// `owner` and `nodes` are expansions the backend may include in responses;
/// they are never sent back (see [`crate::dto`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParkingLot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ParkingLotId>,
    pub code: String,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ParkingLotStatus,
    pub availability: Availability,
    pub global_status: GlobalStatus,
    pub price: Option<f64>,
    pub price_car_per_hour: Option<f64>,
    pub price_car_per_day: Option<f64>,
    pub price_motorcycle_per_hour: Option<f64>,
    pub price_motorcycle_per_day: Option<f64>,
    pub phone_number: Option<String>,
    pub comfort: Option<f64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
    #[serde(deserialize_with = "null_as_empty")]
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(deserialize_with = "null_as_empty")]
    pub services: Vec<Service>,
    #[serde(deserialize_with = "null_as_empty")]
    pub accepted_vehicle_types: Vec<String>,
    pub owner_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(deserialize_with = "null_as_empty")]
    pub node_ids: Vec<NodeId>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    pub nodes: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// The backend sends `null` for lists it never filled in.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ParkingLot {
    /// Create a builder for constructing a [`ParkingLot`].
    #[must_use]
    pub fn builder() -> ParkingLotBuilder {
        ParkingLotBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Validation`] when `code` or `name` is empty
    /// or the coordinates are not valid degrees.
    pub fn validate(&self) -> Result<(), ParkHubError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyCode.into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.latitude).into());
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.longitude).into());
        }
        Ok(())
    }

    /// Whether this record carries the given id.
    #[must_use]
    pub fn has_id(&self, id: &ParkingLotId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// Step-by-step builder for [`ParkingLot`].
#[derive(Debug, Default)]
pub struct ParkingLotBuilder {
    lot: ParkingLot,
}

impl ParkingLotBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<ParkingLotId>) -> Self {
        self.lot.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.lot.code = code.into();
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.lot.name = name.into();
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.lot.address = address.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.lot.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.lot.latitude = latitude;
        self.lot.longitude = longitude;
        self
    }

    #[must_use]
    pub fn status(mut self, status: ParkingLotStatus) -> Self {
        self.lot.status = status;
        self
    }

    #[must_use]
    pub fn availability(mut self, availability: Availability) -> Self {
        self.lot.availability = availability;
        self
    }

    #[must_use]
    pub fn global_status(mut self, global_status: GlobalStatus) -> Self {
        self.lot.global_status = global_status;
        self
    }

    #[must_use]
    pub fn car_prices(mut self, per_hour: f64, per_day: f64) -> Self {
        self.lot.price_car_per_hour = Some(per_hour);
        self.lot.price_car_per_day = Some(per_day);
        self
    }

    #[must_use]
    pub fn motorcycle_prices(mut self, per_hour: f64, per_day: f64) -> Self {
        self.lot.price_motorcycle_per_hour = Some(per_hour);
        self.lot.price_motorcycle_per_day = Some(per_day);
        self
    }

    #[must_use]
    pub fn image(mut self, image: Image) -> Self {
        self.lot.images.push(image);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, code: impl Into<String>) -> Self {
        self.lot.payment_methods.push(PaymentMethod(code.into()));
        self
    }

    #[must_use]
    pub fn service(mut self, code: impl Into<String>) -> Self {
        self.lot.services.push(Service(code.into()));
        self
    }

    #[must_use]
    pub fn owner_id(mut self, owner_id: impl Into<UserId>) -> Self {
        self.lot.owner_id = Some(owner_id.into());
        self
    }

    #[must_use]
    pub fn node_id(mut self, node_id: impl Into<NodeId>) -> Self {
        self.lot.node_ids.push(node_id.into());
        self
    }

    /// Consume the builder, validate, and return a [`ParkingLot`].
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Validation`] if an invariant fails.
    pub fn build(self) -> Result<ParkingLot, ParkHubError> {
        self.lot.validate()?;
        Ok(self.lot)
    }
}
