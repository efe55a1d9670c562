//! Wire DTO for create/update calls and the sanitizer that produces it.
//!
//! The backend accepts a whitelist of fields. Expanded relations (`owner`,
//! `nodes`), identity, and timestamps are stripped; relations travel as ids.

use serde::{Deserialize, Serialize};

use crate::id::{NodeId, UserId};
use crate::image::Image;
use crate::parking_lot::{
    Availability, GlobalStatus, ParkingLot, ParkingLotStatus, PaymentMethod, Service,
};

/// Body of `POST /admin/parking-lot` and `PUT /admin/parking-lot/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotDto {
    pub code: String,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ParkingLotStatus,
    pub availability: Availability,
    pub global_status: GlobalStatus,
    /// Always present on the wire; no owner is an explicit `null`.
    pub owner_id: Option<UserId>,
    pub node_ids: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_car_per_hour: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_car_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_motorcycle_per_hour: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_motorcycle_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comfort: Option<f64>,
    pub accepted_vehicle_types: Vec<String>,
    pub images: Vec<Image>,
    pub payment_methods: Vec<PaymentMethod>,
    pub services: Vec<Service>,
}

impl ParkingLotDto {
    /// Replace the image list, keeping every other field.
    #[must_use]
    pub fn with_images(mut self, images: Vec<Image>) -> Self {
        self.images = images;
        self
    }
}

/// Map a full parking lot value to the fields the backend accepts.
///
/// Pure: the same input always yields the same output. An empty owner id
/// becomes `None` (serialised as `null`), never `""`. Lists keep their order.
#[must_use]
pub fn to_dto(lot: &ParkingLot) -> ParkingLotDto {
    ParkingLotDto {
        code: lot.code.clone(),
        name: lot.name.clone(),
        address: lot.address.clone(),
        description: lot.description.clone(),
        latitude: lot.latitude,
        longitude: lot.longitude,
        status: lot.status,
        availability: lot.availability,
        global_status: lot.global_status,
        owner_id: lot.owner_id.clone().filter(|id| !id.is_empty()),
        node_ids: lot.node_ids.clone(),
        price: lot.price,
        price_car_per_hour: lot.price_car_per_hour,
        price_car_per_day: lot.price_car_per_day,
        price_motorcycle_per_hour: lot.price_motorcycle_per_hour,
        price_motorcycle_per_day: lot.price_motorcycle_per_day,
        phone_number: lot.phone_number.clone(),
        comfort: lot.comfort,
        accepted_vehicle_types: lot.accepted_vehicle_types.clone(),
        images: lot.images.clone(),
        payment_methods: lot.payment_methods.clone(),
        services: lot.services.clone(),
    }
}

impl From<&ParkingLot> for ParkingLotDto {
    fn from(lot: &ParkingLot) -> Self {
        to_dto(lot)
    }
}
