use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::parent::Parent;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub parent_id: i64,
    pub available_seats: i32,
}

/// Vehicle hydrated with its owning parent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleWithParent {
    pub id: i64,
    pub parent_id: i64,
    pub available_seats: i32,
    pub parent: Option<Parent>,
}

/// One row of the vehicle / parent join.
#[derive(Debug, Clone, FromRow)]
pub struct VehicleJoinRow {
    pub id: i64,
    pub parent_id: i64,
    pub available_seats: i32,
    pub p_id: Option<i64>,
    pub parent_name: Option<String>,
    pub parent_email: Option<String>,
    pub parent_phone: Option<String>,
}

impl VehicleJoinRow {
    pub fn into_vehicle(self) -> VehicleWithParent {
        let parent = self.p_id.map(|id| Parent {
            id,
            name: self.parent_name.unwrap_or_default(),
            email: self.parent_email.unwrap_or_default(),
            phone: self.parent_phone.unwrap_or_default(),
        });
        VehicleWithParent {
            id: self.id,
            parent_id: self.parent_id,
            available_seats: self.available_seats,
            parent,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehiclePayload {
    pub parent_id: i64,
    pub available_seats: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehiclePayload {
    pub parent_id: Option<i64>,
    pub available_seats: Option<i32>,
}
