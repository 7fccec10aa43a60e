use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::activity::Activity;
use crate::models::parent::Parent;
use crate::models::vehicle::VehicleWithParent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "transport_type", rename_all = "UPPERCASE")]
pub enum TransportType {
    Outward,
    Return,
}

/// Transport hydrated with its activity and its exclusively owned vehicle
/// (which in turn carries the vehicle's owning parent).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    pub id: i64,
    #[serde(rename = "type")]
    pub transport_type: TransportType,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub pickup_location: String,
    pub activity: Activity,
    pub vehicle: VehicleWithParent,
}

/// One row of the transport / activity / vehicle / parent join. One row per
/// transport: both owned relations are to-one, so no grouping is needed.
#[derive(Debug, Clone, FromRow)]
pub struct TransportJoinRow {
    pub id: i64,
    pub transport_type: TransportType,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub pickup_location: String,
    pub a_id: i64,
    pub activity_name: String,
    pub activity_address: String,
    pub v_id: i64,
    pub parent_id: i64,
    pub available_seats: i32,
    pub p_id: Option<i64>,
    pub parent_name: Option<String>,
    pub parent_email: Option<String>,
    pub parent_phone: Option<String>,
}

impl TransportJoinRow {
    pub fn into_transport(self) -> Transport {
        let parent = self.p_id.map(|id| Parent {
            id,
            name: self.parent_name.unwrap_or_default(),
            email: self.parent_email.unwrap_or_default(),
            phone: self.parent_phone.unwrap_or_default(),
        });
        Transport {
            id: self.id,
            transport_type: self.transport_type,
            date_start: self.date_start,
            date_end: self.date_end,
            pickup_location: self.pickup_location,
            activity: Activity {
                id: self.a_id,
                name: self.activity_name,
                address: self.activity_address,
            },
            vehicle: VehicleWithParent {
                id: self.v_id,
                parent_id: self.parent_id,
                available_seats: self.available_seats,
                parent,
            },
        }
    }
}

/// Create/update payload. On create the vehicle block is required and a new
/// vehicle is inserted alongside the transport; on update it only adjusts
/// the seats of the transport's existing vehicle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportPayload {
    #[serde(rename = "type")]
    pub transport_type: TransportType,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub pickup_location: String,
    pub activity_id: i64,
    pub vehicle: Option<TransportVehiclePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportVehiclePayload {
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub available_seats: i32,
}
