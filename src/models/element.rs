//! Modelo de Element (spot)
//!
//! Un elemento es un slot físico del estacionamiento. Para lectura, su
//! ocupación se deriva de los registros de acceso, reserva y suscripción
//! que lo referencian; para escritura, el dueño autoritativo es el puntero
//! current_occupant_* que los managers reclaman y liberan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::cash_register::RecordKind;
use super::vehicle::VehicleCategory;

/// Estado físico del elemento - mapea al ENUM element_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "element_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ElementStatus {
    Available,
    Maintenance,
}

/// Element principal - mapea exactamente a la tabla t_element
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Element {
    pub id: Uuid,
    pub parking_id: Uuid,
    pub name: String,
    pub element_type: String,
    pub category: VehicleCategory,
    pub status: ElementStatus,
    /// Reclamo vigente sobre el spot; NULL cuando está libre
    pub current_occupant_kind: Option<RecordKind>,
    pub current_occupant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Estado de ocupación derivado de un spot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyStatus {
    Available,
    OccupiedByAccess,
    OccupiedByBooking,
    OccupiedBySubscription,
    Maintenance,
}

/// Ocupante actual de un spot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occupant {
    pub kind: RecordKind,
    pub record_id: Uuid,
    pub vehicle_id: Uuid,
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

/// Snapshot de ocupación de un spot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotOccupancy {
    pub element_id: Uuid,
    pub status: OccupancyStatus,
    pub occupant: Option<Occupant>,
}

impl SpotOccupancy {
    pub fn available(element_id: Uuid) -> Self {
        Self {
            element_id,
            status: OccupancyStatus::Available,
            occupant: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.status == OccupancyStatus::Available
    }
}
