//! Modelo de Access
//!
//! Un acceso es la estancia de un vehículo sin reserva ni suscripción:
//! entra, ocupa un spot y paga al salir según la tarifa vigente.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use super::vehicle::VehicleCategory;

/// Estado del acceso - mapea al ENUM access_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "access_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    Open,
    Closed,
    Cancelled,
}

/// Access principal - mapea exactamente a la tabla t_access
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessRecord {
    pub id: Uuid,
    pub number: i64,
    pub parking_id: Uuid,
    pub vehicle_id: Uuid,
    pub spot_id: Option<Uuid>,
    pub entry_employee_id: Uuid,
    pub exit_employee_id: Option<Uuid>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub amount: Decimal,
    pub status: AccessStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para registrar la entrada de un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccessRequest {
    #[validate(length(min = 2, max = 20))]
    pub vehicle_plate: String,

    pub vehicle_type: Option<VehicleCategory>,

    #[validate(length(min = 2, max = 50))]
    pub vehicle_color: Option<String>,

    pub owner_name: Option<String>,
    pub owner_document: Option<String>,
    pub owner_phone: Option<String>,

    pub spot_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Request para registrar la salida de un vehículo
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CloseAccessRequest {
    pub notes: Option<String>,
}

/// Filtros para listar accesos
#[derive(Debug, Deserialize)]
pub struct AccessFilters {
    pub status: Option<AccessStatus>,
    pub vehicle_id: Option<Uuid>,
    pub spot_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Estadísticas de accesos por parking
#[derive(Debug, Serialize, FromRow)]
pub struct AccessStats {
    pub total: i64,
    pub open: i64,
    pub closed: i64,
    pub cancelled: i64,
}
