//! Modelo de Booking
//!
//! Una reserva bloquea un spot durante una ventana [startDate, endDate).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use super::vehicle::VehicleCategory;

/// Estado de la reserva - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl sqlx::postgres::PgHasArrayType for BookingStatus {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_booking_status")
    }
}

/// Booking principal - mapea exactamente a la tabla t_booking
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingRecord {
    pub id: Uuid,
    pub number: i64,
    pub parking_id: Uuid,
    pub vehicle_id: Uuid,
    pub spot_id: Option<Uuid>,
    pub employee_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: Decimal,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request para crear una reserva
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 2, max = 20))]
    pub vehicle_plate: String,

    pub vehicle_type: Option<VehicleCategory>,

    #[validate(length(min = 2, max = 50))]
    pub vehicle_color: Option<String>,

    pub owner_name: Option<String>,
    pub owner_document: Option<String>,
    pub owner_phone: Option<String>,

    pub spot_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,

    /// Duración de la reserva en minutos; endDate = startDate + duration
    #[validate(range(min = 1))]
    pub duration_minutes: i64,

    pub notes: Option<String>,
}

/// Filtros para listar reservas
#[derive(Debug, Deserialize)]
pub struct BookingFilters {
    pub status: Option<BookingStatus>,
    pub spot_id: Option<Uuid>,
    pub limit: Option<i64>,
}
