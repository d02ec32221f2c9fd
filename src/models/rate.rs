//! Modelo de Rate
//!
//! Tarifas por estacionamiento y categoría de vehículo. Solo `hourly` y
//! `tolerance` participan del cobro por salida; los demás precios se usan
//! para suscripciones por período.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::vehicle::VehicleCategory;

/// Rate principal - mapea exactamente a la tabla t_rate
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rate {
    pub id: Uuid,
    pub parking_id: Uuid,
    pub vehicle_category: VehicleCategory,
    /// Minutos de gracia durante los cuales no se cobra
    pub tolerance: i32,
    pub hourly: Decimal,
    pub daily: Decimal,
    pub weekly: Decimal,
    pub monthly: Decimal,
    pub yearly: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
