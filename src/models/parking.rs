//! Modelo de Parking
//!
//! La moneda es un valor de configuración por parking, no se convierte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Parking principal - mapea exactamente a la tabla t_parking
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Parking {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}
