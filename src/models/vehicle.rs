//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Categoría del vehículo - mapea al ENUM vehicle_category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Bicycle,
    Motorcycle,
    Car,
    Truck,
}

impl Default for VehicleCategory {
    fn default() -> Self {
        VehicleCategory::Car
    }
}

/// Vehicle principal - mapea exactamente a la tabla t_vehicle
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub parking_id: Uuid,
    pub plate: String,
    pub category: VehicleCategory,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_document: Option<String>,
    pub owner_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Datos del vehículo que acompañan una entrada, reserva o suscripción.
/// El vehículo se crea de forma perezosa la primera vez que se ve la placa.
#[derive(Debug, Clone)]
pub struct VehicleDetails {
    pub plate: String,
    pub category: VehicleCategory,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_document: Option<String>,
    pub owner_phone: Option<String>,
}

/// Normalizar una placa antes de cualquier búsqueda o inserción.
/// El match es case-insensitive: se almacena siempre en mayúsculas.
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plate_uppercases_and_trims() {
        assert_eq!(normalize_plate(" abc123 "), "ABC123");
        assert_eq!(normalize_plate("ABC123"), "ABC123");
        assert_eq!(normalize_plate("aBc-12"), "ABC-12");
    }
}
