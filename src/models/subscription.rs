//! Modelo de Subscription
//!
//! Una suscripción otorga ocupación recurrente sobre un spot. Al renovarla
//! se crea un registro nuevo encadenado al anterior vía `parent_id`; el
//! registro viejo queda marcado como Renewed y deja de estar activo.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use super::vehicle::VehicleCategory;

/// Estado de la suscripción - mapea al ENUM subscription_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Renewed,
    Expired,
    Suspended,
}

/// Período de la suscripción - mapea al ENUM subscription_period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "subscription_period", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl SubscriptionPeriod {
    /// Duración del período en días calendario planos (7/30/365),
    /// sin ajuste por meses de distinta longitud.
    pub fn duration(&self) -> Duration {
        match self {
            SubscriptionPeriod::Weekly => Duration::days(7),
            SubscriptionPeriod::Monthly => Duration::days(30),
            SubscriptionPeriod::Yearly => Duration::days(365),
        }
    }
}

/// Subscription principal - mapea exactamente a la tabla t_subscription
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub number: i64,
    pub parking_id: Uuid,
    pub vehicle_id: Uuid,
    pub spot_id: Option<Uuid>,
    pub employee_id: Uuid,
    pub period: SubscriptionPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: Decimal,
    pub is_active: bool,
    pub status: SubscriptionStatus,
    /// Suscripción que esta renueva; forma una cadena hacia atrás, nunca un ciclo
    pub parent_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request para crear una suscripción
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubscriptionRequest {
    #[validate(length(min = 2, max = 20))]
    pub vehicle_plate: String,

    pub vehicle_type: Option<VehicleCategory>,

    #[validate(length(min = 2, max = 50))]
    pub vehicle_color: Option<String>,

    pub owner_name: Option<String>,
    pub owner_document: Option<String>,
    pub owner_phone: Option<String>,

    pub spot_id: Option<Uuid>,
    pub period: SubscriptionPeriod,
    pub start_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Request para renovar una suscripción existente
#[derive(Debug, Deserialize, Validate)]
pub struct RenewSubscriptionRequest {
    pub period: SubscriptionPeriod,
    pub amount: Decimal,
    pub notes: Option<String>,
}

/// Filtros para listar suscripciones
#[derive(Debug, Deserialize)]
pub struct SubscriptionFilters {
    pub is_active: Option<bool>,
    pub status: Option<SubscriptionStatus>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_duration_flat_calendar() {
        assert_eq!(SubscriptionPeriod::Weekly.duration(), Duration::days(7));
        assert_eq!(SubscriptionPeriod::Monthly.duration(), Duration::days(30));
        assert_eq!(SubscriptionPeriod::Yearly.duration(), Duration::days(365));
    }
}
