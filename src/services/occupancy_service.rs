//! Resolución de ocupación de spots
//!
//! La ocupación de un elemento no se almacena: se deriva consultando los
//! tres orígenes (acceso, reserva, suscripción) cuya ventana temporal
//! contiene "ahora". Cuando más de un origen referencia el mismo spot
//! (inconsistencia que la escritura debería prevenir pero el lector debe
//! tolerar), gana Access > Booking > Subscription: un walk-in activo
//! representa presencia física. Consulta de solo lectura, sin locks.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::access::AccessRecord;
use crate::models::booking::BookingRecord;
use crate::models::cash_register::RecordKind;
use crate::models::element::{ElementStatus, Occupant, OccupancyStatus, SpotOccupancy};
use crate::models::subscription::SubscriptionRecord;
use crate::repositories::access_repository::AccessRepository;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::element_repository::ElementRepository;
use crate::repositories::subscription_repository::SubscriptionRepository;
use crate::utils::errors::AppError;

pub struct OccupancyService {
    pool: PgPool,
}

impl OccupancyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Estado de ocupación actual de un elemento.
    pub async fn occupancy_of(&self, element_id: Uuid) -> Result<SpotOccupancy, AppError> {
        let mut conn = self.pool.acquire().await?;

        let element = ElementRepository::find_by_id(&mut conn, element_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Element not found".to_string()))?;

        if element.status == ElementStatus::Maintenance {
            return Ok(SpotOccupancy {
                element_id,
                status: OccupancyStatus::Maintenance,
                occupant: None,
            });
        }

        let now = Utc::now();
        let access = AccessRepository::find_open_by_spot(&mut conn, element_id).await?;
        let booking = BookingRepository::find_active_by_spot(&mut conn, element_id, now).await?;
        let subscription =
            SubscriptionRepository::find_active_by_spot(&mut conn, element_id, now).await?;

        Ok(resolve(element_id, access, booking, subscription))
    }
}

/// Aplicar la precedencia Access > Booking > Subscription sobre los
/// ocupantes candidatos ya consultados.
pub fn resolve(
    element_id: Uuid,
    access: Option<AccessRecord>,
    booking: Option<BookingRecord>,
    subscription: Option<SubscriptionRecord>,
) -> SpotOccupancy {
    if let Some(access) = access {
        return SpotOccupancy {
            element_id,
            status: OccupancyStatus::OccupiedByAccess,
            occupant: Some(Occupant {
                kind: RecordKind::Access,
                record_id: access.id,
                vehicle_id: access.vehicle_id,
                since: access.entry_time,
                until: access.exit_time,
            }),
        };
    }

    if let Some(booking) = booking {
        return SpotOccupancy {
            element_id,
            status: OccupancyStatus::OccupiedByBooking,
            occupant: Some(Occupant {
                kind: RecordKind::Booking,
                record_id: booking.id,
                vehicle_id: booking.vehicle_id,
                since: booking.start_date,
                until: Some(booking.end_date),
            }),
        };
    }

    if let Some(subscription) = subscription {
        return SpotOccupancy {
            element_id,
            status: OccupancyStatus::OccupiedBySubscription,
            occupant: Some(Occupant {
                kind: RecordKind::Subscription,
                record_id: subscription.id,
                vehicle_id: subscription.vehicle_id,
                since: subscription.start_date,
                until: Some(subscription.end_date),
            }),
        };
    }

    SpotOccupancy::available(element_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::access::AccessStatus;
    use crate::models::subscription::{SubscriptionPeriod, SubscriptionStatus};
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn open_access(spot_id: Uuid) -> AccessRecord {
        let now = Utc::now();
        AccessRecord {
            id: Uuid::new_v4(),
            number: 1,
            parking_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            spot_id: Some(spot_id),
            entry_employee_id: Uuid::new_v4(),
            exit_employee_id: None,
            entry_time: now,
            exit_time: None,
            amount: Decimal::ZERO,
            status: AccessStatus::Open,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn active_subscription(spot_id: Uuid) -> SubscriptionRecord {
        let now = Utc::now();
        SubscriptionRecord {
            id: Uuid::new_v4(),
            number: 1,
            parking_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            spot_id: Some(spot_id),
            employee_id: Uuid::new_v4(),
            period: SubscriptionPeriod::Monthly,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(29),
            amount: Decimal::ZERO,
            is_active: true,
            status: SubscriptionStatus::Active,
            parent_id: None,
            notes: None,
            created_at: now,
        }
    }

    #[test]
    fn test_no_sources_means_available() {
        let element_id = Uuid::new_v4();
        let occupancy = resolve(element_id, None, None, None);
        assert!(occupancy.is_free());
        assert!(occupancy.occupant.is_none());
    }

    #[test]
    fn test_access_wins_over_subscription() {
        let element_id = Uuid::new_v4();
        let access = open_access(element_id);
        let access_id = access.id;

        let occupancy = resolve(
            element_id,
            Some(access),
            None,
            Some(active_subscription(element_id)),
        );
        assert_eq!(occupancy.status, OccupancyStatus::OccupiedByAccess);
        assert_eq!(occupancy.occupant.unwrap().record_id, access_id);
    }

    #[test]
    fn test_subscription_alone_occupies() {
        let element_id = Uuid::new_v4();
        let occupancy = resolve(element_id, None, None, Some(active_subscription(element_id)));
        assert_eq!(occupancy.status, OccupancyStatus::OccupiedBySubscription);
        assert_eq!(occupancy.occupant.unwrap().kind, RecordKind::Subscription);
    }
}
