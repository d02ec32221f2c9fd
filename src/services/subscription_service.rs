//! Ciclo de vida de suscripciones
//!
//! Estados: Active -> Renewed | Expired | Suspended. La renovación crea un
//! registro nuevo que arranca donde termina el viejo y lo encadena vía
//! parent_id; ambas escrituras van en la misma transacción para que nunca
//! existan dos suscripciones activas de la misma cadena. El reclamo del
//! spot acompaña al registro activo: se toma al crear, se traspasa al
//! renovar y se libera al suspender o expirar.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::models::cash_register::RecordKind;
use crate::models::subscription::{
    CreateSubscriptionRequest, RenewSubscriptionRequest, SubscriptionFilters, SubscriptionPeriod,
    SubscriptionRecord, SubscriptionStatus,
};
use crate::models::vehicle::VehicleDetails;
use crate::repositories::element_repository::ElementRepository;
use crate::repositories::parking_repository::ParkingRepository;
use crate::repositories::rate_repository::RateRepository;
use crate::repositories::sequence_repository::SequenceRepository;
use crate::repositories::subscription_repository::SubscriptionRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::billing;
use crate::utils::errors::AppError;

pub struct SubscriptionService {
    pool: PgPool,
}

impl SubscriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear una suscripción cobrada según el precio del período en la
    /// tarifa de la categoría del vehículo.
    pub async fn create_subscription(
        &self,
        parking_id: Uuid,
        employee_id: Uuid,
        request: CreateSubscriptionRequest,
    ) -> Result<SubscriptionRecord, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        ParkingRepository::ensure_exists(&mut tx, parking_id).await?;

        if let Some(spot_id) = request.spot_id {
            ElementRepository::find_spot(&mut tx, spot_id, parking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Spot not found".to_string()))?;
        }

        let details = VehicleDetails {
            plate: request.vehicle_plate.clone(),
            category: request.vehicle_type.unwrap_or_default(),
            color: request.vehicle_color.clone(),
            owner_name: request.owner_name.clone(),
            owner_document: request.owner_document.clone(),
            owner_phone: request.owner_phone.clone(),
        };

        let rates = RateRepository::active_rates(&mut tx, parking_id).await?;
        let rate = billing::select_rate(&rates, details.category).ok_or_else(|| {
            AppError::BadRequest("No active rate configured for this parking".to_string())
        })?;

        let amount = period_price(rate, request.period);
        if amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Rate has no price configured for this period".to_string(),
            ));
        }

        let vehicle = VehicleRepository::resolve_or_create(&mut tx, parking_id, &details).await?;
        // La suscripción trae datos frescos del dueño; actualizarlos
        let vehicle = VehicleRepository::update_details(&mut tx, vehicle.id, &details).await?;

        let number =
            SequenceRepository::next_number(&mut tx, parking_id, RecordKind::Subscription).await?;

        let end_date = request.start_date + request.period.duration();

        let subscription = SubscriptionRepository::insert(
            &mut tx,
            number,
            parking_id,
            vehicle.id,
            request.spot_id,
            employee_id,
            request.period,
            request.start_date,
            end_date,
            amount,
            None,
            request.notes,
        )
        .await?;

        if let Some(spot_id) = request.spot_id {
            ElementRepository::claim_spot(&mut tx, spot_id, RecordKind::Subscription, subscription.id)
                .await?
                .ok_or_else(|| AppError::Conflict("Spot is not available".to_string()))?;
        }

        tx.commit().await?;

        info!(
            subscription_id = %subscription.id,
            number = subscription.number,
            plate = %vehicle.plate,
            "subscription created"
        );
        Ok(subscription)
    }

    /// Renovar una suscripción: el registro nuevo arranca en old.endDate,
    /// apunta al viejo vía parentId, y el viejo queda Renewed e inactivo.
    /// Ambas escrituras son atómicas; una renovación parcial dejaría dos
    /// suscripciones activas simultáneas para el mismo vehículo/spot.
    pub async fn renew_subscription(
        &self,
        subscription_id: Uuid,
        employee_id: Uuid,
        request: RenewSubscriptionRequest,
    ) -> Result<SubscriptionRecord, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let old = SubscriptionRepository::find_by_id(&mut tx, subscription_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

        SubscriptionRepository::mark_renewed(&mut tx, old.id)
            .await?
            .ok_or_else(|| AppError::Conflict("Subscription is not active".to_string()))?;

        let number =
            SequenceRepository::next_number(&mut tx, old.parking_id, RecordKind::Subscription)
                .await?;

        let start_date = old.end_date;
        let end_date = start_date + request.period.duration();

        let renewed = SubscriptionRepository::insert(
            &mut tx,
            number,
            old.parking_id,
            old.vehicle_id,
            old.spot_id,
            employee_id,
            request.period,
            start_date,
            end_date,
            request.amount,
            Some(old.id),
            request.notes,
        )
        .await?;

        // El reclamo del spot pasa del registro viejo al nuevo
        if let Some(spot_id) = old.spot_id {
            ElementRepository::release_spot(&mut tx, spot_id, old.id).await?;
            ElementRepository::claim_spot(&mut tx, spot_id, RecordKind::Subscription, renewed.id)
                .await?
                .ok_or_else(|| AppError::Conflict("Spot is not available".to_string()))?;
        }

        tx.commit().await?;

        info!(
            subscription_id = %renewed.id,
            parent_id = %old.id,
            "subscription renewed"
        );
        Ok(renewed)
    }

    /// Suspender una suscripción activa.
    pub async fn suspend_subscription(
        &self,
        subscription_id: Uuid,
    ) -> Result<SubscriptionRecord, AppError> {
        self.deactivate(subscription_id, SubscriptionStatus::Suspended)
            .await
    }

    /// Marcar una suscripción activa como expirada.
    pub async fn expire_subscription(
        &self,
        subscription_id: Uuid,
    ) -> Result<SubscriptionRecord, AppError> {
        self.deactivate(subscription_id, SubscriptionStatus::Expired)
            .await
    }

    pub async fn get_subscription(
        &self,
        subscription_id: Uuid,
    ) -> Result<SubscriptionRecord, AppError> {
        let mut conn = self.pool.acquire().await?;
        SubscriptionRepository::find_by_id(&mut conn, subscription_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))
    }

    pub async fn list_subscriptions(
        &self,
        parking_id: Uuid,
        filters: SubscriptionFilters,
    ) -> Result<Vec<SubscriptionRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        SubscriptionRepository::list(&mut conn, parking_id, &filters).await
    }

    async fn deactivate(
        &self,
        subscription_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<SubscriptionRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        SubscriptionRepository::find_by_id(&mut tx, subscription_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

        let subscription = SubscriptionRepository::deactivate(&mut tx, subscription_id, status)
            .await?
            .ok_or_else(|| AppError::Conflict("Subscription is not active".to_string()))?;

        if let Some(spot_id) = subscription.spot_id {
            ElementRepository::release_spot(&mut tx, spot_id, subscription.id).await?;
        }

        tx.commit().await?;

        info!(subscription_id = %subscription.id, status = ?subscription.status, "subscription deactivated");
        Ok(subscription)
    }
}

/// Precio del período en la tarifa seleccionada.
fn period_price(rate: &crate::models::rate::Rate, period: SubscriptionPeriod) -> Decimal {
    match period {
        SubscriptionPeriod::Weekly => rate.weekly,
        SubscriptionPeriod::Monthly => rate.monthly,
        SubscriptionPeriod::Yearly => rate.yearly,
    }
}
