//! Ciclo de vida de accesos (entrada/salida)
//!
//! Estados: Open -> Closed (salida normal) u Open -> Cancelled (anulación
//! sin cobro). Cada operación corre en una sola transacción: si falla la
//! búsqueda de tarifa después de crear el vehículo, todo se revierte y no
//! quedan vehículos huérfanos ni accesos a medio cerrar. El reclamo del
//! spot y la anotación del cobro en el outbox van dentro de esa misma
//! transacción; solo la entrega del movimiento a la caja corre después.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::models::access::{
    AccessFilters, AccessRecord, AccessStats, CloseAccessRequest, CreateAccessRequest,
};
use crate::models::cash_register::{MovementType, RecordKind};
use crate::models::vehicle::VehicleDetails;
use crate::repositories::access_repository::AccessRepository;
use crate::repositories::element_repository::ElementRepository;
use crate::repositories::ledger_outbox_repository::LedgerOutboxRepository;
use crate::repositories::parking_repository::ParkingRepository;
use crate::repositories::rate_repository::RateRepository;
use crate::repositories::sequence_repository::SequenceRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::billing;
use crate::services::cash_register_service::CashRegisterService;
use crate::utils::errors::{unique_violation_to_conflict, AppError};

pub struct AccessService {
    pool: PgPool,
}

impl AccessService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registrar la entrada de un vehículo.
    ///
    /// Resuelve o crea el vehículo por placa, verifica que no tenga otro
    /// acceso abierto, asigna el número y reclama el spot, todo en una
    /// transacción. El índice parcial sobre accesos abiertos y el update
    /// guardado del reclamo convierten las carreras entre entradas
    /// concurrentes en un Conflict para una de ellas.
    pub async fn create_access(
        &self,
        parking_id: Uuid,
        employee_id: Uuid,
        request: CreateAccessRequest,
    ) -> Result<AccessRecord, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        ParkingRepository::ensure_exists(&mut tx, parking_id).await?;

        if let Some(spot_id) = request.spot_id {
            ElementRepository::find_spot(&mut tx, spot_id, parking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Spot not found".to_string()))?;
        }

        let details = VehicleDetails {
            plate: request.vehicle_plate,
            category: request.vehicle_type.unwrap_or_default(),
            color: request.vehicle_color,
            owner_name: request.owner_name,
            owner_document: request.owner_document,
            owner_phone: request.owner_phone,
        };

        let vehicle = VehicleRepository::resolve_or_create(&mut tx, parking_id, &details).await?;

        if AccessRepository::find_open_by_vehicle(&mut tx, vehicle.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Vehicle already has an open access".to_string(),
            ));
        }

        let number = SequenceRepository::next_number(&mut tx, parking_id, RecordKind::Access).await?;

        let access = AccessRepository::insert(
            &mut tx,
            number,
            parking_id,
            vehicle.id,
            request.spot_id,
            employee_id,
            request.notes,
        )
        .await
        .map_err(|e| unique_violation_to_conflict(e, "Vehicle already has an open access"))?;

        if let Some(spot_id) = request.spot_id {
            ElementRepository::claim_spot(&mut tx, spot_id, RecordKind::Access, access.id)
                .await?
                .ok_or_else(|| AppError::Conflict("Spot is not available".to_string()))?;
        }

        tx.commit().await?;

        info!(
            access_id = %access.id,
            number = access.number,
            plate = %vehicle.plate,
            "access opened"
        );
        Ok(access)
    }

    /// Registrar la salida de un vehículo y calcular el monto a pagar.
    ///
    /// El monto se calcula con la tarifa vigente al momento de la salida
    /// para la categoría del vehículo. Si hay cobro, el movimiento se anota
    /// en el outbox dentro de la misma transacción que el cierre; la
    /// entrega a la caja del empleado corre tras el commit y se reintenta
    /// periódicamente si no hay caja activa.
    pub async fn close_access(
        &self,
        access_id: Uuid,
        exit_employee_id: Uuid,
        request: CloseAccessRequest,
    ) -> Result<AccessRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let access = AccessRepository::find_by_id(&mut tx, access_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Access not found".to_string()))?;

        let vehicle = VehicleRepository::find_by_id(&mut tx, access.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let rates = RateRepository::active_rates(&mut tx, access.parking_id).await?;
        if rates.is_empty() {
            return Err(AppError::BadRequest(
                "Parking has no active rate table".to_string(),
            ));
        }

        let exit_time = Utc::now();
        let amount = billing::compute_fee(access.entry_time, exit_time, &rates, vehicle.category)?;

        let closed = AccessRepository::close(
            &mut tx,
            access_id,
            exit_employee_id,
            exit_time,
            amount,
            request.notes,
        )
        .await?
        .ok_or_else(|| AppError::BadRequest("Access is not open".to_string()))?;

        if let Some(spot_id) = closed.spot_id {
            ElementRepository::release_spot(&mut tx, spot_id, closed.id).await?;
        }

        if closed.amount > Decimal::ZERO {
            LedgerOutboxRepository::enqueue(
                &mut tx,
                closed.parking_id,
                exit_employee_id,
                RecordKind::Access,
                closed.id,
                MovementType::Income,
                closed.amount,
                Some(format!("Access #{} exit fee", closed.number)),
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            access_id = %closed.id,
            amount = %closed.amount,
            "access closed"
        );

        // Entrega inmediata del outbox; una falla aquí no afecta el cierre
        // ya confirmado, la tarea periódica la reintenta.
        if closed.amount > Decimal::ZERO {
            let ledger = CashRegisterService::new(self.pool.clone());
            if let Err(e) = ledger.deliver_pending().await {
                warn!(
                    access_id = %closed.id,
                    error = %e,
                    "outbox delivery failed, entry stays pending"
                );
            }
        }

        Ok(closed)
    }

    /// Anular un acceso abierto sin generar cobro.
    pub async fn cancel_access(
        &self,
        access_id: Uuid,
        request: CloseAccessRequest,
    ) -> Result<AccessRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        AccessRepository::find_by_id(&mut tx, access_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Access not found".to_string()))?;

        let cancelled = AccessRepository::cancel(&mut tx, access_id, request.notes)
            .await?
            .ok_or_else(|| AppError::BadRequest("Access is not open".to_string()))?;

        if let Some(spot_id) = cancelled.spot_id {
            ElementRepository::release_spot(&mut tx, spot_id, cancelled.id).await?;
        }

        tx.commit().await?;

        info!(access_id = %cancelled.id, "access cancelled");
        Ok(cancelled)
    }

    pub async fn get_access(&self, access_id: Uuid) -> Result<AccessRecord, AppError> {
        let mut conn = self.pool.acquire().await?;
        AccessRepository::find_by_id(&mut conn, access_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Access not found".to_string()))
    }

    pub async fn list_accesses(
        &self,
        parking_id: Uuid,
        filters: AccessFilters,
    ) -> Result<Vec<AccessRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        AccessRepository::list(&mut conn, parking_id, &filters).await
    }

    pub async fn access_stats(
        &self,
        parking_id: Uuid,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<AccessStats, AppError> {
        let mut conn = self.pool.acquire().await?;
        AccessRepository::stats(&mut conn, parking_id, start_date, end_date).await
    }
}
