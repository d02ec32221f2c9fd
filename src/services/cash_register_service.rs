//! Ciclo de vida de cajas registradoras
//!
//! Un empleado puede tener a lo sumo 2 cajas activas por parking. El
//! chequeo de tope y la inserción van serializados bajo un advisory lock
//! transaccional por (empleado, parking): dos aperturas concurrentes no
//! pueden pasar ambas el conteo.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::models::cash_register::{
    session_total, CashRegisterSession, CreateMovementRequest, Movement, OpenSessionRequest,
    RecordKind, SessionStatus, SessionSummary,
};
use crate::repositories::cash_register_repository::CashRegisterRepository;
use crate::repositories::ledger_outbox_repository::LedgerOutboxRepository;
use crate::repositories::parking_repository::ParkingRepository;
use crate::repositories::sequence_repository::SequenceRepository;
use crate::utils::errors::AppError;

/// Máximo de cajas activas simultáneas por (empleado, parking)
const MAX_ACTIVE_SESSIONS: i64 = 2;

pub struct CashRegisterService {
    pool: PgPool,
}

impl CashRegisterService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Abrir una caja para el empleado con su monto inicial.
    pub async fn open_session(
        &self,
        parking_id: Uuid,
        employee_id: Uuid,
        request: OpenSessionRequest,
    ) -> Result<CashRegisterSession, AppError> {
        request.validate()?;
        if request.initial_amount < Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Initial amount cannot be negative".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        ParkingRepository::ensure_exists(&mut tx, parking_id).await?;

        CashRegisterRepository::lock_employee_sessions(&mut tx, employee_id, parking_id).await?;

        let active =
            CashRegisterRepository::count_active_sessions(&mut tx, employee_id, parking_id).await?;
        if active >= MAX_ACTIVE_SESSIONS {
            return Err(AppError::Conflict(format!(
                "Employee already has {} active cash sessions for this parking",
                active
            )));
        }

        // Las cajas numeran por (parking, empleado), no por parking
        let number = SequenceRepository::next_number_scoped(
            &mut tx,
            parking_id,
            RecordKind::CashRegister,
            employee_id,
        )
        .await?;

        let session = CashRegisterRepository::insert_session(
            &mut tx,
            number,
            parking_id,
            employee_id,
            request.initial_amount,
        )
        .await?;

        tx.commit().await?;

        info!(
            session_id = %session.id,
            number = session.number,
            employee_id = %employee_id,
            "cash session opened"
        );
        Ok(session)
    }

    /// Cerrar una caja activa y devolver su resumen con total recalculado.
    pub async fn close_session(&self, session_id: Uuid) -> Result<SessionSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        CashRegisterRepository::find_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cash session not found".to_string()))?;

        let session = CashRegisterRepository::close_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Cash session is not active".to_string()))?;

        let (income, expense) =
            CashRegisterRepository::sum_movements(&mut tx, session_id).await?;

        tx.commit().await?;

        info!(session_id = %session.id, "cash session closed");

        let total = session_total(session.initial_amount, income, expense);
        Ok(SessionSummary {
            session,
            income,
            expense,
            total,
        })
    }

    /// Resumen de una caja; el total siempre sale de sumar movimientos.
    pub async fn session_summary(&self, session_id: Uuid) -> Result<SessionSummary, AppError> {
        let mut conn = self.pool.acquire().await?;

        let session = CashRegisterRepository::find_session(&mut conn, session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cash session not found".to_string()))?;

        let (income, expense) = CashRegisterRepository::sum_movements(&mut conn, session_id).await?;
        let total = session_total(session.initial_amount, income, expense);

        Ok(SessionSummary {
            session,
            income,
            expense,
            total,
        })
    }

    /// Registrar un movimiento manual contra una caja activa.
    pub async fn record_movement(
        &self,
        session_id: Uuid,
        request: CreateMovementRequest,
    ) -> Result<Movement, AppError> {
        request.validate()?;
        if request.amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Movement amount must be positive".to_string(),
            ));
        }

        let mut conn = self.pool.acquire().await?;

        let session = CashRegisterRepository::find_session(&mut conn, session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cash session not found".to_string()))?;

        if session.status != SessionStatus::Active {
            return Err(AppError::BadRequest(
                "Cash session is not active".to_string(),
            ));
        }

        CashRegisterRepository::insert_movement(
            &mut conn,
            session.id,
            request.movement_type,
            request.amount,
            request.description,
            None,
            None,
        )
        .await
    }

    pub async fn list_sessions(
        &self,
        parking_id: Uuid,
        status: Option<SessionStatus>,
    ) -> Result<Vec<CashRegisterSession>, AppError> {
        let mut conn = self.pool.acquire().await?;
        CashRegisterRepository::list_sessions(&mut conn, parking_id, status).await
    }

    pub async fn session_movements(&self, session_id: Uuid) -> Result<Vec<Movement>, AppError> {
        let mut conn = self.pool.acquire().await?;

        CashRegisterRepository::find_session(&mut conn, session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cash session not found".to_string()))?;

        CashRegisterRepository::movements_for_session(&mut conn, session_id).await
    }

    /// Entregar las entradas pendientes del outbox a la caja activa de cada
    /// empleado. El lote solo trae entradas con caja activa disponible; las
    /// que no la tienen quedan pendientes fuera del lote y se reportan para
    /// conciliación. Devuelve cuántas entradas se entregaron.
    pub async fn deliver_pending(&self) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        let entries = LedgerOutboxRepository::pending_deliverable(&mut tx, 50).await?;
        let mut delivered = 0;

        for entry in entries {
            let session = CashRegisterRepository::find_active_session(
                &mut tx,
                entry.employee_id,
                entry.parking_id,
            )
            .await?;

            match session {
                Some(session) => {
                    CashRegisterRepository::insert_movement(
                        &mut tx,
                        session.id,
                        entry.movement_type,
                        entry.amount,
                        entry.description.clone(),
                        Some(entry.origin_kind),
                        Some(entry.origin_id),
                    )
                    .await?;
                    LedgerOutboxRepository::mark_delivered(&mut tx, entry.id).await?;
                    delivered += 1;
                }
                None => {
                    // La caja se cerró entre la selección del lote y acá
                    LedgerOutboxRepository::bump_attempts(&mut tx, entry.id).await?;
                    debug!(
                        entry_id = %entry.id,
                        employee_id = %entry.employee_id,
                        attempts = entry.attempts + 1,
                        "no active cash session, outbox entry stays pending"
                    );
                }
            }
        }

        let stalled = LedgerOutboxRepository::stalled_count(&mut tx).await?;

        tx.commit().await?;

        if delivered > 0 {
            info!(delivered, "ledger outbox entries delivered");
        }
        if stalled > 0 {
            warn!(
                stalled,
                "ledger outbox entries have no active cash session to land in"
            );
        }
        Ok(delivered)
    }
}
