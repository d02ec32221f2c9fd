//! Repositorio del outbox del libro mayor
//!
//! La anotación del cobro va en la misma transacción que la transición que
//! lo origina; la entrega a una caja corre después y puede reintentarse.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::cash_register::{LedgerOutboxEntry, MovementType, RecordKind};
use crate::utils::errors::AppError;

/// Lote de entrega: solo entradas que hoy tienen una caja activa donde
/// aterrizar. Las que no la tienen no ocupan lugar en el lote, así un
/// backlog de entradas viejas sin caja nunca frena a las entregables.
const PENDING_DELIVERABLE_SQL: &str = r#"
    SELECT o.* FROM t_ledger_outbox o
    WHERE o.delivered_at IS NULL
      AND EXISTS (
          SELECT 1 FROM t_cash_register c
          WHERE c.employee_id = o.employee_id
            AND c.parking_id = o.parking_id
            AND c.status = 'active'
      )
    ORDER BY o.created_at
    LIMIT $1
    FOR UPDATE OF o SKIP LOCKED
"#;

pub struct LedgerOutboxRepository;

impl LedgerOutboxRepository {
    #[allow(clippy::too_many_arguments)]
    pub async fn enqueue(
        conn: &mut PgConnection,
        parking_id: Uuid,
        employee_id: Uuid,
        origin_kind: RecordKind,
        origin_id: Uuid,
        movement_type: MovementType,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<LedgerOutboxEntry, AppError> {
        let entry = sqlx::query_as::<_, LedgerOutboxEntry>(
            r#"
            INSERT INTO t_ledger_outbox
                (id, parking_id, employee_id, origin_kind, origin_id, type, amount, description, attempts, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(parking_id)
        .bind(employee_id)
        .bind(origin_kind)
        .bind(origin_id)
        .bind(movement_type)
        .bind(amount)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(entry)
    }

    /// Entradas sin entregar con caja activa disponible, más antiguas
    /// primero, bloqueadas contra otros repartidores concurrentes.
    pub async fn pending_deliverable(
        conn: &mut PgConnection,
        limit: i64,
    ) -> Result<Vec<LedgerOutboxEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerOutboxEntry>(PENDING_DELIVERABLE_SQL)
            .bind(limit)
            .fetch_all(conn)
            .await?;

        Ok(entries)
    }

    /// Cuántas entradas pendientes no tienen caja activa donde entregarse.
    /// Quedan fuera del lote de entrega y necesitan conciliación manual si
    /// el empleado no vuelve a abrir caja.
    pub async fn stalled_count(conn: &mut PgConnection) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM t_ledger_outbox o
            WHERE o.delivered_at IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM t_cash_register c
                  WHERE c.employee_id = o.employee_id
                    AND c.parking_id = o.parking_id
                    AND c.status = 'active'
              )
            "#,
        )
        .fetch_one(conn)
        .await?;

        Ok(count)
    }

    pub async fn mark_delivered(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE t_ledger_outbox SET delivered_at = $2 WHERE id = $1 AND delivered_at IS NULL",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn bump_attempts(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE t_ledger_outbox SET attempts = attempts + 1 WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_batch_skips_entries_without_active_session() {
        // Un backlog de entradas viejas sin caja activa no debe llenar el
        // lote ni frenar la entrega de entradas más nuevas con caja
        assert!(PENDING_DELIVERABLE_SQL.contains("delivered_at IS NULL"));
        assert!(PENDING_DELIVERABLE_SQL.contains("EXISTS"));
        assert!(PENDING_DELIVERABLE_SQL.contains("c.status = 'active'"));
        assert!(PENDING_DELIVERABLE_SQL.contains("ORDER BY o.created_at"));
    }
}
