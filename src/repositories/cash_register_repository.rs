//! Repositorio de cajas registradoras y movimientos
//!
//! Los movimientos solo se insertan; el total de una caja se obtiene
//! sumando sus movimientos en la consulta, nunca de una columna cacheada.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::cash_register::{
    CashRegisterSession, Movement, MovementType, RecordKind, SessionStatus,
};
use crate::utils::errors::AppError;

pub struct CashRegisterRepository;

impl CashRegisterRepository {
    /// Serializa apertura de cajas para un (empleado, parking) dentro de la
    /// transacción actual; dos aperturas concurrentes quedan una detrás de
    /// la otra y la segunda ve la cuenta real de cajas activas.
    pub async fn lock_employee_sessions(
        conn: &mut PgConnection,
        employee_id: Uuid,
        parking_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
            .bind(employee_id.to_string())
            .bind(parking_id.to_string())
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn count_active_sessions(
        conn: &mut PgConnection,
        employee_id: Uuid,
        parking_id: Uuid,
    ) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM t_cash_register
            WHERE employee_id = $1 AND parking_id = $2 AND status = 'active'
            "#,
        )
        .bind(employee_id)
        .bind(parking_id)
        .fetch_one(conn)
        .await?;

        Ok(count)
    }

    pub async fn insert_session(
        conn: &mut PgConnection,
        number: i64,
        parking_id: Uuid,
        employee_id: Uuid,
        initial_amount: Decimal,
    ) -> Result<CashRegisterSession, AppError> {
        let now = Utc::now();
        let session = sqlx::query_as::<_, CashRegisterSession>(
            r#"
            INSERT INTO t_cash_register
                (id, number, parking_id, employee_id, initial_amount, start_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'active', $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .bind(parking_id)
        .bind(employee_id)
        .bind(initial_amount)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(session)
    }

    pub async fn find_session(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<CashRegisterSession>, AppError> {
        let session = sqlx::query_as::<_, CashRegisterSession>(
            "SELECT * FROM t_cash_register WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(session)
    }

    /// Caja activa más reciente de un empleado en un parking; contra ella
    /// se registran los cobros de salida.
    pub async fn find_active_session(
        conn: &mut PgConnection,
        employee_id: Uuid,
        parking_id: Uuid,
    ) -> Result<Option<CashRegisterSession>, AppError> {
        let session = sqlx::query_as::<_, CashRegisterSession>(
            r#"
            SELECT * FROM t_cash_register
            WHERE employee_id = $1 AND parking_id = $2 AND status = 'active'
            ORDER BY start_date DESC
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(parking_id)
        .fetch_optional(conn)
        .await?;

        Ok(session)
    }

    /// Cerrar una caja activa. Devuelve None si no estaba activa.
    pub async fn close_session(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<CashRegisterSession>, AppError> {
        let session = sqlx::query_as::<_, CashRegisterSession>(
            r#"
            UPDATE t_cash_register
            SET end_date = $2, status = 'verified'
            WHERE id = $1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;

        Ok(session)
    }

    pub async fn list_sessions(
        conn: &mut PgConnection,
        parking_id: Uuid,
        status: Option<SessionStatus>,
    ) -> Result<Vec<CashRegisterSession>, AppError> {
        let sessions = sqlx::query_as::<_, CashRegisterSession>(
            r#"
            SELECT * FROM t_cash_register
            WHERE parking_id = $1
              AND ($2::session_status IS NULL OR status = $2)
            ORDER BY start_date DESC
            "#,
        )
        .bind(parking_id)
        .bind(status)
        .fetch_all(conn)
        .await?;

        Ok(sessions)
    }

    pub async fn insert_movement(
        conn: &mut PgConnection,
        cash_register_id: Uuid,
        movement_type: MovementType,
        amount: Decimal,
        description: Option<String>,
        origin_kind: Option<RecordKind>,
        origin_id: Option<Uuid>,
    ) -> Result<Movement, AppError> {
        let movement = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO t_movement
                (id, cash_register_id, type, amount, description, origin_kind, origin_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cash_register_id)
        .bind(movement_type)
        .bind(amount)
        .bind(description)
        .bind(origin_kind)
        .bind(origin_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(movement)
    }

    pub async fn movements_for_session(
        conn: &mut PgConnection,
        cash_register_id: Uuid,
    ) -> Result<Vec<Movement>, AppError> {
        let movements = sqlx::query_as::<_, Movement>(
            "SELECT * FROM t_movement WHERE cash_register_id = $1 ORDER BY created_at",
        )
        .bind(cash_register_id)
        .fetch_all(conn)
        .await?;

        Ok(movements)
    }

    /// Suma de ingresos y egresos de una caja, recalculada en cada lectura.
    pub async fn sum_movements(
        conn: &mut PgConnection,
        cash_register_id: Uuid,
    ) -> Result<(Decimal, Decimal), AppError> {
        let (income, expense): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE type = 'income'), 0),
                COALESCE(SUM(amount) FILTER (WHERE type = 'expense'), 0)
            FROM t_movement
            WHERE cash_register_id = $1
            "#,
        )
        .bind(cash_register_id)
        .fetch_one(conn)
        .await?;

        Ok((income, expense))
    }
}
