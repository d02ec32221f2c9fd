//! Repositorio de accesos
//!
//! La exclusividad "un solo acceso abierto por vehículo" está respaldada
//! por el índice parcial uq_access_open_vehicle; el chequeo de aplicación
//! previo solo produce un mensaje de error más claro.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::access::{AccessFilters, AccessRecord, AccessStats};
use crate::utils::errors::AppError;

pub struct AccessRepository;

impl AccessRepository {
    pub async fn insert(
        conn: &mut PgConnection,
        number: i64,
        parking_id: Uuid,
        vehicle_id: Uuid,
        spot_id: Option<Uuid>,
        entry_employee_id: Uuid,
        notes: Option<String>,
    ) -> Result<AccessRecord, AppError> {
        let now = Utc::now();
        let access = sqlx::query_as::<_, AccessRecord>(
            r#"
            INSERT INTO t_access
                (id, number, parking_id, vehicle_id, spot_id, entry_employee_id,
                 entry_time, amount, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 'open', $8, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .bind(parking_id)
        .bind(vehicle_id)
        .bind(spot_id)
        .bind(entry_employee_id)
        .bind(now)
        .bind(notes)
        .fetch_one(conn)
        .await?;

        Ok(access)
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<AccessRecord>, AppError> {
        let access = sqlx::query_as::<_, AccessRecord>("SELECT * FROM t_access WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(access)
    }

    pub async fn find_open_by_vehicle(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
    ) -> Result<Option<AccessRecord>, AppError> {
        let access = sqlx::query_as::<_, AccessRecord>(
            "SELECT * FROM t_access WHERE vehicle_id = $1 AND status = 'open' LIMIT 1",
        )
        .bind(vehicle_id)
        .fetch_optional(conn)
        .await?;

        Ok(access)
    }

    pub async fn find_open_by_spot(
        conn: &mut PgConnection,
        spot_id: Uuid,
    ) -> Result<Option<AccessRecord>, AppError> {
        let access = sqlx::query_as::<_, AccessRecord>(
            r#"
            SELECT * FROM t_access
            WHERE spot_id = $1 AND status = 'open'
            ORDER BY entry_time DESC
            LIMIT 1
            "#,
        )
        .bind(spot_id)
        .fetch_optional(conn)
        .await?;

        Ok(access)
    }

    /// Cerrar un acceso abierto. Devuelve None si el registro no estaba
    /// en estado Open (carrera con otro cierre o cancelación).
    pub async fn close(
        conn: &mut PgConnection,
        id: Uuid,
        exit_employee_id: Uuid,
        exit_time: DateTime<Utc>,
        amount: Decimal,
        notes: Option<String>,
    ) -> Result<Option<AccessRecord>, AppError> {
        let access = sqlx::query_as::<_, AccessRecord>(
            r#"
            UPDATE t_access
            SET exit_employee_id = $2,
                exit_time = $3,
                amount = $4,
                status = 'closed',
                notes = COALESCE($5, notes),
                updated_at = $3
            WHERE id = $1 AND status = 'open'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(exit_employee_id)
        .bind(exit_time)
        .bind(amount)
        .bind(notes)
        .fetch_optional(conn)
        .await?;

        Ok(access)
    }

    /// Anular un acceso abierto sin cobrar.
    pub async fn cancel(
        conn: &mut PgConnection,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<Option<AccessRecord>, AppError> {
        let access = sqlx::query_as::<_, AccessRecord>(
            r#"
            UPDATE t_access
            SET status = 'cancelled',
                notes = COALESCE($2, notes),
                updated_at = $3
            WHERE id = $1 AND status = 'open'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(notes)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;

        Ok(access)
    }

    pub async fn list(
        conn: &mut PgConnection,
        parking_id: Uuid,
        filters: &AccessFilters,
    ) -> Result<Vec<AccessRecord>, AppError> {
        let accesses = sqlx::query_as::<_, AccessRecord>(
            r#"
            SELECT * FROM t_access
            WHERE parking_id = $1
              AND ($2::access_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR vehicle_id = $3)
              AND ($4::uuid IS NULL OR spot_id = $4)
            ORDER BY entry_time DESC
            LIMIT COALESCE($5, 50)
            "#,
        )
        .bind(parking_id)
        .bind(filters.status)
        .bind(filters.vehicle_id)
        .bind(filters.spot_id)
        .bind(filters.limit)
        .fetch_all(conn)
        .await?;

        Ok(accesses)
    }

    pub async fn stats(
        conn: &mut PgConnection,
        parking_id: Uuid,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<AccessStats, AppError> {
        let stats = sqlx::query_as::<_, AccessStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'open') AS open,
                COUNT(*) FILTER (WHERE status = 'closed') AS closed,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
            FROM t_access
            WHERE parking_id = $1
              AND ($2::timestamptz IS NULL OR entry_time >= $2)
              AND ($3::timestamptz IS NULL OR entry_time <= $3)
            "#,
        )
        .bind(parking_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(conn)
        .await?;

        Ok(stats)
    }
}
