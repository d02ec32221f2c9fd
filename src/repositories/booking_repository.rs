//! Repositorio de reservas

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::booking::{BookingFilters, BookingRecord, BookingStatus};
use crate::utils::errors::AppError;

pub struct BookingRepository;

impl BookingRepository {
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        number: i64,
        parking_id: Uuid,
        vehicle_id: Uuid,
        spot_id: Option<Uuid>,
        employee_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<BookingRecord, AppError> {
        let booking = sqlx::query_as::<_, BookingRecord>(
            r#"
            INSERT INTO t_booking
                (id, number, parking_id, vehicle_id, spot_id, employee_id,
                 start_date, end_date, amount, status, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 'pending', $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .bind(parking_id)
        .bind(vehicle_id)
        .bind(spot_id)
        .bind(employee_id)
        .bind(start_date)
        .bind(end_date)
        .bind(notes)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(booking)
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<BookingRecord>, AppError> {
        let booking = sqlx::query_as::<_, BookingRecord>("SELECT * FROM t_booking WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(booking)
    }

    /// Transición de estado con guarda sobre los estados de origen válidos.
    /// Devuelve None si la reserva no estaba en un estado permitido.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> Result<Option<BookingRecord>, AppError> {
        let booking = sqlx::query_as::<_, BookingRecord>(
            r#"
            UPDATE t_booking
            SET status = $3
            WHERE id = $1 AND status = ANY($2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from.to_vec())
        .bind(to)
        .fetch_optional(conn)
        .await?;

        Ok(booking)
    }

    /// Reserva vigente sobre un spot: ventana temporal que contiene `now`
    /// y estado Active.
    pub async fn find_active_by_spot(
        conn: &mut PgConnection,
        spot_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<BookingRecord>, AppError> {
        let booking = sqlx::query_as::<_, BookingRecord>(
            r#"
            SELECT * FROM t_booking
            WHERE spot_id = $1
              AND status = 'active'
              AND start_date <= $2
              AND end_date > $2
            ORDER BY start_date DESC
            LIMIT 1
            "#,
        )
        .bind(spot_id)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(booking)
    }

    pub async fn list(
        conn: &mut PgConnection,
        parking_id: Uuid,
        filters: &BookingFilters,
    ) -> Result<Vec<BookingRecord>, AppError> {
        let bookings = sqlx::query_as::<_, BookingRecord>(
            r#"
            SELECT * FROM t_booking
            WHERE parking_id = $1
              AND ($2::booking_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR spot_id = $3)
            ORDER BY start_date DESC
            LIMIT COALESCE($4, 50)
            "#,
        )
        .bind(parking_id)
        .bind(filters.status)
        .bind(filters.spot_id)
        .bind(filters.limit)
        .fetch_all(conn)
        .await?;

        Ok(bookings)
    }
}
