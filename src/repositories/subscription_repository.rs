//! Repositorio de suscripciones

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::subscription::{
    SubscriptionFilters, SubscriptionPeriod, SubscriptionRecord, SubscriptionStatus,
};
use crate::utils::errors::AppError;

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        number: i64,
        parking_id: Uuid,
        vehicle_id: Uuid,
        spot_id: Option<Uuid>,
        employee_id: Uuid,
        period: SubscriptionPeriod,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        amount: Decimal,
        parent_id: Option<Uuid>,
        notes: Option<String>,
    ) -> Result<SubscriptionRecord, AppError> {
        let subscription = sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            INSERT INTO t_subscription
                (id, number, parking_id, vehicle_id, spot_id, employee_id, period,
                 start_date, end_date, amount, is_active, status, parent_id, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, 'active', $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .bind(parking_id)
        .bind(vehicle_id)
        .bind(spot_id)
        .bind(employee_id)
        .bind(period)
        .bind(start_date)
        .bind(end_date)
        .bind(amount)
        .bind(parent_id)
        .bind(notes)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(subscription)
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<SubscriptionRecord>, AppError> {
        let subscription =
            sqlx::query_as::<_, SubscriptionRecord>("SELECT * FROM t_subscription WHERE id = $1")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(subscription)
    }

    /// Marcar una suscripción activa como renovada. Devuelve None si ya no
    /// estaba activa (renovación concurrente).
    pub async fn mark_renewed(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<SubscriptionRecord>, AppError> {
        let subscription = sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            UPDATE t_subscription
            SET status = 'renewed', is_active = FALSE
            WHERE id = $1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(subscription)
    }

    /// Suspender o expirar una suscripción activa.
    pub async fn deactivate(
        conn: &mut PgConnection,
        id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionRecord>, AppError> {
        let subscription = sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            UPDATE t_subscription
            SET status = $2, is_active = FALSE
            WHERE id = $1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(conn)
        .await?;

        Ok(subscription)
    }

    /// Suscripción vigente sobre un spot: activa y con ventana que contiene `now`.
    pub async fn find_active_by_spot(
        conn: &mut PgConnection,
        spot_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SubscriptionRecord>, AppError> {
        let subscription = sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            SELECT * FROM t_subscription
            WHERE spot_id = $1
              AND is_active
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

        Ok(subscription)
    }

    pub async fn list(
        conn: &mut PgConnection,
        parking_id: Uuid,
        filters: &SubscriptionFilters,
    ) -> Result<Vec<SubscriptionRecord>, AppError> {
        let subscriptions = sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            SELECT * FROM t_subscription
            WHERE parking_id = $1
              AND ($2::boolean IS NULL OR is_active = $2)
              AND ($3::subscription_status IS NULL OR status = $3)
            ORDER BY start_date DESC
            LIMIT COALESCE($4, 50)
            "#,
        )
        .bind(parking_id)
        .bind(filters.is_active)
        .bind(filters.status)
        .bind(filters.limit)
        .fetch_all(conn)
        .await?;

        Ok(subscriptions)
    }
}
