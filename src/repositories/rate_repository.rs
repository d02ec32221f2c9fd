//! Repositorio de tarifas

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::rate::Rate;
use crate::utils::errors::AppError;

pub struct RateRepository;

impl RateRepository {
    /// Tarifas activas del parking, en orden de creación. El orden importa:
    /// la primera tarifa activa es el fallback cuando ninguna coincide con
    /// la categoría del vehículo.
    pub async fn active_rates(
        conn: &mut PgConnection,
        parking_id: Uuid,
    ) -> Result<Vec<Rate>, AppError> {
        let rates = sqlx::query_as::<_, Rate>(
            r#"
            SELECT * FROM t_rate
            WHERE parking_id = $1 AND is_active
            ORDER BY created_at
            "#,
        )
        .bind(parking_id)
        .fetch_all(conn)
        .await?;

        Ok(rates)
    }
}
