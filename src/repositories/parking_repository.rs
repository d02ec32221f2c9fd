//! Repositorio de parkings
//!
//! El parking llega como header en cada request; los servicios lo
//! verifican al abrir la transacción para responder 404 en vez de dejar
//! que la FK reviente el insert.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::parking::Parking;
use crate::utils::errors::AppError;

pub struct ParkingRepository;

impl ParkingRepository {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Parking>, AppError> {
        let parking = sqlx::query_as::<_, Parking>("SELECT * FROM t_parking WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(parking)
    }

    /// Verificar que el parking existe antes de escribir contra él.
    pub async fn ensure_exists(conn: &mut PgConnection, id: Uuid) -> Result<Parking, AppError> {
        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parking not found".to_string()))
    }
}
