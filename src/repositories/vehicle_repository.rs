//! Repositorio de vehículos
//!
//! Los vehículos se crean de forma perezosa la primera vez que aparece una
//! placa y nunca se borran físicamente (solo soft-delete). Las búsquedas
//! filtran deleted_at IS NULL y trabajan sobre la placa normalizada.
//!
//! Dos transacciones concurrentes pueden ver ambas una placa desconocida;
//! el insert usa ON CONFLICT DO NOTHING sobre el índice parcial de placas
//! y el perdedor relee la fila del ganador en vez de reventar con 23505.

use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::vehicle::{normalize_plate, Vehicle, VehicleDetails};
use crate::utils::errors::AppError;

pub struct VehicleRepository;

impl VehicleRepository {
    pub async fn find_by_plate(
        conn: &mut PgConnection,
        parking_id: Uuid,
        plate: &str,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM t_vehicle
            WHERE parking_id = $1 AND plate = $2 AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(parking_id)
        .bind(normalize_plate(plate))
        .fetch_optional(conn)
        .await?;

        Ok(vehicle)
    }

    /// Insertar el vehículo si la placa sigue libre. Devuelve None cuando
    /// otro escritor concurrente ya la registró: el insert espera a que el
    /// ganador confirme y no hace nada, sin abortar la transacción.
    pub async fn create(
        conn: &mut PgConnection,
        parking_id: Uuid,
        details: &VehicleDetails,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO t_vehicle
                (id, parking_id, plate, category, color, owner_name, owner_document, owner_phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (parking_id, plate) WHERE deleted_at IS NULL DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(parking_id)
        .bind(normalize_plate(&details.plate))
        .bind(details.category)
        .bind(&details.color)
        .bind(&details.owner_name)
        .bind(&details.owner_document)
        .bind(&details.owner_phone)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;

        Ok(vehicle)
    }

    /// Buscar el vehículo por placa o crearlo si no existe, dentro de la
    /// misma transacción que la operación que lo referencia. Si pierde la
    /// carrera contra otro registro de la misma placa, relee la fila ya
    /// confirmada del ganador.
    pub async fn resolve_or_create(
        conn: &mut PgConnection,
        parking_id: Uuid,
        details: &VehicleDetails,
    ) -> Result<Vehicle, AppError> {
        if let Some(vehicle) = Self::find_by_plate(conn, parking_id, &details.plate).await? {
            return Ok(vehicle);
        }

        if let Some(vehicle) = Self::create(conn, parking_id, details).await? {
            return Ok(vehicle);
        }

        // El ganador ya confirmó; su fila es visible para la relectura
        Self::find_by_plate(conn, parking_id, &details.plate)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Vehicle is being registered concurrently".to_string())
            })
    }

    /// Refrescar los datos del dueño y del vehículo (usado al suscribir
    /// una placa ya conocida).
    pub async fn update_details(
        conn: &mut PgConnection,
        id: Uuid,
        details: &VehicleDetails,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE t_vehicle
            SET category = $2,
                color = COALESCE($3, color),
                owner_name = COALESCE($4, owner_name),
                owner_document = COALESCE($5, owner_document),
                owner_phone = COALESCE($6, owner_phone)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(details.category)
        .bind(&details.color)
        .bind(&details.owner_name)
        .bind(&details.owner_document)
        .bind(&details.owner_phone)
        .fetch_one(conn)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM t_vehicle WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(vehicle)
    }
}
