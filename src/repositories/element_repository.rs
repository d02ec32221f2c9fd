//! Repositorio de elementos (spots)
//!
//! El reclamo de un spot es un update guardado sobre el puntero
//! current_occupant_*: solo uno de dos escritores concurrentes puede pasar
//! la condición IS NULL, el otro recibe 0 filas y debe fallar con Conflict.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::cash_register::RecordKind;
use crate::models::element::Element;
use crate::utils::errors::AppError;

pub struct ElementRepository;

impl ElementRepository {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Element>, AppError> {
        let element = sqlx::query_as::<_, Element>("SELECT * FROM t_element WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(element)
    }

    pub async fn find_spot(
        conn: &mut PgConnection,
        id: Uuid,
        parking_id: Uuid,
    ) -> Result<Option<Element>, AppError> {
        let element = sqlx::query_as::<_, Element>(
            r#"
            SELECT * FROM t_element
            WHERE id = $1 AND parking_id = $2 AND element_type = 'spot'
            "#,
        )
        .bind(id)
        .bind(parking_id)
        .fetch_optional(conn)
        .await?;

        Ok(element)
    }

    /// Reclamar un spot libre para un registro de ocupación. Devuelve None
    /// si el spot no existe, está en mantenimiento o ya tiene dueño.
    pub async fn claim_spot(
        conn: &mut PgConnection,
        id: Uuid,
        kind: RecordKind,
        record_id: Uuid,
    ) -> Result<Option<Element>, AppError> {
        let element = sqlx::query_as::<_, Element>(
            r#"
            UPDATE t_element
            SET current_occupant_kind = $2, current_occupant_id = $3
            WHERE id = $1
              AND element_type = 'spot'
              AND status = 'available'
              AND current_occupant_id IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(kind)
        .bind(record_id)
        .fetch_optional(conn)
        .await?;

        Ok(element)
    }

    /// Liberar un spot si el reclamo vigente pertenece al registro dado.
    /// Idempotente: liberar un spot ya libre o reclamado por otro no hace nada.
    pub async fn release_spot(
        conn: &mut PgConnection,
        id: Uuid,
        record_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE t_element
            SET current_occupant_kind = NULL, current_occupant_id = NULL
            WHERE id = $1 AND current_occupant_id = $2
            "#,
        )
        .bind(id)
        .bind(record_id)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn list_spots(
        conn: &mut PgConnection,
        parking_id: Uuid,
    ) -> Result<Vec<Element>, AppError> {
        let elements = sqlx::query_as::<_, Element>(
            r#"
            SELECT * FROM t_element
            WHERE parking_id = $1 AND element_type = 'spot'
            ORDER BY name
            "#,
        )
        .bind(parking_id)
        .fetch_all(conn)
        .await?;

        Ok(elements)
    }
}
