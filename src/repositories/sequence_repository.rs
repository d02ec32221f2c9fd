//! Numeración por parking y tipo de registro
//!
//! El patrón max(number)+1 no es seguro bajo transacciones concurrentes:
//! dos llamadores pueden leer el mismo máximo e insertar el mismo número.
//! Aquí el incremento es un upsert atómico sobre una fila contador, dentro
//! de la transacción del llamador. Las tablas de registros además llevan
//! UNIQUE (parking_id, number) como garantía de última instancia.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::cash_register::RecordKind;
use crate::utils::errors::AppError;

pub struct SequenceRepository;

impl SequenceRepository {
    /// Siguiente número para un (parking, tipo). El ámbito por defecto es
    /// el propio parking.
    pub async fn next_number(
        conn: &mut PgConnection,
        parking_id: Uuid,
        kind: RecordKind,
    ) -> Result<i64, AppError> {
        Self::next_number_scoped(conn, parking_id, kind, parking_id).await
    }

    /// Siguiente número con un ámbito explícito; las cajas registradoras
    /// numeran por (parking, empleado).
    pub async fn next_number_scoped(
        conn: &mut PgConnection,
        parking_id: Uuid,
        kind: RecordKind,
        scope_id: Uuid,
    ) -> Result<i64, AppError> {
        let (value,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO t_sequence (parking_id, kind, scope_id, value)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (parking_id, kind, scope_id)
            DO UPDATE SET value = t_sequence.value + 1
            RETURNING value
            "#,
        )
        .bind(parking_id)
        .bind(kind)
        .bind(scope_id)
        .fetch_one(conn)
        .await?;

        Ok(value)
    }
}
