//! Modelo de CashRegister y Movement
//!
//! Una caja registradora es el turno de caja de un empleado dentro de un
//! parking. Los movimientos son líneas inmutables del libro mayor; el total
//! de la caja siempre se recalcula sumando, nunca se almacena.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Estado de la caja - mapea al ENUM session_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Verified,
}

/// Tipo de movimiento - mapea al ENUM movement_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "movement_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Income,
    Expense,
}

/// Tipo de registro que originó un movimiento o consume numeración
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "record_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Access,
    Booking,
    Subscription,
    CashRegister,
}

/// CashRegister principal - mapea exactamente a la tabla t_cash_register
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CashRegisterSession {
    pub id: Uuid,
    pub number: i64,
    pub parking_id: Uuid,
    pub employee_id: Uuid,
    pub initial_amount: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

/// Movement principal - mapea exactamente a la tabla t_movement
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movement {
    pub id: Uuid,
    pub cash_register_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub origin_kind: Option<RecordKind>,
    pub origin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request para abrir una caja
#[derive(Debug, Deserialize, Validate)]
pub struct OpenSessionRequest {
    pub initial_amount: Decimal,
}

/// Request para registrar un movimiento manual
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMovementRequest {
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Entrada del outbox del libro mayor - mapea a la tabla t_ledger_outbox
///
/// Un cobro pendiente de entregar a la caja activa del empleado. Se inserta
/// en la misma transacción que la transición que lo origina y se entrega
/// después; delivered_at distingue lo entregado de lo pendiente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerOutboxEntry {
    pub id: Uuid,
    pub parking_id: Uuid,
    pub employee_id: Uuid,
    pub origin_kind: RecordKind,
    pub origin_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Resumen de una caja con su total recalculado
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session: CashRegisterSession,
    pub income: Decimal,
    pub expense: Decimal,
    pub total: Decimal,
}

/// Total de la caja: monto inicial + ingresos - egresos
pub fn session_total(initial: Decimal, income: Decimal, expense: Decimal) -> Decimal {
    initial + income - expense
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_total_sums_income_minus_expense() {
        let total = session_total(
            Decimal::new(10000, 2), // 100.00
            Decimal::new(2550, 2),  // 25.50
            Decimal::new(1050, 2),  // 10.50
        );
        assert_eq!(total, Decimal::new(11500, 2)); // 115.00
    }
}
