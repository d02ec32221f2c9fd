//! Rutas de cajas registradoras

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::cash_register::{
    CashRegisterSession, CreateMovementRequest, Movement, OpenSessionRequest, SessionStatus,
    SessionSummary,
};
use crate::routes::{parking_from_headers, request_context};
use crate::services::cash_register_service::CashRegisterService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_cash_register_router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_session))
        .route("/", get(list_sessions))
        .route("/:id", get(session_summary))
        .route("/:id/close", post(close_session))
        .route("/:id/movements", post(record_movement))
        .route("/:id/movements", get(session_movements))
}

async fn open_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<CashRegisterSession>, AppError> {
    let ctx = request_context(&headers)?;
    let service = CashRegisterService::new(state.pool.clone());
    let session = service
        .open_session(ctx.parking_id, ctx.employee_id, request)
        .await?;
    Ok(Json(session))
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let service = CashRegisterService::new(state.pool.clone());
    let summary = service.close_session(id).await?;
    Ok(Json(summary))
}

async fn session_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let service = CashRegisterService::new(state.pool.clone());
    let summary = service.session_summary(id).await?;
    Ok(Json(summary))
}

async fn record_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateMovementRequest>,
) -> Result<Json<Movement>, AppError> {
    let service = CashRegisterService::new(state.pool.clone());
    let movement = service.record_movement(id, request).await?;
    Ok(Json(movement))
}

async fn session_movements(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Movement>>, AppError> {
    let service = CashRegisterService::new(state.pool.clone());
    let movements = service.session_movements(id).await?;
    Ok(Json(movements))
}

#[derive(Debug, Deserialize)]
struct SessionsQuery {
    status: Option<SessionStatus>,
}

async fn list_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<CashRegisterSession>>, AppError> {
    let parking_id = parking_from_headers(&headers)?;
    let service = CashRegisterService::new(state.pool.clone());
    let sessions = service.list_sessions(parking_id, query.status).await?;
    Ok(Json(sessions))
}
