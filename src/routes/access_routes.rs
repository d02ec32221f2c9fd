//! Rutas de accesos (entrada/salida de vehículos)

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::access::{
    AccessFilters, AccessRecord, AccessStats, CloseAccessRequest, CreateAccessRequest,
};
use crate::routes::{parking_from_headers, request_context};
use crate::services::access_service::AccessService;
use crate::services::occupancy_service::OccupancyService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_access_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_access))
        .route("/", get(list_accesses))
        .route("/stats", get(access_stats))
        .route("/:id", get(get_access))
        .route("/:id/exit", post(close_access))
        .route("/:id/cancel", post(cancel_access))
}

async fn create_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateAccessRequest>,
) -> Result<Json<AccessRecord>, AppError> {
    let ctx = request_context(&headers)?;

    // El chequeo de ocupación es responsabilidad del handler; el servicio
    // solo garantiza la unicidad de acceso abierto por vehículo.
    if let Some(spot_id) = request.spot_id {
        let occupancy = OccupancyService::new(state.pool.clone())
            .occupancy_of(spot_id)
            .await?;
        if !occupancy.is_free() {
            return Err(AppError::Conflict("Spot is not available".to_string()));
        }
    }

    let service = AccessService::new(state.pool.clone());
    let access = service
        .create_access(ctx.parking_id, ctx.employee_id, request)
        .await?;
    Ok(Json(access))
}

async fn close_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<CloseAccessRequest>,
) -> Result<Json<AccessRecord>, AppError> {
    let ctx = request_context(&headers)?;
    let service = AccessService::new(state.pool.clone());
    let access = service.close_access(id, ctx.employee_id, request).await?;
    Ok(Json(access))
}

async fn cancel_access(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CloseAccessRequest>,
) -> Result<Json<AccessRecord>, AppError> {
    let service = AccessService::new(state.pool.clone());
    let access = service.cancel_access(id, request).await?;
    Ok(Json(access))
}

async fn get_access(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccessRecord>, AppError> {
    let service = AccessService::new(state.pool.clone());
    let access = service.get_access(id).await?;
    Ok(Json(access))
}

async fn list_accesses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filters): Query<AccessFilters>,
) -> Result<Json<Vec<AccessRecord>>, AppError> {
    let parking_id = parking_from_headers(&headers)?;
    let service = AccessService::new(state.pool.clone());
    let accesses = service.list_accesses(parking_id, filters).await?;
    Ok(Json(accesses))
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

async fn access_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<Json<AccessStats>, AppError> {
    let parking_id = parking_from_headers(&headers)?;
    let service = AccessService::new(state.pool.clone());
    let stats = service
        .access_stats(parking_id, query.start_date, query.end_date)
        .await?;
    Ok(Json(stats))
}
