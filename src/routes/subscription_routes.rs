//! Rutas de suscripciones

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::models::subscription::{
    CreateSubscriptionRequest, RenewSubscriptionRequest, SubscriptionFilters, SubscriptionRecord,
};
use crate::routes::{parking_from_headers, request_context};
use crate::services::subscription_service::SubscriptionService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_subscription_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_subscription))
        .route("/", get(list_subscriptions))
        .route("/:id", get(get_subscription))
        .route("/:id/renew", post(renew_subscription))
        .route("/:id/suspend", post(suspend_subscription))
        .route("/:id/expire", post(expire_subscription))
}

async fn create_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<Json<SubscriptionRecord>, AppError> {
    let ctx = request_context(&headers)?;
    let service = SubscriptionService::new(state.pool.clone());
    let subscription = service
        .create_subscription(ctx.parking_id, ctx.employee_id, request)
        .await?;
    Ok(Json(subscription))
}

async fn renew_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewSubscriptionRequest>,
) -> Result<Json<SubscriptionRecord>, AppError> {
    let ctx = request_context(&headers)?;
    let service = SubscriptionService::new(state.pool.clone());
    let subscription = service
        .renew_subscription(id, ctx.employee_id, request)
        .await?;
    Ok(Json(subscription))
}

async fn suspend_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionRecord>, AppError> {
    let service = SubscriptionService::new(state.pool.clone());
    let subscription = service.suspend_subscription(id).await?;
    Ok(Json(subscription))
}

async fn expire_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionRecord>, AppError> {
    let service = SubscriptionService::new(state.pool.clone());
    let subscription = service.expire_subscription(id).await?;
    Ok(Json(subscription))
}

async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionRecord>, AppError> {
    let service = SubscriptionService::new(state.pool.clone());
    let subscription = service.get_subscription(id).await?;
    Ok(Json(subscription))
}

async fn list_subscriptions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filters): Query<SubscriptionFilters>,
) -> Result<Json<Vec<SubscriptionRecord>>, AppError> {
    let parking_id = parking_from_headers(&headers)?;
    let service = SubscriptionService::new(state.pool.clone());
    let subscriptions = service.list_subscriptions(parking_id, filters).await?;
    Ok(Json(subscriptions))
}
