//! Rutas de reservas

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::models::booking::{BookingFilters, BookingRecord, CreateBookingRequest};
use crate::routes::{parking_from_headers, request_context};
use crate::services::booking_service::BookingService;
use crate::services::occupancy_service::OccupancyService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/:id", get(get_booking))
        .route("/:id/activate", post(activate_booking))
        .route("/:id/complete", post(complete_booking))
        .route("/:id/cancel", post(cancel_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<BookingRecord>, AppError> {
    let ctx = request_context(&headers)?;

    // Precondición del handler: el servicio no rederiva la ocupación.
    if let Some(spot_id) = request.spot_id {
        let occupancy = OccupancyService::new(state.pool.clone())
            .occupancy_of(spot_id)
            .await?;
        if !occupancy.is_free() {
            return Err(AppError::Conflict("Spot is not available".to_string()));
        }
    }

    let service = BookingService::new(state.pool.clone());
    let booking = service
        .create_booking(ctx.parking_id, ctx.employee_id, request)
        .await?;
    Ok(Json(booking))
}

async fn activate_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingRecord>, AppError> {
    let service = BookingService::new(state.pool.clone());
    let booking = service.activate_booking(id).await?;
    Ok(Json(booking))
}

async fn complete_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingRecord>, AppError> {
    let service = BookingService::new(state.pool.clone());
    let booking = service.complete_booking(id).await?;
    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingRecord>, AppError> {
    let service = BookingService::new(state.pool.clone());
    let booking = service.cancel_booking(id).await?;
    Ok(Json(booking))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingRecord>, AppError> {
    let service = BookingService::new(state.pool.clone());
    let booking = service.get_booking(id).await?;
    Ok(Json(booking))
}

async fn list_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filters): Query<BookingFilters>,
) -> Result<Json<Vec<BookingRecord>>, AppError> {
    let parking_id = parking_from_headers(&headers)?;
    let service = BookingService::new(state.pool.clone());
    let bookings = service.list_bookings(parking_id, filters).await?;
    Ok(Json(bookings))
}
