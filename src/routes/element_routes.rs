//! Rutas de elementos (spots) y su ocupación derivada

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::models::element::{Element, SpotOccupancy};
use crate::repositories::element_repository::ElementRepository;
use crate::routes::parking_from_headers;
use crate::services::occupancy_service::OccupancyService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_element_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_spots))
        .route("/:id/occupancy", get(spot_occupancy))
}

async fn list_spots(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Element>>, AppError> {
    let parking_id = parking_from_headers(&headers)?;
    let mut conn = state.pool.acquire().await?;
    let spots = ElementRepository::list_spots(&mut conn, parking_id).await?;
    Ok(Json(spots))
}

async fn spot_occupancy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SpotOccupancy>, AppError> {
    let service = OccupancyService::new(state.pool.clone());
    let occupancy = service.occupancy_of(id).await?;
    Ok(Json(occupancy))
}
