//! Ciclo de vida de reservas
//!
//! Estados: Pending -> Active -> Completed | Cancelled. Una reserva
//! pendiente no retiene el spot; el reclamo se toma al activarla (llegada
//! del vehículo) y se libera al completarla o cancelarla. La creación no
//! rederiva la ocupación: ese chequeo es una precondición del llamador
//! contra el resolver antes de insertar.

use chrono::Duration;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::{BookingFilters, BookingRecord, BookingStatus, CreateBookingRequest};
use crate::models::cash_register::RecordKind;
use crate::models::vehicle::VehicleDetails;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::element_repository::ElementRepository;
use crate::repositories::parking_repository::ParkingRepository;
use crate::repositories::sequence_repository::SequenceRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::AppError;

pub struct BookingService {
    pool: PgPool,
}

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear una reserva; endDate = startDate + duración en minutos.
    pub async fn create_booking(
        &self,
        parking_id: Uuid,
        employee_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<BookingRecord, AppError> {
        request.validate()?;

        let end_date = request.start_date + Duration::minutes(request.duration_minutes);

        let mut tx = self.pool.begin().await?;

        ParkingRepository::ensure_exists(&mut tx, parking_id).await?;

        if let Some(spot_id) = request.spot_id {
            ElementRepository::find_spot(&mut tx, spot_id, parking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Spot not found".to_string()))?;
        }

        let details = VehicleDetails {
            plate: request.vehicle_plate,
            category: request.vehicle_type.unwrap_or_default(),
            color: request.vehicle_color,
            owner_name: request.owner_name,
            owner_document: request.owner_document,
            owner_phone: request.owner_phone,
        };

        let vehicle = VehicleRepository::resolve_or_create(&mut tx, parking_id, &details).await?;

        let number =
            SequenceRepository::next_number(&mut tx, parking_id, RecordKind::Booking).await?;

        let booking = BookingRepository::insert(
            &mut tx,
            number,
            parking_id,
            vehicle.id,
            request.spot_id,
            employee_id,
            request.start_date,
            end_date,
            request.notes,
        )
        .await?;

        tx.commit().await?;

        info!(
            booking_id = %booking.id,
            number = booking.number,
            plate = %vehicle.plate,
            "booking created"
        );
        Ok(booking)
    }

    /// Activar una reserva pendiente (el vehículo llegó) y reclamar el spot.
    pub async fn activate_booking(&self, booking_id: Uuid) -> Result<BookingRecord, AppError> {
        self.transition(booking_id, &[BookingStatus::Pending], BookingStatus::Active)
            .await
    }

    /// Completar una reserva activa (el vehículo se fue).
    pub async fn complete_booking(&self, booking_id: Uuid) -> Result<BookingRecord, AppError> {
        self.transition(booking_id, &[BookingStatus::Active], BookingStatus::Completed)
            .await
    }

    /// Cancelar una reserva pendiente o activa.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<BookingRecord, AppError> {
        self.transition(
            booking_id,
            &[BookingStatus::Pending, BookingStatus::Active],
            BookingStatus::Cancelled,
        )
        .await
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<BookingRecord, AppError> {
        let mut conn = self.pool.acquire().await?;
        BookingRepository::find_by_id(&mut conn, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    pub async fn list_bookings(
        &self,
        parking_id: Uuid,
        filters: BookingFilters,
    ) -> Result<Vec<BookingRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        BookingRepository::list(&mut conn, parking_id, &filters).await
    }

    async fn transition(
        &self,
        booking_id: Uuid,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> Result<BookingRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        BookingRepository::find_by_id(&mut tx, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let booking = BookingRepository::set_status(&mut tx, booking_id, from, to)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Booking is not in a valid state for this transition".to_string())
            })?;

        // El spot pertenece a la reserva solo mientras está activa
        if let Some(spot_id) = booking.spot_id {
            match to {
                BookingStatus::Active => {
                    ElementRepository::claim_spot(&mut tx, spot_id, RecordKind::Booking, booking.id)
                        .await?
                        .ok_or_else(|| AppError::Conflict("Spot is not available".to_string()))?;
                }
                BookingStatus::Completed | BookingStatus::Cancelled => {
                    ElementRepository::release_spot(&mut tx, spot_id, booking.id).await?;
                }
                BookingStatus::Pending => {}
            }
        }

        tx.commit().await?;

        info!(booking_id = %booking.id, status = ?booking.status, "booking transition");
        Ok(booking)
    }
}
