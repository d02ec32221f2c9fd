//! Tests de integración sobre las reglas puras del motor: cobro por
//! salida, precedencia de ocupación y aritmética de renovaciones.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use parkar_backend::models::access::{AccessRecord, AccessStatus};
use parkar_backend::models::booking::{BookingRecord, BookingStatus};
use parkar_backend::models::cash_register::{session_total, RecordKind};
use parkar_backend::models::element::OccupancyStatus;
use parkar_backend::models::rate::Rate;
use parkar_backend::models::subscription::SubscriptionPeriod;
use parkar_backend::models::vehicle::{normalize_plate, VehicleCategory};
use parkar_backend::services::billing;
use parkar_backend::services::occupancy_service::resolve;

fn car_rate(tolerance: i32, hourly: &str) -> Rate {
    Rate {
        id: Uuid::new_v4(),
        parking_id: Uuid::new_v4(),
        vehicle_category: VehicleCategory::Car,
        tolerance,
        hourly: hourly.parse().unwrap(),
        daily: Decimal::ZERO,
        weekly: "20.00".parse().unwrap(),
        monthly: "60.00".parse().unwrap(),
        yearly: "600.00".parse().unwrap(),
        is_active: true,
        created_at: Utc::now(),
    }
}

fn open_access(spot_id: Uuid) -> AccessRecord {
    let now = Utc::now();
    AccessRecord {
        id: Uuid::new_v4(),
        number: 1,
        parking_id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        spot_id: Some(spot_id),
        entry_employee_id: Uuid::new_v4(),
        exit_employee_id: None,
        entry_time: now - Duration::hours(1),
        exit_time: None,
        amount: Decimal::ZERO,
        status: AccessStatus::Open,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn active_booking(spot_id: Uuid) -> BookingRecord {
    let now = Utc::now();
    BookingRecord {
        id: Uuid::new_v4(),
        number: 1,
        parking_id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        spot_id: Some(spot_id),
        employee_id: Uuid::new_v4(),
        start_date: now - Duration::minutes(30),
        end_date: now + Duration::minutes(30),
        amount: Decimal::ZERO,
        status: BookingStatus::Active,
        notes: None,
        created_at: now,
    }
}

#[test]
fn exit_fee_walkthrough_one_hour_stay() {
    // Estancia de una hora con 15 de tolerancia: 45 facturables,
    // 2 medias horas a 2.50/h = 2.50
    let rates = vec![car_rate(15, "2.50")];
    let entry = Utc::now();
    let fee = billing::compute_fee(
        entry,
        entry + Duration::hours(1),
        &rates,
        VehicleCategory::Car,
    )
    .unwrap();
    assert_eq!(fee, "2.50".parse::<Decimal>().unwrap());
}

#[test]
fn access_beats_booking_on_same_spot() {
    let spot_id = Uuid::new_v4();
    let access = open_access(spot_id);
    let access_id = access.id;

    let occupancy = resolve(spot_id, Some(access), Some(active_booking(spot_id)), None);
    assert_eq!(occupancy.status, OccupancyStatus::OccupiedByAccess);

    let occupant = occupancy.occupant.unwrap();
    assert_eq!(occupant.kind, RecordKind::Access);
    assert_eq!(occupant.record_id, access_id);
}

#[test]
fn booking_beats_subscription_on_same_spot() {
    let spot_id = Uuid::new_v4();
    let booking = active_booking(spot_id);
    let booking_id = booking.id;

    // Sin acceso abierto, la reserva activa gana sobre cualquier otra fuente
    let occupancy = resolve(spot_id, None, Some(booking), None);
    assert_eq!(occupancy.status, OccupancyStatus::OccupiedByBooking);
    assert_eq!(occupancy.occupant.unwrap().record_id, booking_id);
}

#[test]
fn renewal_periods_chain_without_gaps() {
    // La renovación arranca donde termina la anterior: encadenando un
    // mes y una semana no quedan huecos ni solapamientos.
    let start = Utc::now();
    let first_end = start + SubscriptionPeriod::Monthly.duration();
    let second_end = first_end + SubscriptionPeriod::Weekly.duration();

    assert_eq!(first_end - start, Duration::days(30));
    assert_eq!(second_end - first_end, Duration::days(7));
}

#[test]
fn cash_session_total_reflects_exit_fees() {
    // Caja abierta con 50.00, tres salidas cobradas y un egreso manual
    let rates = vec![car_rate(0, "2.00")];
    let entry = Utc::now();

    let mut income = Decimal::ZERO;
    for minutes in [30, 60, 90] {
        income += billing::compute_fee(
            entry,
            entry + Duration::minutes(minutes),
            &rates,
            VehicleCategory::Car,
        )
        .unwrap();
    }
    // 1.00 + 2.00 + 3.00
    assert_eq!(income, "6.00".parse::<Decimal>().unwrap());

    let total = session_total(
        "50.00".parse().unwrap(),
        income,
        "10.00".parse().unwrap(),
    );
    assert_eq!(total, "46.00".parse::<Decimal>().unwrap());
}

#[test]
fn plates_normalize_to_uppercase_for_lookup() {
    assert_eq!(normalize_plate("  abc-123 "), "ABC-123");
    assert_eq!(normalize_plate("abc-123"), normalize_plate("ABC-123"));
}
