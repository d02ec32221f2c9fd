//! Cálculo de tarifas de salida
//!
//! Función pura: (hora de entrada, hora de salida, tarifas, categoría) ->
//! monto. La tolerancia modela un período de gracia (p. ej. salida
//! inmediata) y el cobro avanza en incrementos de media hora a mitad del
//! precio por hora, redondeado a 2 decimales con redondeo half-up.
//!
//! Los precios daily/weekly/monthly/yearly de la tarifa no participan del
//! cobro por salida; solo alimentan las suscripciones por período.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::rate::Rate;
use crate::models::vehicle::VehicleCategory;
use crate::utils::errors::AppError;

/// Seleccionar la tarifa activa para una categoría de vehículo; si ninguna
/// coincide, la primera tarifa activa del parking actúa como fallback.
pub fn select_rate(rates: &[Rate], category: VehicleCategory) -> Option<&Rate> {
    rates
        .iter()
        .find(|rate| rate.is_active && rate.vehicle_category == category)
        .or_else(|| rates.iter().find(|rate| rate.is_active))
}

/// Calcular el monto a cobrar al cierre de un acceso.
///
/// Sin tarifa activa el resultado es un error, nunca un 0 silencioso: un
/// cobro en cero sería indistinguible de una salida legítimamente gratis.
pub fn compute_fee(
    entry_time: DateTime<Utc>,
    exit_time: DateTime<Utc>,
    rates: &[Rate],
    category: VehicleCategory,
) -> Result<Decimal, AppError> {
    if exit_time < entry_time {
        return Err(AppError::BadRequest(
            "Exit time is earlier than entry time".to_string(),
        ));
    }

    let rate = select_rate(rates, category).ok_or_else(|| {
        AppError::BadRequest("No active rate configured for this parking".to_string())
    })?;

    let total_minutes = (exit_time - entry_time).num_seconds() / 60;
    let billable_minutes = (total_minutes - i64::from(rate.tolerance)).max(0);

    if billable_minutes == 0 {
        return Ok(Decimal::ZERO);
    }

    // Medias horas empezadas, siempre hacia arriba
    let half_hours = (billable_minutes + 29) / 30;

    let fee = Decimal::from(half_hours) * rate.hourly / Decimal::from(2);
    Ok(fee.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn rate_for(category: VehicleCategory, tolerance: i32, hourly: &str) -> Rate {
        Rate {
            id: Uuid::new_v4(),
            parking_id: Uuid::new_v4(),
            vehicle_category: category,
            tolerance,
            hourly: hourly.parse().unwrap(),
            daily: Decimal::ZERO,
            weekly: Decimal::ZERO,
            monthly: Decimal::ZERO,
            yearly: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn fee_after(minutes: i64, rates: &[Rate], category: VehicleCategory) -> Decimal {
        let entry = Utc::now();
        compute_fee(entry, entry + Duration::minutes(minutes), rates, category).unwrap()
    }

    #[test]
    fn test_within_tolerance_is_free() {
        let rates = vec![rate_for(VehicleCategory::Car, 15, "2.50")];
        assert_eq!(fee_after(0, &rates, VehicleCategory::Car), Decimal::ZERO);
        assert_eq!(fee_after(10, &rates, VehicleCategory::Car), Decimal::ZERO);
        assert_eq!(fee_after(15, &rates, VehicleCategory::Car), Decimal::ZERO);
    }

    #[test]
    fn test_forty_minutes_with_fifteen_tolerance_is_one_half_hour() {
        // 40 min - 15 de tolerancia = 25 facturables = 1 media hora
        let rates = vec![rate_for(VehicleCategory::Car, 15, "2.50")];
        assert_eq!(
            fee_after(40, &rates, VehicleCategory::Car),
            "1.25".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_half_hours_round_up() {
        let rates = vec![rate_for(VehicleCategory::Car, 0, "2.00")];
        // 31 facturables = 2 medias horas
        assert_eq!(
            fee_after(31, &rates, VehicleCategory::Car),
            "2.00".parse::<Decimal>().unwrap()
        );
        // 60 facturables = 2 medias horas exactas
        assert_eq!(
            fee_after(60, &rates, VehicleCategory::Car),
            "2.00".parse::<Decimal>().unwrap()
        );
        // 61 facturables = 3 medias horas
        assert_eq!(
            fee_after(61, &rates, VehicleCategory::Car),
            "3.00".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_rounding_half_up_on_third_decimal() {
        // hourly 0.05 -> media hora 0.025 -> redondea a 0.03
        let rates = vec![rate_for(VehicleCategory::Car, 0, "0.05")];
        assert_eq!(
            fee_after(20, &rates, VehicleCategory::Car),
            "0.03".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_category_match_beats_fallback() {
        let rates = vec![
            rate_for(VehicleCategory::Car, 0, "2.00"),
            rate_for(VehicleCategory::Motorcycle, 0, "1.00"),
        ];
        assert_eq!(
            fee_after(30, &rates, VehicleCategory::Motorcycle),
            "0.50".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_unknown_category_falls_back_to_first_active() {
        let rates = vec![rate_for(VehicleCategory::Car, 0, "2.00")];
        assert_eq!(
            fee_after(30, &rates, VehicleCategory::Truck),
            "1.00".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_inactive_rates_are_ignored() {
        let mut inactive = rate_for(VehicleCategory::Car, 0, "9.00");
        inactive.is_active = false;
        let rates = vec![inactive];
        let entry = Utc::now();
        let result = compute_fee(
            entry,
            entry + Duration::minutes(30),
            &rates,
            VehicleCategory::Car,
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_empty_rate_table_is_an_error() {
        let entry = Utc::now();
        let result = compute_fee(entry, entry, &[], VehicleCategory::Car);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_exit_before_entry_is_rejected() {
        let rates = vec![rate_for(VehicleCategory::Car, 0, "2.00")];
        let entry = Utc::now();
        let result = compute_fee(
            entry,
            entry - Duration::minutes(1),
            &rates,
            VehicleCategory::Car,
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_seconds_are_floored_to_minutes() {
        // 15 min 59 s con tolerancia 15 sigue dentro de la gracia
        let rates = vec![rate_for(VehicleCategory::Car, 15, "2.50")];
        let entry = Utc::now();
        let fee = compute_fee(
            entry,
            entry + Duration::seconds(15 * 60 + 59),
            &rates,
            VehicleCategory::Car,
        )
        .unwrap();
        assert_eq!(fee, Decimal::ZERO);
    }
}
