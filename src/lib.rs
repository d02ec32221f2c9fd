//! Parkar - backend de ocupación y facturación de estacionamientos
//!
//! Motor multi-tenant: accesos walk-in, reservas, suscripciones y cajas
//! registradoras, con ocupación de spots derivada y cobro por tarifa.

pub mod config;
pub mod database;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
