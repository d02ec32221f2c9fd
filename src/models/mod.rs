//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod access;
pub mod booking;
pub mod cash_register;
pub mod element;
pub mod parking;
pub mod rate;
pub mod subscription;
pub mod vehicle;
