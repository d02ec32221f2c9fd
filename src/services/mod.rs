//! Servicios de negocio
//!
//! Los servicios son los dueños de las transacciones: abren una por
//! operación de ciclo de vida y los repositorios participan de ella.

pub mod access_service;
pub mod billing;
pub mod booking_service;
pub mod cash_register_service;
pub mod occupancy_service;
pub mod subscription_service;
