//! Repositorios de acceso a datos
//!
//! Todo el SQL vive aquí. Los métodos reciben `&mut PgConnection` para
//! poder participar de la transacción que abre el servicio llamador.

pub mod access_repository;
pub mod booking_repository;
pub mod cash_register_repository;
pub mod element_repository;
pub mod ledger_outbox_repository;
pub mod parking_repository;
pub mod rate_repository;
pub mod sequence_repository;
pub mod subscription_repository;
pub mod vehicle_repository;
