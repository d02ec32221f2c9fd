//! Rutas HTTP de la API
//!
//! Cada recurso expone su propio router montado bajo /api en main. El
//! parking y el empleado que operan llegan en los headers `x-parking-id`
//! y `x-employee-id`; un header ausente o malformado es un 400.

pub mod access_routes;
pub mod booking_routes;
pub mod cash_register_routes;
pub mod element_routes;
pub mod subscription_routes;

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Contexto operativo de toda petición de escritura.
#[derive(Debug)]
pub struct RequestContext {
    pub parking_id: Uuid,
    pub employee_id: Uuid,
}

// TODO: reemplazar por claims del JWT cuando exista middleware de auth
pub fn request_context(headers: &HeaderMap) -> Result<RequestContext, AppError> {
    let parking_id = header_uuid(headers, "x-parking-id")?;
    let employee_id = header_uuid(headers, "x-employee-id")?;
    Ok(RequestContext {
        parking_id,
        employee_id,
    })
}

pub fn parking_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    header_uuid(headers, "x-parking-id")
}

fn header_uuid(headers: &HeaderMap, name: &str) -> Result<Uuid, AppError> {
    let raw = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", name)))?;

    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} header", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_context_from_headers() {
        let parking = Uuid::new_v4();
        let employee = Uuid::new_v4();

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-parking-id",
            HeaderValue::from_str(&parking.to_string()).unwrap(),
        );
        headers.insert(
            "x-employee-id",
            HeaderValue::from_str(&employee.to_string()).unwrap(),
        );

        let ctx = request_context(&headers).unwrap();
        assert_eq!(ctx.parking_id, parking);
        assert_eq!(ctx.employee_id, employee);
    }

    #[test]
    fn test_missing_header_is_bad_request() {
        let headers = HeaderMap::new();
        let err = request_context(&headers).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_malformed_header_is_bad_request() {
        let mut headers = HeaderMap::new();
        headers.insert("x-parking-id", HeaderValue::from_static("not-a-uuid"));
        headers.insert(
            "x-employee-id",
            HeaderValue::from_static("00000000-0000-0000-0000-000000000000"),
        );
        let err = request_context(&headers).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
