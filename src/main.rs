use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use parkar_backend::config::environment::EnvironmentConfig;
use parkar_backend::database::DatabaseConnection;
use parkar_backend::routes;
use parkar_backend::services::cash_register_service::CashRegisterService;
use parkar_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkar_backend=debug,tower_http=info".into()),
        )
        .init();

    info!("🅿️ Parkar - Occupancy & Billing Backend");
    info!("=======================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();
    let config = EnvironmentConfig::from_env();
    let addr: SocketAddr = config.server_url().parse()?;

    // Reintento periódico de entregas pendientes del outbox del libro mayor
    let ledger_pool = pool.clone();
    tokio::spawn(async move {
        let ledger = CashRegisterService::new(ledger_pool);
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            if let Err(e) = ledger.deliver_pending().await {
                tracing::warn!("ledger outbox retry failed: {}", e);
            }
        }
    });

    let app_state = AppState::new(pool, config);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/access", routes::access_routes::create_access_router())
        .nest(
            "/api/booking",
            routes::booking_routes::create_booking_router(),
        )
        .nest(
            "/api/subscription",
            routes::subscription_routes::create_subscription_router(),
        )
        .nest(
            "/api/cash-register",
            routes::cash_register_routes::create_cash_register_router(),
        )
        .nest("/api/spot", routes::element_routes::create_element_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚗 Accesos:");
    info!("   POST /api/access - Registrar entrada");
    info!("   POST /api/access/:id/exit - Registrar salida y cobrar");
    info!("   POST /api/access/:id/cancel - Anular acceso");
    info!("   GET  /api/access - Listar accesos");
    info!("   GET  /api/access/stats - Estadísticas de accesos");
    info!("📅 Reservas:");
    info!("   POST /api/booking - Crear reserva");
    info!("   POST /api/booking/:id/activate - Activar reserva");
    info!("   POST /api/booking/:id/complete - Completar reserva");
    info!("   POST /api/booking/:id/cancel - Cancelar reserva");
    info!("🎫 Suscripciones:");
    info!("   POST /api/subscription - Crear suscripción");
    info!("   POST /api/subscription/:id/renew - Renovar suscripción");
    info!("   POST /api/subscription/:id/suspend - Suspender suscripción");
    info!("   POST /api/subscription/:id/expire - Expirar suscripción");
    info!("💰 Cajas:");
    info!("   POST /api/cash-register - Abrir caja");
    info!("   POST /api/cash-register/:id/close - Cerrar caja");
    info!("   POST /api/cash-register/:id/movements - Registrar movimiento");
    info!("🅿️ Spots:");
    info!("   GET  /api/spot - Listar spots");
    info!("   GET  /api/spot/:id/occupancy - Ocupación derivada");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "parkar-backend",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
