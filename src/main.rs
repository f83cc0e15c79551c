//! PaymentsWay connector HTTP entrypoint.
//!
//! Launches an Axum-based HTTP server exposing the payment-provider protocol routes:
//!
//! - `GET /manifest` – Provider discovery manifest
//! - `POST /payments` – Authorize a payment (redirect flow)
//! - `POST /payments/{payment_id}/cancellations` – Acknowledge a cancellation
//! - `POST /payments/{payment_id}/settlements` – Acknowledge a settlement
//! - `POST /payments/{payment_id}/refunds` – Acknowledge a refund
//! - `POST /payments/{payment_id}/inbound-request/{action}` – Acknowledge a notification
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control the binding address
//! - `PAYMENTSWAY_URL`, `SETTINGS_STORE_URL` point at the external services
//! - `VTEX_APP_ID` and friends identify the hosting application

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tower_http::trace::TraceLayer;

use paymentsway_rs::config::Config;
use paymentsway_rs::connector::PaymentsWayConnector;
use paymentsway_rs::gateway::PaymentsWayClient;
use paymentsway_rs::handlers;
use paymentsway_rs::settings::SettingsResolver;
use paymentsway_rs::settings_store::HttpSettingsStore;
use paymentsway_rs::shutdown::Shutdown;
use paymentsway_rs::telemetry;

/// Initializes the connector server.
///
/// - Loads `.env` variables.
/// - Initializes tracing.
/// - Wires the settings store, resolver and gateway client into the connector.
/// - Starts an Axum HTTP server with the protocol handlers.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env variables
    dotenv().ok();

    telemetry::init();

    let config = Config::load()?;
    let app = config.app().clone();
    tracing::info!(
        vendor = app.vendor.as_deref().unwrap_or("<unset>"),
        name = app.name.as_deref().unwrap_or("<unset>"),
        version = app.version.as_deref().unwrap_or("<unset>"),
        workspace = app.workspace.as_deref().unwrap_or("<unset>"),
        region = app.region.as_deref().unwrap_or("<unset>"),
        gateway = %config.gateway_url(),
        "Starting PaymentsWay connector"
    );

    let store = HttpSettingsStore::try_from(config.settings_store_url().as_str())?;
    let resolver = SettingsResolver::new(Arc::new(store), app);
    let gateway = PaymentsWayClient::try_from(config.gateway_url().as_str())?;
    let connector = Arc::new(PaymentsWayConnector::new(resolver, gateway));

    let http_endpoints = Router::new()
        .merge(handlers::routes().with_state(connector))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    let shutdown = Shutdown::try_new()?;
    let cancellation_token = shutdown.cancellation_token();
    let graceful_shutdown = async move { cancellation_token.cancelled().await };
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(graceful_shutdown)
        .await?;

    Ok(())
}
