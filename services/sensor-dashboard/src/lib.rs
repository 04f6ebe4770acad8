//! Sensor Dashboard - map, real-time, history and management views for
//! environmental sensors
//!
//! A thin presentation layer over a remote sensor API: store actions call the
//! backend, cache the results, and the dashboard renders pages from the cache.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod html;
pub mod io;
pub mod map;
pub mod model;
pub mod notifier;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{load_config, Config};
pub use error::{DashboardError, Result};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::io::ReqwestHttpClient;
use crate::notifier::FlashNotifier;
use crate::store::SensorStore;

/// Wire the HTTP client, cache and notifier into a store
pub fn build_store(config: &Config) -> Result<SensorStore> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new(config.api.timeout())?);
    let api = ApiClient::new(&config.api.base_url, http);
    let state = state::new_state_handle(config.dashboard.toast_history_size);
    let notifier = Arc::new(FlashNotifier::new(Arc::clone(&state)));
    Ok(SensorStore::new(api, state, notifier))
}

/// Run the dashboard server until `cancel` fires
pub async fn serve(config: Config, cancel: CancellationToken) -> Result<()> {
    let store = build_store(&config)?;
    let router = dashboard::build_router(store, config.map.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.dashboard.port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        DashboardError::Config(format!(
            "Failed to bind dashboard to port {}: {}",
            config.dashboard.port, e
        ))
    })?;
    tracing::info!(
        "Dashboard listening on http://{} (backend {})",
        addr,
        config.api.base_url
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::debug!("Dashboard stopped");
    Ok(())
}

/// Run the dashboard server until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    serve(config, cancel).await
}
