//! # Freqtable Server: HTTP Boundary and CLI
//!
//! Exposes the create-frequency-table use case over HTTP:
//!
//! | Method | Path                     | Success                               |
//! |--------|--------------------------|---------------------------------------|
//! | `GET`  | `/ping`                  | 200 `{"message":"pong"}`              |
//! | `POST` | `/frequency-tables`      | 201 `{id, name, date_created, ...}`   |
//! | `GET`  | `/frequency-tables/{id}` | 200 with the table's `values`         |
//!
//! Failures use the body described in [`ErrorResponse`]: 400 for invalid
//! requests, 404 for unknown tables and 500 for anything that failed while
//! extracting or storing.
//!
//! The `freqtable` binary wraps this crate; see [`cli`].

pub mod cli;
mod error;
mod handlers;
mod models;
pub mod output;
mod validation;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use models::{CreateFrequencyTableRequest, FrequencyTableResponse, PingResponse};
pub use validation::validate_url;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use freqtable::{CreateFrequencyTable, FrequencyTableRepository};
use tokio::net::TcpListener;

/// Shared state of the router.
#[derive(Clone)]
pub struct AppState {
    create: Arc<dyn CreateFrequencyTable>,
    tables: Arc<dyn FrequencyTableRepository>,
}

impl AppState {
    /// State creating tables with `create` and reading them from `tables`.
    ///
    /// Both should share one repository, or created tables can't be fetched.
    #[must_use]
    pub fn new(
        create: Arc<dyn CreateFrequencyTable>,
        tables: Arc<dyn FrequencyTableRepository>,
    ) -> Self {
        Self { create, tables }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/frequency-tables", post(handlers::create_frequency_table))
        .route("/frequency-tables/{id}", get(handlers::get_frequency_table))
        .with_state(state)
}

/// Serve `state` on `listener` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(address) = listener.local_addr() {
        tracing::info!(%address, "Freqtable server listening");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
