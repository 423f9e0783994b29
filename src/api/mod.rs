//! REST facade over [`UponorClient`].
//!
//! Handlers hold no state of their own: each request validates its input,
//! makes at most one device call and reshapes the answer.

pub mod error;
mod read;
mod write;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::client::UponorClient;
use crate::transport::Transport;

pub use error::ApiError;

/// Route table, also printed at startup.
pub const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/api/raw", "full raw device data"),
    ("GET", "/api/thermostats", "list thermostats"),
    ("GET", "/api/thermostat/{code}", "single thermostat"),
    ("GET", "/api/system", "system mode"),
    ("POST", "/api/thermostat/{code}/temperature", "change setpoint"),
    ("POST", "/api/system/mode", "switch heating/cooling"),
    ("POST", "/api/system/away", "toggle away mode"),
    ("POST", "/api/raw/set", "write raw variables"),
];

/// Shared handler state. `Clone` only bumps the `Arc`.
pub struct AppState<T> {
    pub client: Arc<UponorClient<T>>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<T: Transport> AppState<T> {
    pub fn new(client: UponorClient<T>) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Build the top-level axum [`Router`].
pub fn router<T: Transport + 'static>(state: AppState<T>) -> Router {
    Router::new()
        .route("/", get(read::banner::<T>))
        .route("/api/raw", get(read::raw::<T>))
        .route("/api/raw/set", post(write::set_raw::<T>))
        .route("/api/thermostats", get(read::thermostats::<T>))
        .route("/api/thermostat/{code}", get(read::thermostat::<T>))
        .route(
            "/api/thermostat/{code}/temperature",
            post(write::set_temperature::<T>),
        )
        .route("/api/system", get(read::system::<T>))
        .route("/api/system/mode", post(write::set_mode::<T>))
        .route("/api/system/away", post(write::set_away::<T>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
