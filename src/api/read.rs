//! Read-only endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::transport::Transport;
use crate::types::{Snapshot, Thermostat};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    service: &'static str,
    version: &'static str,
    status: &'static str,
    uponor_host: String,
}

#[derive(Serialize)]
pub struct ThermostatList {
    count: usize,
    thermostats: Vec<Thermostat>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    mode: &'static str,
    is_cooling: bool,
    is_away: bool,
}

/// `GET /`
pub async fn banner<T: Transport>(State(state): State<AppState<T>>) -> Json<Banner> {
    Json(Banner {
        service: "Uponor API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        uponor_host: state.client.host().to_string(),
    })
}

/// `GET /api/raw`
pub async fn raw<T: Transport>(State(state): State<AppState<T>>) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(state.client.fetch_all().await?))
}

/// `GET /api/thermostats`
pub async fn thermostats<T: Transport>(
    State(state): State<AppState<T>>,
) -> Result<Json<ThermostatList>, ApiError> {
    let thermostats = state.client.list_thermostats().await?;
    Ok(Json(ThermostatList {
        count: thermostats.len(),
        thermostats,
    }))
}

/// `GET /api/thermostat/{code}`
///
/// Any code that does not match a present thermostat is a 404, including
/// codes outside the addressable range.
pub async fn thermostat<T: Transport>(
    State(state): State<AppState<T>>,
    Path(code): Path<String>,
) -> Result<Json<Thermostat>, ApiError> {
    state
        .client
        .thermostat(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("thermostat not found".to_string()))
}

/// `GET /api/system`
pub async fn system<T: Transport>(
    State(state): State<AppState<T>>,
) -> Result<Json<SystemStatus>, ApiError> {
    let mode = state.client.get_system_mode().await?;
    Ok(Json(SystemStatus {
        mode: mode.mode().as_str(),
        is_cooling: mode.is_cooling,
        is_away: mode.is_away,
    }))
}
