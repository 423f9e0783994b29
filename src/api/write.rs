//! Endpoints that change device state. Input is fully validated before the
//! device is contacted.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ApiError, AppState};
use crate::protocol::WaspVar;
use crate::transport::Transport;
use crate::types::{HvacMode, Temperature, ThermostatCode};

#[derive(Serialize)]
pub struct Ack {
    success: bool,
    message: String,
}

#[derive(Serialize)]
pub struct ModeAck {
    success: bool,
    message: String,
    mode: &'static str,
}

#[derive(Serialize)]
pub struct AwayAck {
    success: bool,
    message: String,
    enabled: bool,
}

#[derive(Serialize)]
pub struct RawAck {
    success: bool,
    result: Value,
}

type Body = Result<Json<Value>, JsonRejection>;

fn json_object(body: Body) -> Result<Map<String, Value>, ApiError> {
    match body?.0 {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::Validation(
            "request body must be a JSON object".to_string(),
        )),
    }
}

/// Accepts JSON numbers and numeric strings; rejects anything non-finite.
fn parse_celsius(value: Option<&Value>) -> Option<f64> {
    let celsius = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    celsius.filter(|c| c.is_finite())
}

/// `POST /api/thermostat/{code}/temperature` with `{"temperature": 21.5}`
pub async fn set_temperature<T: Transport>(
    State(state): State<AppState<T>>,
    Path(code): Path<String>,
    body: Body,
) -> Result<Json<Ack>, ApiError> {
    let body = json_object(body)?;
    let celsius = parse_celsius(body.get("temperature"))
        .ok_or_else(|| ApiError::Validation("invalid temperature".to_string()))?;
    let code: ThermostatCode = code.parse()?;

    state
        .client
        .set_temperature_for(code, Temperature::from_celsius(celsius))
        .await?;

    Ok(Json(Ack {
        success: true,
        message: format!("Temperature set to {celsius}\u{00b0}C for {code}"),
    }))
}

/// `POST /api/system/mode` with `{"mode": "heating" | "cooling"}`
pub async fn set_mode<T: Transport>(
    State(state): State<AppState<T>>,
    body: Body,
) -> Result<Json<ModeAck>, ApiError> {
    let body = json_object(body)?;
    let mode = body
        .get("mode")
        .and_then(Value::as_str)
        .and_then(HvacMode::from_api_str)
        .ok_or_else(|| {
            ApiError::Validation(r#"invalid mode, use "heating" or "cooling""#.to_string())
        })?;

    state.client.set_cooling_mode(mode.is_cooling()).await?;

    Ok(Json(ModeAck {
        success: true,
        message: format!("Mode changed to {}", mode.as_str()),
        mode: mode.as_str(),
    }))
}

/// `POST /api/system/away` with `{"enabled": bool}`
pub async fn set_away<T: Transport>(
    State(state): State<AppState<T>>,
    body: Body,
) -> Result<Json<AwayAck>, ApiError> {
    let body = json_object(body)?;
    let enabled = body.get("enabled").and_then(Value::as_bool).ok_or_else(|| {
        ApiError::Validation(r#"field "enabled" must be true or false"#.to_string())
    })?;

    state.client.set_away_mode(enabled).await?;

    Ok(Json(AwayAck {
        success: true,
        message: format!(
            "Away mode {}",
            if enabled { "enabled" } else { "disabled" }
        ),
        enabled,
    }))
}

/// `POST /api/raw/set` with `{"vars": [{"waspVarName": ..., "waspVarValue": ...}]}`
pub async fn set_raw<T: Transport>(
    State(state): State<AppState<T>>,
    body: Body,
) -> Result<Json<RawAck>, ApiError> {
    let mut body = json_object(body)?;
    let vars = match body.remove("vars") {
        Some(vars @ Value::Array(_)) => vars,
        _ => {
            return Err(ApiError::Validation(
                r#"invalid format, "vars" array required"#.to_string(),
            ));
        }
    };
    let vars: Vec<WaspVar> = serde_json::from_value(vars).map_err(|e| {
        ApiError::Validation(format!(
            "each entry of \"vars\" needs string waspVarName and waspVarValue: {e}"
        ))
    })?;

    let result = state.client.write_variables(&vars).await?;

    Ok(Json(RawAck {
        success: true,
        result,
    }))
}
