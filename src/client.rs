use serde_json::Value;
use tracing::{debug, warn};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    actuator_var, check_result, controller_presence_var, flatten_vars, get_attributes_body,
    maximum_setpoint_var, minimum_setpoint_var, name_var, room_temperature_var,
    set_attributes_body, setpoint_var, thermostat_id_var, thermostat_presence_var, Action,
    WaspVar, CONTROLLER_COUNT, FORCED_ECO_MODE, HEAT_COOL_MODE, JNAP_PATH,
    THERMOSTATS_PER_CONTROLLER,
};
use crate::transport::{HttpTransport, Transport};
use crate::types::*;
use crate::{Error, Result};

pub struct UponorClientBuilder {
    host: String,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl UponorClientBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<UponorClient<HttpTransport>> {
        let http = reqwest::Client::builder().build()?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(MessageLogger::new(mode, &path)?),
            _ => None,
        };

        let endpoint = format!("http://{}{}", self.host, JNAP_PATH);
        let transport = HttpTransport::new(http, endpoint, logger);
        Ok(UponorClient::with_transport(self.host, transport))
    }
}

/// Client for a single Smatrix Pulse gateway.
///
/// Holds no device state: every method is exactly one round trip, and
/// concurrent callers never share a snapshot.
pub struct UponorClient<T = HttpTransport> {
    transport: T,
    host: String,
}

impl UponorClient<HttpTransport> {
    pub fn builder(host: impl Into<String>) -> UponorClientBuilder {
        UponorClientBuilder::new(host)
    }
}

impl<T: Transport> UponorClient<T> {
    pub fn with_transport(host: impl Into<String>, transport: T) -> Self {
        Self {
            transport,
            host: host.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Read every variable the gateway exposes.
    pub async fn fetch_all(&self) -> Result<Snapshot> {
        let raw = self.round_trip(Action::GetAttributes, get_attributes_body()).await?;
        let vars = flatten_vars(&raw)?;
        debug!(count = vars.len(), "fetched device variables");
        Ok(Snapshot { raw, vars })
    }

    /// Apply variable assignments. Returns the device acknowledgement as-is.
    pub async fn write_variables(&self, vars: &[WaspVar]) -> Result<Value> {
        debug!(count = vars.len(), "writing device variables");
        self.round_trip(Action::SetAttributes, set_attributes_body(vars))
            .await
    }

    pub async fn list_thermostats(&self) -> Result<Vec<Thermostat>> {
        let snapshot = self.fetch_all().await?;
        Ok(thermostats_from_vars(&snapshot.vars))
    }

    /// Look up one thermostat by code. `Ok(None)` if it is not present.
    pub async fn thermostat(&self, code: &str) -> Result<Option<Thermostat>> {
        let thermostats = self.list_thermostats().await?;
        Ok(thermostats.into_iter().find(|t| t.code.to_string() == code))
    }

    pub async fn get_system_mode(&self) -> Result<SystemMode> {
        let snapshot = self.fetch_all().await?;
        Ok(system_mode_from_vars(&snapshot.vars))
    }

    pub async fn set_temperature_for(&self, code: ThermostatCode, temp: Temperature) -> Result<Value> {
        let raw = temp.to_raw().ok_or_else(|| {
            Error::Validation(format!("temperature out of range: {}", temp.celsius()))
        })?;
        let var = WaspVar::raw_number(setpoint_var(&code), raw);
        debug!(%code, raw, "setting setpoint");
        self.write_variables(&[var]).await
    }

    pub async fn set_cooling_mode(&self, enabled: bool) -> Result<Value> {
        self.write_variables(&[WaspVar::flag(HEAT_COOL_MODE, enabled)])
            .await
    }

    pub async fn set_away_mode(&self, enabled: bool) -> Result<Value> {
        self.write_variables(&[WaspVar::flag(FORCED_ECO_MODE, enabled)])
            .await
    }

    async fn round_trip(&self, action: Action, body: Value) -> Result<Value> {
        let response = self.transport.call(action, body).await?;
        if let Err(e) = check_result(action, &response) {
            warn!(action = action.name(), error = %e, "device rejected request");
            return Err(e);
        }
        Ok(response)
    }
}

/// Enumerate thermostats whose controller and slot both report presence.
pub fn thermostats_from_vars(vars: &Variables) -> Vec<Thermostat> {
    let mut thermostats = Vec::new();

    for c in 1..=CONTROLLER_COUNT {
        if !vars.flag(&controller_presence_var(c)) {
            continue;
        }
        for t in 1..=THERMOSTATS_PER_CONTROLLER {
            if !vars.flag(&thermostat_presence_var(c, t)) {
                continue;
            }
            let Some(code) = ThermostatCode::new(c, t) else {
                continue;
            };
            thermostats.push(Thermostat {
                code,
                id: vars.text(&thermostat_id_var(c, t)),
                name: vars.text(&name_var(&code)),
                room_temp: vars.temperature(&room_temperature_var(&code)),
                setpoint: vars.temperature(&setpoint_var(&code)),
                min_temp: vars.temperature(&minimum_setpoint_var(&code)),
                max_temp: vars.temperature(&maximum_setpoint_var(&code)),
                active: vars.flag(&actuator_var(&code)),
            });
        }
    }

    thermostats
}

pub fn system_mode_from_vars(vars: &Variables) -> SystemMode {
    SystemMode {
        is_cooling: vars.flag(HEAT_COOL_MODE),
        is_away: vars.flag(FORCED_ECO_MODE),
    }
}
