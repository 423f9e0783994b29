use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{ThermostatCode, Variables};
use crate::{Error, Result};

pub const JNAP_PATH: &str = "/JNAP/";
pub const ACTION_HEADER: &str = "x-jnap-action";
pub const RESULT_OK: &str = "OK";

const GET_ATTRIBUTES_URI: &str = "http://phyn.com/jnap/uponorsky/GetAttributes";
const SET_ATTRIBUTES_URI: &str = "http://phyn.com/jnap/uponorsky/SetAttributes";

/// Highest controller index the Smatrix Pulse gateway addresses.
/// Fixed by the firmware's variable naming; the device never reports it.
pub const CONTROLLER_COUNT: u8 = 5;

/// Highest thermostat slot per controller, fixed the same way.
pub const THERMOSTATS_PER_CONTROLLER: u8 = 13;

pub const HEAT_COOL_MODE: &str = "sys_heat_cool_mode";
pub const FORCED_ECO_MODE: &str = "sys_forced_eco_mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetAttributes,
    SetAttributes,
}

impl Action {
    pub fn uri(&self) -> &'static str {
        match self {
            Action::GetAttributes => GET_ATTRIBUTES_URI,
            Action::SetAttributes => SET_ATTRIBUTES_URI,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::GetAttributes => "GetAttributes",
            Action::SetAttributes => "SetAttributes",
        }
    }
}

/// One variable assignment as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaspVar {
    #[serde(rename = "waspVarName")]
    pub name: String,
    #[serde(rename = "waspVarValue")]
    pub value: String,
}

impl WaspVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn flag(name: impl Into<String>, on: bool) -> Self {
        Self::new(name, if on { "1" } else { "0" })
    }

    pub fn raw_number(name: impl Into<String>, raw: i64) -> Self {
        Self::new(name, raw.to_string())
    }
}

pub fn get_attributes_body() -> Value {
    json!({})
}

pub fn set_attributes_body(vars: &[WaspVar]) -> Value {
    json!({ "vars": vars })
}

/// Fails unless the top-level `result` field is `"OK"`.
pub fn check_result(action: Action, response: &Value) -> Result<()> {
    match response.get("result") {
        Some(Value::String(s)) if s == RESULT_OK => Ok(()),
        Some(Value::String(s)) => Err(Error::Rejected {
            action,
            result: s.clone(),
        }),
        Some(other) => Err(Error::Rejected {
            action,
            result: other.to_string(),
        }),
        None => Err(Error::Protocol(format!(
            "{} response has no result field",
            action.name()
        ))),
    }
}

/// Flatten `output.vars` into a name -> value map. Later duplicates win.
pub fn flatten_vars(response: &Value) -> Result<Variables> {
    let vars = match response.pointer("/output/vars") {
        Some(Value::Array(vars)) => vars,
        _ => {
            return Err(Error::Protocol(
                "GetAttributes response has no output.vars array".to_string(),
            ));
        }
    };

    let mut map = Variables::default();
    for item in vars {
        let name = match item.get("waspVarName").and_then(|v| v.as_str()) {
            Some(n) => n,
            None => continue,
        };
        let value = match item.get("waspVarValue") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        map.insert(name, value);
    }
    Ok(map)
}

pub fn controller_presence_var(controller: u8) -> String {
    format!("sys_controller_{controller}_presence")
}

pub fn thermostat_presence_var(controller: u8, thermostat: u8) -> String {
    format!("C{controller}_thermostat_{thermostat}_presence")
}

pub fn thermostat_id_var(controller: u8, thermostat: u8) -> String {
    format!("C{controller}_thermostat_{thermostat}_id")
}

pub fn name_var(code: &ThermostatCode) -> String {
    format!("cust_{code}_name")
}

pub fn room_temperature_var(code: &ThermostatCode) -> String {
    format!("{code}_room_temperature")
}

pub fn setpoint_var(code: &ThermostatCode) -> String {
    format!("{code}_setpoint")
}

pub fn minimum_setpoint_var(code: &ThermostatCode) -> String {
    format!("{code}_minimum_setpoint")
}

pub fn maximum_setpoint_var(code: &ThermostatCode) -> String {
    format!("{code}_maximum_setpoint")
}

pub fn actuator_var(code: &ThermostatCode) -> String {
    format!("{code}_stat_cb_actuator")
}
