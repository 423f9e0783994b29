use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::protocol::{CONTROLLER_COUNT, THERMOSTATS_PER_CONTROLLER};
use crate::Error;

const RAW_OFFSET: f64 = 320.0;
const RAW_PER_DEGREE: f64 = 18.0;

/// Temperature stored as Celsius internally.
/// The controller encodes temperatures as tenths of a degree Fahrenheit,
/// so `raw = celsius * 18 + 320`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature(f64);

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self(c)
    }

    pub fn from_raw(raw: i64) -> Self {
        Self((raw as f64 - RAW_OFFSET) / RAW_PER_DEGREE)
    }

    /// Parse a raw wire value. Empty or non-numeric strings are absent, not errors.
    pub fn parse_raw(s: &str) -> Option<Self> {
        s.trim().parse::<i64>().ok().map(Self::from_raw)
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    /// Round half up to the nearest raw unit. `None` when the result does
    /// not fit the controller's integer encoding.
    pub fn to_raw(&self) -> Option<i64> {
        let raw = (self.0 * RAW_PER_DEGREE + RAW_OFFSET + 0.5).floor();
        let fits = raw.is_finite() && raw >= i64::MIN as f64 && raw < i64::MAX as f64;
        fits.then_some(raw as i64)
    }

    /// One-decimal rendering used in API responses, e.g. `"21.5"`.
    pub fn to_decimal_string(&self) -> String {
        format!("{:.1}", self.0)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

/// Controller/thermostat slot address, rendered as `C<controller>_T<thermostat>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThermostatCode {
    pub controller: u8,
    pub thermostat: u8,
}

impl ThermostatCode {
    pub fn new(controller: u8, thermostat: u8) -> Option<Self> {
        let in_range = (1..=CONTROLLER_COUNT).contains(&controller)
            && (1..=THERMOSTATS_PER_CONTROLLER).contains(&thermostat);
        in_range.then_some(Self {
            controller,
            thermostat,
        })
    }
}

impl fmt::Display for ThermostatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}_T{}", self.controller, self.thermostat)
    }
}

impl FromStr for ThermostatCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Validation(format!("invalid thermostat code: {s}"));
        let (c, t) = s
            .strip_prefix('C')
            .and_then(|rest| rest.split_once("_T"))
            .ok_or_else(invalid)?;
        let controller = c.parse::<u8>().map_err(|_| invalid())?;
        let thermostat = t.parse::<u8>().map_err(|_| invalid())?;
        Self::new(controller, thermostat).ok_or_else(invalid)
    }
}

impl Serialize for ThermostatCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacMode {
    Heating,
    Cooling,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Heating => "heating",
            HvacMode::Cooling => "cooling",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "heating" => Some(HvacMode::Heating),
            "cooling" => Some(HvacMode::Cooling),
            _ => None,
        }
    }

    pub fn is_cooling(&self) -> bool {
        matches!(self, HvacMode::Cooling)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thermostat {
    pub code: ThermostatCode,
    pub id: Option<String>,
    pub name: Option<String>,
    pub room_temp: Option<Temperature>,
    pub setpoint: Option<Temperature>,
    pub min_temp: Option<Temperature>,
    pub max_temp: Option<Temperature>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemMode {
    pub is_cooling: bool,
    pub is_away: bool,
}

impl SystemMode {
    pub fn mode(&self) -> HvacMode {
        if self.is_cooling {
            HvacMode::Cooling
        } else {
            HvacMode::Heating
        }
    }
}

/// Flat snapshot of the device's variables, rebuilt on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Protocol booleans are `"1"`; anything else, including absence, is false.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == Some("1")
    }

    pub fn temperature(&self, name: &str) -> Option<Temperature> {
        self.get(name).and_then(Temperature::parse_raw)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Result of a full read: the untouched device payload plus the flattened map.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub raw: Value,
    pub vars: Variables,
}
