use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::protocol::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLogMode {
    /// Every request and response body.
    Full,
    /// Action, variable count and result only.
    Compact,
}

impl MessageLogMode {
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s {
            "full" => Some(MessageLogMode::Full),
            "compact" => Some(MessageLogMode::Compact),
            _ => None,
        }
    }
}

/// Appends one JSON object per line for every exchange with the device.
/// Request, response and error lines of one exchange share an `exchange` id.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self { mode, file })
    }

    pub fn log_request(&mut self, action: Action, body: &Value) -> Uuid {
        let exchange = Uuid::new_v4();
        let mut entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "exchange": exchange.to_string(),
            "action": action.name(),
        });
        match self.mode {
            MessageLogMode::Full => entry["body"] = body.clone(),
            MessageLogMode::Compact => entry["vars"] = json!(var_count(body)),
        }
        self.write_line(&entry);
        exchange
    }

    pub fn log_response(&mut self, exchange: Uuid, status: u16, body: &Value) {
        let mut entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "resp",
            "exchange": exchange.to_string(),
            "status": status,
            "result": body.get("result"),
        });
        match self.mode {
            MessageLogMode::Full => entry["body"] = body.clone(),
            MessageLogMode::Compact => entry["vars"] = json!(var_count(body)),
        }
        self.write_line(&entry);
    }

    pub fn log_error(&mut self, exchange: Uuid, error: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "err",
            "exchange": exchange.to_string(),
            "error": error,
        });
        self.write_line(&entry);
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write message log entry: {e}");
        }
    }
}

fn var_count(body: &Value) -> usize {
    body.get("vars")
        .or_else(|| body.pointer("/output/vars"))
        .and_then(|v| v.as_array())
        .map_or(0, Vec::len)
}
