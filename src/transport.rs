use std::future::Future;
use std::sync::Mutex;

use serde_json::Value;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::logger::MessageLogger;
use crate::protocol::{Action, ACTION_HEADER};
use crate::{Error, Result};

/// One request/response exchange with the device.
///
/// Implementations send `body` for the given action and hand back the parsed
/// JSON response untouched; result checking happens in the client.
pub trait Transport: Send + Sync {
    fn call(&self, action: Action, body: Value) -> impl Future<Output = Result<Value>> + Send;
}

pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    logger: Option<Mutex<MessageLogger>>,
}

impl HttpTransport {
    pub(crate) fn new(http: reqwest::Client, endpoint: String, logger: Option<MessageLogger>) -> Self {
        Self {
            http,
            endpoint,
            logger: logger.map(Mutex::new),
        }
    }

    fn with_logger<R>(&self, f: impl FnOnce(&mut MessageLogger) -> R) -> Option<R> {
        let logger = self.logger.as_ref()?;
        match logger.lock() {
            Ok(mut guard) => Some(f(&mut guard)),
            Err(_) => {
                warn!("message logger poisoned, skipping entry");
                None
            }
        }
    }

    async fn send(&self, action: Action, body: &Value) -> Result<(u16, Value)> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header(ACTION_HEADER, action.uri())
            .json(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.error_for_status()?.text().await?;
        trace!(status, bytes = text.len(), "device response");

        let value = serde_json::from_str(&text)
            .map_err(|e| Error::Protocol(format!("invalid JSON from device: {e}")))?;
        Ok((status, value))
    }
}

impl Transport for HttpTransport {
    async fn call(&self, action: Action, body: Value) -> Result<Value> {
        debug!(url = %self.endpoint, action = action.name(), "calling device");
        let exchange: Option<Uuid> = self.with_logger(|l| l.log_request(action, &body));

        let outcome = self.send(action, &body).await;

        if let Some(exchange) = exchange {
            match &outcome {
                Ok((status, value)) => {
                    self.with_logger(|l| l.log_response(exchange, *status, value));
                }
                Err(e) => {
                    let msg = e.to_string();
                    self.with_logger(|l| l.log_error(exchange, &msg));
                }
            }
        }

        outcome.map(|(_, value)| value)
    }
}
