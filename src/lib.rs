pub mod api;
mod client;
pub mod config;
mod error;
mod logger;
pub mod protocol;
mod transport;
mod types;

pub use client::{system_mode_from_vars, thermostats_from_vars, UponorClient, UponorClientBuilder};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use transport::{HttpTransport, Transport};
pub use types::*;
