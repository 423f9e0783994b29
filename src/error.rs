use std::fmt;

use crate::protocol::Action;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Rejected { action: Action, result: String },
    Protocol(String),
    Validation(String),
    Io(std::io::Error),
}

impl Error {
    /// True for failures on the device side of the bridge: transport errors,
    /// non-"OK" results and unreadable responses.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Rejected { .. } | Error::Protocol(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Rejected { action, result } => {
                write!(f, "{} rejected by device: result={result}", action.name())
            }
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::Validation(msg) => write!(f, "{msg}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_classification() {
        assert!(Error::Protocol("bad".into()).is_upstream());
        assert!(
            Error::Rejected {
                action: Action::SetAttributes,
                result: "ErrorUnknown".into()
            }
            .is_upstream()
        );
        assert!(!Error::Validation("nope".into()).is_upstream());
    }

    #[test]
    fn rejected_message_names_action() {
        let err = Error::Rejected {
            action: Action::GetAttributes,
            result: "_ErrorUnauthorized".into(),
        };
        assert_eq!(
            err.to_string(),
            "GetAttributes rejected by device: result=_ErrorUnauthorized"
        );
    }
}
