//! Provider adapter errors and their mapping onto [`GatewayError`].

use consilium_application::GatewayError;
use thiserror::Error;

/// One failed endpoint attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub root: String,
    pub status: Option<u16>,
    pub detail: String,
}

impl std::fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "endpoint {}: {} {}", self.root, status, self.detail),
            None => write!(f, "endpoint {}: {}", self.root, self.detail),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unreadable response: {0}")]
    Decode(String),

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("{}", join_failures(.0))]
    AllEndpointsFailed(Vec<EndpointFailure>),

    #[error("could not build HTTP client: {0}")]
    Client(String),
}

fn join_failures(failures: &[EndpointFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

impl ProviderError {
    /// Record this error as a failed attempt against `root`
    pub fn at(self, root: &str) -> EndpointFailure {
        let (status, detail) = match self {
            ProviderError::Http { status, body } => (Some(status), body),
            other => (None, other.to_string()),
        };
        EndpointFailure {
            root: root.to_string(),
            status,
            detail,
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Http { status, body } => GatewayError::Provider { status, body },
            ProviderError::Timeout => GatewayError::Timeout,
            ProviderError::Transport(msg) => GatewayError::Network(msg),
            ProviderError::Decode(msg) => GatewayError::Network(format!("unreadable response: {}", msg)),
            ProviderError::Missing(what) => GatewayError::InvalidRequest(format!("missing {}", what)),
            ProviderError::AllEndpointsFailed(failures) => {
                let status = failures.iter().rev().find_map(|f| f.status).unwrap_or(0);
                GatewayError::Provider {
                    status,
                    body: join_failures(&failures),
                }
            }
            ProviderError::Client(msg) => GatewayError::Unsupported(msg),
        }
    }
}
