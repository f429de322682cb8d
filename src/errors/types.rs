use thiserror::Error;

#[derive(Debug, Error)]
pub enum PocForgeError {
    /// Local precondition failure; no network call was attempted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-success HTTP status or connection failure.
    #[error("Transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// A malformed event frame. Never aborts a stream.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Failure reported by the server, message passed through verbatim.
    #[error("{0}")]
    Application(String),

    #[error("A generation session is already in progress")]
    SessionBusy,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PocForgeError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by a transport failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PocForgeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
