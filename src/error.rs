use thiserror::Error;

#[derive(Error, Debug)]
pub enum TicketDeskError {
    #[error("ticket '{0}' not found")]
    TicketNotFound(String),

    #[error("ticket number '{0}' matches more than one record")]
    AmbiguousTicket(String),

    #[error("no ticket selected")]
    NoTicketSelected,

    #[error("another save or delete is still in progress")]
    Busy,

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("invalid note priority '{0}', expected one of: None, Low, Medium, High")]
    InvalidPriority(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl TicketDeskError {
    /// Message without the category prefix, used inside alert text.
    pub fn reason(&self) -> String {
        match self {
            TicketDeskError::Fetch(msg)
            | TicketDeskError::Upload(msg)
            | TicketDeskError::Write(msg)
            | TicketDeskError::Other(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TicketDeskError>;
