use thiserror::Error;

/// Reasons a payload cannot be rendered as a report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("No data available")]
    NoData,
    #[error("Invalid data structure")]
    InvalidStructure { detail: String },
}

impl Rejection {
    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        Rejection::InvalidStructure {
            detail: detail.into(),
        }
    }

    /// Decoder message for logs; empty for `NoData`.
    pub fn detail(&self) -> &str {
        match self {
            Rejection::NoData => "",
            Rejection::InvalidStructure { detail } => detail,
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Message(String),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("State file {0:?} does not hold a JSON object")]
    NotAnObject(std::path::PathBuf),
}
