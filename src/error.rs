use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid hex color: {0} (expected RRGGBB, e.g. 1a1b26)")]
    InvalidColor(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid target time: {0}")]
    InvalidTarget(String),

    #[error("Quote parse error: {0}")]
    QuoteParse(#[from] serde_json::Error),

    #[error("Quote field is empty: {0}")]
    QuoteField(&'static str),
}

pub type Result<T> = std::result::Result<T, AppError>;
