use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Credentials error: {message}")]
    CredentialsError { message: String },

    #[error("JWT signing failed: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Base64 decoding failed: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Sheet tab not found: {0}")]
    TabNotFound(String),
}

pub type Result<T> = std::result::Result<T, SheetsError>;
