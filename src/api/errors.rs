use thiserror::Error;

/// Failure taxonomy of the transfer collaborator. Every variant is scoped
/// to the one request that produced it.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request URL is invalid")]
    InvalidUrl,

    #[error("invalid response code - {0}")]
    InvalidResponseStatus(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("received data appears to be corrupt")]
    CorruptResponse,

    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Error alias
pub type Result<T, E = ApiError> = std::result::Result<T, E>;
