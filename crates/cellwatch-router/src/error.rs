use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response status: {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response field {0} missing or empty")]
    MissingField(String),
    #[error("invalid router address: {0}")]
    BadAddress(String),
    #[error("wrong router password")]
    WrongPassword,
    #[error("router session expired")]
    SessionExpired,
    #[error("router rejected the set request")]
    SetRejected,
    #[error("unknown network mode: {0}")]
    UnknownMode(String),
}
