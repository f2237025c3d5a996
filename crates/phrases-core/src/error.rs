/// Failure taxonomy shared by every [`crate::PhraseStore`] implementation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Required input was missing or blank. The message is user-facing.
    #[error("{0}")]
    Validation(String),
    /// The remote service answered with a non-2xx status or an unusable body.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    /// The remote service could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        StoreError::Upstream {
            status: 502,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return StoreError::malformed(err.to_string());
        }
        match err.status() {
            Some(status) => StoreError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => StoreError::Transport(err.to_string()),
        }
    }
}
