use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the server's own text when it sent one.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text for the single notification slot the UI has.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_shown_verbatim() {
        let err = ApiError::Server {
            status: 400,
            message: "Group name not specified".into(),
        };
        assert_eq!(err.user_message(), "Group name not specified");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn config_error_is_prefixed() {
        let err = ApiError::Config("missing API key".into());
        assert_eq!(err.user_message(), "Invalid configuration: missing API key");
    }
}
