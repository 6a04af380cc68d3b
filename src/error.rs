use thiserror::Error;

/// Error types that can occur while normalizing, dispatching or persisting evaluations.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// HTTP transport errors without a usable status code
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Authentication and authorization errors
    #[error("Auth error: {0}")]
    AuthError(String),
    /// Invalid request parameters or format
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Provider throttled the request (HTTP 429 or quota exhaustion)
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Provider-side failure (HTTP 5xx)
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },
    /// A single attempt exceeded its wall-clock bound
    #[error("Timed out: {0}")]
    Timeout(String),
    /// Errors returned by the LLM provider
    #[error("Provider error: {0}")]
    ProviderError(String),
    /// API response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// A per-conversation precondition (such as an external prompt) is unavailable
    #[error("Precondition missing: {0}")]
    PreconditionMissing(String),
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
    /// Configuration file or value errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Tabular input/output errors
    #[error("CSV error: {0}")]
    Csv(String),
    /// Generic error
    #[error("Generic error: {0}")]
    Generic(String),
}

impl JudgeError {
    /// Maps a non-success HTTP status and its body to the matching error class.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            401 | 403 => JudgeError::AuthError(message),
            429 => JudgeError::RateLimited(message),
            500..=599 => JudgeError::ServerError { status, message },
            400..=499 => JudgeError::InvalidRequest(format!("HTTP {status}: {message}")),
            _ => JudgeError::ProviderError(format!("HTTP {status}: {message}")),
        }
    }
}

/// Converts reqwest HTTP errors into JudgeErrors
impl From<reqwest::Error> for JudgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return JudgeError::Timeout(err.to_string());
        }
        match err.status() {
            Some(status) => JudgeError::from_status(status.as_u16(), err.to_string()),
            None => JudgeError::HttpError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for JudgeError {
    fn from(err: serde_json::Error) -> Self {
        JudgeError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl From<csv::Error> for JudgeError {
    fn from(err: csv::Error) -> Self {
        JudgeError::Csv(err.to_string())
    }
}

impl From<toml::de::Error> for JudgeError {
    fn from(err: toml::de::Error) -> Self {
        JudgeError::ConfigError(err.to_string())
    }
}

impl From<serde_yaml::Error> for JudgeError {
    fn from(err: serde_yaml::Error) -> Self {
        JudgeError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_error_classes() {
        assert!(matches!(
            JudgeError::from_status(401, "nope"),
            JudgeError::AuthError(_)
        ));
        assert!(matches!(
            JudgeError::from_status(429, "slow down"),
            JudgeError::RateLimited(_)
        ));
        assert!(matches!(
            JudgeError::from_status(503, "down"),
            JudgeError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            JudgeError::from_status(400, "bad"),
            JudgeError::InvalidRequest(_)
        ));
    }

    #[test]
    fn json_errors_carry_position() {
        let err: JudgeError = serde_json::from_str::<serde_json::Value>("{ nope")
            .unwrap_err()
            .into();
        let JudgeError::JsonError(msg) = err else {
            panic!("expected JsonError");
        };
        assert!(msg.contains("line 1"));
    }
}
