//! HTTP judge providers.

#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "openai")]
pub mod openai;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::JudgeError;

pub(crate) fn build_client(timeout_seconds: Option<u64>) -> Result<Client, JudgeError> {
    let mut builder = Client::builder();
    if let Some(sec) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(sec));
    }
    Ok(builder.build()?)
}

/// Parses a base URL, making sure relative joins append to its path.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, JudgeError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| JudgeError::ConfigError(format!("Invalid base URL {raw:?}: {e}")))
}

pub(crate) fn log_request_payload<T: Serialize>(label: &str, body: &T) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    if let Ok(json) = serde_json::to_string(body) {
        log::trace!("{label}: {json}");
    }
}

/// Sends a request and decodes a JSON body, mapping HTTP failures to error classes.
pub(crate) async fn send_and_parse<T: DeserializeOwned>(
    request: RequestBuilder,
    context: &str,
) -> Result<T, JudgeError> {
    let response = request.send().await?;
    let status = response.status();
    log::debug!("{context} HTTP status: {status}");
    let resp_text = response.text().await?;
    if !status.is_success() {
        return Err(JudgeError::from_status(status.as_u16(), resp_text));
    }
    serde_json::from_str(&resp_text).map_err(|e| JudgeError::ResponseFormatError {
        message: format!("Failed to decode {context} response: {e}"),
        raw_response: resp_text,
    })
}
