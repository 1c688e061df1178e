//! Spreadsheet-backed endpoint integration.
//!
//! The endpoint is a script web app that appends one row per POST. The body is
//! JSON sent as `text/plain` so browsers never issue a CORS pre-flight; we keep
//! the same wire format so one deployment serves both clients.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::domain::{RemoteReply, SubmissionPayload};
use crate::error::AppError;

/// Shown when neither the transport nor the endpoint gave a usable reason.
pub const GENERIC_FAILURE: &str = "Submission failed";
/// Shown when the endpoint answered but did not confirm the row was written.
pub const NOT_ACKNOWLEDGED: &str = "Submission was not acknowledged";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Network failure or a non-2xx answer.
    #[error("{message}")]
    Transport { message: String },
    /// The endpoint answered but reported `success: false`.
    #[error("{message}")]
    Rejected { message: String },
    #[error("Submission failed")]
    Unexpected,
}

impl SubmitError {
    pub fn transport(message: Option<String>) -> Self {
        Self::Transport {
            message: non_blank(message).unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        }
    }

    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected {
            message: non_blank(message).unwrap_or_else(|| NOT_ACKNOWLEDGED.to_string()),
        }
    }
}

fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// Where submissions go.
pub trait Endpoint {
    fn submit(&self, payload: &SubmissionPayload) -> Result<RemoteReply, SubmitError>;
}

impl<E: Endpoint + ?Sized> Endpoint for Box<E> {
    fn submit(&self, payload: &SubmissionPayload) -> Result<RemoteReply, SubmitError> {
        (**self).submit(payload)
    }
}

pub struct ScriptClient {
    client: Client,
    url: String,
}

impl ScriptClient {
    /// `timeout = None` leaves the POST unbounded.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Endpoint for ScriptClient {
    fn submit(&self, payload: &SubmissionPayload) -> Result<RemoteReply, SubmitError> {
        let body = serde_json::to_string(payload).map_err(|e| {
            warn!("failed to encode payload: {e}");
            SubmitError::Unexpected
        })?;
        let cache = chrono::Utc::now().timestamp_millis().to_string();
        debug!("POST {} cache={cache} body={body}", self.url);

        let resp = self
            .client
            .post(&self.url)
            .query(&[("cache", cache.as_str())])
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .map_err(|e| {
                warn!("submission request failed: {e}");
                SubmitError::transport(None)
            })?;

        let status = resp.status();
        let text = resp.text().map_err(|e| {
            warn!("failed to read submission response: {e}");
            SubmitError::transport(None)
        })?;

        if !status.is_success() {
            warn!("endpoint answered {status}");
            let message = serde_json::from_str::<RemoteReply>(&text)
                .ok()
                .and_then(|r| r.message);
            return Err(SubmitError::transport(message));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("unparseable endpoint reply ({e}): {text}");
            SubmitError::Unexpected
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, Rating};
    use crate::test_support::serve_once;

    fn payload() -> SubmissionPayload {
        SubmissionPayload::with_position(
            Rating::new(7).unwrap(),
            Coordinates::new(37.7749, -122.4194).unwrap(),
        )
    }

    #[test]
    fn posts_plain_text_json_with_cache_buster() {
        let server = serve_once("200 OK", r#"{"success":true}"#);
        let client = ScriptClient::new(server.url.clone(), None).unwrap();

        let reply = client.submit(&payload()).unwrap();
        assert!(reply.success);

        let request = server.request();
        let first_line = request.lines().next().unwrap_or_default();
        assert!(first_line.starts_with("POST /exec?cache="), "{first_line}");
        let cache = first_line
            .trim_start_matches("POST /exec?cache=")
            .split_whitespace()
            .next()
            .unwrap_or_default();
        assert!(!cache.is_empty() && cache.chars().all(|c| c.is_ascii_digit()), "{cache}");
        assert!(request.to_ascii_lowercase().contains("content-type: text/plain"));
        assert!(request.ends_with(r#"{"rating":7,"lat":37.7749,"lng":-122.4194}"#));
    }

    #[test]
    fn error_status_prefers_server_message() {
        let server = serve_once("503 Service Unavailable", r#"{"message":"Server overloaded"}"#);
        let client = ScriptClient::new(server.url.clone(), None).unwrap();
        let err = client.submit(&payload()).unwrap_err();
        assert_eq!(
            err,
            SubmitError::Transport {
                message: "Server overloaded".to_string()
            }
        );
        server.request();
    }

    #[test]
    fn error_status_without_message_is_generic() {
        let server = serve_once("500 Internal Server Error", "oops");
        let client = ScriptClient::new(server.url.clone(), None).unwrap();
        let err = client.submit(&payload()).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
        server.request();
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        // Bind then drop so the port is very likely closed.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let client = ScriptClient::new(format!("http://{addr}/exec"), None).unwrap();
        let err = client.submit(&payload()).unwrap_err();
        assert_eq!(err, SubmitError::transport(None));
    }

    #[test]
    fn success_false_is_returned_as_reply() {
        let server = serve_once("200 OK", r#"{"success":false,"message":"Sheet locked"}"#);
        let client = ScriptClient::new(server.url.clone(), None).unwrap();
        let reply = client.submit(&payload()).unwrap();
        assert!(!reply.success);
        assert_eq!(reply.message.as_deref(), Some("Sheet locked"));
        server.request();
    }

    #[test]
    fn blank_messages_fall_back() {
        assert_eq!(SubmitError::rejected(Some("  ".into())).to_string(), NOT_ACKNOWLEDGED);
        assert_eq!(SubmitError::transport(None).to_string(), GENERIC_FAILURE);
    }
}
