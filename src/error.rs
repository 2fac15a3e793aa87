//! Error types that are part of the public API surface.

use std::time::Duration;

use thiserror::Error;

/// Errors from the DevTools Protocol client.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to reach the DevTools HTTP endpoint or open the WebSocket.
    #[error("failed to connect to DevTools at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// No inspectable page target was listed by the browser.
    #[error("no page target found at {endpoint}{}", filter_suffix(.filter))]
    NoPageTarget {
        endpoint: String,
        filter: Option<String>,
    },

    /// A CDP command returned an error response.
    #[error("CDP error {code}: {message}")]
    Remote { code: i64, message: String },

    /// A CDP command did not answer in time.
    #[error("CDP command '{method}' timed out after {duration:?}")]
    Timeout { method: String, duration: Duration },

    /// Serialization, unexpected message shapes, or a closed connection.
    #[error("CDP protocol error: {detail}")]
    Protocol { detail: String },
}

fn filter_suffix(filter: &Option<String>) -> String {
    filter
        .as_ref()
        .map(|f| format!(" matching '{f}'"))
        .unwrap_or_default()
}

/// Why an envelope string could not be turned into an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("envelope is not valid JSON: {0}")]
    Json(String),

    #[error("envelope has no recognised status")]
    UnknownStatus,
}

/// A fetch that never produced a usable envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// Every attempt threw or came back empty.
    #[error("no result after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// The evaluation ran cleanly but its result was not a valid envelope.
    #[error(transparent)]
    Undecodable(#[from] DecodeError),
}
