//! Error types for the collection client.
//!
//! # Design
//! A server that answered with a non-2xx status lands in `Http` with the raw
//! status and body, so the `userMessage` the back end puts in its error body
//! stays reachable. A request that got no answer at all is `Transport`.
//! `Rejected` only comes out of `ColecaoService::create`, which re-wraps
//! HTTP failures into the JSON text of the server's error body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::jsog::NormalizeError;
use crate::transport::TransportError;

/// Errors returned by `HttpClient` and `ColecaoService`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside 2xx.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// No response was received (connect failure, timeout, I/O).
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Create failed; the message is the JSON-encoded server error body.
    #[error("{0}")]
    Rejected(String),

    /// The response body used JSOG markers that could not be resolved.
    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a server-side failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The error body as JSON, when the server sent one.
    pub fn body_json(&self) -> Option<Value> {
        match self {
            ApiError::Http { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    /// The human-readable `userMessage` the back end attaches to failures.
    pub fn user_message(&self) -> Option<String> {
        self.body_json()?
            .get("userMessage")?
            .as_str()
            .map(str::to_string)
    }

    fn name(&self) -> &'static str {
        match self {
            ApiError::Http { .. } => "HttpError",
            ApiError::Transport(_) => "TransportError",
            ApiError::Rejected(_) => "RejectedError",
            ApiError::Normalize(_) => "NormalizeError",
            ApiError::Deserialization(_) => "DeserializationError",
            ApiError::Serialization(_) => "SerializationError",
        }
    }
}

/// Error shape handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationError {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl From<&ApiError> for ApplicationError {
    fn from(err: &ApiError) -> Self {
        let body = match err {
            ApiError::Rejected(message) => serde_json::from_str(message).ok(),
            other => other.body_json(),
        };
        let details = body.as_ref().and_then(|b| b.get("details")).and_then(|d| {
            d.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
        });
        Self {
            name: err.name().to_string(),
            message: err.to_string(),
            details,
        }
    }
}
