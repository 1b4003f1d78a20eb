use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::status::{ApiCode, classify_code};

/// Machine-readable body of a request-level fault.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Errors produced by the transport client.
///
/// An `Api` fault is data for the status resolver, not control flow: the
/// caller classifies it with [`ClientError::known_code`] and maps the
/// result to catalogue messages.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unable to load certificate material from {path}")]
    Certificate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The service answered with a non-success status. `body` is absent
    /// when the response carried no decodable fault body.
    #[error("api fault: http status {status}")]
    Api {
        status: StatusCode,
        body: Option<ErrorBody>,
    },

    /// Network-level failure: timeout, connection refused, TLS handshake.
    /// No code extraction is possible; treat as unclassified.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Extracts and classifies the structured error code, if the fault
    /// carried a decodable body. `None` means an unclassified transport
    /// failure that is not an application-level outcome.
    pub fn known_code(&self) -> Option<ApiCode> {
        match self {
            ClientError::Api {
                body: Some(body), ..
            } => Some(classify_code(&body.error_code)),
            _ => None,
        }
    }
}
