//! Error types for the registry client

use http::{StatusCode, Uri};

use crate::platform::Platform;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while talking to a registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry address could not be parsed
    #[error("invalid registry address {address:?}: {reason}")]
    InvalidAddress {
        /// The address as given
        address: String,
        /// Why it was rejected
        reason: String,
    },

    /// A repository name, tag or digest is malformed
    #[error("invalid repository name or reference: {0:?}")]
    InvalidName(String),

    /// A request could not be built
    #[error("building request: {0}")]
    Http(#[from] http::Error),

    /// A pagination link could not be resolved
    #[error("invalid link {link:?}: {reason}")]
    InvalidLink {
        /// The link target as sent by the registry
        link: String,
        /// Why it could not be followed
        reason: String,
    },

    /// The request could not be sent, or no response was received
    #[error("sending request: {0}")]
    Request(#[from] hyperdriver::client::Error),

    /// An error occured while receiving the response body
    #[error("reading response body: {0}")]
    Body(#[source] BoxError),

    /// The registry answered with a non-success status
    #[error("HTTP {status} from {uri}: {message}")]
    Response {
        /// Response status code
        status: StatusCode,
        /// The URI which was requested
        uri: Uri,
        /// The response body
        message: String,
    },

    /// A response body was not the expected JSON document
    #[error("decoding {what}: {source}")]
    Decode {
        /// The document being decoded
        what: &'static str,
        /// The JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The registry returned a manifest this client does not understand
    #[error("unsupported manifest type: {0}")]
    UnsupportedMediaType(String),

    /// An image index has no manifest for the wanted platform
    #[error("no manifest for platform {platform} in {reference}")]
    NoMatchingPlatform {
        /// The wanted platform
        platform: Platform,
        /// Repository and tag of the index
        reference: String,
    },

    /// TLS could not be configured for the client
    #[error("configuring TLS: {0}")]
    Tls(#[from] rustls::Error),
}

impl RegistryError {
    /// The HTTP status returned by the registry, if this is a response error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RegistryError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Did this error happen before the registry could answer?
    pub fn is_transport(&self) -> bool {
        matches!(self, RegistryError::Request(_) | RegistryError::Body(_))
    }

    pub(crate) fn decode(what: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| RegistryError::Decode { what, source }
    }
}
