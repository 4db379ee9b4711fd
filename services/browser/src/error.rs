//! Error types for the browser

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use registry_client::RegistryError;

/// Result type for request handlers
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Errors surfaced while serving a page
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// The registry could not be queried
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The page template failed to load or render
    #[error("rendering template: {0}")]
    Template(#[from] minijinja::Error),

    /// No embedded asset exists at this path
    #[error("asset not found: {0}")]
    AssetNotFound(String),
}

impl BrowserError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BrowserError::Registry(error) if error.status() == Some(StatusCode::NOT_FOUND) => {
                StatusCode::NOT_FOUND
            }
            BrowserError::Registry(RegistryError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            BrowserError::Registry(error) if error.is_transport() => StatusCode::BAD_GATEWAY,
            BrowserError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            BrowserError::Registry(_) | BrowserError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BrowserError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, "{}", self);
        } else {
            tracing::warn!(%status, "{}", self);
        }

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_not_found_maps_to_404() {
        let error = BrowserError::from(RegistryError::Response {
            status: StatusCode::NOT_FOUND,
            uri: "http://registry.test/v2/nope/tags/list".parse().unwrap(),
            message: "NAME_UNKNOWN".into(),
        });
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_registry_errors_map_to_500() {
        let error = BrowserError::from(RegistryError::Response {
            status: StatusCode::UNAUTHORIZED,
            uri: "http://registry.test/v2/_catalog".parse().unwrap(),
            message: "authentication required".into(),
        });
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = BrowserError::from(RegistryError::UnsupportedMediaType("text/plain".into()));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn response_body_is_the_message() {
        let response = BrowserError::AssetNotFound("missing.css".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"asset not found: missing.css");
    }
}
