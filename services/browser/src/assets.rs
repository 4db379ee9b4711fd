//! Static assets, embedded in the binary

use axum::Router;
use axum::extract::Path;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::app::AppState;
use crate::error::{BrowserError, BrowserResult};

const ASSETS: &[(&str, &[u8])] = &[
    ("style.css", include_bytes!("../assets/style.css")),
    ("favicon.svg", include_bytes!("../assets/favicon.svg")),
];

/// Router serving `/static/*`
pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/static/{*path}", get(asset))
}

async fn asset(Path(path): Path<String>) -> BrowserResult<Response> {
    let body = lookup(&path).ok_or_else(|| BrowserError::AssetNotFound(path.clone()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&path).to_string()),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        body,
    )
        .into_response())
}

fn lookup(path: &str) -> Option<&'static [u8]> {
    ASSETS
        .iter()
        .find(|(name, _)| *name == path)
        .map(|(_, body)| *body)
}

fn content_type(path: &str) -> mime::Mime {
    match path.rsplit_once('.').map(|(_, extension)| extension) {
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("svg") => mime::IMAGE_SVG,
        Some("png") => mime::IMAGE_PNG,
        Some("html") => mime::TEXT_HTML_UTF_8,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type("style.css"), mime::TEXT_CSS_UTF_8);
        assert_eq!(content_type("favicon.svg"), mime::IMAGE_SVG);
        assert_eq!(content_type("archive"), mime::APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn embedded_assets_are_found() {
        assert!(lookup("style.css").is_some_and(|body| !body.is_empty()));
        assert!(lookup("favicon.svg").is_some());
        assert!(lookup("../Cargo.toml").is_none());
    }
}
