//! Application builder and router

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use minijinja::Environment;
use registry_client::RegistryClient;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::BrowserResult;

const DEFAULT_TITLE: &str = "Registry Browser";
pub(crate) const INDEX_TEMPLATE: &str = "index.html";

/// Page templates, compiled once at startup
#[derive(Debug, Clone)]
pub(crate) struct Templates(Arc<Environment<'static>>);

impl Templates {
    fn load() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        Ok(Templates(Arc::new(env)))
    }

    pub(crate) fn render<S: Serialize>(
        &self,
        name: &str,
        context: S,
    ) -> Result<String, minijinja::Error> {
        self.0.get_template(name)?.render(context)
    }
}

/// Shared state for request handlers
#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) client: RegistryClient,
    pub(crate) templates: Templates,
    pub(crate) title: Arc<str>,
}

/// Builder for the registry browser service
#[derive(Debug)]
pub struct BrowserBuilder {
    client: RegistryClient,
    title: Option<String>,
}

impl BrowserBuilder {
    /// Create a builder browsing the registry behind `client`
    pub fn new(client: RegistryClient) -> Self {
        Self {
            client,
            title: None,
        }
    }

    /// Set the page title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Build the browser service
    ///
    /// Returns a Router that can be served with any tower-compatible server
    pub fn build(self) -> BrowserResult<Router> {
        let state = AppState {
            client: self.client,
            templates: Templates::load()?,
            title: self.title.as_deref().unwrap_or(DEFAULT_TITLE).into(),
        };

        Ok(Router::new()
            .route("/", get(crate::index::index))
            .route("/healthz", get(healthz))
            .merge(crate::assets::router())
            .layer(TraceLayer::new_for_http())
            .with_state(state))
    }
}

/// Liveness check, independent of the registry
async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_compile() {
        let templates = Templates::load().unwrap();
        let html = templates
            .render(
                INDEX_TEMPLATE,
                minijinja::context! {
                    title => "Test",
                    registry => "localhost:5000",
                    repositories => Vec::<String>::new(),
                    selected_repo => "",
                    selected_tag => "",
                },
            )
            .unwrap();

        assert!(html.contains("<title>Test</title>"));
        assert!(html.contains("No repositories."));
        assert!(html.contains("Select a repository."));
    }
}
