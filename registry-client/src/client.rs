use std::collections::HashSet;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Uri, header};
use http_body_util::BodyExt as _;
use hyperdriver::Body;
use hyperdriver::service::SharedService;
use serde::de::DeserializeOwned;
use sha2::{Digest as _, Sha256};
use tower::ServiceExt as _;

use crate::auth::{AuthenticationLayer, Credentials};
use crate::error::{RegistryError, RegistryResult};
use crate::models::{
    Catalog, ImageDetail, ImageIndex, MANIFEST_ACCEPT, Manifest, ManifestKind, TagList,
};
use crate::names::{validate_reference, validate_repository};
use crate::paginate;
use crate::platform::Platform;
use crate::registry::Registry;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DOCKER_CONTENT_DIGEST: &str = "docker-content-digest";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PAGE_SIZE: usize = 100;

/// Settings for the HTTP transport of one [RegistryClient]
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Verify the registry's TLS certificate
    pub tls_verify: bool,

    /// Timeout for each request
    pub timeout: Duration,

    /// `User-Agent` sent with each request
    pub user_agent: String,

    /// Number of entries requested per catalog or tag list page
    pub page_size: usize,

    /// Platform picked from multi-platform image indexes
    pub platform: Platform,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls_verify: true,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            platform: Platform::default(),
        }
    }
}

/// A read-only client for the Distribution API of one registry
#[derive(Debug, Clone)]
pub struct RegistryClient {
    registry: Registry,
    inner: hyperdriver::client::SharedClientService<Body, Body>,
    page_size: usize,
    platform: Platform,
}

/// A manifest as fetched, before decoding
#[derive(Debug)]
struct FetchedManifest {
    digest: String,
    kind: ManifestKind,
    body: Bytes,
}

impl RegistryClient {
    /// Create a client connecting to `registry` over TCP.
    pub fn new(
        registry: Registry,
        credentials: Credentials,
        config: TransportConfig,
    ) -> RegistryResult<Self> {
        let builder = hyperdriver::Client::build_tcp_http();
        let builder = if config.tls_verify {
            builder.with_default_tls()
        } else {
            tracing::warn!(
                %registry,
                "TLS certificate verification is disabled for this registry"
            );
            builder.with_tls(crate::tls::accept_any_certificate()?)
        };

        let inner = builder
            .with_user_agent(config.user_agent.clone())
            .with_timeout(config.timeout)
            .layer(AuthenticationLayer::new(credentials))
            .build_service();

        Ok(RegistryClient {
            registry,
            inner,
            page_size: config.page_size.max(1),
            platform: config.platform,
        })
    }

    /// Create a client which sends requests through `service`.
    ///
    /// The TLS, timeout and user agent settings of `config` are ignored.
    pub fn with_service<S>(
        registry: Registry,
        credentials: Credentials,
        config: TransportConfig,
        service: S,
    ) -> Self
    where
        S: tower::Service<
                http::Request<hyperdriver::Body>,
                Response = http::Response<hyperdriver::Body>,
                Error = hyperdriver::client::Error,
            > + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        let inner = tower::ServiceBuilder::new()
            .layer(SharedService::layer())
            .layer(AuthenticationLayer::new(credentials))
            .service(service);

        RegistryClient {
            registry,
            inner,
            page_size: config.page_size.max(1),
            platform: config.platform,
        }
    }

    /// The registry this client talks to
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The platform picked from multi-platform images
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// List every repository in the registry, following pagination.
    #[tracing::instrument(skip(self), fields(registry = %self.registry))]
    pub async fn catalog(&self) -> RegistryResult<Vec<String>> {
        let first = self
            .registry
            .uri(&format!("/v2/_catalog?n={}", self.page_size))?;

        let repositories = self
            .paginate(first, "catalog", |page: Catalog| {
                page.repositories.unwrap_or_default()
            })
            .await?;

        tracing::debug!("Found {} repositories", repositories.len());
        Ok(repositories)
    }

    /// List every tag of `repository`, following pagination.
    #[tracing::instrument(skip(self), fields(registry = %self.registry))]
    pub async fn tags(&self, repository: &str) -> RegistryResult<Vec<String>> {
        validate_repository(repository)?;
        let first = self.registry.uri(&format!(
            "/v2/{repository}/tags/list?n={}",
            self.page_size
        ))?;

        let tags = self
            .paginate(first, "tag list", |page: TagList| {
                page.tags.unwrap_or_default()
            })
            .await?;

        tracing::debug!("Found {} tags", tags.len());
        Ok(tags)
    }

    /// Get the digest and total layer size of a tagged image.
    ///
    /// Multi-platform images are resolved to the configured platform, and the
    /// digest reported is that of the platform's manifest.
    #[tracing::instrument(skip(self), fields(registry = %self.registry))]
    pub async fn image(&self, repository: &str, tag: &str) -> RegistryResult<ImageDetail> {
        let mut fetched = self.manifest(repository, tag).await?;

        if fetched.kind == ManifestKind::Index {
            let index: ImageIndex = decode("image index", &fetched.body)?;
            let descriptor =
                index
                    .find(&self.platform)
                    .ok_or_else(|| RegistryError::NoMatchingPlatform {
                        platform: self.platform.clone(),
                        reference: format!("{repository}:{tag}"),
                    })?;

            if descriptor.kind() == Some(ManifestKind::Index) {
                return Err(RegistryError::UnsupportedMediaType(format!(
                    "nested image index {}",
                    descriptor.digest
                )));
            }

            tracing::debug!(
                platform = %self.platform,
                digest = %descriptor.digest,
                "Resolved image index"
            );
            fetched = self.manifest(repository, &descriptor.digest).await?;

            if fetched.kind != ManifestKind::Image {
                return Err(RegistryError::UnsupportedMediaType(
                    "nested image index".to_owned(),
                ));
            }
        }

        let manifest: Manifest = decode("image manifest", &fetched.body)?;
        let detail = ImageDetail {
            name: tag.to_owned(),
            digest: fetched.digest,
            size: manifest.layer_size(),
        };

        tracing::debug!(digest = %detail.digest, size = detail.size, "Fetched image");
        Ok(detail)
    }

    async fn manifest(
        &self,
        repository: &str,
        reference: &str,
    ) -> RegistryResult<FetchedManifest> {
        validate_repository(repository)?;
        validate_reference(reference)?;

        let uri = self
            .registry
            .uri(&format!("/v2/{repository}/manifests/{reference}"))?;

        let response = self.send(uri, Some(MANIFEST_ACCEPT)).await?;
        let (parts, body) = response.into_parts();
        let body = collect(body).await?;

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        let kind = ManifestKind::classify(content_type, &body)?;

        let digest = content_digest(&parts.headers)
            .unwrap_or_else(|| format!("sha256:{}", hex::encode(Sha256::digest(&body))));

        Ok(FetchedManifest { digest, kind, body })
    }

    async fn paginate<T, F>(
        &self,
        first: Uri,
        what: &'static str,
        mut items: F,
    ) -> RegistryResult<Vec<String>>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> Vec<String>,
    {
        let mut collected = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(first);

        while let Some(uri) = next.take() {
            visited.insert(uri.clone());
            let response = self.send(uri.clone(), None).await?;

            next = paginate::next_link(response.headers())
                .map(|link| paginate::resolve(&uri, &link))
                .transpose()?;

            if let Some(following) = next.take_if(|following| visited.contains(&*following)) {
                tracing::warn!(%following, "{what} pagination loops back to a fetched page");
            }

            let body = collect(response.into_body()).await?;
            collected.extend(items(decode(what, &body)?));
        }

        Ok(collected)
    }

    async fn send(
        &self,
        uri: Uri,
        accept: Option<&str>,
    ) -> RegistryResult<http::Response<hyperdriver::Body>> {
        let mut builder = http::Request::get(uri.clone());
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let request = builder.body(Body::empty())?;

        tracing::trace!(%uri, "Sending registry request");
        let response = self.inner.clone().oneshot(request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = collect(response.into_body()).await?;
            let message = String::from_utf8_lossy(&body).trim().to_owned();
            return Err(RegistryError::Response {
                status,
                uri,
                message,
            });
        }

        Ok(response)
    }
}

fn content_digest(headers: &HeaderMap) -> Option<String> {
    headers
        .get(DOCKER_CONTENT_DIGEST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|digest| digest.contains(':'))
        .map(str::to_owned)
}

fn decode<T: DeserializeOwned>(what: &'static str, body: &[u8]) -> RegistryResult<T> {
    serde_json::from_slice(body).map_err(RegistryError::decode(what))
}

async fn collect<B>(body: B) -> RegistryResult<Bytes>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let collected = body
        .collect()
        .await
        .map_err(|err| RegistryError::Body(err.into()))?;
    Ok(collected.to_bytes())
}
