//! Credentials for the registry.
//!
//! Registries accept either anonymous reads or static HTTP Basic credentials.
//! [Credentials] are applied to every outgoing request by the
//! [AuthenticationLayer] installed on the client transport.

use std::sync::Arc;

use http::HeaderValue;
use tower::layer::Layer;

use crate::secret::Secret;

/// Create a basic authentication header value, with the password being optional.
///
/// Basic authentication Base64 encodes the username and password, separated by a colon.
///
/// # Example
/// ```rust
/// use registry_client::basic_auth;
///
/// let header = basic_auth("username", Some("password"));
/// assert_eq!(header.to_str().unwrap(), "Basic dXNlcm5hbWU6cGFzc3dvcmQ=");
/// ```
pub fn basic_auth<U, P>(username: U, password: Option<P>) -> HeaderValue
where
    U: std::fmt::Display,
    P: std::fmt::Display,
{
    use base64::prelude::BASE64_STANDARD;
    use base64::write::EncoderWriter;
    use std::io::Write;

    let mut buf = b"Basic ".to_vec();
    {
        let mut encoder = EncoderWriter::new(&mut buf, &BASE64_STANDARD);
        let _ = write!(encoder, "{}:", username);
        if let Some(password) = password {
            let _ = write!(encoder, "{}", password);
        }
    }
    let mut header = HeaderValue::from_bytes(&buf).expect("base64 is always valid HeaderValue");
    header.set_sensitive(true);
    header
}

/// How to authenticate against the registry.
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// Send no credentials.
    #[default]
    Anonymous,

    /// HTTP Basic authentication, with the password being optional.
    Basic {
        /// Registry username
        username: String,
        /// Registry password
        password: Option<Secret>,
    },
}

impl Credentials {
    /// Build credentials from an optional username and password.
    ///
    /// An empty or missing username with no password means anonymous access.
    pub fn new(username: Option<String>, password: Option<Secret>) -> Self {
        let username = username.filter(|name| !name.is_empty());
        let password = password.filter(|secret| !secret.is_empty());

        match (username, password) {
            (None, None) => Credentials::Anonymous,
            (username, password) => Credentials::Basic {
                username: username.unwrap_or_default(),
                password,
            },
        }
    }

    /// Is this anonymous access?
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Credentials::Anonymous)
    }

    /// Apply the credentials to a request.
    ///
    /// An `Authorization` header already present on the request is left alone.
    pub fn authenticate<B>(&self, mut req: http::Request<B>) -> http::Request<B> {
        let Credentials::Basic { username, password } = self else {
            return req;
        };

        if !req.headers().contains_key(http::header::AUTHORIZATION) {
            let header_value = basic_auth(username, password.as_ref().map(Secret::revealed));
            req.headers_mut()
                .append(http::header::AUTHORIZATION, header_value);
        } else {
            tracing::warn!("{} header already set", http::header::AUTHORIZATION);
        }
        req
    }
}

/// A layer which applies [Credentials] to every request.
#[derive(Debug, Clone)]
pub struct AuthenticationLayer {
    credentials: Arc<Credentials>,
}

impl AuthenticationLayer {
    pub(crate) fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
        }
    }
}

impl<S> Layer<S> for AuthenticationLayer {
    type Service = AuthenticationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthenticationService {
            inner,
            credentials: self.credentials.clone(),
        }
    }
}

/// Service produced by [AuthenticationLayer].
#[derive(Debug, Clone)]
pub struct AuthenticationService<S> {
    inner: S,
    credentials: Arc<Credentials>,
}

impl<S, BIn, BOut> tower::Service<http::Request<BIn>> for AuthenticationService<S>
where
    S: tower::Service<http::Request<BIn>, Response = http::Response<BOut>>,
    S::Future: Send + 'static,
{
    type Response = http::Response<BOut>;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<BIn>) -> Self::Future {
        let req = self.credentials.authenticate(req);
        self.inner.call(req)
    }
}
