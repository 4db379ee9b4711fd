//! # Registry client
//!
//! A small read-only client for the
//! [OCI Distribution API](https://github.com/opencontainers/distribution-spec),
//! covering what a registry browser needs:
//!
//! - listing repositories (`/v2/_catalog`)
//! - listing tags (`/v2/<name>/tags/list`)
//! - summarizing a tagged image: manifest digest and total layer size
//!
//! Lists are paginated with the `Link` header and fetched completely.
//! Authentication is anonymous or HTTP Basic. TLS settings are chosen per client
//! with [TransportConfig].
//!
//! ## Example
//!
//! ```no_run
//! use registry_client::{Credentials, Registry, RegistryClient, TransportConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::parse("localhost:5000", true)?;
//! let client = RegistryClient::new(registry, Credentials::Anonymous, TransportConfig::default())?;
//!
//! for repository in client.catalog().await? {
//!     println!("{repository}: {:?}", client.tags(&repository).await?);
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod error;
pub mod mock;
pub mod models;
mod names;
mod paginate;
mod platform;
mod registry;
mod secret;
mod tls;

pub use self::auth::{AuthenticationLayer, AuthenticationService, Credentials, basic_auth};
pub use self::client::{RegistryClient, TransportConfig};
pub use self::error::{RegistryError, RegistryResult};
pub use self::models::ImageDetail;
pub use self::platform::{ParsePlatformError, Platform};
pub use self::registry::Registry;
pub use self::secret::Secret;
