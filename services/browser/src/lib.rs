//! # Registry browser
//!
//! A small web UI for browsing the repositories and tags of a container
//! registry. The service is an axum [Router](axum::Router) built with
//! [BrowserBuilder], which talks to the registry through a
//! [RegistryClient](registry_client::RegistryClient).
//!
//! ```no_run
//! use registry_browser::BrowserBuilder;
//! use registry_client::{Credentials, Registry, RegistryClient, TransportConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::parse("localhost:5000", true)?;
//! let client = RegistryClient::new(registry, Credentials::Anonymous, TransportConfig::default())?;
//! let app = BrowserBuilder::new(client).title("Images").build()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod assets;
pub mod bytesize;
pub mod config;
mod error;
mod index;

pub use self::app::BrowserBuilder;
pub use self::bytesize::{SiBytes, format_si};
pub use self::error::{BrowserError, BrowserResult};
