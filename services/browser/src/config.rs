//! Command line and file configuration for the browser

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use registry_client::{
    Credentials, Platform, Registry, RegistryClient, RegistryResult, Secret, TransportConfig,
};
use serde::{Deserialize, Deserializer};

const DEFAULT_PORT: u16 = 80;
const DEFAULT_URL: &str = "localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Browse the repositories and tags of a container registry
#[derive(Debug, Default, clap::Parser)]
#[command(version, about)]
pub struct Args {
    /// TOML file with default settings
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Port to listen on [default: 80]
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to listen on [default: 0.0.0.0]
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Registry address, e.g. `registry.example.com` or `http://localhost:5000`
    /// [default: localhost:5000]
    #[arg(long)]
    pub url: Option<String>,

    /// Registry username
    #[arg(long)]
    pub user: Option<String>,

    /// Registry password
    #[arg(long)]
    pub pass: Option<String>,

    /// Use plain HTTP when the registry address has no scheme. Local hosts
    /// always default to plain HTTP.
    #[arg(long)]
    pub insecure: bool,

    /// Don't verify the registry's TLS certificate
    #[arg(long)]
    pub tls_skip_verify: bool,

    /// Platform shown for multi-platform images, as os/arch[/variant]
    /// [default: linux/amd64]
    #[arg(long)]
    pub platform: Option<Platform>,
}

/// Errors reading the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("reading config from {path}")]
    Io {
        /// Path to the config file
        path: Utf8PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for [Config]
    #[error("parsing config from {path}")]
    Parse {
        /// Path to the config file
        path: Utf8PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml_edit::de::Error,
    },
}

/// Resolved browser settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Address to listen on
    pub bind: IpAddr,

    /// Registry address
    pub url: String,

    /// Registry username
    pub user: Option<String>,

    /// Registry password
    pub pass: Option<Secret>,

    /// Use plain HTTP when `url` has no scheme
    pub insecure: bool,

    /// Don't verify the registry's TLS certificate
    pub tls_skip_verify: bool,

    /// Platform shown for multi-platform images
    #[serde(deserialize_with = "platform_from_str")]
    pub platform: Platform,

    /// Page title
    pub title: Option<String>,

    /// Timeout for each registry request, in seconds
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            url: DEFAULT_URL.to_owned(),
            user: None,
            pass: None,
            insecure: false,
            tls_skip_verify: false,
            platform: Platform::default(),
            title: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn platform_from_str<'de, D>(deserializer: D) -> Result<Platform, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
}

impl Config {
    /// Load the config file named in `args`, if any, and apply the command line over it.
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        Ok(config.apply(args))
    }

    /// Read a TOML config file
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        Config::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Parse a TOML config document
    pub fn from_toml(contents: &str) -> Result<Self, toml_edit::de::Error> {
        toml_edit::de::from_str(contents)
    }

    /// Override settings with those given on the command line
    pub fn apply(mut self, args: Args) -> Self {
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(bind) = args.bind {
            self.bind = bind;
        }
        if let Some(url) = args.url {
            self.url = url;
        }
        if let Some(user) = args.user {
            self.user = Some(user);
        }
        if let Some(pass) = args.pass {
            self.pass = Some(pass.into());
        }
        if let Some(platform) = args.platform {
            self.platform = platform;
        }

        // Flags can only switch these on.
        self.insecure |= args.insecure;
        self.tls_skip_verify |= args.tls_skip_verify;
        self
    }

    /// Address the server listens on
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// The registry to browse
    pub fn registry(&self) -> RegistryResult<Registry> {
        Registry::parse(&self.url, self.insecure)
    }

    /// Credentials for the registry
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.user.clone(), self.pass.clone())
    }

    /// Transport settings for the registry client
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls_verify: !self.tls_skip_verify,
            timeout: Duration::from_secs(self.timeout),
            platform: self.platform.clone(),
            ..Default::default()
        }
    }

    /// Build the registry client these settings describe
    pub fn client(&self) -> RegistryResult<RegistryClient> {
        RegistryClient::new(self.registry()?, self.credentials(), self.transport())
    }
}
