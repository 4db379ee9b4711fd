//! Registry addresses.

use std::fmt;
use std::net::IpAddr;

use http::Uri;
use http::uri::{Authority, Scheme};

use crate::error::{RegistryError, RegistryResult};

/// The address of a container registry: a scheme and a `host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    scheme: Scheme,
    authority: Authority,
}

impl Registry {
    /// Parse a registry address.
    ///
    /// Accepts `host[:port]` or `http(s)://host[:port]`. Addresses without a
    /// scheme use plain HTTP when `insecure` is set or the host is local
    /// (`localhost`, a loopback address, or a private IPv4 address), and HTTPS
    /// otherwise.
    pub fn parse(address: &str, insecure: bool) -> RegistryResult<Self> {
        let address = address.trim();
        let invalid = |reason: &str| RegistryError::InvalidAddress {
            address: address.to_owned(),
            reason: reason.to_owned(),
        };

        if address.is_empty() {
            return Err(invalid("address is empty"));
        }

        let (scheme, rest) = if let Some(rest) = address.strip_prefix("https://") {
            (Some(Scheme::HTTPS), rest)
        } else if let Some(rest) = address.strip_prefix("http://") {
            (Some(Scheme::HTTP), rest)
        } else if address.contains("://") {
            return Err(invalid("only http and https are supported"));
        } else {
            (None, address)
        };

        let host = rest.strip_suffix('/').unwrap_or(rest);
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        if host.contains('/') {
            return Err(invalid("address must not include a path"));
        }
        if host.contains('@') {
            return Err(invalid("credentials must be passed separately"));
        }

        let authority: Authority = host.parse().map_err(|err: http::uri::InvalidUri| {
            RegistryError::InvalidAddress {
                address: address.to_owned(),
                reason: err.to_string(),
            }
        })?;

        let scheme = scheme.unwrap_or_else(|| {
            if insecure || is_local(&authority) {
                Scheme::HTTP
            } else {
                Scheme::HTTPS
            }
        });

        Ok(Registry { scheme, authority })
    }

    /// The URI scheme used to reach the registry.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// The `host[:port]` of the registry.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Build a URI on this registry from a path and optional query.
    pub(crate) fn uri(&self, path_and_query: &str) -> RegistryResult<Uri> {
        Ok(Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }
}

/// Hosts which are reached over plain HTTP unless a scheme is given.
fn is_local(authority: &Authority) -> bool {
    let host = authority.host();
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    let host = host.trim_start_matches('[').trim_end_matches(']');
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => ip.is_loopback() || ip.is_private(),
        Ok(IpAddr::V6(ip)) => ip.is_loopback(),
        Err(_) => false,
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.authority)
    }
}
