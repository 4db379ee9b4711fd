//! Image platforms, as found in image indexes.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// The operating system and CPU architecture an image was built for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Platform {
    /// Operating system, e.g. `linux`
    pub os: String,

    /// CPU architecture, e.g. `amd64`
    pub architecture: String,

    /// CPU variant, e.g. `v8`
    #[serde(default)]
    pub variant: Option<String>,
}

impl Platform {
    /// Create a platform without a variant.
    pub fn new(os: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            architecture: architecture.into(),
            variant: None,
        }
    }

    /// Does `candidate` satisfy this platform?
    ///
    /// The variant is only compared when this platform names one.
    pub fn matches(&self, candidate: &Platform) -> bool {
        self.os == candidate.os
            && self.architecture == candidate.architecture
            && (self.variant.is_none() || self.variant == candidate.variant)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::new("linux", "amd64")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)?;
        if let Some(variant) = &self.variant {
            write!(f, "/{variant}")?;
        }
        Ok(())
    }
}

/// A platform string was not of the form `os/arch[/variant]`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid platform {0:?}, expected os/arch[/variant]")]
pub struct ParsePlatformError(String);

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let (Some(os), Some(architecture)) = (parts.next(), parts.next()) else {
            return Err(ParsePlatformError(s.to_owned()));
        };
        let variant = parts.next();

        if os.is_empty()
            || architecture.is_empty()
            || variant.is_some_and(str::is_empty)
            || parts.next().is_some()
        {
            return Err(ParsePlatformError(s.to_owned()));
        }

        Ok(Platform {
            os: os.to_owned(),
            architecture: architecture.to_owned(),
            variant: variant.map(str::to_owned),
        })
    }
}
