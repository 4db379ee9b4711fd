//! Documents returned by the Distribution API

use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::error::{RegistryError, RegistryResult};
use crate::platform::Platform;

/// OCI image manifest
pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
/// OCI image index
pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
/// Docker image manifest, schema 2
pub const DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";
/// Docker manifest list
pub const DOCKER_MANIFEST_LIST: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";

/// `Accept` header sent when fetching manifests.
pub(crate) const MANIFEST_ACCEPT: &str = "application/vnd.oci.image.manifest.v1+json, \
    application/vnd.oci.image.index.v1+json, \
    application/vnd.docker.distribution.manifest.v2+json, \
    application/vnd.docker.distribution.manifest.list.v2+json";

/// Response to `GET /v2/_catalog`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Catalog {
    #[serde(default)]
    pub(crate) repositories: Option<Vec<String>>,
}

/// Response to `GET /v2/<name>/tags/list`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TagList {
    #[serde(default)]
    pub(crate) tags: Option<Vec<String>>,
}

/// A reference to content by digest, with its size
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Media type of the referenced content
    #[serde(default)]
    pub media_type: Option<String>,

    /// Digest of the referenced content
    pub digest: String,

    /// Size of the referenced content in bytes
    pub size: i64,

    /// Platform of an image referenced from an index
    #[serde(default)]
    pub platform: Option<Platform>,
}

impl Descriptor {
    /// What the descriptor points at, judged by its media type
    pub(crate) fn kind(&self) -> Option<ManifestKind> {
        self.media_type
            .as_deref()
            .and_then(ManifestKind::from_media_type)
    }
}

/// A single-platform image manifest
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Image configuration blob
    pub config: Descriptor,

    /// Filesystem layers
    #[serde(default)]
    pub layers: Vec<Descriptor>,
}

impl Manifest {
    /// Total size of all layers, in bytes
    pub fn layer_size(&self) -> i64 {
        self.layers
            .iter()
            .fold(0i64, |total, layer| total.saturating_add(layer.size))
    }
}

/// A multi-platform image index
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIndex {
    /// Per-platform manifests
    #[serde(default)]
    pub manifests: Vec<Descriptor>,
}

impl ImageIndex {
    /// The first manifest built for `platform`
    pub fn find(&self, platform: &Platform) -> Option<&Descriptor> {
        self.manifests.iter().find(|descriptor| {
            descriptor
                .platform
                .as_ref()
                .is_some_and(|candidate| platform.matches(candidate))
        })
    }
}

/// The summary of one tagged image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDetail {
    /// Tag name
    pub name: String,

    /// Digest of the image manifest, `algorithm:hex`
    pub digest: String,

    /// Sum of layer sizes in bytes
    pub size: i64,
}

/// What kind of document a manifest response holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ManifestKind {
    Image,
    Index,
}

impl ManifestKind {
    /// Classify a manifest response from its `Content-Type` and body.
    ///
    /// Registries which answer with a generic JSON content type are classified
    /// by the `mediaType` field, then by the document's shape.
    pub(crate) fn classify(content_type: Option<&str>, body: &[u8]) -> RegistryResult<Self> {
        let content_type = content_type
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "application/json");

        if let Some(kind) = content_type.and_then(Self::from_media_type) {
            return Ok(kind);
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Probe {
            #[serde(default)]
            media_type: Option<String>,
            #[serde(default)]
            manifests: Option<IgnoredAny>,
            #[serde(default)]
            layers: Option<IgnoredAny>,
        }

        let probe: Probe =
            serde_json::from_slice(body).map_err(RegistryError::decode("manifest"))?;

        if let Some(media_type) = probe.media_type.as_deref() {
            return Self::from_media_type(media_type)
                .ok_or_else(|| RegistryError::UnsupportedMediaType(media_type.to_owned()));
        }

        if let Some(content_type) = content_type {
            return Err(RegistryError::UnsupportedMediaType(content_type.to_owned()));
        }

        match (probe.manifests, probe.layers) {
            (Some(_), _) => Ok(ManifestKind::Index),
            (None, Some(_)) => Ok(ManifestKind::Image),
            (None, None) => Err(RegistryError::UnsupportedMediaType(
                "manifest without a media type".to_owned(),
            )),
        }
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            OCI_MANIFEST | DOCKER_MANIFEST => Some(ManifestKind::Image),
            OCI_INDEX | DOCKER_MANIFEST_LIST => Some(ManifestKind::Index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = indoc::indoc! {r#"
        {
            "schemaVersion": 2,
            "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
            "config": {
                "mediaType": "application/vnd.docker.container.image.v1+json",
                "size": 1469,
                "digest": "sha256:c1aabb73d2339c5ebaa3681de2e9d9c18d57485045a4e311d9f8004bec208d67"
            },
            "layers": [
                {
                    "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
                    "size": 1000000,
                    "digest": "sha256:aaaa"
                },
                {
                    "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
                    "size": 234567,
                    "digest": "sha256:bbbb"
                }
            ]
        }
    "#};

    const INDEX: &str = indoc::indoc! {r#"
        {
            "schemaVersion": 2,
            "manifests": [
                {
                    "mediaType": "application/vnd.oci.image.manifest.v1+json",
                    "size": 528,
                    "digest": "sha256:arm",
                    "platform": { "architecture": "arm64", "os": "linux", "variant": "v8" }
                },
                {
                    "mediaType": "application/vnd.oci.image.manifest.v1+json",
                    "size": 528,
                    "digest": "sha256:amd",
                    "platform": { "architecture": "amd64", "os": "linux" }
                }
            ]
        }
    "#};

    #[test]
    fn sums_layer_sizes() {
        let manifest: Manifest = serde_json::from_str(IMAGE).unwrap();
        assert_eq!(manifest.layer_size(), 1_234_567);
        assert_eq!(manifest.config.size, 1469);
    }

    #[test]
    fn descriptor_kind_from_media_type() {
        let index: ImageIndex = serde_json::from_str(INDEX).unwrap();
        assert_eq!(index.manifests[0].kind(), Some(ManifestKind::Image));

        let manifest: Manifest = serde_json::from_str(IMAGE).unwrap();
        assert_eq!(manifest.config.kind(), None);
    }

    #[test]
    fn layer_size_saturates() {
        let mut manifest: Manifest = serde_json::from_str(IMAGE).unwrap();
        manifest.layers[0].size = i64::MAX;
        assert_eq!(manifest.layer_size(), i64::MAX);
    }

    #[test]
    fn index_finds_platform() {
        let index: ImageIndex = serde_json::from_str(INDEX).unwrap();

        let amd64 = index.find(&Platform::default()).unwrap();
        assert_eq!(amd64.digest, "sha256:amd");

        let arm64 = index.find(&"linux/arm64".parse().unwrap()).unwrap();
        assert_eq!(arm64.digest, "sha256:arm");

        assert!(index.find(&"windows/amd64".parse().unwrap()).is_none());
    }

    #[test]
    fn classify_by_content_type() {
        let kind = ManifestKind::classify(Some(OCI_INDEX), b"{}").unwrap();
        assert_eq!(kind, ManifestKind::Index);

        let kind = ManifestKind::classify(
            Some("application/vnd.oci.image.manifest.v1+json; charset=utf-8"),
            b"{}",
        )
        .unwrap();
        assert_eq!(kind, ManifestKind::Image);
    }

    #[test]
    fn classify_generic_json_by_body() {
        let kind = ManifestKind::classify(Some("application/json"), IMAGE.as_bytes()).unwrap();
        assert_eq!(kind, ManifestKind::Image);

        let kind = ManifestKind::classify(None, INDEX.as_bytes()).unwrap();
        assert_eq!(kind, ManifestKind::Index);
    }

    #[test]
    fn classify_rejects_schema1() {
        let body = br#"{"schemaVersion": 1, "name": "alpine", "fsLayers": []}"#;
        let error = ManifestKind::classify(
            Some("application/vnd.docker.distribution.manifest.v1+prettyjws"),
            body,
        )
        .unwrap_err();
        assert!(matches!(error, RegistryError::UnsupportedMediaType(_)));

        let error = ManifestKind::classify(None, body).unwrap_err();
        assert!(matches!(error, RegistryError::UnsupportedMediaType(_)));
    }
}
