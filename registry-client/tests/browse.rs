//! Walking a registry through the public client API

use http::{HeaderMap, HeaderValue, StatusCode, header};
use indoc::indoc;
use registry_client::mock::MockService;
use registry_client::{
    Credentials, Platform, Registry, RegistryClient, RegistryError, TransportConfig,
};

const ARM64_DIGEST: &str =
    "sha256:2222222222222222222222222222222222222222222222222222222222222222";

const MANIFEST_LIST: &str = indoc! {r#"
    {
      "schemaVersion": 2,
      "mediaType": "application/vnd.docker.distribution.manifest.list.v2+json",
      "manifests": [
        {
          "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
          "digest": "sha256:1111111111111111111111111111111111111111111111111111111111111111",
          "size": 528,
          "platform": { "architecture": "amd64", "os": "linux" }
        },
        {
          "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
          "digest": "sha256:2222222222222222222222222222222222222222222222222222222222222222",
          "size": 528,
          "platform": { "architecture": "arm64", "os": "linux", "variant": "v8" }
        }
      ]
    }
"#};

const ARM64_MANIFEST: &str = indoc! {r#"
    {
      "schemaVersion": 2,
      "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
      "config": {
        "mediaType": "application/vnd.docker.container.image.v1+json",
        "digest": "sha256:3333333333333333333333333333333333333333333333333333333333333333",
        "size": 1469
      },
      "layers": [
        {
          "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
          "digest": "sha256:4444444444444444444444444444444444444444444444444444444444444444",
          "size": 3348624
        }
      ]
    }
"#};

fn content_type(media_type: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(media_type));
    headers
}

fn mock_registry() -> MockService {
    let mock = MockService::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LINK,
        HeaderValue::from_static(r#"</v2/_catalog?n=2&last=library%2Fbusybox>; rel="next""#),
    );
    mock.add(
        "/v2/_catalog?n=2",
        StatusCode::OK,
        headers,
        r#"{"repositories": ["library/alpine", "library/busybox"]}"#,
    );
    mock.json(
        "/v2/_catalog?n=2&last=library%2Fbusybox",
        r#"{"repositories": ["tools/jq"]}"#,
    );

    mock.json(
        "/v2/library/alpine/tags/list?n=2",
        r#"{"name": "library/alpine", "tags": ["3.19", "latest"]}"#,
    );
    mock.add(
        "/v2/library/alpine/manifests/3.19",
        StatusCode::OK,
        content_type("application/vnd.docker.distribution.manifest.list.v2+json"),
        MANIFEST_LIST,
    );
    let mut headers = content_type("application/vnd.docker.distribution.manifest.v2+json");
    headers.insert("docker-content-digest", HeaderValue::from_static(ARM64_DIGEST));
    mock.add(
        &format!("/v2/library/alpine/manifests/{ARM64_DIGEST}"),
        StatusCode::OK,
        headers,
        ARM64_MANIFEST,
    );
    mock
}

fn client(mock: &MockService, platform: Platform) -> RegistryClient {
    let config = TransportConfig {
        page_size: 2,
        platform,
        ..Default::default()
    };

    RegistryClient::with_service(
        Registry::parse("http://registry.test", false).unwrap(),
        Credentials::new(Some("reader".into()), Some("s3cret".into())),
        config,
        mock.clone(),
    )
}

#[tokio::test]
async fn browse_registry() {
    let mock = mock_registry();
    let client = client(&mock, "linux/arm64/v8".parse().unwrap());

    let repositories = client.catalog().await.unwrap();
    assert_eq!(
        repositories,
        ["library/alpine", "library/busybox", "tools/jq"]
    );

    let tags = client.tags("library/alpine").await.unwrap();
    assert_eq!(tags, ["3.19", "latest"]);

    let detail = client.image("library/alpine", "3.19").await.unwrap();
    assert_eq!(detail.name, "3.19");
    assert_eq!(detail.digest, ARM64_DIGEST);
    assert_eq!(detail.size, 3_348_624);

    let requests = mock.requests();
    assert_eq!(requests.len(), 5);
    assert!(requests.iter().all(|request| {
        request.uri.host() == Some("registry.test")
            && request.headers.get(header::AUTHORIZATION).is_some()
    }));
}

#[tokio::test]
async fn platform_missing_from_index() {
    let mock = mock_registry();
    let client = client(&mock, "windows/amd64".parse().unwrap());

    let error = client.image("library/alpine", "3.19").await.unwrap_err();
    assert!(matches!(error, RegistryError::NoMatchingPlatform { .. }));
    assert!(error.to_string().contains("windows/amd64"));
}
