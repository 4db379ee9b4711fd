//! Link header pagination.
//!
//! Registries paginate the catalog and tag lists with a `Link` header:
//! `Link: </v2/_catalog?last=repo99&n=100>; rel="next"`

use http::{HeaderMap, Uri};
use url::Url;

use crate::error::{RegistryError, RegistryResult};

/// The target of the `rel="next"` link, if the response has one.
pub(crate) fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(http::header::LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let (target, params) = link.trim().split_once(';')?;
            let is_next = params.split(';').any(|param| {
                matches!(
                    param.trim().replace(' ', "").as_str(),
                    "rel=\"next\"" | "rel=next" | "rel='next'"
                )
            });

            is_next.then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_owned()
            })
        })
}

/// Resolve a link target against the URI of the request which returned it.
pub(crate) fn resolve(base: &Uri, link: &str) -> RegistryResult<Uri> {
    let invalid = |reason: String| RegistryError::InvalidLink {
        link: link.to_owned(),
        reason,
    };

    let base = Url::parse(&base.to_string()).map_err(|err| invalid(err.to_string()))?;
    let joined = base.join(link).map_err(|err| invalid(err.to_string()))?;

    if joined.origin() != base.origin() {
        return Err(invalid("link points at another host".to_owned()));
    }

    joined
        .as_str()
        .parse()
        .map_err(|err: http::uri::InvalidUri| invalid(err.to_string()))
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn headers(link: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::LINK, HeaderValue::from_static(link));
        headers
    }

    #[test]
    fn finds_next_link() {
        let headers = headers(r#"</v2/_catalog?last=b&n=2>; rel="next""#);
        assert_eq!(
            next_link(&headers).as_deref(),
            Some("/v2/_catalog?last=b&n=2")
        );
    }

    #[test]
    fn ignores_other_relations() {
        let headers = headers(
            r#"</v2/_catalog?n=2>; rel="prev", </v2/_catalog?last=d&n=2>; rel=next"#,
        );
        assert_eq!(
            next_link(&headers).as_deref(),
            Some("/v2/_catalog?last=d&n=2")
        );

        let headers = self::headers(r#"</v2/_catalog?n=2>; rel="prev""#);
        assert_eq!(next_link(&headers), None);
        assert_eq!(next_link(&HeaderMap::new()), None);
    }

    #[test]
    fn resolves_relative_links() {
        let base: Uri = "http://localhost:5000/v2/_catalog?n=2".parse().unwrap();

        let next = resolve(&base, "/v2/_catalog?last=b&n=2").unwrap();
        assert_eq!(next.to_string(), "http://localhost:5000/v2/_catalog?last=b&n=2");

        let next = resolve(&base, "http://localhost:5000/v2/_catalog?last=c&n=2").unwrap();
        assert_eq!(next.to_string(), "http://localhost:5000/v2/_catalog?last=c&n=2");
    }

    #[test]
    fn refuses_foreign_hosts() {
        let base: Uri = "http://localhost:5000/v2/_catalog?n=2".parse().unwrap();
        assert!(resolve(&base, "https://elsewhere.example/v2/_catalog").is_err());
    }
}
