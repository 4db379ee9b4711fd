//! The index page: repositories, tags, and the selected image

use axum::extract::{Query, State};
use axum::response::Html;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use registry_client::ImageDetail;
use serde::{Deserialize, Serialize};

use crate::app::{AppState, INDEX_TEMPLATE};
use crate::bytesize::format_si;
use crate::error::BrowserResult;

/// Characters escaped in query string values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Selection made through the query string
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IndexQuery {
    repo: String,
    tag: String,
}

#[derive(Debug, Serialize)]
struct IndexPage<'a> {
    title: &'a str,
    registry: String,
    repositories: Vec<Link>,
    selected_repo: &'a str,
    selected_tag: &'a str,
    tags: Option<Vec<Link>>,
    tag_detail: Option<TagDetail>,
}

/// An entry in one of the listings
#[derive(Debug, Serialize)]
struct Link {
    name: String,
    href: String,
    selected: bool,
}

impl Link {
    fn repository(name: String, selected: &str) -> Self {
        Link {
            href: format!("?repo={}", utf8_percent_encode(&name, QUERY_VALUE)),
            selected: name == selected,
            name,
        }
    }

    fn tag(repository: &str, name: String, selected: &str) -> Self {
        Link {
            href: format!(
                "?repo={}&tag={}",
                utf8_percent_encode(repository, QUERY_VALUE),
                utf8_percent_encode(&name, QUERY_VALUE)
            ),
            selected: name == selected,
            name,
        }
    }
}

#[derive(Debug, Serialize)]
struct TagDetail {
    name: String,
    digest: String,
    size: String,
}

impl From<ImageDetail> for TagDetail {
    fn from(detail: ImageDetail) -> Self {
        TagDetail {
            name: detail.name,
            digest: detail.digest,
            size: format_si(detail.size),
        }
    }
}

/// Render the index page
#[tracing::instrument(skip(state))]
pub(crate) async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> BrowserResult<Html<String>> {
    let client = &state.client;

    let repositories = client
        .catalog()
        .await?
        .into_iter()
        .map(|name| Link::repository(name, &query.repo))
        .collect();

    let mut page = IndexPage {
        title: &state.title,
        registry: client.registry().to_string(),
        repositories,
        selected_repo: &query.repo,
        selected_tag: &query.tag,
        tags: None,
        tag_detail: None,
    };

    if !query.repo.is_empty() {
        let tags = client.tags(&query.repo).await?;
        page.tags = Some(
            tags.into_iter()
                .map(|name| Link::tag(&query.repo, name, &query.tag))
                .collect(),
        );

        if !query.tag.is_empty() {
            let detail = client.image(&query.repo, &query.tag).await?;
            page.tag_detail = Some(detail.into());
        }
    }

    let html = state.templates.render(INDEX_TEMPLATE, &page)?;
    Ok(Html(html))
}
