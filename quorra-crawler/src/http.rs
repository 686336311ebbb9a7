use crate::error::{ExpandError, Result};
use crate::expander::{Expander, Expansion, NodeId};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Expands a node by fetching its url over HTTP and reading `a[href]`
/// links out of the body.
///
/// Edges stay within the fetched page's domain (subdomains included)
/// unless `follow_external` is set. Non-success statuses come back as
/// [`ExpandError::BadStatus`] so they land in the failure sink instead of
/// producing an empty page.
pub struct HttpExpander {
    client: Client,
    follow_external: bool,
}

impl HttpExpander {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent(concat!("quorra/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            follow_external: false,
        }
    }

    pub fn with_follow_external(mut self, follow_external: bool) -> Self {
        self.follow_external = follow_external;
        self
    }
}

impl Default for HttpExpander {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Expander for HttpExpander {
    async fn expand(&self, id: &NodeId) -> Result<Expansion> {
        let page_url =
            Url::parse(id).map_err(|e| ExpandError::InvalidId(format!("{id}: {e}")))?;

        debug!(url = %page_url, "fetching");
        let response = self.client.get(page_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExpandError::BadStatus {
                id: id.clone(),
                status: status.as_u16(),
            });
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|content_type| content_type.contains("text/html"))
            .unwrap_or(false);

        let body = response.text().await?;

        let edges = if is_html {
            extract_links(&body, &page_url, self.follow_external)
        } else {
            Vec::new()
        };

        Ok(Expansion {
            content: body,
            edges,
        })
    }
}

/// Pulls `a[href]` targets out of a page, resolved to absolute urls.
fn extract_links(html: &str, page_url: &Url, follow_external: bool) -> Vec<NodeId> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_edge(page_url, href) else {
            continue;
        };
        if follow_external || in_scope(&resolved, page_url) {
            links.push(resolved.to_string());
        }
    }
    links
}

/// Resolves a raw href against the page url. Fragment-only, javascript:,
/// mailto: and tel: hrefs are not crawlable edges.
fn resolve_edge(base: &Url, href: &str) -> Option<Url> {
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);

    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Same host as the page, or a subdomain of it.
fn in_scope(candidate: &Url, page_url: &Url) -> bool {
    let (Some(host), Some(base)) = (candidate.host_str(), page_url.host_str()) else {
        return false;
    };
    host == base || host.ends_with(&format!(".{base}"))
}
