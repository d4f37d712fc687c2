//! Discussion discovery for a saved article.
//!
//! Resolution is chosen by the URL's host:
//!
//! - **Hacker News** item pages resolve to the story's article, then search
//!   for other threads about that article (excluding the story itself)
//! - **HackerWeb** mirror pages behave like Hacker News item pages
//! - **Reddit** submissions resolve to the linked article, then search
//! - **Anything else** is searched directly
//!
//! Every strategy funnels into [`HnClient::search`].

mod hn;
mod reddit;

pub use hn::{DiscussionThread, HnClient};
pub use reddit::RedditClient;

use thiserror::Error;
use url::Url;

use crate::net::LookupError;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// A discussion page URL without exactly one item id.
    #[error("expected exactly one item id in discussion URL: {0}")]
    MissingItemId(String),
}

impl ResolveError {
    /// Network-level failures are worth a warning; malformed URLs are not recoverable.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveError::Lookup(_))
    }
}

/// Outcome of resolving one URL.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The article a discussion or submission page points to, when the
    /// input was such a page.
    pub canonical_url: Option<String>,
    /// Threads about the article, highest score first.
    pub threads: Vec<DiscussionThread>,
}

/// Where a URL lives, which decides how it is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    HackerNews,
    HackerWeb,
    Reddit,
    Web,
}

impl Source {
    pub fn for_url(url: &Url) -> Self {
        match url.host_str() {
            Some("news.ycombinator.com") => Self::HackerNews,
            Some("hackerweb.app" | "cheeaun.github.io") => Self::HackerWeb,
            Some("www.reddit.com" | "reddit.com" | "old.reddit.com" | "redd.it") => Self::Reddit,
            _ => Self::Web,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscussionResolver {
    hn: HnClient,
    reddit: RedditClient,
}

impl DiscussionResolver {
    pub fn new(hn: HnClient, reddit: RedditClient) -> Self {
        Self { hn, reddit }
    }

    /// Find discussions of `url`, following discussion pages to their article.
    pub async fn resolve(&self, url: &str) -> Result<Resolution, ResolveError> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Unparseable URL, searching as-is");
                return self.search(url, None, None).await;
            }
        };

        let source = Source::for_url(&parsed);
        tracing::debug!(url = %url, ?source, "Resolving discussions");
        match source {
            Source::HackerNews => {
                let id = hn_item_id(&parsed)?;
                self.resolve_hn_item(&id).await
            }
            Source::HackerWeb => {
                let id = hackerweb_item_id(&parsed)?;
                self.resolve_hn_item(&id).await
            }
            Source::Reddit => match self.reddit.submission_url(&parsed).await? {
                Some(article) => self.search(&article, Some(article.clone()), None).await,
                None => {
                    tracing::debug!(url = %url, "Reddit listing has no link submission");
                    Ok(Resolution::default())
                }
            },
            Source::Web => self.search(url, None, None).await,
        }
    }

    async fn resolve_hn_item(&self, id: &str) -> Result<Resolution, ResolveError> {
        match self.hn.item_url(id).await? {
            Some(article) => self.search(&article, Some(article.clone()), Some(id)).await,
            None => {
                tracing::debug!(id = %id, "HN item has no external URL, skipping search");
                Ok(Resolution::default())
            }
        }
    }

    async fn search(
        &self,
        url: &str,
        canonical_url: Option<String>,
        exclude_id: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let threads = self.hn.search(url, exclude_id).await?;
        Ok(Resolution {
            canonical_url,
            threads,
        })
    }
}

/// The single numeric `id` query parameter of an HN item page.
fn hn_item_id(url: &Url) -> Result<String, ResolveError> {
    let mut ids = url
        .query_pairs()
        .filter(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned());
    match (ids.next(), ids.next()) {
        (Some(id), None) if is_item_id(&id) => Ok(id),
        _ => Err(ResolveError::MissingItemId(url.to_string())),
    }
}

/// The trailing id of a HackerWeb page, e.g. `https://hackerweb.app/#/item/10179571`.
fn hackerweb_item_id(url: &Url) -> Result<String, ResolveError> {
    url.as_str()
        .rsplit_once('/')
        .map(|(_, id)| id)
        .filter(|id| is_item_id(id))
        .map(str::to_string)
        .ok_or_else(|| ResolveError::MissingItemId(url.to_string()))
}

/// Item ids are spliced into the item API path, so only digits pass.
fn is_item_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}
