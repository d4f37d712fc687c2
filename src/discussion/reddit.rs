//! Reddit submission lookup over the public JSON listing endpoints.
//!
//! <https://www.reddit.com/dev/api>
use serde::Deserialize;
use url::Url;

use crate::net::{HttpClient, LookupError};

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

/// A listing child. Links are `t3`; comments (`t1`) and others carry no url.
#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: ThingData,
}

#[derive(Debug, Deserialize)]
struct ThingData {
    #[serde(default)]
    url: Option<String>,
}

impl Listing {
    /// Url of the first link in the listing.
    fn link_url(self) -> Option<String> {
        self.data
            .children
            .into_iter()
            .find(|thing| thing.kind == "t3")
            .and_then(|thing| thing.data.url)
    }
}

/// Submission id from a Reddit URL path.
///
/// Handles `/r/<sub>/comments/<id>/<slug>/`, `/comments/<id>` and
/// `redd.it/<id>` short links.
pub fn submission_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    if url.host_str() == Some("redd.it") {
        return segments.next().map(str::to_string);
    }
    segments
        .skip_while(|segment| *segment != "comments")
        .nth(1)
        .map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct RedditClient {
    http: HttpClient,
    api_url: Url,
}

impl RedditClient {
    pub fn new(http: HttpClient, api_url: Url) -> Self {
        Self { http, api_url }
    }

    /// The article URL a submission links to.
    ///
    /// Looks the submission up by id when the path carries one, otherwise by
    /// the submission URL itself.
    pub async fn submission_url(&self, url: &Url) -> Result<Option<String>, LookupError> {
        match submission_id(url) {
            Some(id) => self.submission_url_by_id(&id).await,
            None => self.submission_url_by_url(url).await,
        }
    }

    async fn submission_url_by_id(&self, id: &str) -> Result<Option<String>, LookupError> {
        let api_url = Url::parse(&format!("{}/by_id/t3_{id}.json", self.base()))?;
        let listing: Listing = self.http.get_json(api_url).await?;
        Ok(listing.link_url())
    }

    async fn submission_url_by_url(&self, url: &Url) -> Result<Option<String>, LookupError> {
        let api_url = Url::parse(&format!(
            "{}{}/.json",
            self.base(),
            url.path().trim_end_matches('/')
        ))?;
        // A submission page is two listings: the post, then its comments
        let listings: Vec<Listing> = self.http.get_json(api_url).await?;
        Ok(listings.into_iter().next().and_then(Listing::link_url))
    }

    fn base(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }
}
