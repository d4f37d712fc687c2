//! Hacker News item and search APIs.
//!
//! - Item API: <https://github.com/HackerNews/API>
//! - Search API: <https://hn.algolia.com/api>
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::fmt;
use url::Url;

use crate::net::{HttpClient, LookupError};

/// Base URL of a discussion page; the item id goes in the `id` parameter.
pub const DISCUSSION_BASE_URL: &str = "https://news.ycombinator.com/item";

// ============================================================================
// Data Structures
// ============================================================================

/// A Hacker News story discussing some URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionThread {
    pub id: String,
    pub points: u64,
    pub created_at: DateTime<Utc>,
}

impl DiscussionThread {
    pub fn discussion_url(&self) -> String {
        // ids come from the API as plain integers, no encoding needed
        format!("{DISCUSSION_BASE_URL}?id={}", self.id)
    }
}

impl fmt::Display for DiscussionThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.discussion_url(),
            format_points(self.points),
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// `1 point`, otherwise `N points`.
pub fn format_points(points: u64) -> String {
    let suffix = if points == 1 { "" } else { "s" };
    format!("{points} point{suffix}")
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemResponse {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    #[serde(rename = "objectID")]
    id: String,
    points: Option<u64>,
    created_at_i: i64,
}

impl SearchHit {
    fn into_thread(self) -> Option<DiscussionThread> {
        let Some(created_at) = DateTime::from_timestamp(self.created_at_i, 0) else {
            tracing::warn!(
                id = %self.id,
                created_at_i = self.created_at_i,
                "Skipping hit with out-of-range timestamp"
            );
            return None;
        };
        Some(DiscussionThread {
            id: self.id,
            points: self.points.unwrap_or(0),
            created_at,
        })
    }
}

/// Drop `exclude_id` and order by points, highest first.
///
/// The sort is stable so equal scores keep the API's order.
pub(crate) fn rank(response: SearchResponse, exclude_id: Option<&str>) -> Vec<DiscussionThread> {
    let mut threads: Vec<DiscussionThread> = response
        .hits
        .into_iter()
        .filter(|hit| Some(hit.id.as_str()) != exclude_id)
        .filter_map(SearchHit::into_thread)
        .collect();
    threads.sort_by(|a, b| b.points.cmp(&a.points));
    threads
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct HnClient {
    http: HttpClient,
    item_api: Url,
    search_api: Url,
}

impl HnClient {
    pub fn new(http: HttpClient, item_api: Url, search_api: Url) -> Self {
        Self {
            http,
            item_api,
            search_api,
        }
    }

    /// The external article URL of an item, if it links to one.
    ///
    /// Ask HN posts and comments have no `url`.
    pub async fn item_url(&self, id: &str) -> Result<Option<String>, LookupError> {
        let api_url = Url::parse(&format!(
            "{}/{id}.json",
            self.item_api.as_str().trim_end_matches('/')
        ))?;
        // The item API answers `null` for unknown ids
        let item: Option<ItemResponse> = self.http.get_json(api_url).await?;
        Ok(item.and_then(|item| item.url))
    }

    /// Stories with at least one comment whose URL matches `url`.
    pub async fn search(
        &self,
        url: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<DiscussionThread>, LookupError> {
        let api_url = Url::parse_with_params(
            self.search_api.as_str(),
            &[
                ("query", url),
                ("numericFilters", "num_comments>0"),
                ("restrictSearchableAttributes", "url"),
            ],
        )?;
        let response: SearchResponse = self.http.get_json(api_url).await?;
        let threads = rank(response, exclude_id);
        tracing::debug!(url = %url, count = threads.len(), "HN search complete");
        Ok(threads)
    }
}

// ============================================================================
// Tests
// ============================================================================
