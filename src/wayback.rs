//! Wayback Machine availability lookup.
//!
//! <https://archive.org/help/wayback_api.php>
use chrono::NaiveDateTime;
use serde::Deserialize;
use url::Url;

use crate::net::{HttpClient, LookupError};

/// Wayback timestamps are `YYYYMMDDhhmmss`.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Deserialize)]
pub struct AvailabilityResponse {
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<Closest>,
}

#[derive(Debug, Deserialize)]
struct Closest {
    url: String,
}

/// Finds the archived snapshot closest to a point in time.
#[derive(Debug, Clone)]
pub struct SnapshotLookup {
    http: HttpClient,
    api_url: Url,
}

impl SnapshotLookup {
    pub fn new(http: HttpClient, api_url: Url) -> Self {
        Self { http, api_url }
    }

    /// Returns the closest snapshot URL, or `None` when nothing is archived.
    ///
    /// Without `at_time` the archive picks its most recent snapshot.
    pub async fn lookup(
        &self,
        url: &str,
        at_time: Option<NaiveDateTime>,
    ) -> Result<Option<String>, LookupError> {
        let mut params = vec![("url", url.to_string())];
        if let Some(time) = at_time {
            params.push(("timestamp", compact_timestamp(time)));
        }
        let api_url = Url::parse_with_params(self.api_url.as_str(), &params)?;
        let response: AvailabilityResponse = self.http.get_json(api_url).await?;
        let snapshot = parse_snapshot(response);
        tracing::debug!(url = %url, found = snapshot.is_some(), "Wayback lookup complete");
        Ok(snapshot)
    }
}

/// Render a timestamp as the archive's compact digit form.
pub fn compact_timestamp(time: NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Extract the closest snapshot URL from an availability response.
pub fn parse_snapshot(response: AvailabilityResponse) -> Option<String> {
    response.archived_snapshots.closest.map(|closest| closest.url)
}
