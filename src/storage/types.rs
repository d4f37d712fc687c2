use chrono::NaiveDateTime;
use std::process::ExitStatus;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Saved-item store failures. All of them end the session.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No saved items to pick from
    #[error("No saved items found. Sync your reading list with memory_jogger first.")]
    Empty,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row's `time_added` column is not a recognizable timestamp
    #[error("Saved item {id} has an invalid time_added value: {value:?}")]
    InvalidTimestamp { id: i64, value: String },

    /// The memory_jogger binary could not be started
    #[error("Failed to run `{bin}`: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    /// memory_jogger ran but reported failure
    #[error("`memory_jogger saved-items {action}` failed for item {item_id}: {status}")]
    CommandFailed {
        action: &'static str,
        item_id: i64,
        status: ExitStatus,
    },
}

// ============================================================================
// Helper Types
// ============================================================================

/// Raw `saved_items` row. Converted to [`SavedItem`] via `into_item()`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SavedItemRow {
    pub id: i64,
    pub title: String,
    pub excerpt: Option<String>,
    pub url: String,
    pub time_added: String,
}

/// Timestamp layouts written by memory_jogger's SQLite backend.
const TIME_ADDED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

pub(crate) fn parse_time_added(value: &str) -> Option<NaiveDateTime> {
    TIME_ADDED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
}

impl SavedItemRow {
    pub(crate) fn into_item(self) -> Result<SavedItem, StoreError> {
        let time_added =
            parse_time_added(&self.time_added).ok_or_else(|| StoreError::InvalidTimestamp {
                id: self.id,
                value: self.time_added.clone(),
            })?;
        Ok(SavedItem {
            id: self.id,
            title: self.title,
            excerpt: self.excerpt.filter(|excerpt| !excerpt.trim().is_empty()),
            url: self.url,
            time_added,
        })
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// An article saved in the reading list.
///
/// The id is owned by the store and only ever handed back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedItem {
    pub id: i64,
    pub title: String,
    pub excerpt: Option<String>,
    pub url: String,
    pub time_added: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(time_added: &str, excerpt: Option<&str>) -> SavedItemRow {
        SavedItemRow {
            id: 7,
            title: "Title".to_string(),
            excerpt: excerpt.map(str::to_string),
            url: "http://example.com/".to_string(),
            time_added: time_added.to_string(),
        }
    }

    #[test]
    fn test_parse_time_added_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        assert_eq!(parse_time_added("2021-03-04 05:06:07"), Some(expected));
        assert_eq!(parse_time_added("2021-03-04T05:06:07"), Some(expected));
        assert_eq!(parse_time_added("2021-03-04 05:06:07.000"), Some(expected));
        assert_eq!(parse_time_added("yesterday"), None);
    }

    #[test]
    fn test_into_item_rejects_bad_timestamp() {
        let err = row("not a time", None).into_item().unwrap_err();
        assert!(matches!(err, StoreError::InvalidTimestamp { id: 7, .. }));
    }

    #[test]
    fn test_into_item_drops_blank_excerpt() {
        let item = row("2021-03-04 05:06:07", Some("  ")).into_item().unwrap();
        assert_eq!(item.excerpt, None);

        let item = row("2021-03-04 05:06:07", Some("Summary")).into_item().unwrap();
        assert_eq!(item.excerpt.as_deref(), Some("Summary"));
    }
}
