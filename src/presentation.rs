//! Views derived from session state
//!
//! Everything here is a pure function of its arguments. Nothing is cached:
//! renderers call these on every draw with the current time.

use crate::session::{Thread, Timestamp};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Absolute date layout used once a timestamp is a week old
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

const HOUR_MS: f64 = 3_600_000.0;

fn hours_between(ts: &Timestamp, now: DateTime<Utc>) -> Option<f64> {
    ts.as_datetime()
        .map(|then| (now - then).num_milliseconds() as f64 / HOUR_MS)
}

/// Human label for how long ago `ts` was
///
/// # Examples
///
/// ```
/// use chatshelf::presentation::relative_label;
/// use chatshelf::session::Timestamp;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// assert_eq!(relative_label(&Timestamp::at(now - Duration::minutes(5)), now), "just now");
/// assert_eq!(relative_label(&Timestamp::at(now - Duration::hours(5)), now), "5h ago");
/// assert_eq!(relative_label(&Timestamp::Invalid, now), "unknown");
/// ```
pub fn relative_label(ts: &Timestamp, now: DateTime<Utc>) -> String {
    relative_label_with_format(ts, now, DEFAULT_DATE_FORMAT)
}

/// Whether `layout` is a usable strftime layout
pub fn is_valid_date_format(layout: &str) -> bool {
    !layout.is_empty() && !StrftimeItems::new(layout).any(|item| matches!(item, Item::Error))
}

/// [`relative_label`] with a caller-chosen absolute date layout
///
/// An unusable layout falls back to [`DEFAULT_DATE_FORMAT`].
pub fn relative_label_with_format(ts: &Timestamp, now: DateTime<Utc>, date_format: &str) -> String {
    let (Some(then), Some(hours)) = (ts.as_datetime(), hours_between(ts, now)) else {
        return "unknown".to_string();
    };

    if hours < 1.0 {
        "just now".to_string()
    } else if hours < 24.0 {
        format!("{}h ago", hours.floor() as i64)
    } else if hours < 48.0 {
        "yesterday".to_string()
    } else if hours < 168.0 {
        format!("{}d ago", (hours / 24.0).floor() as i64)
    } else if is_valid_date_format(date_format) {
        then.format(date_format).to_string()
    } else {
        then.format(DEFAULT_DATE_FORMAT).to_string()
    }
}

/// Recency bucket for the thread list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyBucket {
    Today,
    Yesterday,
    ThisWeek,
    Older,
    Unknown,
}

impl RecencyBucket {
    /// Display order of the buckets
    pub const ORDER: [RecencyBucket; 5] = [
        RecencyBucket::Today,
        RecencyBucket::Yesterday,
        RecencyBucket::ThisWeek,
        RecencyBucket::Older,
        RecencyBucket::Unknown,
    ];

    /// Bucket for a thread last updated at `ts`
    pub fn classify(ts: &Timestamp, now: DateTime<Utc>) -> Self {
        match hours_between(ts, now) {
            None => Self::Unknown,
            Some(h) if h < 24.0 => Self::Today,
            Some(h) if h < 48.0 => Self::Yesterday,
            Some(h) if h < 168.0 => Self::ThisWeek,
            Some(_) => Self::Older,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::Older => "Older",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for RecencyBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Partition threads by how recently they were updated
///
/// Threads keep their relative order inside a bucket. Buckets come out in
/// [`RecencyBucket::ORDER`] and empty buckets are omitted.
pub fn group_by_recency(threads: &[Thread], now: DateTime<Utc>) -> Vec<(RecencyBucket, Vec<&Thread>)> {
    let mut groups: Vec<(RecencyBucket, Vec<&Thread>)> =
        RecencyBucket::ORDER.iter().map(|b| (*b, Vec::new())).collect();

    for thread in threads {
        let bucket = RecencyBucket::classify(&thread.updated_at, now);
        if let Some((_, members)) = groups.iter_mut().find(|(b, _)| *b == bucket) {
            members.push(thread);
        }
    }

    groups.retain(|(_, members)| !members.is_empty());
    groups
}

/// Title for a thread named after `text`
///
/// Text longer than `max_chars` characters is cut to `max_chars` and
/// `ellipsis` is appended; shorter text is returned unchanged.
///
/// # Examples
///
/// ```
/// use chatshelf::presentation::infer_title;
///
/// assert_eq!(infer_title("short", 40, "..."), "short");
/// assert_eq!(infer_title(&"x".repeat(50), 40, "...").len(), 43);
/// ```
pub fn infer_title(text: &str, max_chars: usize, ellipsis: &str) -> String {
    if text.chars().count() > max_chars {
        let mut title: String = text.chars().take(max_chars).collect();
        title.push_str(ellipsis);
        title
    } else {
        text.to_string()
    }
}

/// One row of the thread list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSummary {
    pub id: String,
    pub title: String,
    pub message_count: usize,
    pub bucket: RecencyBucket,
    pub updated: String,
    pub selected: bool,
}

/// Flatten grouped threads into list rows, in display order
pub fn summarize(
    threads: &[Thread],
    selected_id: Option<&str>,
    now: DateTime<Utc>,
    date_format: &str,
) -> Vec<ThreadSummary> {
    group_by_recency(threads, now)
        .into_iter()
        .flat_map(|(bucket, members)| {
            members.into_iter().map(move |thread| ThreadSummary {
                id: thread.id.clone(),
                title: thread.title.clone(),
                message_count: thread.messages.len(),
                bucket,
                updated: relative_label_with_format(&thread.updated_at, now, date_format),
                selected: selected_id == Some(thread.id.as_str()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(d: Duration) -> Timestamp {
        Timestamp::at(now() - d)
    }

    fn thread_updated(title: &str, updated_at: Timestamp) -> Thread {
        let mut thread = Thread::new(title);
        thread.updated_at = updated_at;
        thread
    }

    #[test]
    fn test_relative_label_thresholds() {
        let n = now();
        assert_eq!(relative_label(&ago(Duration::minutes(59)), n), "just now");
        assert_eq!(relative_label(&ago(Duration::hours(1)), n), "1h ago");
        assert_eq!(relative_label(&ago(Duration::minutes(23 * 60 + 59)), n), "23h ago");
        assert_eq!(relative_label(&ago(Duration::hours(24)), n), "yesterday");
        assert_eq!(relative_label(&ago(Duration::hours(47)), n), "yesterday");
        assert_eq!(relative_label(&ago(Duration::hours(48)), n), "2d ago");
        assert_eq!(relative_label(&ago(Duration::hours(167)), n), "6d ago");
        assert_eq!(relative_label(&ago(Duration::hours(168)), n), "6/8/2024");
    }

    #[test]
    fn test_relative_label_future_is_just_now() {
        assert_eq!(relative_label(&ago(Duration::hours(-3)), now()), "just now");
    }

    #[test]
    fn test_relative_label_invalid_is_unknown() {
        assert_eq!(relative_label(&Timestamp::Invalid, now()), "unknown");
    }

    #[test]
    fn test_relative_label_custom_format() {
        let ts = ago(Duration::days(30));
        assert_eq!(relative_label_with_format(&ts, now(), "%Y-%m-%d"), "2024-05-16");
    }

    #[test]
    fn test_relative_label_bad_format_falls_back_to_default() {
        let ts = ago(Duration::days(30));
        assert!(!is_valid_date_format("%Q"));
        assert_eq!(relative_label_with_format(&ts, now(), "%Q"), "5/16/2024");
        assert_eq!(relative_label_with_format(&ts, now(), ""), "5/16/2024");
    }

    #[test]
    fn test_group_by_recency_three_buckets() {
        let threads = vec![
            thread_updated("a", ago(Duration::hours(2))),
            thread_updated("b", ago(Duration::hours(30))),
            thread_updated("c", ago(Duration::hours(200))),
        ];
        let groups = group_by_recency(&threads, now());

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, RecencyBucket::Today);
        assert_eq!(groups[1].0, RecencyBucket::Yesterday);
        assert_eq!(groups[2].0, RecencyBucket::Older);
        assert!(groups.iter().all(|(_, members)| members.len() == 1));
        assert_eq!(groups[0].1[0].title, "a");
        assert_eq!(groups[1].1[0].title, "b");
        assert_eq!(groups[2].1[0].title, "c");
    }

    #[test]
    fn test_group_by_recency_preserves_order_and_puts_unknown_last() {
        let threads = vec![
            thread_updated("broken", Timestamp::Invalid),
            thread_updated("week-2", ago(Duration::hours(100))),
            thread_updated("today", ago(Duration::minutes(1))),
            thread_updated("week-1", ago(Duration::hours(50))),
        ];
        let groups = group_by_recency(&threads, now());
        let buckets: Vec<RecencyBucket> = groups.iter().map(|(b, _)| *b).collect();
        assert_eq!(
            buckets,
            vec![RecencyBucket::Today, RecencyBucket::ThisWeek, RecencyBucket::Unknown]
        );

        let week: Vec<&str> = groups[1].1.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(week, vec!["week-2", "week-1"]);
    }

    #[test]
    fn test_group_by_recency_empty_input() {
        assert!(group_by_recency(&[], now()).is_empty());
    }

    #[test]
    fn test_infer_title_boundaries() {
        assert_eq!(infer_title(&"x".repeat(40), 40, "..."), "x".repeat(40));
        let long = infer_title(&"x".repeat(41), 40, "...");
        assert_eq!(long, format!("{}...", "x".repeat(40)));
        assert_eq!(infer_title("", 40, "..."), "");
    }

    #[test]
    fn test_infer_title_counts_characters_not_bytes() {
        let text = "é".repeat(45);
        let title = infer_title(&text, 40, "…");
        assert_eq!(title.chars().count(), 41);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn test_summarize_marks_selection_in_display_order() {
        let threads = vec![
            thread_updated("old", ago(Duration::days(30))),
            thread_updated("new", ago(Duration::minutes(5))),
        ];
        let selected = threads[0].id.clone();
        let rows = summarize(&threads, Some(&selected), now(), DEFAULT_DATE_FORMAT);

        assert_eq!(rows[0].title, "new");
        assert_eq!(rows[0].updated, "just now");
        assert!(!rows[0].selected);
        assert_eq!(rows[1].title, "old");
        assert!(rows[1].selected);
        assert_eq!(rows[1].bucket, RecencyBucket::Older);
    }
}
