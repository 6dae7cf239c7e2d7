//! Sidebar-style grouping of conversations by recency.

use chrono::{DateTime, Duration, Local, TimeZone};
use database::Conversation;
use tracing::debug;

/// Conversations bucketed by how recently they were updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateGroups {
    pub today: Vec<Conversation>,
    pub yesterday: Vec<Conversation>,
    pub this_week: Vec<Conversation>,
    pub older: Vec<Conversation>,
}

impl DateGroups {
    /// Non-empty groups with their display labels, newest first.
    pub fn labeled(&self) -> Vec<(&'static str, &[Conversation])> {
        [
            ("Today", self.today.as_slice()),
            ("Yesterday", self.yesterday.as_slice()),
            ("This week", self.this_week.as_slice()),
            ("Older", self.older.as_slice()),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .collect()
    }

    /// Total number of conversations across all groups.
    pub fn len(&self) -> usize {
        self.today.len() + self.yesterday.len() + self.this_week.len() + self.older.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group by `updated_at` relative to the local wall clock.
pub fn group_by_date(conversations: &[Conversation]) -> DateGroups {
    group_by_date_at(conversations, Local::now())
}

/// Group by `updated_at` relative to `now`.
///
/// Boundaries are local midnight today, midnight yesterday and midnight seven
/// days ago, all in `now`'s time zone. Input order is kept within a group.
/// Timestamps that fail to parse land in `older`.
pub fn group_by_date_at<Tz: TimeZone>(
    conversations: &[Conversation],
    now: DateTime<Tz>,
) -> DateGroups {
    let today = start_of_day(&now);
    let yesterday = today.clone() - Duration::days(1);
    let this_week = today.clone() - Duration::days(7);

    let mut groups = DateGroups::default();
    for conversation in conversations {
        let bucket = match DateTime::parse_from_rfc3339(&conversation.updated_at) {
            Ok(updated) if updated >= today => &mut groups.today,
            Ok(updated) if updated >= yesterday => &mut groups.yesterday,
            Ok(updated) if updated >= this_week => &mut groups.this_week,
            Ok(_) => &mut groups.older,
            Err(e) => {
                debug!(
                    "Unparseable updated_at '{}' on {}: {}",
                    conversation.updated_at, conversation.id, e
                );
                &mut groups.older
            }
        };
        bucket.push(conversation.clone());
    }

    groups
}

fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        // No midnight in this zone today (DST gap): fall back to the instant itself.
        .unwrap_or_else(|| now.clone())
}
