//! Fetched sessions -> events -> merged calendar -> file.

use serde_json::Value;
use tracing::info;

use crate::build::{EventBuilder, SkippedRecord};
use crate::error::SleepcalResult;
use crate::merge::merge_events;
use crate::store::CalendarStore;

/// What one sync run did
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Records handed to the builder
    pub fetched: usize,
    pub added: usize,
    /// Events dropped because an event with the same UID was added earlier in the run
    pub duplicates: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Events in the calendar after the run
    pub total_events: usize,
}

impl SyncReport {
    /// Skipped for being too short or already in the calendar
    pub fn filtered_count(&self) -> usize {
        self.skipped.iter().filter(|s| s.reason.is_filtered()).count()
    }

    /// Skipped because the record couldn't be turned into an event
    pub fn failed_count(&self) -> usize {
        self.skipped.len() - self.filtered_count()
    }
}

/// Merge a batch of session records into the calendar at `store` and save it.
pub fn sync_sessions(
    store: &CalendarStore,
    builder: &EventBuilder,
    records: &[Value],
) -> SleepcalResult<SyncReport> {
    let (mut calendar, existing_uids) = store.load();
    info!(
        existing = existing_uids.len(),
        records = records.len(),
        "Merging sleep sessions"
    );

    let report = builder.build_batch(records, &existing_uids);
    let stats = merge_events(&mut calendar, report.events);

    store.save(&calendar)?;

    Ok(SyncReport {
        fetched: records.len(),
        added: stats.added,
        duplicates: stats.duplicates,
        skipped: report.skipped,
        total_events: calendar.len(),
    })
}
