//! Appending new events to a calendar without duplicating UIDs.

use std::collections::HashSet;

use crate::calendar::CalendarFile;
use crate::event::CalendarEvent;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub duplicates: usize,
}

/// Append every event whose UID isn't in the calendar yet.
///
/// UIDs added earlier in the same call count as present, so a batch that
/// repeats a session only adds it once. Existing events are left as they are.
pub fn merge_events(
    calendar: &mut CalendarFile,
    events: impl IntoIterator<Item = CalendarEvent>,
) -> MergeStats {
    let mut seen: HashSet<String> = calendar.uids();
    let mut stats = MergeStats::default();

    for event in events {
        if seen.insert(event.uid.clone()) {
            calendar.events.push(event);
            stats.added += 1;
        } else {
            stats.duplicates += 1;
        }
    }

    stats
}
