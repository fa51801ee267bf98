//! In-memory calendar: metadata plus events in insertion order.

use std::collections::HashSet;

use crate::constants::{DEFAULT_PRODUCT_ID, ICALENDAR_VERSION};
use crate::event::CalendarEvent;

/// Calendar-level properties written to the VCALENDAR block
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMetadata {
    pub product_id: String,
    pub version: String,
}

impl Default for CalendarMetadata {
    fn default() -> Self {
        CalendarMetadata {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            version: ICALENDAR_VERSION.to_string(),
        }
    }
}

impl CalendarMetadata {
    pub fn with_product_id(product_id: impl Into<String>) -> Self {
        CalendarMetadata {
            product_id: product_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarFile {
    pub metadata: CalendarMetadata,
    pub events: Vec<CalendarEvent>,
}

impl CalendarFile {
    pub fn new(metadata: CalendarMetadata) -> Self {
        CalendarFile {
            metadata,
            events: Vec::new(),
        }
    }

    pub fn uids(&self) -> HashSet<String> {
        self.events.iter().map(|e| e.uid.clone()).collect()
    }

    pub fn contains_uid(&self, uid: &str) -> bool {
        self.events.iter().any(|e| e.uid == uid)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
