//! Calendar event types.
//!
//! `CalendarEvent` is what the builder produces for a sleep session and what
//! the ICS parser produces for every VEVENT found in an existing calendar file.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: String,
    /// DTSTART; always set for sleep events
    pub start: Option<EventTime>,
    /// DTEND; events from other tools may use DURATION instead or have neither
    pub end: Option<EventTime>,
    /// CREATED
    pub created: Option<DateTime<Utc>>,
    /// DTSTAMP
    pub stamp: Option<DateTime<Utc>>,
    pub summary: String,
    pub description: Option<String>,

    /// Other VEVENT properties of a loaded event, written back unchanged
    pub extra_properties: Vec<ExtraProperty>,
}

/// A VEVENT property sleepcal doesn't interpret, kept with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraProperty {
    pub name: String,
    pub params: Vec<(String, String)>,
    /// Raw value as it appeared in the file
    pub value: String,
}

impl ExtraProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ExtraProperty {
            name: name.into(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// Start or end of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    /// An instant, written with a Z suffix
    DateTimeUtc(DateTime<Utc>),
    /// Wall-clock time with no timezone
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M UTC")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{} ({})", datetime.format("%Y-%m-%d %H:%M"), tzid)
            }
        }
    }
}

impl CalendarEvent {
    /// First line of the summary, for one-line listings
    pub fn title(&self) -> &str {
        self.summary.lines().next().unwrap_or_default()
    }
}
