//! Core library for sleepcal.
//!
//! Converts sleep sessions fetched from a sleep tracker into calendar events
//! and merges them into an iCalendar file without introducing duplicates:
//! - `build` turns one raw session into an event (or a skip reason)
//! - `merge` appends new events to a calendar, deduplicating by UID
//! - `store` loads and saves the calendar file
//! - `sync` ties the three together for a batch of sessions

pub mod build;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod date_range;
pub mod duration;
pub mod error;
pub mod event;
pub mod ics;
pub mod merge;
pub mod session;
pub mod store;
pub mod sync;

pub use calendar::{CalendarFile, CalendarMetadata};
pub use event::{CalendarEvent, EventTime, ExtraProperty};
pub use session::RawSession;
