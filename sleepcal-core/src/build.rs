//! Sleep session to calendar event conversion.
//!
//! Each session either becomes exactly one event or is skipped with a
//! `SkipReason`. A bad session never aborts the rest of the batch.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Number, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::NOT_APPLICABLE;
use crate::duration::format_hh_mm;
use crate::event::{CalendarEvent, EventTime};
use crate::session::RawSession;

/// Result of converting one session
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Included(CalendarEvent),
    Skipped(SkipReason),
}

/// Why a session did not produce an event
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The record doesn't have the shape of a sleep session
    Malformed(String),
    /// Bedtimes missing, unparsable, or inconsistent
    InvalidTimes(String),
    /// Time in bed below the configured minimum
    TooShort { minutes: i64, min_minutes: i64 },
    /// The calendar already has an event with this UID
    AlreadyRecorded(String),
    /// A duration field holds a negative number of seconds
    InvalidField { field: &'static str, value: i64 },
}

impl SkipReason {
    /// Filtered sessions are expected and not worth a warning.
    pub fn is_filtered(&self) -> bool {
        matches!(
            self,
            SkipReason::TooShort { .. } | SkipReason::AlreadyRecorded(_)
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::Malformed(msg) => write!(f, "malformed session: {}", msg),
            SkipReason::InvalidTimes(msg) => write!(f, "invalid time: {}", msg),
            SkipReason::TooShort {
                minutes,
                min_minutes,
            } => write!(
                f,
                "too short: {} min in bed, minimum is {} min",
                minutes, min_minutes
            ),
            SkipReason::AlreadyRecorded(uid) => write!(f, "already recorded: {}", uid),
            SkipReason::InvalidField { field, value } => {
                write!(f, "invalid {}: {} seconds", field, value)
            }
        }
    }
}

/// A session that was skipped, with its position in the batch
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub events: Vec<CalendarEvent>,
    pub skipped: Vec<SkippedRecord>,
}

/// Builds calendar events from sleep sessions.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    pub min_sleep_duration_minutes: i64,
    /// Used as CREATED and DTSTAMP of every event built
    pub generated_at: DateTime<Utc>,
}

impl EventBuilder {
    pub fn new(min_sleep_duration_minutes: i64, generated_at: DateTime<Utc>) -> Self {
        EventBuilder {
            min_sleep_duration_minutes,
            generated_at,
        }
    }

    pub fn build(&self, session: &RawSession, existing_uids: &HashSet<String>) -> BuildOutcome {
        match self.try_build(session, existing_uids) {
            Ok(event) => BuildOutcome::Included(event),
            Err(reason) => BuildOutcome::Skipped(reason),
        }
    }

    /// Build events for a batch of JSON records, preserving their order.
    pub fn build_batch(&self, records: &[Value], existing_uids: &HashSet<String>) -> BuildReport {
        let mut report = BuildReport::default();

        for (index, record) in records.iter().enumerate() {
            let outcome = match RawSession::from_value(record.clone()) {
                Ok(session) => self.build(&session, existing_uids),
                Err(e) => BuildOutcome::Skipped(SkipReason::Malformed(e.to_string())),
            };

            match outcome {
                BuildOutcome::Included(event) => report.events.push(event),
                BuildOutcome::Skipped(reason) => {
                    if reason.is_filtered() {
                        debug!(index, %reason, "Skipping sleep session");
                    } else {
                        warn!(index, %reason, "Skipping sleep session");
                    }
                    report.skipped.push(SkippedRecord { index, reason });
                }
            }
        }

        report
    }

    fn try_build(
        &self,
        session: &RawSession,
        existing_uids: &HashSet<String>,
    ) -> Result<CalendarEvent, SkipReason> {
        let (raw_start, raw_end) = match (&session.bedtime_start, &session.bedtime_end) {
            (Some(start), Some(end)) => (start.as_str(), end.as_str()),
            (None, _) => return Err(SkipReason::InvalidTimes("missing bedtime_start".into())),
            (_, None) => return Err(SkipReason::InvalidTimes("missing bedtime_end".into())),
        };
        let bedtime = Bedtime::parse(raw_start, raw_end)?;

        let time_in_bed = bedtime.seconds();
        if time_in_bed < self.min_sleep_duration_minutes.saturating_mul(60) {
            return Err(SkipReason::TooShort {
                minutes: time_in_bed / 60,
                min_minutes: self.min_sleep_duration_minutes,
            });
        }

        let uid = resolve_uid(session, raw_start, raw_end);
        if existing_uids.contains(&uid) {
            return Err(SkipReason::AlreadyRecorded(uid));
        }

        let stats = SleepStats::from_session(session, time_in_bed)?;
        let (start, end) = bedtime.event_times();

        Ok(CalendarEvent {
            uid,
            start: Some(start),
            end: Some(end),
            created: Some(self.generated_at),
            stamp: Some(self.generated_at),
            summary: stats.summary(),
            description: Some(stats.description()),
            extra_properties: vec![],
        })
    }
}

/// Sessions without their own id get a UID derived from their bedtimes, so the
/// same session maps to the same UID on every run.
fn resolve_uid(session: &RawSession, raw_start: &str, raw_end: &str) -> String {
    match session.stable_id() {
        Some(id) => id.to_string(),
        None => {
            let key = format!("{}/{}", raw_start, raw_end);
            Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
        }
    }
}

// =========================================================================
// Bedtimes
// =========================================================================

enum Timestamp {
    Instant(DateTime<FixedOffset>),
    Floating(NaiveDateTime),
}

/// Bedtime start and end, either both with a UTC offset or both without.
enum Bedtime {
    Instant {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
    Floating {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Bedtime {
    fn parse(raw_start: &str, raw_end: &str) -> Result<Self, SkipReason> {
        let start = parse_timestamp(raw_start).ok_or_else(|| {
            SkipReason::InvalidTimes(format!("unparsable bedtime_start '{}'", raw_start))
        })?;
        let end = parse_timestamp(raw_end).ok_or_else(|| {
            SkipReason::InvalidTimes(format!("unparsable bedtime_end '{}'", raw_end))
        })?;

        let bedtime = match (start, end) {
            (Timestamp::Instant(start), Timestamp::Instant(end)) => Bedtime::Instant { start, end },
            (Timestamp::Floating(start), Timestamp::Floating(end)) => {
                Bedtime::Floating { start, end }
            }
            _ => {
                return Err(SkipReason::InvalidTimes(
                    "only one of bedtime_start and bedtime_end has a UTC offset".into(),
                ));
            }
        };

        if bedtime.seconds() < 0 {
            return Err(SkipReason::InvalidTimes(format!(
                "bedtime_end '{}' is before bedtime_start '{}'",
                raw_end, raw_start
            )));
        }

        Ok(bedtime)
    }

    fn seconds(&self) -> i64 {
        match self {
            Bedtime::Instant { start, end } => (*end - *start).num_seconds(),
            Bedtime::Floating { start, end } => (*end - *start).num_seconds(),
        }
    }

    fn event_times(&self) -> (EventTime, EventTime) {
        match self {
            Bedtime::Instant { start, end } => (
                EventTime::DateTimeUtc(start.with_timezone(&Utc)),
                EventTime::DateTimeUtc(end.with_timezone(&Utc)),
            ),
            Bedtime::Floating { start, end } => (
                EventTime::DateTimeFloating(*start),
                EventTime::DateTimeFloating(*end),
            ),
        }
    }
}

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];
const FLOATING_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 timestamp with or without a UTC offset. A bare date is
/// midnight local time.
fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(Timestamp::Instant(dt));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(Timestamp::Instant(dt));
        }
    }
    for format in FLOATING_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Timestamp::Floating(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Timestamp::Floating(date.and_time(NaiveTime::MIN)));
    }

    None
}

// =========================================================================
// Derived statistics
// =========================================================================

struct SleepStats {
    time_in_bed: u64,
    total: u64,
    rem: u64,
    light: u64,
    deep: u64,
    awake: u64,
    latency: u64,
    efficiency: Option<Number>,
    resting_hr: Option<Number>,
    score: Option<Number>,
}

impl SleepStats {
    fn from_session(session: &RawSession, time_in_bed: i64) -> Result<Self, SkipReason> {
        Ok(SleepStats {
            time_in_bed: seconds("time_in_bed", Some(time_in_bed))?,
            total: seconds("total_sleep_duration", session.total_sleep_duration)?,
            rem: seconds("rem_sleep_duration", session.rem_sleep_duration)?,
            light: seconds("light_sleep_duration", session.light_sleep_duration)?,
            deep: seconds("deep_sleep_duration", session.deep_sleep_duration)?,
            awake: seconds("awake_time", session.awake_time)?,
            latency: seconds("latency", session.latency)?,
            efficiency: session.efficiency.clone(),
            resting_hr: session.lowest_heart_rate.clone(),
            score: session.readiness_score().cloned(),
        })
    }

    /// Share of total sleep, in whole percent with halves rounded to even.
    /// None when there was no sleep.
    fn percent_of_total(&self, part: u64) -> Option<i64> {
        if self.total == 0 {
            return None;
        }
        Some((part as f64 / self.total as f64 * 100.0).round_ties_even() as i64)
    }

    fn summary(&self) -> String {
        format!(
            "Sleep: {}\nTib: {}",
            format_hh_mm(self.total),
            format_hh_mm(self.time_in_bed)
        )
    }

    fn description(&self) -> String {
        [
            format!("Readiness Score: {}", or_not_applicable(self.score.as_ref())),
            format!("Time in Bed: {}", format_hh_mm(self.time_in_bed)),
            format!("Total Sleep: {}", format_hh_mm(self.total)),
            format!("Efficiency: {}", or_not_applicable(self.efficiency.as_ref())),
            format!("Latency: {}", format_hh_mm(self.latency)),
            format!("Awake Time: {}", format_hh_mm(self.awake)),
            self.phase_line("REM Sleep", self.rem),
            self.phase_line("Light Sleep", self.light),
            self.phase_line("Deep Sleep", self.deep),
            format!("Resting HR: {}", or_not_applicable(self.resting_hr.as_ref())),
        ]
        .join("\n")
    }

    fn phase_line(&self, label: &str, seconds: u64) -> String {
        let percent = match self.percent_of_total(seconds) {
            Some(p) => format!("{}%", p),
            None => NOT_APPLICABLE.to_string(),
        };
        format!("{}: {} ({})", label, format_hh_mm(seconds), percent)
    }
}

fn seconds(field: &'static str, value: Option<i64>) -> Result<u64, SkipReason> {
    let value = value.unwrap_or(0);
    u64::try_from(value).map_err(|_| SkipReason::InvalidField { field, value })
}

fn or_not_applicable(value: Option<&Number>) -> String {
    value
        .map(|n| n.to_string())
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}
