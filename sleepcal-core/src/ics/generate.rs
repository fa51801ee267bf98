//! ICS file generation.

use crate::calendar::{CalendarFile, CalendarMetadata};
use crate::event::{CalendarEvent, EventTime};
use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

/// Generate .ics content for a whole calendar
pub fn generate_calendar(calendar: &CalendarFile) -> String {
    let mut cal = Calendar::new();

    for event in &calendar.events {
        cal.push(to_ics_event(event));
    }

    let cal = cal.done();

    // The icalendar crate writes its own PRODID, replace it with ours
    apply_metadata(&cal.to_string(), &calendar.metadata)
}

fn to_ics_event(event: &CalendarEvent) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);

    // DTSTAMP is required by RFC 5545; events loaded without one get the current time
    let dtstamp = event.stamp.unwrap_or_else(Utc::now);
    ics_event.add_property("DTSTAMP", format_utc(&dtstamp));

    if let Some(created) = event.created {
        ics_event.add_property("CREATED", format_utc(&created));
    }

    if let Some(ref start) = event.start {
        add_datetime_property(&mut ics_event, "DTSTART", start);
    }
    if let Some(ref end) = event.end {
        add_datetime_property(&mut ics_event, "DTEND", end);
    }

    if !event.summary.is_empty() {
        ics_event.summary(&event.summary);
    }

    if let Some(ref desc) = event.description {
        ics_event.description(desc);
    }

    // Properties of loaded events we don't interpret (LOCATION, ATTENDEE, X-..., etc.)
    for extra in &event.extra_properties {
        let mut prop = Property::new(&extra.name, &extra.value);
        for (key, value) in &extra.params {
            prop.add_parameter(key, value);
        }
        ics_event.append_multi_property(prop);
    }

    ics_event.done()
}

/// Rewrite the VCALENDAR header of the icalendar crate's output
/// - PRODID and VERSION come from the calendar metadata
/// - CALSCALE:GREGORIAN is dropped (it's the default)
fn apply_metadata(ics: &str, metadata: &CalendarMetadata) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut in_event = false;

    for line in ics.lines() {
        if line == "BEGIN:VEVENT" {
            in_event = true;
        } else if line == "END:VEVENT" {
            in_event = false;
        }

        if !in_event
            && (line.starts_with("PRODID:")
                || line.starts_with("VERSION:")
                || line == "CALSCALE:GREGORIAN")
        {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");

        if line == "BEGIN:VCALENDAR" {
            result.push_str(&format!("VERSION:{}\r\n", metadata.version));
            result.push_str(&format!("PRODID:{}\r\n", metadata.product_id));
        }
    }

    result
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Add a datetime property with proper formatting based on EventTime variant
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::Date(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        EventTime::DateTimeUtc(dt) => {
            ics_event.add_property(name, format_utc(dt));
        }
        EventTime::DateTimeFloating(dt) => {
            // Floating datetime (no Z, no TZID)
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%S").to_string());
        }
        EventTime::DateTimeZoned { datetime, tzid } => {
            let mut prop = Property::new(name, datetime.format("%Y%m%dT%H%M%S").to_string());
            prop.add_parameter("TZID", tzid);
            ics_event.append_property(prop);
        }
    }
}
