//! ICS file parsing using the icalendar crate's parser.

use crate::error::{SleepcalError, SleepcalResult};
use crate::event::{CalendarEvent, EventTime, ExtraProperty};
use chrono::{DateTime, NaiveDateTime, Utc};
use icalendar::{
    DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};
use tracing::warn;

/// Properties mapped onto `CalendarEvent` fields; everything else is kept as-is
const KNOWN_PROPERTIES: &[&str] = &[
    "UID",
    "DTSTART",
    "DTEND",
    "DTSTAMP",
    "CREATED",
    "SUMMARY",
    "DESCRIPTION",
];

/// Parse ICS content into the events it contains, in file order.
pub fn parse_events(content: &str) -> SleepcalResult<Vec<CalendarEvent>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    if !content.contains("BEGIN:VCALENDAR") && !content.contains("BEGIN:VEVENT") {
        return Err(SleepcalError::IcsParse("not an iCalendar file".into()));
    }

    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| SleepcalError::IcsParse(e.to_string()))?;

    let mut events = Vec::new();
    collect_events(&calendar.components, &mut events);
    Ok(events)
}

/// VEVENTs may sit at the top level or inside a VCALENDAR
fn collect_events(components: &[Component<'_>], events: &mut Vec<CalendarEvent>) {
    for component in components {
        if component.name == "VEVENT" {
            match parse_vevent(component) {
                Some(event) => events.push(event),
                None => warn!("Dropping VEVENT without UID"),
            }
        } else if component.name == "VCALENDAR" {
            collect_events(&component.components, events);
        }
    }
}

/// Only UID is required. DTSTART/DTEND/CREATED values we can't interpret stay
/// in `extra_properties` so they are written back as they were.
fn parse_vevent(vevent: &Component<'_>) -> Option<CalendarEvent> {
    let uid = vevent.find_prop("UID")?.val.to_string();
    let start = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time);
    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time);

    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_default();
    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| p.val.to_string());

    let created = vevent
        .find_prop("CREATED")
        .and_then(|p| parse_utc(p.val.as_ref()));
    let stamp = vevent
        .find_prop("DTSTAMP")
        .and_then(|p| parse_utc(p.val.as_ref()));

    // An unparsable DTSTAMP is replaced on write, so it isn't kept
    let extra_properties: Vec<ExtraProperty> = vevent
        .properties
        .iter()
        .filter(|p| {
            let name: &str = p.name.as_ref();
            match name {
                "DTSTART" => start.is_none(),
                "DTEND" => end.is_none(),
                "CREATED" => created.is_none(),
                _ => !KNOWN_PROPERTIES.contains(&name),
            }
        })
        .map(to_extra_property)
        .collect();

    Some(CalendarEvent {
        uid,
        start,
        end,
        created,
        stamp,
        summary,
        description,
        extra_properties,
    })
}

fn to_extra_property(prop: &Property<'_>) -> ExtraProperty {
    ExtraProperty {
        name: prop.name.to_string(),
        params: prop
            .params
            .iter()
            .map(|p| {
                let value = p.val.as_ref().map(|v| v.to_string()).unwrap_or_default();
                (p.key.to_string(), value)
            })
            .collect(),
        value: prop.val.to_string(),
    }
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        },
    }
}

/// Parse a UTC timestamp like 20240102T080000Z
fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let value = value.strip_suffix('Z')?;
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarFile;
    use crate::ics::generate_calendar;
    use chrono::{NaiveDate, TimeZone};

    const SLEEP_ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//sleepcal//oura-sleep-ical//EN\r\n\
BEGIN:VEVENT\r\n\
UID:abc\r\n\
DTSTAMP:20240102T080000Z\r\n\
CREATED:20240102T080000Z\r\n\
DTSTART:20240101T230000\r\n\
DTEND:20240102T070000\r\n\
SUMMARY:Sleep: 7:00\\nTib: 8:00\r\n\
DESCRIPTION:Readiness Score: 85\\nTime in \r\n Bed: 8:00\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_sleep_event() {
        let events = parse_events(SLEEP_ICS).expect("Should parse");
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.uid, "abc");
        assert_eq!(
            event.start,
            Some(EventTime::DateTimeFloating(
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(23, 0, 0)
                    .unwrap()
            ))
        );
        assert_eq!(event.summary, "Sleep: 7:00\nTib: 8:00");
        assert_eq!(
            event.description.as_deref(),
            Some("Readiness Score: 85\nTime in Bed: 8:00"),
            "Line folding and escapes should be undone"
        );
        assert_eq!(
            event.stamp,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap())
        );
        assert_eq!(event.created, event.stamp);
        assert!(event.extra_properties.is_empty());
    }

    #[test]
    fn test_parse_keeps_unknown_properties() {
        let ics = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:OTHER
BEGIN:VEVENT
UID:other-1
DTSTART:20240101T100000Z
DTEND:20240101T110000Z
SUMMARY:Dentist
LOCATION:Main Street
X-CUSTOM:value
END:VEVENT
END:VCALENDAR"#;

        let events = parse_events(ics).expect("Should parse");
        let event = &events[0];

        assert!(event.created.is_none());
        assert_eq!(
            event.extra_properties,
            vec![
                ExtraProperty::new("LOCATION", "Main Street"),
                ExtraProperty::new("X-CUSTOM", "value"),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_property_parameters() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:meeting\r\n\
DTSTART:20240101T100000Z\r\n\
DTEND:20240101T110000Z\r\n\
ATTENDEE;CN=Bob;PARTSTAT=ACCEPTED:mailto:bob@example.org\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_events(ics).expect("Should parse");

        assert_eq!(
            events[0].extra_properties,
            vec![
                ExtraProperty::new("ATTENDEE", "mailto:bob@example.org")
                    .with_param("CN", "Bob")
                    .with_param("PARTSTAT", "ACCEPTED")
            ]
        );
    }

    #[test]
    fn test_parse_keeps_events_without_end() {
        let ics = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:with-duration
DTSTART:20240101T100000Z
DURATION:PT1H
END:VEVENT
BEGIN:VEVENT
UID:start-only
DTSTART;VALUE=DATE:20240101
END:VEVENT
BEGIN:VEVENT
SUMMARY:No uid
DTSTART:20240101T100000Z
END:VEVENT
END:VCALENDAR"#;

        let events = parse_events(ics).expect("Should parse");
        let uids: Vec<&str> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["with-duration", "start-only"]);

        assert_eq!(
            events[0].start,
            Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
            ))
        );
        assert!(events[0].end.is_none());
        assert_eq!(
            events[0].extra_properties,
            vec![ExtraProperty::new("DURATION", "PT1H")]
        );

        assert_eq!(
            events[1].start,
            Some(EventTime::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        );
        assert!(events[1].end.is_none());
        assert_eq!(events[1].summary, "");
    }

    #[test]
    fn test_parse_keeps_unreadable_times_verbatim() {
        let ics = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:odd
DTSTART:sometime
DTEND:20240101T110000Z
END:VEVENT
END:VCALENDAR"#;

        let events = parse_events(ics).expect("Should parse");

        assert!(events[0].start.is_none());
        assert!(events[0].end.is_some());
        assert_eq!(
            events[0].extra_properties,
            vec![ExtraProperty::new("DTSTART", "sometime")]
        );
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(parse_events("").unwrap().is_empty());
        assert!(parse_events("  \r\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_calendar_without_events() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\nEND:VCALENDAR\r\n";
        assert!(parse_events(ics).unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        let result = parse_events("this is not a calendar");
        assert!(matches!(result, Err(SleepcalError::IcsParse(_))));
    }

    #[test]
    fn test_generate_parse_roundtrip() {
        let generated = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        let event = CalendarEvent {
            uid: "s1".to_string(),
            start: Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2024, 1, 1, 22, 0, 0).unwrap(),
            )),
            end: Some(EventTime::DateTimeZoned {
                datetime: NaiveDate::from_ymd_opt(2024, 1, 2)
                    .unwrap()
                    .and_hms_opt(7, 0, 0)
                    .unwrap(),
                tzid: "Europe/Zurich".to_string(),
            }),
            created: Some(generated),
            stamp: Some(generated),
            summary: "Sleep: 7:00\nTib: 8:00".to_string(),
            description: Some(
                "Readiness Score: 85\nTime in Bed: 8:00\nTotal Sleep: 7:00\nEfficiency: 90\n\
                 Latency: 0:10\nAwake Time: 0:50\nREM Sleep: 1:30 (21%)\n\
                 Light Sleep: 4:00 (57%)\nDeep Sleep: 1:30 (21%)\nResting HR: 48"
                    .to_string(),
            ),
            extra_properties: vec![
                ExtraProperty::new("LOCATION", "Bedroom"),
                ExtraProperty::new("ATTENDEE", "mailto:bob@example.org").with_param("CN", "Bob"),
            ],
        };
        let calendar = CalendarFile {
            events: vec![event.clone()],
            ..Default::default()
        };

        let ics = generate_calendar(&calendar);
        let parsed = parse_events(&ics).expect("Should parse generated ICS");

        assert_eq!(parsed, vec![event], "ICS:\n{}", ics);
    }

    #[test]
    fn test_parse_text_is_unescaped_once() {
        let ics = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:text
DTSTART:20240101T100000Z
SUMMARY:one\, two\; three
DESCRIPTION:back\\nslash
END:VEVENT
END:VCALENDAR"#;

        let events = parse_events(ics).expect("Should parse");

        assert_eq!(events[0].summary, "one, two; three");
        assert_eq!(events[0].description.as_deref(), Some(r"back\nslash"));
    }
}
