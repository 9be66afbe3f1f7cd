//! iCalendar document parsing using the icalendar crate's parser.

use super::models::Event;
use crate::error::{parse_error, BotResult};
use crate::utils::time::localize;
use chrono::{DateTime, Duration, NaiveTime};
use chrono_tz::Tz;
use icalendar::parser::{read_calendar, unfold, Component};
use icalendar::{CalendarDateTime, DatePerhapsTime};
use tracing::{debug, warn};

/// Parse a calendar document into its events, expressed in `tz`.
///
/// Events are returned in document order. A `VEVENT` without a usable
/// `DTSTART` is skipped.
pub fn parse_events(content: &str, tz: Tz) -> BotResult<Vec<Event>> {
    if !content.contains("BEGIN:VCALENDAR") {
        return Err(parse_error("Document is not an iCalendar file"));
    }
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded)
        .map_err(|e| parse_error(&format!("Malformed calendar document: {}", e)))?;

    let mut events = Vec::new();
    for component in &calendar.components {
        collect_events(component, tz, &mut events);
    }
    Ok(events)
}

fn collect_events(component: &Component<'_>, tz: Tz, events: &mut Vec<Event>) {
    if component.name == "VEVENT" {
        match parse_event(component, tz) {
            Some(event) => events.push(event),
            None => warn!("Skipping calendar entry without a usable start time"),
        }
        return;
    }
    for child in &component.components {
        collect_events(child, tz, events);
    }
}

fn parse_event(vevent: &Component<'_>, tz: Tz) -> Option<Event> {
    let (start, all_day) = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(|dpt| to_zoned(dpt, tz))?;

    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(|dpt| to_zoned(dpt, tz).0)
        .unwrap_or_else(|| {
            if all_day {
                start + Duration::days(1)
            } else {
                start
            }
        });

    let text = |name: &str| {
        vevent
            .find_prop(name)
            .map(|p| p.val.to_string())
            .filter(|value| !value.trim().is_empty())
    };

    Some(Event {
        summary: text("SUMMARY").unwrap_or_default(),
        description: text("DESCRIPTION"),
        start,
        end,
        location: text("LOCATION"),
        uid: text("UID"),
        all_day,
    })
}

/// Convert a parsed date or date-time into the configured timezone.
///
/// Returns the instant and whether the value was a plain date.
fn to_zoned(dpt: DatePerhapsTime, tz: Tz) -> (DateTime<Tz>, bool) {
    match dpt {
        DatePerhapsTime::Date(date) => (localize(tz, date.and_time(NaiveTime::MIN)), true),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => (dt.with_timezone(&tz), false),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            (localize(tz, naive), false)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let zoned = match tzid.parse::<Tz>() {
                Ok(event_tz) => localize(event_tz, date_time).with_timezone(&tz),
                Err(_) => {
                    debug!("Unknown TZID '{}', using {}", tzid, tz);
                    localize(tz, date_time)
                }
            };
            (zoned, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    const CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:meeting-1@example.com\r\n\
SUMMARY:Plenum\r\n\
DESCRIPTION:Agenda:\\n1. Budget\\, again\r\n\
LOCATION:Room 4\r\n\
DTSTART:20300115T170000Z\r\n\
DTEND:20300115T183000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Sommerfest\r\n\
DTSTART;VALUE=DATE:20300620\r\n\
DTEND;VALUE=DATE:20300621\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Lesekreis\r\n\
DTSTART;TZID=Europe/Berlin:20300301T190000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Floating\r\n\
DTSTART:20300401T080000\r\n\
DTEND:20300401T090000\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_events() {
        let events = parse_events(CALENDAR, Berlin).unwrap();
        assert_eq!(events.len(), 4);

        let plenum = &events[0];
        assert_eq!(plenum.summary, "Plenum");
        assert_eq!(plenum.uid.as_deref(), Some("meeting-1@example.com"));
        assert_eq!(plenum.description.as_deref(), Some("Agenda:\n1. Budget, again"));
        assert_eq!(plenum.location.as_deref(), Some("Room 4"));
        assert_eq!(plenum.start, Berlin.with_ymd_and_hms(2030, 1, 15, 18, 0, 0).unwrap());
        assert_eq!(plenum.end, Berlin.with_ymd_and_hms(2030, 1, 15, 19, 30, 0).unwrap());
        assert!(!plenum.all_day);
    }

    #[test]
    fn test_all_day_events_start_at_local_midnight() {
        let events = parse_events(CALENDAR, Berlin).unwrap();
        let fest = &events[1];
        assert!(fest.all_day);
        assert_eq!(fest.start, Berlin.with_ymd_and_hms(2030, 6, 20, 0, 0, 0).unwrap());
        assert_eq!(fest.end, Berlin.with_ymd_and_hms(2030, 6, 21, 0, 0, 0).unwrap());
        assert_eq!(fest.description, None);
    }

    #[test]
    fn test_missing_end_defaults_to_start() {
        let events = parse_events(CALENDAR, Berlin).unwrap();
        let reading = &events[2];
        assert_eq!(reading.start, Berlin.with_ymd_and_hms(2030, 3, 1, 19, 0, 0).unwrap());
        assert_eq!(reading.end, reading.start);
    }

    #[test]
    fn test_floating_times_use_configured_zone() {
        let events = parse_events(CALENDAR, chrono_tz::UTC).unwrap();
        let floating = &events[3];
        assert_eq!(
            floating.start,
            chrono_tz::UTC.with_ymd_and_hms(2030, 4, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_text_is_unescaped_exactly_once() {
        let calendar = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:A\\, B\\\\n C\r\n\
DESCRIPTION:first\\nsecond\\; third\r\n\
DTSTART:20300115T170000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_events(calendar, Berlin).unwrap();
        assert_eq!(events[0].summary, "A, B\\n C");
        assert_eq!(events[0].description.as_deref(), Some("first\nsecond; third"));
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(parse_events("this is not a calendar", Berlin).is_err());
    }
}
