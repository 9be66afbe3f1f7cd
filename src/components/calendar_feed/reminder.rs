use super::models::Event;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Select the events that are due for a reminder at `now`.
///
/// An event is due when the time until its start lies within
/// `[offset - interval / 2, offset + interval / 2]`. With one evaluation per
/// polling interval this reminds about each event roughly once; nothing is
/// remembered between evaluations.
pub fn select_reminders(
    events: &[Event],
    now: DateTime<Tz>,
    offset: Duration,
    interval: Duration,
) -> Vec<Event> {
    let tolerance = interval / 2;
    let earliest = offset - tolerance;
    let latest = offset + tolerance;

    let mut due: Vec<Event> = events
        .iter()
        .filter(|event| {
            let left = event.start - now;
            left >= earliest && left <= latest
        })
        .cloned()
        .collect();

    due.sort_by_key(|event| event.start);
    due
}
