use super::models::{Event, EventIdentity};
use chrono::DateTime;
use chrono_tz::Tz;
use std::collections::HashSet;

/// Find the events of `current` that should be announced.
///
/// An event qualifies when it starts strictly after `now` and either
/// `return_all` is set or no event in `previous` has the same identity
/// key. A missing previous snapshot means every future event is new.
/// The result is stably sorted by start time.
pub fn diff_events(
    current: &[Event],
    previous: Option<&[Event]>,
    now: DateTime<Tz>,
    return_all: bool,
    identity: EventIdentity,
) -> Vec<Event> {
    let known: HashSet<&str> = previous
        .unwrap_or_default()
        .iter()
        .map(|event| identity.key(event))
        .collect();

    let mut new_events: Vec<Event> = current
        .iter()
        .filter(|event| return_all || !known.contains(identity.key(event)))
        .filter(|event| event.start > now)
        .cloned()
        .collect();

    new_events.sort_by_key(|event| event.start);
    new_events
}
