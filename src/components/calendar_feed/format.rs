//! Pure message rendering. Nothing in here knows about the chat transport.

use super::models::Event;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use rust_i18n::t;

/// Discord rejects messages longer than this many characters
pub const MESSAGE_LIMIT: usize = 2000;

const BLOCK_SEPARATOR: &str = "\n\n";

/// Render a single event as a markdown block
pub fn format_event(event: &Event, locale: &str) -> String {
    let name = if event.summary.trim().is_empty() {
        t!("event_untitled", locale = locale).to_string()
    } else {
        escape_markdown(&event.summary)
    };

    let mut lines = vec![
        t!("event_heading", locale = locale).to_string(),
        t!("event_name", locale = locale, value = name).to_string(),
    ];

    if let Some(description) = &event.description {
        lines.push(
            t!(
                "event_description",
                locale = locale,
                value = escape_markdown(description)
            )
            .to_string(),
        );
    }

    lines.push(
        t!(
            "event_start",
            locale = locale,
            value = format_time(&event.start, event.all_day, locale)
        )
        .to_string(),
    );
    lines.push(
        t!(
            "event_end",
            locale = locale,
            value = format_time(&display_end(event), event.all_day, locale)
        )
        .to_string(),
    );

    if let Some(location) = &event.location {
        lines.push(
            t!(
                "event_location",
                locale = locale,
                value = escape_markdown(location)
            )
            .to_string(),
        );
    }

    lines.join("\n")
}

/// Announcement for newly added events, `None` when there are none
pub fn new_events_message(events: &[Event], locale: &str) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    Some(with_header(
        t!("new_events_header", locale = locale).to_string(),
        events,
        locale,
    ))
}

/// Listing of all upcoming events for the events command
pub fn event_list_message(events: &[Event], locale: &str) -> String {
    if events.is_empty() {
        return t!("no_upcoming_events", locale = locale).to_string();
    }
    with_header(
        t!("upcoming_events_header", locale = locale).to_string(),
        events,
        locale,
    )
}

/// Reminder for events starting soon, `None` when nothing is due
pub fn reminder_message(events: &[Event], offset_minutes: i64, locale: &str) -> Option<String> {
    let header = match events.len() {
        0 => return None,
        1 => t!("reminder_single", locale = locale, minutes = offset_minutes),
        _ => t!("reminder_multiple", locale = locale, minutes = offset_minutes),
    };
    Some(with_header(header.to_string(), events, locale))
}

fn with_header(header: String, events: &[Event], locale: &str) -> String {
    let mut blocks = vec![header];
    blocks.extend(events.iter().map(|event| format_event(event, locale)));
    blocks.join(BLOCK_SEPARATOR)
}

fn format_time(dt: &DateTime<Tz>, all_day: bool, locale: &str) -> String {
    let pattern = if all_day {
        t!("format_date", locale = locale)
    } else {
        t!("format_datetime", locale = locale)
    };
    dt.format(&pattern).to_string()
}

/// iCalendar all-day events end on the day after their last day
fn display_end(event: &Event) -> DateTime<Tz> {
    if event.all_day && event.end > event.start {
        event.end - Duration::days(1)
    } else {
        event.end
    }
}

/// Escape characters Discord would interpret as markdown, including
/// headings, quotes and list markers at the start of a line
pub fn escape_markdown(text: &str) -> String {
    text.split('\n')
        .map(escape_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_line(line: &str) -> String {
    let body = line.trim_start();
    let mut out = String::with_capacity(line.len() + 1);
    out.push_str(&line[..line.len() - body.len()]);

    if body.starts_with(|c: char| matches!(c, '#' | '>' | '-' | '+')) {
        out.push('\\');
    }
    // "1. item" renders as an ordered list
    let digits = body.chars().take_while(char::is_ascii_digit).count();
    let list_dot = (digits > 0 && body[digits..].starts_with(". ")).then_some(digits);

    for (i, c) in body.chars().enumerate() {
        if matches!(c, '\\' | '*' | '_' | '~' | '`' | '|') || Some(i) == list_dot {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split a message into chunks of at most `limit` characters.
///
/// Prefers breaking between blocks (blank lines), then between lines, and
/// only cuts inside a line when the line alone is too long.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    if text.is_empty() {
        return chunks;
    }

    let mut current: Option<String> = None;
    for block in text.split(BLOCK_SEPARATOR) {
        if char_len(block) <= limit {
            append_piece(&mut chunks, &mut current, block, BLOCK_SEPARATOR, limit);
            continue;
        }
        let mut separator = BLOCK_SEPARATOR;
        for line in block.split('\n') {
            for piece in hard_wrap(line, limit) {
                append_piece(&mut chunks, &mut current, &piece, separator, limit);
                separator = "\n";
            }
        }
    }

    chunks.extend(current.filter(|chunk| !chunk.is_empty()));
    chunks
}

/// Append `piece` to the open chunk, or close it and start a new one
fn append_piece(
    chunks: &mut Vec<String>,
    current: &mut Option<String>,
    piece: &str,
    separator: &str,
    limit: usize,
) {
    if let Some(open) = current
        .as_mut()
        .filter(|open| char_len(open) + char_len(separator) + char_len(piece) <= limit)
    {
        open.push_str(separator);
        open.push_str(piece);
        return;
    }

    if let Some(full) = current.take().filter(|chunk| !chunk.is_empty()) {
        chunks.push(full);
    }
    *current = Some(piece.to_string());
}

fn hard_wrap(line: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(limit)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
