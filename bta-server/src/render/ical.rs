//! iCalendar rendering
//!
//! Emits the calendar header, a Europe/Berlin VTIMEZONE block, one
//! VEVENT per item and, on request, derived events: roll-call
//! follow-ups (with optional display alarms) and all-day session-week
//! markers. Event timestamps are written as TZID-local values so the
//! civil times stored on the items survive unchanged; only `DTSTAMP`
//! is a real UTC instant.
//!
//! Content lines longer than 70 characters are hard-folded with CRLF
//! plus one leading space, and the whole output uses CRLF throughout.

use bta_common::model::make_uid;
use bta_common::week::monday_of_iso_week;
use bta_common::AgendaItem;
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeSet;

/// Named zone all event times are rendered in
pub const TZID: &str = "Europe/Berlin";

const PRODID: &str = "-//bt-agenda//bt-agenda.dev//";
const CALENDAR_NAME: &str = "Tagesordnung Bundestag";
const CALENDAR_DESCRIPTION: &str = "Dieses iCal-Feed stellt die aktuelle Tagesordnung des \
    Plenums des Deutschen Bundestages bereit. Die Daten werden in Sitzungswochen alle 15 \
    Minuten von bundestag.de übernommen.";

/// Derived-event switches of the calendar format
#[derive(Debug, Clone, Copy, Default)]
pub struct IcalOptions {
    /// Emit a follow-up event per roll-call vote
    pub roll_call_events: bool,
    /// Attach a 15-minutes-before display alarm to each follow-up
    pub roll_call_alarms: bool,
    /// Emit one all-day marker per session week
    pub session_week_markers: bool,
}

pub fn render(items: &[AgendaItem], options: &IcalOptions) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        format!("PRODID:{PRODID}"),
        "CALSCALE:GREGORIAN".into(),
        "COLOR:#808080".into(),
        "X-APPLE-CALENDAR-COLOR:#808080".into(),
        fold_line(&format!("X-WR-CALNAME:{CALENDAR_NAME}")),
        fold_line(&format!("X-WR-CALDESC:{CALENDAR_DESCRIPTION}")),
        fold_line(&format!("DESCRIPTION:{CALENDAR_DESCRIPTION}")),
    ];
    push_timezone(&mut lines);

    let mut session_weeks: BTreeSet<(i32, u32)> = BTreeSet::new();
    for item in items {
        let week = item.start.date().iso_week();
        session_weeks.insert((week.year(), week.week()));

        push_event(&mut lines, item);
        if options.roll_call_events && item.namentliche_abstimmung {
            push_roll_call_event(&mut lines, item, options.roll_call_alarms);
        }
    }

    if options.session_week_markers {
        let dtstamp = Utc::now();
        for (year, week) in session_weeks {
            if let Some(monday) = monday_of_iso_week(week, year) {
                push_session_week(&mut lines, monday, dtstamp);
            }
        }
    }

    lines.push("END:VCALENDAR".into());
    lines.join("\r\n")
}

/// Fixed Europe/Berlin timezone definition with its standard/daylight
/// transition rules.
fn push_timezone(lines: &mut Vec<String>) {
    for line in [
        "BEGIN:VTIMEZONE",
        "TZID:Europe/Berlin",
        "BEGIN:STANDARD",
        "TZNAME:CET",
        "DTSTART:19701025T030000",
        "TZOFFSETFROM:+0200",
        "TZOFFSETTO:+0100",
        "RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU",
        "END:STANDARD",
        "BEGIN:DAYLIGHT",
        "TZNAME:CEST",
        "DTSTART:19700329T020000",
        "TZOFFSETFROM:+0100",
        "TZOFFSETTO:+0200",
        "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU",
        "END:DAYLIGHT",
        "END:VTIMEZONE",
    ] {
        lines.push(line.into());
    }
}

fn push_event(lines: &mut Vec<String>, item: &AgendaItem) {
    lines.push("BEGIN:VEVENT".into());
    lines.push(fold_line(&format!("UID:{}", item.uid)));
    lines.push(fold_line(&format!("DTSTAMP:{}", utc_timestamp(item.dtstamp))));
    lines.push(fold_line(&format!("DTSTART;TZID={TZID}:{}", local_timestamp(item.start))));
    lines.push(fold_line(&format!("DTEND;TZID={TZID}:{}", local_timestamp(item.end))));
    lines.push(fold_line(&format!("SUMMARY:{}", item.summary())));
    lines.push(fold_line(&format!(
        "DESCRIPTION:{}",
        escape_text(&item.beschreibung)
    )));
    if let Some(url) = &item.url {
        lines.push(fold_line(&format!("URL:{url}")));
    }
    lines.push("END:VEVENT".into());
}

/// Follow-up event for a roll-call vote: starts when the item ends,
/// fixed 15-minute duration.
fn push_roll_call_event(lines: &mut Vec<String>, item: &AgendaItem, alarm: bool) {
    let thema = format!("Namentliche Abstimmung: {}", item.thema);
    lines.push("BEGIN:VEVENT".into());
    lines.push(fold_line(&format!(
        "UID:{}",
        make_uid(item.end, &thema, &item.top)
    )));
    lines.push(fold_line(&format!("DTSTAMP:{}", utc_timestamp(item.dtstamp))));
    lines.push(fold_line(&format!("DTSTART;TZID={TZID}:{}", local_timestamp(item.end))));
    lines.push(fold_line(&format!(
        "DTEND;TZID={TZID}:{}",
        local_timestamp(item.end + Duration::minutes(15))
    )));
    lines.push(fold_line(&format!("SUMMARY:{thema}")));
    if alarm {
        lines.push("BEGIN:VALARM".into());
        lines.push("ACTION:DISPLAY".into());
        lines.push(fold_line(&format!("DESCRIPTION:{thema}")));
        lines.push("TRIGGER:-PT15M".into());
        lines.push("END:VALARM".into());
    }
    lines.push("END:VEVENT".into());
}

/// All-day marker covering Monday through Friday of one session week
/// (exclusive end on Saturday).
fn push_session_week(lines: &mut Vec<String>, monday: NaiveDate, dtstamp: DateTime<Utc>) {
    let end = monday + Days::new(5);
    lines.push("BEGIN:VEVENT".into());
    lines.push(fold_line(&format!(
        "UID:{}",
        make_uid(monday.and_hms_opt(0, 0, 0).expect("midnight"), "Sitzungswoche", "")
    )));
    lines.push(fold_line(&format!("DTSTAMP:{}", utc_timestamp(dtstamp))));
    lines.push(format!("DTSTART;VALUE=DATE:{}", monday.format("%Y%m%d")));
    lines.push(format!("DTEND;VALUE=DATE:{}", end.format("%Y%m%d")));
    lines.push("SUMMARY:Sitzungswoche".into());
    lines.push("END:VEVENT".into());
}

/// Hard-fold one content line at 70 characters, continuation lines
/// prefixed with a single space.
pub fn fold_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= 70 {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / 70 * 3);
    for (i, chunk) in chars.chunks(70).enumerate() {
        if i > 0 {
            out.push_str("\r\n ");
        }
        out.extend(chunk);
    }
    out
}

/// Embedded newlines become the literal two-character sequence `\n`.
fn escape_text(value: &str) -> String {
    value.replace('\n', "\\n")
}

fn local_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y%m%dT%H%M%S").to_string()
}

fn utc_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}
