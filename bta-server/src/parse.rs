//! Agenda page parser
//!
//! Turns the parliament's conference-week HTML into canonical
//! [`AgendaItem`]s. One `table.bt-table-data` per sitting day; the
//! table body encodes a sequence of boundary timestamps, so an item's
//! end time comes from the *next* row. The first body row only opens
//! the day's boundary sequence and the last row terminates it; neither
//! is an item of its own.
//!
//! A malformed row is skipped with a warning and the rest of the page
//! still parses.

use bta_common::model::{make_uid, ROLL_CALL_MARKER};
use bta_common::{AgendaItem, Error, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::warn;

/// Base for article links; the page only carries relative paths
const ARCHIVE_BASE_URL: &str = "https://bundestag.de";

/// Localized month names as they appear in conference-day headers
const MONTH_NAMES: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.bt-table-data").expect("static selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.bt-conference-title").expect("static selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody > tr").expect("static selector"));
static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[data-th="Uhrzeit"]"#).expect("static selector"));
static TOP_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[data-th="TOP"]"#).expect("static selector"));
static THEMA_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"td[data-th="Thema"] a.bt-top-collapser"#).expect("static selector")
});
static DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[data-th="Thema"] p"#).expect("static selector"));
static URL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"td[data-th="Thema"] div div div button"#).expect("static selector")
});
static STATUS_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"td[data-th="Status/ Abstimmung"] p"#).expect("static selector")
});

/// Parse a conference-week page into the ordered item sequence.
pub fn parse_agenda(html: &str) -> Vec<AgendaItem> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for table in document.select(&TABLE_SELECTOR) {
        let Some(date) = conference_date(table) else {
            warn!("skipping conference table without a parseable date header");
            continue;
        };

        let rows: Vec<ElementRef> = table.select(&ROW_SELECTOR).collect();
        for i in 1..rows.len().saturating_sub(1) {
            match parse_row(rows[i], rows[i + 1], date) {
                Ok(item) => items.push(item),
                Err(err) => warn!(row = i, %err, "skipping malformed agenda row"),
            }
        }
    }

    items
}

/// Date of one sitting day, from a header like "17. Januar 2024 (Mittwoch)".
fn conference_date(table: ElementRef) -> Option<NaiveDate> {
    let title = table.select(&TITLE_SELECTOR).next()?;
    let text = title.text().collect::<String>();
    let date_part = text.split('(').next().unwrap_or_default().trim().to_string();

    let mut parts = date_part.split_whitespace();
    let day: u32 = parts.next()?.trim_end_matches('.').parse().ok()?;
    let month_name = parts.next()?;
    let year: i32 = parts.next()?.parse().ok()?;
    let month = MONTH_NAMES.iter().position(|name| *name == month_name)? as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_row(row: ElementRef, next_row: ElementRef, date: NaiveDate) -> Result<AgendaItem> {
    let start = boundary_time(row, date)
        .ok_or_else(|| Error::MalformedRow("missing or invalid start time".into()))?;
    let end = boundary_time(next_row, date)
        .ok_or_else(|| Error::MalformedRow("missing or invalid end time".into()))?;
    let end = correct_end(start, end);

    let top = normalize_top(&cell_text(row, &TOP_SELECTOR));
    let thema = cell_text(row, &THEMA_SELECTOR);
    let description = row
        .select(&DESCRIPTION_SELECTOR)
        .next()
        .map(text_with_breaks)
        .unwrap_or_default();
    let status = row
        .select(&STATUS_SELECTOR)
        .next()
        .map(text_with_breaks)
        .unwrap_or_default();
    let url = row
        .select(&URL_SELECTOR)
        .next()
        .and_then(|button| button.value().attr("data-url"))
        .map(|path| format!("{ARCHIVE_BASE_URL}{path}"));

    let beschreibung = if status.is_empty() {
        description
    } else {
        format!("Status: {status}\n\n{description}")
    };
    let namentliche_abstimmung = beschreibung.ends_with(ROLL_CALL_MARKER);

    Ok(AgendaItem {
        start,
        end,
        uid: make_uid(start, &thema, &top),
        top,
        thema,
        beschreibung,
        url,
        status,
        namentliche_abstimmung,
        dtstamp: Utc::now(),
    })
}

/// Civil timestamp of one boundary row: its "HH:MM" time cell on `date`.
fn boundary_time(row: ElementRef, date: NaiveDate) -> Option<NaiveDateTime> {
    let text = cell_text(row, &TIME_SELECTOR);
    let (hour, minute) = text.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    date.and_hms_opt(hour, minute, 0)
}

/// End-time corrections: parallel items share a boundary and get a
/// 15-minute default duration; an end before its start rolls over past
/// midnight into the next day.
fn correct_end(start: NaiveDateTime, mut end: NaiveDateTime) -> NaiveDateTime {
    if end == start {
        end += Duration::minutes(15);
    }
    if end <= start {
        end += Duration::days(1);
    }
    end
}

/// Prefix bare item numbers with "TOP"; comma-joined labels are
/// normalized part by part ("5, ZP 2" → "TOP 5, ZP 2").
fn normalize_top(raw: &str) -> String {
    raw.split(',')
        .map(|part| {
            let part = part.trim();
            if !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()) {
                format!("TOP {part}")
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn cell_text(row: ElementRef, selector: &Selector) -> String {
    row.select(selector)
        .next()
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Text content with `<br>` turned into newlines and every other tag
/// dropped.
fn text_with_breaks(element: ElementRef) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out.trim().to_string()
}
