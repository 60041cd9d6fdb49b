//! Canonical agenda item model
//!
//! One `AgendaItem` per plenary agenda row. Timestamps are civil local
//! times (Europe/Berlin); the zone is applied by the calendar renderer,
//! never stored on the item. `dtstamp` records when the item was parsed
//! and is a real UTC instant.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host suffix appended to every generated item identifier
pub const UID_DOMAIN: &str = "bt-agenda.dev";

/// Trailing phrase marking an agenda item that ends in a roll-call vote
pub const ROLL_CALL_MARKER: &str = "Namentliche Abstimmung";

/// A single agenda item of one plenary sitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    /// Civil local start time, minute precision
    pub start: NaiveDateTime,
    /// Civil local end time; always after `start`
    pub end: NaiveDateTime,
    /// Agenda item label, e.g. "TOP 5" or "TOP 5, ZP 2"
    pub top: String,
    /// Topic title
    pub thema: String,
    /// Composed description: "Status: <status>\n\n<text>" when a status exists
    pub beschreibung: String,
    /// Link into the source text archive, absent for most items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Status / voting-result fragment, may be empty
    pub status: String,
    /// True when the description ends in the roll-call marker phrase
    pub namentliche_abstimmung: bool,
    /// Stable identifier derived from (start, thema, top)
    pub uid: String,
    /// Generation timestamp of this record
    pub dtstamp: DateTime<Utc>,
}

impl AgendaItem {
    /// Calendar summary line: "TOP 5: Thema", or just the topic when
    /// the item carries no label.
    pub fn summary(&self) -> String {
        if self.top.is_empty() {
            self.thema.clone()
        } else {
            format!("{}: {}", self.top, self.thema)
        }
    }
}

/// Derive the stable item identifier from its distinguishing fields.
///
/// The millisecond epoch of `start` is taken over the civil timestamp
/// as-is, so the same source row always maps to the same identifier.
pub fn make_uid(start: NaiveDateTime, thema: &str, top: &str) -> String {
    format!(
        "{}-{}-{}@{}",
        start.and_utc().timestamp_millis(),
        slugify(thema),
        slugify(top),
        UID_DOMAIN
    )
}

/// Lowercase and collapse whitespace runs to single hyphens.
///
/// Punctuation is kept: "TOP 5, ZP 2" becomes "top-5,-zp-2".
pub fn slugify(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
