//! Format renderers
//!
//! Each renderer turns the canonical item sequence into one export
//! format with its own escaping rules. Rendering is pure; the HTTP
//! layer owns caching and content negotiation.

pub mod csv;
pub mod ical;
pub mod json;
pub mod xml;

pub use ical::IcalOptions;

use bta_common::{AgendaItem, Result};
use chrono::NaiveDateTime;

/// Output format of an agenda response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ical,
    Json,
    Xml,
    Csv,
}

impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Ical => "text/calendar; charset=utf-8",
            Format::Json => "application/json; charset=utf-8",
            Format::Xml => "application/xml; charset=utf-8",
            Format::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// Render an item sequence; `ical_options` only applies to the
/// calendar format.
pub fn render(format: Format, items: &[AgendaItem], ical_options: &IcalOptions) -> Result<String> {
    match format {
        Format::Ical => Ok(ical::render(items, ical_options)),
        Format::Json => json::render(items),
        Format::Xml => Ok(xml::render(items)),
        Format::Csv => Ok(csv::render(items)),
    }
}

/// Civil timestamp in the exchange formats (JSON field encoding, XML
/// and CSV columns)
pub(crate) fn civil_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}
