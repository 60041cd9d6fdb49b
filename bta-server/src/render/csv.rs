//! Delimited-text rendering
//!
//! Fixed column order matching the header; a field containing a
//! quote, comma or newline is wrapped in quotes with internal quotes
//! doubled, everything else stays bare.

use super::civil_timestamp;
use bta_common::AgendaItem;

const HEADER: [&str; 7] = ["Start", "Ende", "TOP", "Thema", "Beschreibung", "URL", "Status"];

pub fn render(items: &[AgendaItem]) -> String {
    let mut rows = Vec::with_capacity(items.len() + 1);
    rows.push(HEADER.map(|name| escape_field(name)).join(","));
    for item in items {
        let columns = [
            civil_timestamp(item.start),
            civil_timestamp(item.end),
            item.top.clone(),
            item.thema.clone(),
            item.beschreibung.clone(),
            item.url.clone().unwrap_or_default(),
            item.status.clone(),
        ];
        rows.push(columns.map(|value| escape_field(&value)).join(","));
    }
    rows.join("\n")
}

fn escape_field(value: &str) -> String {
    let escaped = value.replace('"', "\"\"");
    if escaped.contains(['"', ',', '\n']) {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bta_common::model::make_uid;
    use chrono::{Duration, NaiveDate, Utc};

    fn item(beschreibung: &str) -> AgendaItem {
        let start = NaiveDate::from_ymd_opt(2024, 1, 17)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        AgendaItem {
            start,
            end: start + Duration::minutes(50),
            top: "TOP 5".into(),
            thema: "Haushalt".into(),
            beschreibung: beschreibung.into(),
            url: None,
            status: String::new(),
            namentliche_abstimmung: false,
            uid: make_uid(start, "Haushalt", "TOP 5"),
            dtstamp: Utc::now(),
        }
    }

    #[test]
    fn header_row_comes_first() {
        let csv = render(&[]);
        assert_eq!(csv, "Start,Ende,TOP,Thema,Beschreibung,URL,Status");
    }

    #[test]
    fn plain_fields_stay_unquoted() {
        let csv = render(&[item("Erste Beratung")]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "2024-01-17T17:30:00,2024-01-17T18:20:00,TOP 5,Haushalt,Erste Beratung,,"
        );
    }

    #[test]
    fn commas_and_newlines_force_quoting() {
        let csv = render(&[item("Erste Beratung, zweite Lesung\nDrucksache 20/9999")]);
        assert!(csv.contains("\"Erste Beratung, zweite Lesung\nDrucksache 20/9999\""));
    }

    #[test]
    fn internal_quotes_are_doubled() {
        let csv = render(&[item("sogenannte \"Schuldenbremse\"")]);
        assert!(csv.contains("\"sogenannte \"\"Schuldenbremse\"\"\""));
    }
}
