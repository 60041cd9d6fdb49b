//! XML rendering
//!
//! A root `<agenda>` with one `<event>` per item. Child elements keep
//! a fixed order; the optional `status` and `url` are omitted when
//! empty.

use super::civil_timestamp;
use bta_common::AgendaItem;

pub fn render(items: &[AgendaItem]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<agenda>\n");
    for item in items {
        xml.push_str("  <event>\n");
        push_field(&mut xml, "start", &civil_timestamp(item.start));
        push_field(&mut xml, "end", &civil_timestamp(item.end));
        push_field(&mut xml, "top", &item.top);
        push_field(&mut xml, "thema", &item.thema);
        if !item.status.is_empty() {
            push_field(&mut xml, "status", &item.status);
        }
        push_field(&mut xml, "beschreibung", &item.beschreibung);
        if let Some(url) = &item.url {
            push_field(&mut xml, "url", url);
        }
        xml.push_str("  </event>\n");
    }
    xml.push_str("</agenda>");
    xml
}

fn push_field(xml: &mut String, name: &str, value: &str) {
    xml.push_str(&format!("    <{name}>{}</{name}>\n", escape(value)));
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bta_common::model::make_uid;
    use chrono::{Duration, NaiveDate, Utc};

    fn item(status: &str, url: Option<&str>) -> AgendaItem {
        let start = NaiveDate::from_ymd_opt(2024, 1, 17)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        AgendaItem {
            start,
            end: start + Duration::minutes(50),
            top: "TOP 5".into(),
            thema: "Bericht & Beschluss".into(),
            beschreibung: "Erste Beratung".into(),
            url: url.map(Into::into),
            status: status.into(),
            namentliche_abstimmung: false,
            uid: make_uid(start, "Bericht & Beschluss", "TOP 5"),
            dtstamp: Utc::now(),
        }
    }

    #[test]
    fn fields_appear_in_fixed_order() {
        let xml = render(&[item("beendet", Some("https://bundestag.de/x"))]);
        let positions: Vec<usize> = ["<start>", "<end>", "<top>", "<thema>", "<status>", "<beschreibung>", "<url>"]
            .iter()
            .map(|tag| xml.find(tag).unwrap_or_else(|| panic!("missing {tag}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(xml.contains("<start>2024-01-17T17:30:00</start>"));
    }

    #[test]
    fn empty_optional_fields_are_omitted() {
        let xml = render(&[item("", None)]);
        assert!(!xml.contains("<status>"));
        assert!(!xml.contains("<url>"));
        assert!(xml.contains("<beschreibung>"));
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let xml = render(&[item("", None)]);
        assert!(xml.contains("<thema>Bericht &amp; Beschluss</thema>"));
    }

    #[test]
    fn empty_sequence_yields_bare_root() {
        let xml = render(&[]);
        assert!(xml.ends_with("<agenda>\n</agenda>"));
    }
}
