//! JSON rendering

use bta_common::{AgendaItem, Result};

/// Serialize the item sequence as a JSON array, field names as in the
/// canonical model.
pub fn render(items: &[AgendaItem]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bta_common::model::make_uid;
    use chrono::{Duration, NaiveDate, Utc};

    fn item() -> AgendaItem {
        let start = NaiveDate::from_ymd_opt(2024, 1, 17)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        AgendaItem {
            start,
            end: start + Duration::minutes(50),
            top: "TOP 5".into(),
            thema: "Haushalt".into(),
            beschreibung: "Status: beendet\n\nErste Beratung".into(),
            url: None,
            status: "beendet".into(),
            namentliche_abstimmung: false,
            uid: make_uid(start, "Haushalt", "TOP 5"),
            dtstamp: Utc::now(),
        }
    }

    #[test]
    fn rendering_then_parsing_is_lossless() {
        let items = vec![item()];
        let json = render(&items).unwrap();
        let back: Vec<AgendaItem> = serde_json::from_str(&json).unwrap();
        assert_eq!(items, back);
    }

    #[test]
    fn field_names_match_the_model() {
        let json = render(&[item()]).unwrap();
        for field in [
            "\"start\"",
            "\"end\"",
            "\"top\"",
            "\"thema\"",
            "\"beschreibung\"",
            "\"status\"",
            "\"namentliche_abstimmung\"",
            "\"uid\"",
            "\"dtstamp\"",
        ] {
            assert!(json.contains(field), "missing {field}");
        }
    }

    #[test]
    fn empty_sequence_renders_as_empty_array() {
        assert_eq!(render(&[]).unwrap(), "[]");
    }
}
