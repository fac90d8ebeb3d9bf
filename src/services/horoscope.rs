use crate::app::DailyHoroscope;
use color_eyre::Result;
use serde_json::{Value as JsonValue, json};

/// Output schema declared on the horoscope request; mirrors `DailyHoroscope` exactly
#[must_use]
pub fn response_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "date": { "type": "STRING" },
            "overall_score": { "type": "INTEGER" },
            "lucky_color": { "type": "STRING" },
            "lucky_direction": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "action_items": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": [
            "date",
            "overall_score",
            "lucky_color",
            "lucky_direction",
            "summary",
            "action_items"
        ]
    })
}

/// Parses the model's JSON text. Missing or mistyped fields fail the whole horoscope.
pub fn parse_horoscope(text: &str) -> Result<DailyHoroscope> {
    serde_json::from_str::<DailyHoroscope>(text.trim())
        .map_err(|error| color_eyre::eyre::eyre!("Horoscope response did not match schema: {}", error))
}

/// Display-ready projection of a horoscope for the daily screen
#[derive(Debug, Clone, PartialEq)]
pub struct HoroscopeCard {
    pub score: String,
    pub summary: String,
    pub lucky_color: String,
    pub lucky_direction: String,
    /// Numbered in the order the model returned them
    pub action_items: Vec<String>,
    pub footer: String,
}

impl HoroscopeCard {
    #[must_use]
    pub fn new(horoscope: &DailyHoroscope, user_name: &str) -> Self {
        Self {
            score: horoscope.overall_score.to_string(),
            summary: format!("「{}」", horoscope.summary),
            lucky_color: horoscope.lucky_color.clone(),
            lucky_direction: horoscope.lucky_direction.clone(),
            action_items: horoscope
                .action_items
                .iter()
                .enumerate()
                .map(|(index, item)| format!("{}. {}", index + 1, item))
                .collect(),
            footer: format!(
                "Astrological Forecast for {} • {}",
                user_name, horoscope.date
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"date":"2024-06-01","overall_score":82,"lucky_color":"藍","lucky_direction":"東","summary":"...","action_items":["冥想","早睡"]}"#;

    #[test]
    fn test_sample_renders_score_and_ordered_items() {
        let horoscope = parse_horoscope(SAMPLE).unwrap();
        let card = HoroscopeCard::new(&horoscope, "王小明");

        assert_eq!(card.score, "82");
        assert_eq!(card.action_items, vec!["1. 冥想", "2. 早睡"]);
        assert_eq!(card.lucky_color, "藍");
        assert_eq!(card.lucky_direction, "東");
        assert_eq!(card.footer, "Astrological Forecast for 王小明 • 2024-06-01");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let without_summary = r#"{"date":"2024-06-01","overall_score":82,"lucky_color":"藍","lucky_direction":"東","action_items":[]}"#;
        assert!(parse_horoscope(without_summary).is_err());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let string_score = SAMPLE.replace("82", "\"82\"");
        assert!(parse_horoscope(&string_score).is_err());
        assert!(parse_horoscope("not json at all").is_err());
    }

    #[test]
    fn test_schema_requires_every_field() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|value| value.as_str())
            .collect();
        let properties = schema["properties"].as_object().unwrap();

        assert_eq!(required.len(), 6);
        assert_eq!(properties.len(), 6);
        for field in required {
            assert!(properties.contains_key(field), "{} not declared", field);
        }
        assert_eq!(schema["properties"]["overall_score"]["type"], "INTEGER");
        assert_eq!(schema["properties"]["action_items"]["items"]["type"], "STRING");
    }
}
