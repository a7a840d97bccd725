use regex::Regex;
use serde_json::{Map, Value};

use super::Suggestion;
use crate::charset::WORD_DELIMITERS;
use crate::common::fields_are_not_empty;

/// Russian labels of the name parts.
pub const FIELD_NAMES: &[(&str, &str)] = &[("surname", "фамилия"), ("name", "имя"), ("patronymic", "отчество")];

/// `true` if the value begins with the data field as a whole word.
fn value_starts_with(suggestion: &Suggestion, field: &str) -> bool {
    let Some(field_value) = suggestion.data_text(field) else {
        return false;
    };
    Regex::new(&format!(
        "(?i)^{}([{}]|$)",
        regex::escape(&field_value),
        WORD_DELIMITERS
    ))
    .map_or(false, |pattern| pattern.is_match(&suggestion.value))
}

/// Required parts come from `params.parts`; otherwise surname and name, plus
/// the patronymic when the value is written surname first.
pub(super) fn is_data_complete(suggestion: &Suggestion, params: &Map<String, Value>) -> bool {
    let fields: Vec<String> = match params.get("parts").and_then(Value::as_array) {
        Some(parts) => parts
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        None => {
            let mut fields = vec!["surname".to_string(), "name".to_string()];
            if value_starts_with(suggestion, "surname") {
                fields.push("patronymic".to_string());
            }
            fields
        }
    };
    fields_are_not_empty(suggestion.data_or_null(), &fields)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_name_first_needs_no_patronymic() {
        let suggestion = Suggestion::new("Иван Иванов").with_data(json!({
            "surname": "Иванов",
            "name": "Иван",
            "patronymic": null,
        }));
        assert!(is_data_complete(&suggestion, &Map::new()));
    }

    #[test]
    fn test_surname_first_needs_patronymic() {
        let suggestion = Suggestion::new("Иванов Иван").with_data(json!({
            "surname": "Иванов",
            "name": "Иван",
            "patronymic": null,
        }));
        assert!(!is_data_complete(&suggestion, &Map::new()));

        let suggestion = Suggestion::new("Иванов Иван Иванович").with_data(json!({
            "surname": "Иванов",
            "name": "Иван",
            "patronymic": "Иванович",
        }));
        assert!(is_data_complete(&suggestion, &Map::new()));
    }

    #[test]
    fn test_surname_prefix_is_not_surname_first() {
        let suggestion = Suggestion::new("Иванова").with_data(json!({ "surname": "Иванов", "name": "Анна" }));
        assert!(!value_starts_with(&suggestion, "surname"));
    }

    #[test]
    fn test_parts_param() {
        let suggestion = Suggestion::new("Иван").with_data(json!({ "name": "Иван", "surname": null }));
        let params = json!({ "parts": ["NAME"] });
        assert!(is_data_complete(&suggestion, params.as_object().unwrap()));
        assert!(!is_data_complete(&suggestion, &Map::new()));
    }

    #[test]
    fn test_missing_data_is_incomplete() {
        assert!(!is_data_complete(&Suggestion::new("Иван"), &Map::new()));
    }
}
