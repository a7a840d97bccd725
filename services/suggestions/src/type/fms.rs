use super::Suggestion;
use crate::common::escape_html;

/// "{code} — {name}", without highlighting.
pub(super) fn format_result(suggestion: &Suggestion) -> String {
    let code = suggestion.data_text("code").unwrap_or_default();
    let name = suggestion.data_text("name").unwrap_or_default();
    escape_html(&format!("{code} — {name}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_result() {
        let suggestion = Suggestion::new("ОУФМС").with_data(json!({
            "code": "770-001",
            "name": "ОТДЕЛОМ УФМС РОССИИ ПО ГОР. МОСКВЕ",
        }));
        assert_eq!(format_result(&suggestion), "770-001 — ОТДЕЛОМ УФМС РОССИИ ПО ГОР. МОСКВЕ");
    }
}
