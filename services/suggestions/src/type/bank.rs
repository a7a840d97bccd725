use regex::Regex;

use super::{format_subtext_address, wrap_formatted_value, Suggestion, TypeContext};
use crate::highlight::HighlightOptions;

lazy_static::lazy_static! {
    static ref ADDRESS_PREFIX: Regex = Regex::new(r"(?i)^\d{6}( РОССИЯ)?, ").unwrap();
}

pub(super) fn format_result(
    value: &str,
    current_value: &str,
    suggestion: &Suggestion,
    ctx: &TypeContext,
    options: &HighlightOptions,
) -> String {
    let highlighter = ctx.highlighter;
    let bic = highlighter.highlight(
        &suggestion.data_text("bic").unwrap_or_default(),
        current_value,
        &HighlightOptions::default(),
    );

    let highlighted = highlighter.highlight(value, current_value, options);
    let mut html = wrap_formatted_value(&highlighted, suggestion, ctx.classes);

    let address = suggestion
        .data_text("address.value")
        .map(|address| {
            let address = ADDRESS_PREFIX.replace(&address, "");
            format_subtext_address(&address, current_value, ctx)
        })
        .unwrap_or_default();

    if !bic.is_empty() || !address.is_empty() {
        html.push_str(&format!(
            "<div class=\"{}\"><span class=\"{}\">{}</span>{}</div>",
            ctx.classes.subtext, ctx.classes.subtext_inline, bic, address
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::r#type::tests::Fixture;

    fn bank() -> Suggestion {
        Suggestion::new("СБЕРБАНК РОССИИ").with_data(json!({
            "bic": "044525225",
            "address": { "value": "117997 РОССИЯ, г Москва, ул Вавилова, д 19" },
        }))
    }

    #[test]
    fn test_bic_and_address() {
        let fixture = Fixture::new();
        let html = format_result("СБЕРБАНК РОССИИ", "0445", &bank(), &fixture.ctx(), &HighlightOptions::default());
        assert_eq!(
            html,
            "<span class=\"suggestions-value\">СБЕРБАНК РОССИИ</span>\
             <div class=\"suggestions-subtext\">\
             <span class=\"suggestions-subtext suggestions-subtext_inline\"><strong>0445</strong>25225</span>\
             <span class=\"suggestions-nowrap\">г Москва</span>, \
             <span class=\"suggestions-nowrap\">ул Вавилова</span>, \
             <span class=\"suggestions-nowrap\">д 19</span></div>"
        );
    }

    #[test]
    fn test_without_details() {
        let fixture = Fixture::new();
        let suggestion = Suggestion::new("БАНК");
        assert_eq!(
            format_result("БАНК", "банк", &suggestion, &fixture.ctx(), &HighlightOptions::default()),
            "<span class=\"suggestions-value\"><strong>БАНК</strong></span>"
        );
    }
}
