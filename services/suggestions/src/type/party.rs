use regex::Regex;

use super::{format_subtext_address, wrap_formatted_value, Suggestion, TypeContext};
use crate::highlight::HighlightOptions;

lazy_static::lazy_static! {
    static ref ADDRESS_PREFIX: Regex = Regex::new(r"(?i)^(\d{6}|Россия),\s+").unwrap();
}

/// Digit groups of an INN by organization type.
fn inn_parts_lengths(party_type: &str) -> Option<&'static [usize]> {
    match party_type {
        "LEGAL" => Some(&[2, 2, 5, 1]),
        "INDIVIDUAL" => Some(&[2, 2, 6, 2]),
        _ => None,
    }
}

/// Highlighted INN split into digit groups with delimiter spans.
///
/// Markup counts towards no group, so a closing tag may open the next one.
fn format_inn(suggestion: &Suggestion, current_value: &str, ctx: &TypeContext) -> Option<String> {
    let inn = suggestion.data_text("inn")?;
    let formatted = ctx
        .highlighter
        .highlight(&inn, current_value, &HighlightOptions::default());

    let Some(lengths) = suggestion
        .data_text("type")
        .and_then(|party_type| inn_parts_lengths(&party_type))
    else {
        return Some(formatted);
    };

    let mut chars = formatted.chars();
    let groups: Vec<String> = lengths
        .iter()
        .map(|&length| {
            let mut remaining = length;
            let mut group = String::new();
            while remaining > 0 {
                let Some(ch) = chars.next() else { break };
                group.push(ch);
                if ch.is_ascii_digit() {
                    remaining -= 1;
                }
            }
            group
        })
        .collect();

    let delimiter = format!("<span class=\"{}\"></span>", ctx.classes.subtext_delimiter);
    let mut result = groups.join(&delimiter);
    result.extend(chars);
    Some(result)
}

pub(super) fn format_result(
    value: &str,
    current_value: &str,
    suggestion: &Suggestion,
    ctx: &TypeContext,
    options: &HighlightOptions,
) -> String {
    let highlighter = ctx.highlighter;
    let plain = HighlightOptions::default();

    let inn = format_inn(suggestion, current_value, ctx).unwrap_or_default();
    let ogrn = highlighter.highlight(
        &suggestion.data_text("ogrn").unwrap_or_default(),
        current_value,
        &plain,
    );
    let inn_ogrn = highlighter.choose(&inn, &ogrn).to_string();
    let management = highlighter.highlight(
        &suggestion.data_text("management.name").unwrap_or_default(),
        current_value,
        &plain,
    );

    let mut options = options.clone();
    if ctx.is_mobile {
        options.max_length = Some(50);
    }

    let name = highlighter.highlight(value, current_value, &options);
    let latin = highlighter.highlight(
        &suggestion.data_text("name.latin").unwrap_or_default(),
        current_value,
        &options,
    );
    let mut html = wrap_formatted_value(highlighter.choose(&name, &latin), suggestion, ctx.classes);

    let address = suggestion
        .data_text("address.value")
        .map(|address| {
            let address = ADDRESS_PREFIX.replace(&address, "");
            format_subtext_address(&address, current_value, ctx)
        })
        .unwrap_or_default();

    if !inn_ogrn.is_empty() || !address.is_empty() || !management.is_empty() {
        html.push_str(&format!(
            "<div class=\"{}\"><span class=\"{}\">{}</span>{}</div>",
            ctx.classes.subtext,
            ctx.classes.subtext_inline,
            inn_ogrn,
            highlighter.choose(&address, &management)
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::r#type::tests::Fixture;

    fn sberbank() -> Suggestion {
        Suggestion::new("ПАО СБЕРБАНК").with_data(json!({
            "inn": "7707083893",
            "ogrn": "1027700132195",
            "type": "LEGAL",
            "name": { "latin": "SBERBANK" },
            "management": { "name": "Греф Герман Оскарович" },
            "address": { "value": "117997, г Москва, ул Вавилова, д 19" },
        }))
    }

    #[test]
    fn test_inn_groups() {
        let fixture = Fixture::new();
        let delimiter = "<span class=\"suggestions-subtext-delimiter\"></span>";
        assert_eq!(
            format_inn(&sberbank(), "", &fixture.ctx()).unwrap(),
            format!("77{d}07{d}08389{d}3", d = delimiter)
        );
        assert_eq!(
            format_inn(&sberbank(), "7707", &fixture.ctx()).unwrap(),
            format!("<strong>77{d}07{d}</strong>08389{d}3", d = delimiter)
        );
    }

    #[test]
    fn test_inn_without_type_is_not_grouped() {
        let fixture = Fixture::new();
        let suggestion = Suggestion::new("ИП").with_data(json!({ "inn": "500100732259" }));
        assert_eq!(format_inn(&suggestion, "", &fixture.ctx()).unwrap(), "500100732259");
    }

    #[test]
    fn test_ogrn_replaces_unmatched_inn() {
        let fixture = Fixture::new();
        let html = format_result("ПАО СБЕРБАНК", "1027700", &sberbank(), &fixture.ctx(), &HighlightOptions::default());
        assert!(html.contains("<span class=\"suggestions-subtext suggestions-subtext_inline\"><strong>1027700</strong>132195</span>"));
    }

    #[test]
    fn test_latin_name_and_address() {
        let fixture = Fixture::new();
        let html = format_result("ПАО СБЕРБАНК", "sber", &sberbank(), &fixture.ctx(), &HighlightOptions::default());
        assert!(html.starts_with("<span class=\"suggestions-value\"><strong>SBER</strong>BANK</span>"));
        assert!(html.contains("</span><span class=\"suggestions-nowrap\">г Москва</span>"));
    }

    #[test]
    fn test_management_replaces_unmatched_address() {
        let fixture = Fixture::new();
        let html = format_result("ПАО СБЕРБАНК", "греф", &sberbank(), &fixture.ctx(), &HighlightOptions::default());
        assert!(html.ends_with("<strong>Греф</strong> Герман Оскарович</div>"));
    }

    #[test]
    fn test_mobile() {
        let mut fixture = Fixture::new();
        fixture.is_mobile = true;
        let html = format_result("ПАО СБЕРБАНК", "", &sberbank(), &fixture.ctx(), &HighlightOptions::default());
        assert!(html.ends_with("</span>г Москва</div>"));
    }
}
