use serde_json::Value;

use super::{wrap_formatted_value, Suggestion, TypeContext, ValueFlags};
use crate::address::{
    compose_address_value, components_below, copy_data_components, Bounds, ComposeOptions, ADDRESS_COMPONENTS,
};
use crate::charset::format_token;
use crate::common::{as_text, fields_are_not_empty};
use crate::highlight::HighlightOptions;
use crate::tokenizer::tokenize_words;

/// Complete means the lowest bound (or the flat) is filled in.
pub(super) fn is_data_complete(suggestion: &Suggestion, bounds: &Bounds) -> bool {
    let field = bounds.to.unwrap_or("flat");
    match &suggestion.data {
        Some(data) if data.is_object() => fields_are_not_empty(data, &[field]),
        _ => true,
    }
}

/// Query words not found in the value. The value keeps its case, so a
/// capitalized word never counts as used.
fn unused_tokens(tokens: Vec<String>, value: &str) -> Vec<String> {
    tokens
        .into_iter()
        .filter(|token| !value.contains(token.as_str()))
        .collect()
}

/// Former names that explain the words the current value doesn't contain.
fn formatted_history_values(unused_tokens: &[String], history_values: &[String]) -> String {
    let values: Vec<&str> = history_values
        .iter()
        .filter(|history_value| {
            let normalized = format_token(history_value);
            unused_tokens.iter().any(|token| normalized.contains(token.as_str()))
        })
        .map(String::as_str)
        .collect();

    if values.is_empty() {
        String::new()
    } else {
        format!(" (бывш. {})", values.join(", "))
    }
}

fn history_values(suggestion: &Suggestion) -> Vec<String> {
    suggestion
        .data
        .as_ref()
        .and_then(|data| data.get("history_values"))
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(as_text).collect())
        .unwrap_or_default()
}

fn has_components_below_district(suggestion: &Suggestion) -> bool {
    let below = components_below(ADDRESS_COMPONENTS, "city_district");
    !copy_data_components(suggestion.data_or_null(), &below, ADDRESS_COMPONENTS).is_empty()
}

pub(super) fn format_result(
    value: &str,
    current_value: &str,
    suggestion: &Suggestion,
    ctx: &TypeContext,
    options: &HighlightOptions,
) -> String {
    let mut value = value.to_string();

    let history = history_values(suggestion);
    if !history.is_empty() {
        let tokens = tokenize_words(current_value, options.unformattable_tokens.as_slice());
        let unused = unused_tokens(tokens, &value);
        value.push_str(&formatted_history_values(&unused, &history));
    }

    let highlighted = ctx.highlighter.highlight(&value, current_value, options);
    let mut html = wrap_formatted_value(&highlighted, suggestion, ctx.classes);

    if let Some(district) = suggestion.data_text("city_district_with_type") {
        let own = &ctx.bounds.own;
        if (own.is_empty() || own.contains(&"street")) && has_components_below_district(suggestion) {
            html.push_str(&format!(
                "<div class=\"{}\">{}</div>",
                ctx.classes.subtext,
                ctx.highlighter
                    .highlight(&district, current_value, &HighlightOptions::default())
            ));
        }
    }

    html
}

fn value_within_constraints(suggestion: &Suggestion, ctx: &TypeContext, options: ComposeOptions) -> String {
    let data = ctx
        .constraints
        .unrestricted_data(suggestion.data_or_null(), ADDRESS_COMPONENTS);
    compose_address_value(&data, options)
}

fn value_within_bounds(suggestion: &Suggestion, ctx: &TypeContext) -> String {
    let mut ids = ctx.bounds.own.clone();
    ids.push("city_district_fias_id");
    let data = copy_data_components(suggestion.data_or_null(), &ids, ADDRESS_COMPONENTS);
    compose_address_value(&Value::Object(data), ComposeOptions::default())
}

pub(super) fn suggestion_value(suggestion: &Suggestion, ctx: &TypeContext, flags: ValueFlags) -> Option<String> {
    if flags.has_same_values {
        if ctx.restrict_value {
            // constrained components must be left out
            Some(value_within_constraints(suggestion, ctx, ComposeOptions::default()))
        } else if !ctx.bounds.own.is_empty() {
            Some(value_within_bounds(suggestion, ctx))
        } else {
            Some(suggestion.unrestricted_value.clone())
        }
    } else if flags.has_been_enriched && ctx.restrict_value {
        Some(value_within_constraints(
            suggestion,
            ctx,
            ComposeOptions {
                exclude_city_district: true,
                ..Default::default()
            },
        ))
    } else {
        None
    }
}
