use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::address::{
    compose_address_value, compose::compose_name_value, AddressComponent, Bounds, ComposeOptions,
    Constraints, ADDRESS_COMPONENTS, ADDRESS_STOPWORDS,
};
use crate::charset::WORD_DELIMITERS;
use crate::common::{escape_html, get_text};
use crate::highlight::{HighlightOptions, HighlightProcessor};
use crate::matcher::{FieldAccessor, Matcher};

mod address;
mod bank;
mod fms;
mod name;
mod party;

const NO_STOPWORDS: &[&str] = &[];

static NULL: Value = Value::Null;

/// One entry of a suggestions response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub value: String,
    #[serde(default)]
    pub unrestricted_value: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Suggestion {
    pub fn new(value: &str) -> Self {
        Suggestion {
            value: value.to_string(),
            unrestricted_value: value.to_string(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_unrestricted_value(mut self, value: &str) -> Self {
        self.unrestricted_value = value.to_string();
        self
    }

    /// The data object, or `null` when there is none.
    pub fn data_or_null(&self) -> &Value {
        self.data.as_ref().unwrap_or(&NULL)
    }

    /// Truthy text at a dotted data path.
    pub fn data_text(&self, path: &str) -> Option<String> {
        self.data.as_ref().and_then(|data| get_text(data, path))
    }

    /// Data that went through the quality check carries a non-null `qc`.
    pub fn is_enriched(&self) -> bool {
        self.data
            .as_ref()
            .and_then(|data| data.get("qc"))
            .map_or(false, |qc| !qc.is_null())
    }
}

/// CSS class names used in rendered markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classes {
    pub hint: String,
    pub mobile: String,
    pub nowrap: String,
    pub selected: String,
    pub suggestion: String,
    pub subtext: String,
    pub subtext_inline: String,
    pub subtext_delimiter: String,
    pub remove_constraint: String,
    pub value: String,
}

impl Default for Classes {
    fn default() -> Self {
        Classes {
            hint: "suggestions-hint".to_string(),
            mobile: "suggestions-mobile".to_string(),
            nowrap: "suggestions-nowrap".to_string(),
            selected: "suggestions-selected".to_string(),
            suggestion: "suggestions-suggestion".to_string(),
            subtext: "suggestions-subtext".to_string(),
            subtext_inline: "suggestions-subtext suggestions-subtext_inline".to_string(),
            subtext_delimiter: "suggestions-subtext-delimiter".to_string(),
            remove_constraint: "suggestions-remove".to_string(),
            value: "suggestions-value".to_string(),
        }
    }
}

/// Session state a type bundle needs to make its decisions.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    pub bounds: &'a Bounds,
    pub constraints: &'a Constraints,
    pub restrict_value: bool,
    pub params: &'a Map<String, Value>,
    pub classes: &'a Classes,
    pub is_mobile: bool,
    pub highlighter: &'a HighlightProcessor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueFlags {
    pub has_same_values: bool,
    pub has_been_enriched: bool,
}

/// A follow-up request that fetches the full record for a suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub method: &'static str,
    pub query: String,
    pub params: Map<String, Value>,
}

/// Kind of entity being suggested, with its per-kind behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SuggestionType {
    Name,
    Address,
    Party,
    Email,
    Bank,
    Fms,
    /// Any other dictionary served under its own lowercased name.
    Outward(String),
}

impl SuggestionType {
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "NAME" => SuggestionType::Name,
            "ADDRESS" => SuggestionType::Address,
            "PARTY" => SuggestionType::Party,
            "EMAIL" => SuggestionType::Email,
            "BANK" => SuggestionType::Bank,
            "FMS" => SuggestionType::Fms,
            _ => SuggestionType::Outward(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SuggestionType::Name => "NAME",
            SuggestionType::Address => "ADDRESS",
            SuggestionType::Party => "PARTY",
            SuggestionType::Email => "EMAIL",
            SuggestionType::Bank => "BANK",
            SuggestionType::Fms => "FMS",
            SuggestionType::Outward(name) => name,
        }
    }

    pub fn url_suffix(&self) -> String {
        match self {
            SuggestionType::Name => "fio".to_string(),
            SuggestionType::Address => "address".to_string(),
            SuggestionType::Party => "party".to_string(),
            SuggestionType::Email => "email".to_string(),
            SuggestionType::Bank => "bank".to_string(),
            SuggestionType::Fms => "fms_unit".to_string(),
            SuggestionType::Outward(name) => name.to_lowercase(),
        }
    }

    /// Labels of the data fields a value is made of.
    pub fn field_names(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            SuggestionType::Name => name::FIELD_NAMES,
            _ => &[],
        }
    }

    pub fn no_suggestions_hint(&self) -> Option<&'static str> {
        match self {
            SuggestionType::Name | SuggestionType::Email => None,
            SuggestionType::Address => Some("Неизвестный адрес"),
            SuggestionType::Party => Some("Неизвестная организация"),
            SuggestionType::Bank => Some("Неизвестный банк"),
            SuggestionType::Fms => Some("Неизвестное подразделение"),
            SuggestionType::Outward(_) => Some("Неизвестное значение"),
        }
    }

    /// Matchers tried in order when looking for the suggestion equal to the input.
    pub fn matchers(&self) -> Vec<Matcher> {
        match self {
            SuggestionType::Address => vec![
                Matcher::by_normalized_query(ADDRESS_STOPWORDS),
                Matcher::by_words(ADDRESS_STOPWORDS),
            ],
            SuggestionType::Party => vec![Matcher::by_fields(vec![
                FieldAccessor::value(),
                FieldAccessor::data_path("address.value").with_stopwords(ADDRESS_STOPWORDS),
                FieldAccessor::data_path("inn"),
                FieldAccessor::data_path("ogrn"),
            ])],
            SuggestionType::Bank => vec![Matcher::by_fields(vec![
                FieldAccessor::value(),
                FieldAccessor::data_path("bic"),
                FieldAccessor::data_path("swift"),
            ])],
            SuggestionType::Email => vec![Matcher::by_normalized_query(NO_STOPWORDS)],
            SuggestionType::Name | SuggestionType::Fms | SuggestionType::Outward(_) => vec![
                Matcher::by_normalized_query(NO_STOPWORDS),
                Matcher::by_words(NO_STOPWORDS),
            ],
        }
    }

    /// Words left unhighlighted in rendered results.
    pub fn unformattable_tokens(&self) -> &'static [&'static str] {
        match self {
            SuggestionType::Address => ADDRESS_STOPWORDS,
            _ => NO_STOPWORDS,
        }
    }

    pub fn data_components(&self) -> Option<&'static [AddressComponent]> {
        match self {
            SuggestionType::Address | SuggestionType::Party | SuggestionType::Bank => Some(ADDRESS_COMPONENTS),
            _ => None,
        }
    }

    pub fn geo_enabled(&self) -> bool {
        matches!(self, SuggestionType::Address | SuggestionType::Party | SuggestionType::Bank)
    }

    pub fn enrichment_enabled(&self) -> bool {
        matches!(self, SuggestionType::Address | SuggestionType::Party | SuggestionType::Bank)
    }

    /// The enrichment request for `suggestion`, if the type supports one.
    pub fn enrichment(&self, suggestion: &Suggestion) -> Option<Enrichment> {
        let (method, query, params) = match self {
            SuggestionType::Address => (
                "suggest",
                Some(suggestion.unrestricted_value.clone()).filter(|query| !query.is_empty()),
                json!({
                    "count": 1,
                    "locations": null,
                    "locations_boost": null,
                    "from_bound": null,
                    "to_bound": null,
                }),
            ),
            SuggestionType::Party => (
                "findById",
                suggestion.data_text("hid"),
                json!({ "count": 1, "locations_boost": null }),
            ),
            SuggestionType::Bank => ("findById", suggestion.data_text("bic"), json!({ "count": 1 })),
            _ => return None,
        };

        let Value::Object(params) = params else {
            return None;
        };
        Some(Enrichment {
            method,
            query: query?,
            params,
        })
    }

    pub fn is_query_requestable(&self, query: &str) -> bool {
        match self {
            SuggestionType::Email => query.contains('@'),
            _ => true,
        }
    }

    pub fn is_data_complete(&self, suggestion: &Suggestion, ctx: &TypeContext) -> bool {
        match self {
            SuggestionType::Address => address::is_data_complete(suggestion, ctx.bounds),
            SuggestionType::Name => name::is_data_complete(suggestion, ctx.params),
            _ => true,
        }
    }

    /// Only address and name values can be rebuilt from their data.
    pub fn composes_value(&self) -> bool {
        matches!(self, SuggestionType::Address | SuggestionType::Name)
    }

    pub fn compose_value(&self, data: &Value, options: ComposeOptions) -> Option<String> {
        match self {
            SuggestionType::Address => Some(compose_address_value(data, options)),
            SuggestionType::Name => Some(compose_name_value(data)),
            _ => None,
        }
    }

    /// Text put into the input on selection, when it differs from the value.
    pub fn format_selected(&self, suggestion: &Suggestion) -> Option<String> {
        match self {
            SuggestionType::Bank => suggestion.data_text("name.payment"),
            _ => None,
        }
    }

    /// Value for a selected suggestion that must be rebuilt from its data.
    pub fn suggestion_value(&self, suggestion: &Suggestion, ctx: &TypeContext, flags: ValueFlags) -> Option<String> {
        match self {
            SuggestionType::Address => address::suggestion_value(suggestion, ctx, flags),
            _ => None,
        }
    }

    /// Renders one list item as HTML.
    pub fn format_result(
        &self,
        value: &str,
        current_value: &str,
        suggestion: &Suggestion,
        ctx: &TypeContext,
        options: &HighlightOptions,
    ) -> String {
        match self {
            SuggestionType::Address => address::format_result(value, current_value, suggestion, ctx, options),
            SuggestionType::Party => party::format_result(value, current_value, suggestion, ctx, options),
            SuggestionType::Bank => bank::format_result(value, current_value, suggestion, ctx, options),
            SuggestionType::Fms => fms::format_result(suggestion),
            _ => default_format_result(value, current_value, suggestion, ctx, options),
        }
    }
}

lazy_static::lazy_static! {
    static ref FIRST_TWO_WORDS: Regex = Regex::new(&format!(
        "^([^{d}]+[{d}]+[^{d}]+).*",
        d = WORD_DELIMITERS
    ))
    .unwrap();
}

/// Address subtext: highlighted on desktop, cut to two words on mobile.
fn format_subtext_address(address: &str, current_value: &str, ctx: &TypeContext) -> String {
    if ctx.is_mobile {
        escape_html(&FIRST_TWO_WORDS.replace(address, "$1"))
    } else {
        ctx.highlighter
            .highlight(address, current_value, &HighlightOptions::with_stopwords(ADDRESS_STOPWORDS))
    }
}

/// Highlights the value and wraps it into the value span.
pub fn default_format_result(
    value: &str,
    current_value: &str,
    suggestion: &Suggestion,
    ctx: &TypeContext,
    options: &HighlightOptions,
) -> String {
    let html = ctx.highlighter.highlight(value, current_value, options);
    wrap_formatted_value(&html, suggestion, ctx.classes)
}

pub fn wrap_formatted_value(html: &str, suggestion: &Suggestion, classes: &Classes) -> String {
    match suggestion.data_text("state.status") {
        Some(status) => format!(
            "<span class=\"{}\" data-suggestion-status=\"{}\">{}</span>",
            classes.value,
            escape_html(&status),
            html
        ),
        None => format!("<span class=\"{}\">{}</span>", classes.value, html),
    }
}
