//! Per-control suggestion state: requests, selection and enrichment.

pub mod cache;
pub mod transport;

pub use cache::{build_cache_key, CacheStats, SuggestionsCache};
pub use transport::{MemoryTransport, RecordedRequest, SuggestionTransport};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::address::{
    bounded_kladr_id, copy_data_components, filtered_location, Bounds, ComposeOptions, ConstraintSpec, Constraints,
};
use crate::common::IdGenerator;
use crate::error::Result;
use crate::highlight::{HighlightOptions, HighlightProcessor};
use crate::matcher::find_match;
use crate::metrics::Metrics;
use crate::r#type::{Classes, Suggestion, SuggestionType, TypeContext, ValueFlags};

/// Replaces the type's list item renderer: `(value, current_value, suggestion)`.
pub type FormatResultFn = Arc<dyn Fn(&str, &str, &Suggestion) -> String + Send + Sync>;
/// Replaces the type's selected-value formatter.
pub type FormatSelectedFn = Arc<dyn Fn(&Suggestion) -> Option<String> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    #[serde(rename = "type")]
    pub suggestion_type: String,
    /// Address level range, e.g. `"city-settlement"`.
    pub bounds: Option<String>,
    pub constraints: Vec<ConstraintSpec>,
    pub restrict_value: bool,
    pub count: usize,
    pub min_chars: usize,
    pub enrichment_enabled: bool,
    pub no_cache: bool,
    pub prevent_bad_queries: bool,
    pub trigger_select_on_blur: bool,
    pub mobile: bool,
    pub language: Option<String>,
    /// Overrides the type's hint; an empty string disables it.
    pub no_suggestions_hint: Option<String>,
    /// Extra request parameters.
    pub params: Map<String, Value>,
    pub cache_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            suggestion_type: "ADDRESS".to_string(),
            bounds: None,
            constraints: Vec::new(),
            restrict_value: false,
            count: 5,
            min_chars: 1,
            enrichment_enabled: true,
            no_cache: false,
            prevent_bad_queries: false,
            trigger_select_on_blur: true,
            mobile: false,
            language: None,
            no_suggestions_hint: None,
            params: Map::new(),
            cache_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    /// Don't append a space to an incomplete value.
    pub no_space: bool,
    /// Ask for the next level right after selecting.
    pub continue_selecting: bool,
    pub dont_enrich: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Selected {
        suggestion: Suggestion,
        value: String,
        /// The input value differs from the one before selection.
        value_changed: bool,
        /// The same suggestion was already selected.
        reselected: bool,
    },
    Nothing,
}

pub struct Session {
    id: String,
    options: SessionOptions,
    suggestion_type: SuggestionType,
    bounds: Bounds,
    constraints: Constraints,
    ids: IdGenerator,
    classes: Classes,
    highlighter: HighlightProcessor,
    transport: Arc<dyn SuggestionTransport>,
    cache: SuggestionsCache,
    metrics: Metrics,
    current_value: String,
    suggestions: Vec<Suggestion>,
    selected_index: Option<usize>,
    selection: Option<Suggestion>,
    visible: bool,
    format_result: Option<FormatResultFn>,
    format_selected: Option<FormatSelectedFn>,
}

impl Session {
    pub fn new(options: SessionOptions, transport: Arc<dyn SuggestionTransport>) -> Self {
        let suggestion_type = SuggestionType::resolve(&options.suggestion_type);
        let mut ids = IdGenerator::new();
        let id = ids.next_id("i");

        let bounds = match (suggestion_type.data_components(), options.bounds.as_deref()) {
            (Some(components), Some(range)) => Bounds::resolve(range, components),
            (None, Some(range)) => {
                warn!(bounds = %range, kind = %suggestion_type.name(), "Bounds are not supported by the type");
                Bounds::default()
            }
            _ => Bounds::default(),
        };

        let metrics = Metrics::new(suggestion_type.name());
        let cache = SuggestionsCache::new(options.cache_size);
        let mut session = Session {
            id,
            options,
            suggestion_type,
            bounds,
            constraints: Constraints::new(),
            ids,
            classes: Classes::default(),
            highlighter: HighlightProcessor::default(),
            transport,
            cache,
            metrics,
            current_value: String::new(),
            suggestions: Vec::new(),
            selected_index: None,
            selection: None,
            visible: false,
            format_result: None,
            format_selected: None,
        };

        let specs = session.options.constraints.clone();
        for spec in &specs {
            session.add_constraint(spec);
        }
        debug!(id = %session.id, kind = %session.suggestion_type.name(), "Session created");
        session
    }

    pub fn with_highlighter(mut self, highlighter: HighlightProcessor) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn with_classes(mut self, classes: Classes) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_format_result(mut self, format_result: FormatResultFn) -> Self {
        self.format_result = Some(format_result);
        self
    }

    pub fn with_format_selected(mut self, format_selected: FormatSelectedFn) -> Self {
        self.format_selected = Some(format_selected);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn suggestion_type(&self) -> &SuggestionType {
        &self.suggestion_type
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn selection(&self) -> Option<&Suggestion> {
        self.selection.as_ref()
    }

    pub fn current_value(&self) -> &str {
        &self.current_value
    }

    /// Input text typed or restored without a request.
    pub fn set_input_value(&mut self, value: &str) {
        self.current_value = value.to_string();
        self.selected_index = None;
    }

    /// Whether the suggestion list would be shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn context(&self) -> TypeContext<'_> {
        TypeContext {
            bounds: &self.bounds,
            constraints: &self.constraints,
            restrict_value: self.options.restrict_value,
            params: &self.options.params,
            classes: &self.classes,
            is_mobile: self.options.mobile,
            highlighter: &self.highlighter,
        }
    }

    /// Adds a constraint, returning its id when it has valid locations.
    pub fn add_constraint(&mut self, spec: &ConstraintSpec) -> Option<String> {
        let Some(components) = self.suggestion_type.data_components() else {
            warn!(kind = %self.suggestion_type.name(), "Constraints are not supported by the type");
            return None;
        };
        let compose_label = self.suggestion_type == SuggestionType::Address;
        let id = self
            .constraints
            .add(spec, &mut self.ids, components, compose_label);
        if id.is_none() {
            warn!(session = %self.id, "Ignoring constraint without valid locations");
        }
        id
    }

    pub fn remove_constraint(&mut self, id: &str) -> bool {
        self.constraints.remove(id).is_some()
    }

    /// Restricts the session to the location selected in a parent control.
    pub fn constrain_to_parent(&mut self, parent: &Suggestion) -> Option<String> {
        let components = self.suggestion_type.data_components()?;
        let mut location = filtered_location(parent.data_or_null(), components)?;
        // a city request restricted by a city finds nothing
        if self.bounds.own.contains(&"city") {
            location.remove("city_fias_id");
        }

        self.constraints = Constraints::new();
        self.options.restrict_value = true;
        let spec = ConstraintSpec {
            locations: Some(Value::Object(location)),
            label: None,
            deletable: false,
        };
        self.add_constraint(&spec)
    }

    pub fn no_suggestions_hint(&self) -> Option<String> {
        match &self.options.no_suggestions_hint {
            Some(hint) if hint.is_empty() => None,
            Some(hint) => Some(hint.clone()),
            None => self.suggestion_type.no_suggestions_hint().map(str::to_string),
        }
    }

    pub fn is_query_requestable(&self, query: &str) -> bool {
        query.chars().count() >= self.options.min_chars && self.suggestion_type.is_query_requestable(query)
    }

    /// Parameters of a suggestions request for `query`.
    pub fn request_params(&self, query: &str) -> Map<String, Value> {
        let mut params = self.options.params.clone();
        if self.suggestion_type.data_components().is_some() {
            params.extend(self.bounds.params());
            params.extend(self.constraints.location_params(self.options.restrict_value));
        }
        params.insert("query".to_string(), Value::String(query.to_string()));
        if self.options.count > 0 {
            params.insert("count".to_string(), json!(self.options.count));
        }
        if let Some(language) = &self.options.language {
            params.insert("language".to_string(), Value::String(language.clone()));
        }
        params
    }

    /// Values are shown restricted only under a single constraint.
    fn should_restrict_values(&self) -> bool {
        self.options.restrict_value && self.constraints.len() == 1
    }

    fn set_unrestricted_values(&self, suggestions: &mut [Suggestion]) {
        let label = self.constraints.first_label();
        let restrict = self.should_restrict_values();
        for suggestion in suggestions.iter_mut().filter(|s| s.unrestricted_value.is_empty()) {
            suggestion.unrestricted_value = if restrict {
                format!("{}, {}", label, suggestion.value)
            } else {
                suggestion.value.clone()
            };
        }
    }

    async fn fetch(
        &mut self,
        query: &str,
        custom_params: Map<String, Value>,
        method: &str,
        for_enrichment: bool,
    ) -> Result<Vec<Suggestion>> {
        let mut params = self.request_params(query);
        params.extend(custom_params);
        let key = build_cache_key(&params);

        if let Some(cached) = self.cache.response(&key) {
            self.metrics.record_cache_hit();
            return Ok(cached);
        }
        if self.options.prevent_bad_queries && self.cache.is_bad_query(query) {
            debug!(query = %query, "Skipping query extending one without results");
            return Ok(Vec::new());
        }

        let url_suffix = self.suggestion_type.url_suffix();
        let mut suggestions = match self.transport.fetch_suggestions(method, &url_suffix, &params).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                self.metrics.record_fetch_error();
                return Err(err);
            }
        };
        self.metrics.record_fetch(suggestions.len());
        self.set_unrestricted_values(&mut suggestions);

        if !self.options.no_cache {
            if for_enrichment {
                if let Some(first) = suggestions.first() {
                    self.cache.put_enrichment(query, first.clone());
                }
            } else {
                self.cache.inject_enrichment(query, &mut suggestions);
                self.cache.put_response(key, suggestions.clone());
                if self.options.prevent_bad_queries && suggestions.is_empty() {
                    self.cache.add_bad_query(query);
                }
            }
        }
        Ok(suggestions)
    }

    /// Fetches suggestions for `query` and makes them the current list.
    ///
    /// A failed request leaves the list empty.
    pub async fn update_suggestions(&mut self, query: &str) -> &[Suggestion] {
        self.current_value = query.to_string();
        self.selected_index = None;

        if !self.is_query_requestable(query) {
            self.suggestions.clear();
            self.visible = false;
            return &self.suggestions;
        }

        match self.fetch(query, Map::new(), "suggest", false).await {
            Ok(suggestions) => self.suggestions = suggestions,
            Err(err) => {
                warn!(query = %query, error = %err, "Failed to fetch suggestions");
                self.suggestions.clear();
            }
        }
        self.visible = !self.suggestions.is_empty() || self.no_suggestions_hint().is_some();
        &self.suggestions
    }

    /// Marks a list item as active, as keyboard navigation does.
    pub fn activate(&mut self, index: Option<usize>) {
        self.selected_index = index.filter(|i| *i < self.suggestions.len());
    }

    /// The active item, else the suggestion matching `value`.
    pub fn find_suggestion_index(&self, value: &str) -> Option<usize> {
        if self.selected_index.is_some() {
            return self.selected_index;
        }
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let found = find_match(&self.suggestion_type.matchers(), value, &self.suggestions);
        if found.is_some() {
            self.metrics.record_match();
        }
        found
    }

    fn has_same_values(&self, index: usize) -> bool {
        let Some(suggestion) = self.suggestions.get(index) else {
            return false;
        };
        self.suggestions
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && other.value == suggestion.value)
    }

    /// Enriched suggestion and whether enrichment took place.
    async fn enrich(&mut self, suggestion: Suggestion, options: SelectionOptions) -> (Suggestion, bool) {
        if !self.options.enrichment_enabled || options.dont_enrich || suggestion.is_enriched() {
            return (suggestion, false);
        }
        let Some(enrichment) = self.suggestion_type.enrichment(&suggestion) else {
            return (suggestion, false);
        };

        if let Some(cached) = self.cache.enrichment(&enrichment.query) {
            return (cached, true);
        }

        self.metrics.record_enrichment();
        match self
            .fetch(&enrichment.query, enrichment.params, enrichment.method, true)
            .await
        {
            Ok(found) => match found.into_iter().next() {
                Some(enriched) => (enriched, true),
                None => (suggestion, false),
            },
            Err(err) => {
                debug!(query = %enrichment.query, error = %err, "Enrichment failed");
                (suggestion, false)
            }
        }
    }

    /// Rebuilds the value from the bounded components.
    fn check_value_bounds(&self, suggestion: &mut Suggestion) {
        let Some(components) = self.suggestion_type.data_components() else {
            return;
        };
        if self.bounds.own.is_empty() || !self.suggestion_type.composes_value() {
            return;
        }
        let data = copy_data_components(suggestion.data_or_null(), &self.bounds.value_components(), components);
        if let Some(value) = self
            .suggestion_type
            .compose_value(&Value::Object(data), ComposeOptions::default())
        {
            suggestion.value = value;
        }
    }

    /// Text put into the input for a selected suggestion.
    pub fn suggestion_value(&self, suggestion: &Suggestion, flags: ValueFlags) -> String {
        let formatted = match &self.format_selected {
            Some(format_selected) => format_selected(suggestion),
            None => self.suggestion_type.format_selected(suggestion),
        };
        if let Some(value) = formatted {
            return value;
        }
        self.suggestion_type
            .suggestion_value(suggestion, &self.context(), flags)
            .unwrap_or_else(|| suggestion.value.clone())
    }

    async fn on_select_complete(&mut self, continue_selecting: bool) {
        if continue_selecting {
            let value = self.current_value.clone();
            self.update_suggestions(&value).await;
        } else {
            self.visible = false;
        }
    }

    /// Selects the suggestion at `index`, enriching it first.
    pub async fn select(&mut self, index: Option<usize>, options: SelectionOptions) -> SelectOutcome {
        let last_value = self.current_value.clone();
        let Some((index, suggestion)) = index.and_then(|i| self.suggestions.get(i).cloned().map(|s| (i, s))) else {
            if !options.continue_selecting && self.selection.is_none() {
                self.metrics.record_select_nothing();
            }
            self.on_select_complete(options.continue_selecting).await;
            return SelectOutcome::Nothing;
        };

        let has_same_values = self.has_same_values(index);
        let (suggestion, has_been_enriched) = self.enrich(suggestion, options).await;
        let flags = ValueFlags {
            has_same_values,
            has_been_enriched,
        };
        self.select_suggestion(suggestion, Some(index), &last_value, options, flags)
            .await
    }

    async fn select_suggestion(
        &mut self,
        mut suggestion: Suggestion,
        index: Option<usize>,
        last_value: &str,
        options: SelectionOptions,
        flags: ValueFlags,
    ) -> SelectOutcome {
        let complete = self
            .suggestion_type
            .is_data_complete(&suggestion, &self.context());
        let continue_selecting = options.continue_selecting && !complete;

        if flags.has_been_enriched {
            if let Some(listed) = index.and_then(|i| self.suggestions.get_mut(i)) {
                listed.data = suggestion.data.clone();
            }
        }

        self.check_value_bounds(&mut suggestion);
        let mut value = self.suggestion_value(&suggestion, flags);
        if !value.is_empty() && !options.no_space && !complete {
            value.push(' ');
        }
        self.current_value = value.clone();

        if value.is_empty() {
            self.selection = None;
            self.metrics.record_select_nothing();
            return SelectOutcome::Nothing;
        }

        let reselected = self
            .selection
            .as_ref()
            .map_or(false, |current| current.value == suggestion.value && current.data == suggestion.data);
        if !reselected {
            self.metrics.record_select();
        }
        debug!(session = %self.id, value = %value, complete, "Suggestion selected");

        self.selection = Some(suggestion.clone());
        self.on_select_complete(continue_selecting).await;

        SelectOutcome::Selected {
            suggestion,
            value_changed: value != last_value,
            value,
            reselected,
        }
    }

    /// Selects the active or matching suggestion for the current input.
    pub async fn select_current_value(&mut self, options: SelectionOptions) -> SelectOutcome {
        // already selected and not edited since
        if self.selection.is_some() && !self.visible {
            return SelectOutcome::Nothing;
        }
        let index = self.find_suggestion_index(&self.current_value);
        self.select(index, options).await
    }

    pub async fn select_on_blur(&mut self) -> SelectOutcome {
        let outcome = if self.options.trigger_select_on_blur {
            self.select_current_value(SelectionOptions {
                no_space: true,
                ..Default::default()
            })
            .await
        } else {
            SelectOutcome::Nothing
        };
        self.visible = false;
        outcome
    }

    /// Looks up the full record for the current input, selecting it or
    /// dropping the selection.
    pub async fn fix_data(&mut self) -> Option<Suggestion> {
        let last_value = self.current_value.clone();
        let query = last_value.trim().to_string();

        if !self.is_query_requestable(&query) {
            self.selection = None;
            return None;
        }

        self.current_value = query.clone();
        let custom_params = match json!({ "count": 1, "from_bound": null, "to_bound": null }) {
            Value::Object(params) => params,
            _ => Map::new(),
        };

        let found = match self.fetch(&query, custom_params, "suggest", false).await {
            Ok(found) => found.into_iter().next(),
            Err(err) => {
                debug!(query = %query, error = %err, "Fixing data failed");
                None
            }
        };
        let Some(suggestion) = found else {
            self.selection = None;
            return None;
        };

        let flags = ValueFlags {
            has_same_values: false,
            has_been_enriched: true,
        };
        let options = SelectionOptions {
            no_space: true,
            ..Default::default()
        };
        self.select_suggestion(suggestion, None, &last_value, options, flags)
            .await;
        self.selection.clone()
    }

    /// Makes `suggestion` the selection without a request, trimming its
    /// data to the bounds. Suggestions without object data are ignored.
    pub fn set_suggestion(&mut self, suggestion: Suggestion) -> bool {
        if !matches!(suggestion.data, Some(Value::Object(_))) {
            return false;
        }
        let mut suggestion = suggestion;

        if !self.bounds.own.is_empty() {
            self.check_value_bounds(&mut suggestion);
            if let Some(components) = self.suggestion_type.data_components() {
                let mut data = copy_data_components(suggestion.data_or_null(), &self.bounds.all, components);
                if let Some(kladr_id) = suggestion.data_text("kladr_id") {
                    if let Some(bounded) = bounded_kladr_id(&kladr_id, &self.bounds.all, components) {
                        data.insert("kladr_id".to_string(), Value::String(bounded));
                    }
                }
                suggestion.data = Some(Value::Object(data));
            }
        }

        self.suggestions = vec![suggestion.clone()];
        self.current_value = self.suggestion_value(&suggestion, ValueFlags::default());
        self.selection = Some(suggestion);
        self.visible = false;
        true
    }

    /// Resets the session, returning the dropped selection.
    pub fn clear(&mut self) -> Option<Suggestion> {
        self.cache.clear();
        self.current_value.clear();
        self.suggestions.clear();
        self.selected_index = None;
        self.visible = false;
        self.selection.take()
    }

    /// HTML of the list item at `index`.
    pub fn format_result(&self, index: usize) -> Option<String> {
        let suggestion = self.suggestions.get(index)?;
        let html = match &self.format_result {
            Some(format_result) => format_result(&suggestion.value, &self.current_value, suggestion),
            None => {
                let options = HighlightOptions::with_stopwords(self.suggestion_type.unformattable_tokens());
                self.suggestion_type.format_result(
                    &suggestion.value,
                    &self.current_value,
                    suggestion,
                    &self.context(),
                    &options,
                )
            }
        };
        Some(html)
    }
}
