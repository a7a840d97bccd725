//! Location constraints imposed on an address control.

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::compose::{compose_address_value, ComposeOptions};
use super::kladr::{fias_specificity, kladr_specificity, significant_kladr_id};
use super::{component_by_id, AddressComponent, FIAS_PARAM_NAMES};
use crate::common::{as_text, is_truthy, IdGenerator};

/// A constraint as it is configured: one location object or a list of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    #[serde(default, alias = "restrictions")]
    pub locations: Option<Value>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub deletable: bool,
}

/// One location of a constraint, reduced to the fields that identify it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintLocation {
    fields: Map<String, Value>,
    significant_kladr: Option<String>,
    /// Index of the deepest schema component the location pins down.
    pub specificity: Option<usize>,
}

impl ConstraintLocation {
    pub fn new(data: &Value, components: &[AddressComponent]) -> Self {
        let mut fields = Map::new();
        let mut specificity = None;

        if let Some(data) = data.as_object() {
            for (i, component) in components.iter().enumerate() {
                match data.get(component.id) {
                    Some(value) if component.for_locations && is_truthy(value) => {
                        fields.insert(component.id.to_string(), value.clone());
                        specificity = Some(i);
                    }
                    _ => {}
                }
            }
        }

        let fias_names: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|name| FIAS_PARAM_NAMES.contains(name))
            .collect();

        let mut significant_kladr = None;
        if !fias_names.is_empty() {
            specificity = fias_specificity(&fias_names, components);
            fields = fields
                .iter()
                .filter(|(name, _)| FIAS_PARAM_NAMES.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
        } else if let Some(kladr_id) = fields.get("kladr_id").and_then(as_text) {
            let significant = significant_kladr_id(&kladr_id);
            specificity = kladr_specificity(&significant, components);
            significant_kladr = Some(significant);
            fields = Map::new();
            fields.insert("kladr_id".to_string(), Value::String(kladr_id));
        }

        ConstraintLocation {
            fields,
            significant_kladr,
            specificity,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_valid(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Whether suggestion data lies inside this location.
    pub fn contains_data(&self, data: &Value) -> bool {
        if let Some(significant) = &self.significant_kladr {
            return data
                .get("kladr_id")
                .and_then(as_text)
                .map_or(false, |kladr_id| kladr_id.starts_with(significant.as_str()));
        }

        self.fields.iter().all(|(name, expected)| {
            match (data.get(name).and_then(as_text), as_text(expected)) {
                (Some(actual), Some(expected)) => actual.to_lowercase() == expected.to_lowercase(),
                _ => false,
            }
        })
    }

    pub fn label(&self) -> String {
        compose_address_value(
            &Value::Object(self.fields.clone()),
            ComposeOptions {
                save_city_district: true,
                ..Default::default()
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub id: String,
    pub deletable: bool,
    pub locations: Vec<ConstraintLocation>,
    pub label: String,
}

impl Constraint {
    /// Builds a constraint; `None` when no location survives validation.
    /// Without a configured label, one is composed from the locations
    /// when `compose_label` is set.
    pub fn new(
        spec: &ConstraintSpec,
        ids: &mut IdGenerator,
        components: &[AddressComponent],
        compose_label: bool,
    ) -> Option<Self> {
        let id = ids.next_id("c");
        let raw_locations = match &spec.locations {
            Some(Value::Array(items)) => items.clone(),
            Some(location) => vec![location.clone()],
            None => Vec::new(),
        };

        let locations: Vec<ConstraintLocation> = raw_locations
            .iter()
            .map(|data| ConstraintLocation::new(data, components))
            .filter(ConstraintLocation::is_valid)
            .collect();
        if locations.is_empty() {
            debug!(id = %id, "Dropping constraint without valid locations");
            return None;
        }

        let label = match &spec.label {
            Some(label) => label.clone(),
            None if compose_label => locations
                .iter()
                .map(ConstraintLocation::label)
                .collect::<Vec<_>>()
                .join(", "),
            None => String::new(),
        };

        Some(Constraint {
            id,
            deletable: spec.deletable,
            locations,
            label,
        })
    }

    pub fn fields(&self) -> Vec<Value> {
        self.locations
            .iter()
            .map(|location| Value::Object(location.fields().clone()))
            .collect()
    }
}

/// Constraints of a control in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    items: LinkedHashMap<String, Constraint>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint built from `spec`, returning its id if it was valid.
    pub fn add(
        &mut self,
        spec: &ConstraintSpec,
        ids: &mut IdGenerator,
        components: &[AddressComponent],
        compose_label: bool,
    ) -> Option<String> {
        let constraint = Constraint::new(spec, ids, components, compose_label)?;
        let id = constraint.id.clone();
        self.items.insert(id.clone(), constraint);
        Some(id)
    }

    /// Removes a deletable constraint.
    pub fn remove(&mut self, id: &str) -> Option<Constraint> {
        match self.items.get(id) {
            Some(constraint) if constraint.deletable => self.items.remove(id),
            _ => None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Constraint> {
        self.items.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Label of the earliest constraint, empty without constraints.
    pub fn first_label(&self) -> &str {
        self.items
            .front()
            .map(|(_, constraint)| constraint.label.as_str())
            .unwrap_or("")
    }

    /// `locations` and `restrict_value` request parameters.
    pub fn location_params(&self, restrict_value: bool) -> Map<String, Value> {
        let locations: Vec<Value> = self.iter().flat_map(Constraint::fields).collect();
        let mut params = Map::new();
        if !locations.is_empty() {
            params.insert("locations".to_string(), Value::Array(locations));
            params.insert("restrict_value".to_string(), Value::Bool(restrict_value));
        }
        params
    }

    /// Drops the fields the constraints already pin down.
    ///
    /// Everything up to the deepest location containing `data` is removed.
    /// For city-regions (region and city share a KLADR id) the city goes too.
    pub fn unrestricted_data(&self, data: &Value, components: &[AddressComponent]) -> Value {
        let max_specificity = self
            .iter()
            .flat_map(|constraint| constraint.locations.iter())
            .filter(|location| location.contains_data(data))
            .filter_map(|location| location.specificity)
            .max();

        let (Some(max_specificity), Some(object)) = (max_specificity, data.as_object()) else {
            return data.clone();
        };

        let mut restricted: Vec<&str> = Vec::new();
        let region_kladr = object.get("region_kladr_id").and_then(as_text);
        if region_kladr.is_some() && region_kladr == object.get("city_kladr_id").and_then(as_text) {
            if let Some((_, city)) = component_by_id(components, "city") {
                restricted.extend(city.fields.iter().copied());
            }
        }
        for component in components.iter().take(max_specificity + 1) {
            restricted.extend(component.fields.iter().copied());
        }

        let unrestricted: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| !restricted.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Value::Object(unrestricted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ADDRESS_COMPONENTS;
    use serde_json::json;

    fn spec(locations: Value) -> ConstraintSpec {
        ConstraintSpec {
            locations: Some(locations),
            ..Default::default()
        }
    }

    #[test]
    fn test_location_by_fias() {
        let location = ConstraintLocation::new(
            &json!({"region": "Краснодарский", "region_fias_id": "d00e1013", "flat": "5"}),
            ADDRESS_COMPONENTS,
        );
        assert_eq!(location.fields().len(), 1);
        assert!(location.fields().contains_key("region_fias_id"));
        assert_eq!(location.specificity, component_by_id(ADDRESS_COMPONENTS, "region").map(|c| c.0));
    }

    #[test]
    fn test_location_by_kladr() {
        let location = ConstraintLocation::new(&json!({"kladr_id": "5000004000000", "region": "Московская"}), ADDRESS_COMPONENTS);
        assert_eq!(location.fields().len(), 1);
        assert_eq!(location.specificity, component_by_id(ADDRESS_COMPONENTS, "city").map(|c| c.0));
        assert!(location.contains_data(&json!({"kladr_id": "5000004000012"})));
        assert!(!location.contains_data(&json!({"kladr_id": "5000005000000"})));
        assert!(!location.contains_data(&json!({"region": "Московская"})));
    }

    #[test]
    fn test_location_by_names() {
        let location = ConstraintLocation::new(&json!({"region": "Москва", "city": "Москва"}), ADDRESS_COMPONENTS);
        assert_eq!(location.specificity, component_by_id(ADDRESS_COMPONENTS, "city").map(|c| c.0));
        assert!(location.contains_data(&json!({"region": "МОСКВА", "city": "москва", "street": "Арбат"})));
        assert!(!location.contains_data(&json!({"region": "Москва"})));
        assert!(!ConstraintLocation::new(&json!({"geo_lat": "55"}), ADDRESS_COMPONENTS).is_valid());
    }

    #[test]
    fn test_constraint_ids_and_labels() {
        let mut ids = IdGenerator::new();
        let mut constraints = Constraints::new();
        let first = constraints.add(&spec(json!({"region": "Москва"})), &mut ids, ADDRESS_COMPONENTS, true);
        let invalid = constraints.add(&spec(json!({"geo_lat": "1"})), &mut ids, ADDRESS_COMPONENTS, true);
        let third = constraints.add(
            &ConstraintSpec {
                locations: Some(json!([{"region": "Тульская"}, {"region": "Калужская"}])),
                label: Some("Центр".to_string()),
                deletable: true,
            },
            &mut ids,
            ADDRESS_COMPONENTS,
            true,
        );

        assert_eq!(first.as_deref(), Some("c1"));
        assert_eq!(invalid, None);
        assert_eq!(third.as_deref(), Some("c3"));
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints.first_label(), "Москва");
        assert_eq!(constraints.get("c3").map(|c| c.locations.len()), Some(2));
    }

    #[test]
    fn test_remove_only_deletable() {
        let mut ids = IdGenerator::new();
        let mut constraints = Constraints::new();
        constraints.add(&spec(json!({"region": "Москва"})), &mut ids, ADDRESS_COMPONENTS, true);
        assert!(constraints.remove("c1").is_none());
        assert_eq!(constraints.len(), 1);
    }

    #[test]
    fn test_location_params() {
        let mut ids = IdGenerator::new();
        let mut constraints = Constraints::new();
        assert!(constraints.location_params(true).is_empty());

        constraints.add(&spec(json!({"kladr_id": "7700000000000"})), &mut ids, ADDRESS_COMPONENTS, true);
        let params = constraints.location_params(true);
        assert_eq!(params["locations"], json!([{"kladr_id": "7700000000000"}]));
        assert_eq!(params["restrict_value"], json!(true));
    }

    #[test]
    fn test_unrestricted_data() {
        let mut ids = IdGenerator::new();
        let mut constraints = Constraints::new();
        constraints.add(&spec(json!({"region": "Краснодарский"})), &mut ids, ADDRESS_COMPONENTS, true);

        let data = json!({
            "country": "Россия",
            "region": "Краснодарский",
            "region_with_type": "Краснодарский край",
            "city": "Сочи",
            "city_with_type": "г Сочи",
            "street": "Курортный"
        });
        let unrestricted = constraints.unrestricted_data(&data, ADDRESS_COMPONENTS);
        assert_eq!(
            unrestricted,
            json!({"city": "Сочи", "city_with_type": "г Сочи", "street": "Курортный"})
        );

        let elsewhere = json!({"region": "Ростовская", "city": "Шахты"});
        assert_eq!(constraints.unrestricted_data(&elsewhere, ADDRESS_COMPONENTS), elsewhere);
    }

    #[test]
    fn test_unrestricted_data_city_region() {
        let mut ids = IdGenerator::new();
        let mut constraints = Constraints::new();
        constraints.add(&spec(json!({"region": "Москва"})), &mut ids, ADDRESS_COMPONENTS, true);

        let data = json!({
            "region": "Москва",
            "region_kladr_id": "7700000000000",
            "city": "Москва",
            "city_with_type": "г Москва",
            "city_kladr_id": "7700000000000",
            "street_with_type": "ул Арбат"
        });
        let unrestricted = constraints.unrestricted_data(&data, ADDRESS_COMPONENTS);
        assert_eq!(
            unrestricted,
            json!({
                "region_kladr_id": "7700000000000",
                "city_kladr_id": "7700000000000",
                "street_with_type": "ул Арбат"
            })
        );
    }

    #[test]
    fn test_restrictions_alias() {
        let spec: ConstraintSpec = serde_json::from_value(json!({
            "restrictions": {"city": "Тула"},
            "deletable": true
        }))
        .unwrap();
        assert!(spec.deletable);
        assert_eq!(spec.locations, Some(json!({"city": "Тула"})));
    }
}
