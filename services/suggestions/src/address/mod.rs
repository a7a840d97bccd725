//! Address component model.
//!
//! An ordered schema of administrative levels, from country down to flat.
//! The order is the specificity order: bounds, restriction and truncation all
//! compare positions in [`ADDRESS_COMPONENTS`].

pub mod bounds;
pub mod compose;
pub mod constraint;
pub mod kladr;
pub mod stopwords;

pub use bounds::Bounds;
pub use compose::{compose_address_value, ComposeOptions};
pub use constraint::{Constraint, ConstraintLocation, ConstraintSpec, Constraints};
pub use kladr::{bounded_kladr_id, fias_specificity, kladr_specificity, significant_kladr_id};
pub use stopwords::ADDRESS_STOPWORDS;

use serde_json::{Map, Value};

/// Width of a KLADR id at some level: significant digits, then zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KladrFormat {
    pub digits: usize,
    pub zeros: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressComponent {
    pub id: &'static str,
    /// Keys of suggestion data owned by this component.
    pub fields: &'static [&'static str],
    pub for_bounds: bool,
    pub for_locations: bool,
    pub kladr_format: Option<KladrFormat>,
    /// The FIAS id field that identifies this level.
    pub fias_type: Option<&'static str>,
}

const fn id_component(id: &'static str, fields: &'static [&'static str]) -> AddressComponent {
    AddressComponent {
        id,
        fields,
        for_bounds: false,
        for_locations: true,
        kladr_format: None,
        fias_type: None,
    }
}

const fn level(
    id: &'static str,
    fields: &'static [&'static str],
    for_bounds: bool,
    for_locations: bool,
    digits: usize,
    zeros: usize,
    fias_type: &'static str,
) -> AddressComponent {
    AddressComponent {
        id,
        fields,
        for_bounds,
        for_locations,
        kladr_format: Some(KladrFormat { digits, zeros }),
        fias_type: Some(fias_type),
    }
}

pub static ADDRESS_COMPONENTS: &[AddressComponent] = &[
    id_component("kladr_id", &["kladr_id"]),
    id_component("postal_code", &["postal_code"]),
    id_component("country_iso_code", &["country_iso_code"]),
    level("country", &["country"], true, true, 0, 13, "country_iso_code"),
    id_component("region_iso_code", &["region_iso_code"]),
    id_component("region_fias_id", &["region_fias_id"]),
    level("region_type_full", &["region_type_full"], false, true, 2, 11, "region_fias_id"),
    level(
        "region",
        &["region", "region_type", "region_type_full", "region_with_type"],
        true,
        true,
        2,
        11,
        "region_fias_id",
    ),
    id_component("area_fias_id", &["area_fias_id"]),
    level("area_type_full", &["area_type_full"], false, true, 5, 8, "area_fias_id"),
    level(
        "area",
        &["area", "area_type", "area_type_full", "area_with_type"],
        true,
        true,
        5,
        8,
        "area_fias_id",
    ),
    id_component("city_fias_id", &["city_fias_id"]),
    level("city_type_full", &["city_type_full"], false, true, 8, 5, "city_fias_id"),
    level(
        "city",
        &["city", "city_type", "city_type_full", "city_with_type"],
        true,
        true,
        8,
        5,
        "city_fias_id",
    ),
    id_component("city_district_fias_id", &["city_district_fias_id"]),
    level(
        "city_district_type_full",
        &["city_district_type_full"],
        false,
        true,
        11,
        2,
        "city_district_fias_id",
    ),
    level(
        "city_district",
        &[
            "city_district",
            "city_district_type",
            "city_district_type_full",
            "city_district_with_type",
        ],
        true,
        true,
        11,
        2,
        "city_district_fias_id",
    ),
    id_component("settlement_fias_id", &["settlement_fias_id"]),
    level(
        "settlement_type_full",
        &["settlement_type_full"],
        false,
        true,
        11,
        2,
        "settlement_fias_id",
    ),
    level(
        "settlement",
        &["settlement", "settlement_type", "settlement_type_full", "settlement_with_type"],
        true,
        true,
        11,
        2,
        "settlement_fias_id",
    ),
    id_component("street_fias_id", &["street_fias_id"]),
    level("street_type_full", &["street_type_full"], false, true, 15, 2, "street_fias_id"),
    level(
        "street",
        &["street", "street_type", "street_type_full", "street_with_type"],
        true,
        true,
        15,
        2,
        "street_fias_id",
    ),
    level(
        "house",
        &["house", "house_type", "house_type_full", "block", "block_type"],
        true,
        true,
        19,
        0,
        "house_fias_id",
    ),
    level(
        "flat",
        &["flat", "flat_type", "flat_type_full"],
        true,
        false,
        19,
        0,
        "flat_fias_id",
    ),
];

/// Location parameters that are FIAS ids (or ISO codes) rather than names.
pub const FIAS_PARAM_NAMES: &[&str] = &[
    "country_iso_code",
    "region_iso_code",
    "region_fias_id",
    "area_fias_id",
    "city_fias_id",
    "city_district_fias_id",
    "settlement_fias_id",
    "planning_structure_fias_id",
    "street_fias_id",
];

/// Position and definition of a component by id.
pub fn component_by_id<'a>(
    components: &'a [AddressComponent],
    id: &str,
) -> Option<(usize, &'a AddressComponent)> {
    components.iter().enumerate().find(|(_, c)| c.id == id)
}

/// Ids of the components a control may be bounded by, in schema order.
pub fn bound_ids(components: &[AddressComponent]) -> Vec<&'static str> {
    components.iter().filter(|c| c.for_bounds).map(|c| c.id).collect()
}

/// Ids of the components that may appear in a location filter.
pub fn location_ids(components: &[AddressComponent]) -> Vec<&'static str> {
    components.iter().filter(|c| c.for_locations).map(|c| c.id).collect()
}

/// Ids of every component below `id`.
pub fn components_below(components: &[AddressComponent], id: &str) -> Vec<&'static str> {
    match component_by_id(components, id) {
        Some((index, _)) => components[index + 1..].iter().map(|c| c.id).collect(),
        None => Vec::new(),
    }
}

/// Copies the non-null fields owned by the listed components.
pub fn copy_data_components<S: AsRef<str>>(
    data: &Value,
    component_ids: &[S],
    components: &[AddressComponent],
) -> Map<String, Value> {
    let mut result = Map::new();
    let Some(data) = data.as_object() else {
        return result;
    };

    for id in component_ids {
        let Some((_, component)) = component_by_id(components, id.as_ref()) else {
            continue;
        };
        for field in component.fields {
            match data.get(*field) {
                Some(Value::Null) | None => {}
                Some(value) => {
                    result.insert(field.to_string(), value.clone());
                }
            }
        }
    }
    result
}

/// Keeps only the non-empty location fields of `data`.
/// A KLADR id, when present, wins over everything else.
pub fn filtered_location(data: &Value, components: &[AddressComponent]) -> Option<Map<String, Value>> {
    let data = data.as_object()?;
    let allowed = location_ids(components);
    let mut location = Map::new();

    for (key, value) in data {
        if crate::common::is_truthy(value) && allowed.contains(&key.as_str()) {
            location.insert(key.clone(), value.clone());
        }
    }

    if location.is_empty() {
        return None;
    }
    if let Some(kladr_id) = location.get("kladr_id").cloned() {
        let mut only_kladr = Map::new();
        only_kladr.insert("kladr_id".to_string(), kladr_id);
        return Some(only_kladr);
    }
    Some(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_order() {
        let ids = bound_ids(ADDRESS_COMPONENTS);
        assert_eq!(
            ids,
            vec!["country", "region", "area", "city", "city_district", "settlement", "street", "house", "flat"]
        );
    }

    #[test]
    fn test_component_by_id() {
        let (index, city) = component_by_id(ADDRESS_COMPONENTS, "city").unwrap();
        assert_eq!(index, 13);
        assert_eq!(city.kladr_format, Some(KladrFormat { digits: 8, zeros: 5 }));
        assert!(component_by_id(ADDRESS_COMPONENTS, "planet").is_none());
    }

    #[test]
    fn test_flat_is_not_a_location() {
        assert!(!location_ids(ADDRESS_COMPONENTS).contains(&"flat"));
        assert!(location_ids(ADDRESS_COMPONENTS).contains(&"kladr_id"));
    }

    #[test]
    fn test_components_below() {
        let below = components_below(ADDRESS_COMPONENTS, "street");
        assert_eq!(below, vec!["house", "flat"]);
    }

    #[test]
    fn test_copy_data_components() {
        let data = json!({
            "region": "Москва",
            "region_with_type": "г Москва",
            "city": "Москва",
            "city_type": null,
            "street": "Тверская"
        });
        let copy = copy_data_components(&data, &["city", "street"], ADDRESS_COMPONENTS);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy["city"], json!("Москва"));
        assert!(!copy.contains_key("city_type"));
        assert!(!copy.contains_key("region"));
    }

    #[test]
    fn test_filtered_location() {
        let data = json!({"region": "Москва", "street": "", "geo_lat": "55.7"});
        let location = filtered_location(&data, ADDRESS_COMPONENTS).unwrap();
        assert_eq!(location.len(), 1);
        assert_eq!(location["region"], json!("Москва"));

        let data = json!({"region": "Москва", "kladr_id": "7700000000000"});
        let location = filtered_location(&data, ADDRESS_COMPONENTS).unwrap();
        assert_eq!(location.len(), 1);
        assert!(location.contains_key("kladr_id"));

        assert!(filtered_location(&json!({"geo_lat": "1"}), ADDRESS_COMPONENTS).is_none());
    }
}
