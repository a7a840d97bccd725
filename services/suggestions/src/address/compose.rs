//! Display strings composed from structured suggestion data.

use serde_json::{Map, Value};

use crate::common::{field_text, join_present};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Keep the city district whatever its origin.
    pub save_city_district: bool,
    /// Drop the city district unless `save_city_district` is set.
    pub exclude_city_district: bool,
}

/// `{with_type}`, else the short type and name joined, else the full type.
fn typed_part(data: &Map<String, Value>, with_type: &str, parts: [&str; 2], type_full: &str) -> String {
    if let Some(value) = field_text(data, with_type) {
        return value;
    }
    let joined = join_present(parts.iter().map(|key| field_text(data, key)), " ");
    if !joined.is_empty() {
        return joined;
    }
    field_text(data, type_full).unwrap_or_default()
}

fn level_part(data: &Map<String, Value>, level: &str) -> String {
    let short_type = format!("{level}_type");
    typed_part(
        data,
        &format!("{level}_with_type"),
        [short_type.as_str(), level],
        &format!("{level}_type_full"),
    )
}

/// Comma-joined address, country first.
pub fn compose_address_value(data: &Value, options: ComposeOptions) -> String {
    let empty = Map::new();
    let data = data.as_object().unwrap_or(&empty);

    let country = field_text(data, "country");
    // the region is the only level written name first: "Московская обл"
    let mut region = typed_part(data, "region_with_type", ["region", "region_type"], "region_type_full");
    let area = level_part(data, "area");
    let city = level_part(data, "city");
    let mut city_district = level_part(data, "city_district");
    let settlement = level_part(data, "settlement");
    let street = level_part(data, "street");
    let house = join_present(
        ["stead_type", "stead", "house_type", "house", "block_type", "block"]
            .iter()
            .map(|key| field_text(data, key)),
        " ",
    );
    let flat = join_present(["flat_type", "flat"].iter().map(|key| field_text(data, key)), " ");
    let postal_box = field_text(data, "postal_box").map(|number| format!("а/я {number}"));

    // "г Москва, г Москва"
    if region == city {
        region.clear();
    }

    if !options.save_city_district {
        if options.exclude_city_district {
            city_district.clear();
        } else if !city_district.is_empty() && field_text(data, "city_district_fias_id").is_none() {
            // districts without a FIAS id come from OKATO and are unreliable
            city_district.clear();
        }
    }

    join_present(
        [
            country,
            Some(region),
            Some(area),
            Some(city),
            Some(city_district),
            Some(settlement),
            Some(street),
            Some(house),
            Some(flat),
            postal_box,
        ],
        ", ",
    )
}

/// "Surname Name Patronymic", skipping missing parts.
pub fn compose_name_value(data: &Value) -> String {
    let empty = Map::new();
    let data = data.as_object().unwrap_or(&empty);
    join_present(
        ["surname", "name", "patronymic"].iter().map(|key| field_text(data, key)),
        " ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_region_equal_to_city_is_dropped() {
        let data = json!({
            "region": "Moscow",
            "region_with_type": "Moscow",
            "city": "Moscow",
            "city_with_type": "Moscow"
        });
        assert_eq!(compose_address_value(&data, ComposeOptions::default()), "Moscow");
    }

    #[test]
    fn test_full_address() {
        let data = json!({
            "country": "Россия",
            "region_with_type": "Московская обл",
            "area_type": "р-н",
            "area": "Одинцовский",
            "city_with_type": "г Одинцово",
            "street_type": "ул",
            "street": "Маршала Жукова",
            "house_type": "д",
            "house": "10",
            "block_type": "к",
            "block": "2",
            "flat_type": "кв",
            "flat": "15"
        });
        assert_eq!(
            compose_address_value(&data, ComposeOptions::default()),
            "Россия, Московская обл, р-н Одинцовский, г Одинцово, ул Маршала Жукова, д 10 к 2, кв 15"
        );
    }

    #[test]
    fn test_region_name_comes_first() {
        let data = json!({"region": "Тульская", "region_type": "обл"});
        assert_eq!(compose_address_value(&data, ComposeOptions::default()), "Тульская обл");
        let data = json!({"region_type_full": "область"});
        assert_eq!(compose_address_value(&data, ComposeOptions::default()), "область");
    }

    #[test]
    fn test_city_district_rules() {
        let with_fias = json!({
            "city_with_type": "г Москва",
            "city_district_with_type": "р-н Арбат",
            "city_district_fias_id": "abc"
        });
        let without_fias = json!({
            "city_with_type": "г Москва",
            "city_district_with_type": "р-н Арбат"
        });

        let default = ComposeOptions::default();
        let save = ComposeOptions {
            save_city_district: true,
            ..Default::default()
        };
        let exclude = ComposeOptions {
            exclude_city_district: true,
            ..Default::default()
        };

        assert_eq!(compose_address_value(&with_fias, default), "г Москва, р-н Арбат");
        assert_eq!(compose_address_value(&without_fias, default), "г Москва");
        assert_eq!(compose_address_value(&without_fias, save), "г Москва, р-н Арбат");
        assert_eq!(compose_address_value(&with_fias, exclude), "г Москва");
        let both = ComposeOptions {
            save_city_district: true,
            exclude_city_district: true,
        };
        assert_eq!(compose_address_value(&with_fias, both), "г Москва, р-н Арбат");
    }

    #[test]
    fn test_postal_box() {
        let data = json!({"city_with_type": "г Тула", "postal_box": "15"});
        assert_eq!(compose_address_value(&data, ComposeOptions::default()), "г Тула, а/я 15");
    }

    #[test]
    fn test_empty_data() {
        assert_eq!(compose_address_value(&json!({}), ComposeOptions::default()), "");
        assert_eq!(compose_address_value(&Value::Null, ComposeOptions::default()), "");
    }

    #[test]
    fn test_compose_name_value() {
        let data = json!({"surname": "Иванов", "name": "Иван", "patronymic": null});
        assert_eq!(compose_name_value(&data), "Иванов Иван");
    }
}
