//! KLADR id arithmetic and schema specificity.

use regex::Regex;

use super::{component_by_id, AddressComponent};

lazy_static::lazy_static! {
    static ref TRAILING_ZEROS: Regex = Regex::new(r"^(\d{2})(\d*?)(0+)$").unwrap();
}

/// Widths a significant KLADR id is padded back to, one per level.
const LEVEL_WIDTHS: [usize; 6] = [2, 5, 8, 11, 15, 19];

/// Cuts a KLADR id down to its last non-empty level.
///
/// `50 000 040 000 00` becomes `50 000 040`: trailing zeros are stripped and
/// the rest is padded back to the width of the level it ends in.
pub fn significant_kladr_id(kladr_id: &str) -> String {
    let significant = TRAILING_ZEROS.replace(kladr_id, "${1}${2}");
    let length = significant.chars().count();
    let width = LEVEL_WIDTHS
        .iter()
        .copied()
        .find(|width| length <= *width)
        .unwrap_or(LEVEL_WIDTHS[LEVEL_WIDTHS.len() - 1]);

    let mut result = significant.into_owned();
    while result.chars().count() < width {
        result.push('0');
    }
    result
}

/// Keeps the digits of `kladr_id` that the deepest bound covers and zeroes
/// the rest. `None` when the deepest bound has no KLADR format.
pub fn bounded_kladr_id(
    kladr_id: &str,
    bounds_all: &[&str],
    components: &[AddressComponent],
) -> Option<String> {
    let bound_to = bounds_all.last()?;
    let format = component_by_id(components, bound_to)?.1.kladr_format?;

    let digits: String = kladr_id.chars().take(format.digits).collect();
    Some(digits + &"0".repeat(format.zeros))
}

/// Index of the deepest component whose KLADR level has exactly the width
/// of `significant_kladr_id`.
pub fn kladr_specificity(significant_kladr_id: &str, components: &[AddressComponent]) -> Option<usize> {
    let length = significant_kladr_id.chars().count();
    components
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kladr_format.map_or(false, |f| f.digits == length))
        .map(|(i, _)| i)
        .last()
}

/// Index of the deepest component identified by one of the FIAS fields.
pub fn fias_specificity<S: AsRef<str>>(fias_field_names: &[S], components: &[AddressComponent]) -> Option<usize> {
    components
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.fias_type
                .map_or(false, |fias| fias_field_names.iter().any(|name| name.as_ref() == fias))
        })
        .map(|(i, _)| i)
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ADDRESS_COMPONENTS;

    #[test]
    fn test_significant_kladr_id() {
        assert_eq!(significant_kladr_id("5000004000000"), "50000040");
        assert_eq!(significant_kladr_id("7700000000000"), "77");
        assert_eq!(significant_kladr_id("5000000100000"), "50000001");
        assert_eq!(significant_kladr_id("77000000000268400"), "770000000002684");
    }

    #[test]
    fn test_significant_kladr_id_widths() {
        for id in ["5000004000000", "7700000000000", "6300000100000", "50000040000123400"] {
            let significant = significant_kladr_id(id);
            assert!(LEVEL_WIDTHS.contains(&significant.len()), "{id} -> {significant}");
            assert!(id.starts_with(significant.trim_end_matches('0')));
        }
    }

    #[test]
    fn test_significant_kladr_id_without_zeros() {
        assert_eq!(significant_kladr_id("5000004000001"), "500000400000100");
    }

    #[test]
    fn test_bounded_kladr_id() {
        let all = ["country", "region", "area", "city"];
        assert_eq!(
            bounded_kladr_id("5000004000012", &all, ADDRESS_COMPONENTS).as_deref(),
            Some("5000004000000")
        );
        assert_eq!(
            bounded_kladr_id("5000004000012", &["country", "region"], ADDRESS_COMPONENTS).as_deref(),
            Some("5000000000000")
        );
        assert_eq!(bounded_kladr_id("5000004000012", &[], ADDRESS_COMPONENTS), None);
    }

    #[test]
    fn test_kladr_specificity() {
        let (city, _) = component_by_id(ADDRESS_COMPONENTS, "city").unwrap();
        assert_eq!(kladr_specificity("50000040", ADDRESS_COMPONENTS), Some(city));
        let (region, _) = component_by_id(ADDRESS_COMPONENTS, "region").unwrap();
        assert_eq!(kladr_specificity("77", ADDRESS_COMPONENTS), Some(region));
        assert_eq!(kladr_specificity("123", ADDRESS_COMPONENTS), None);
    }

    #[test]
    fn test_fias_specificity() {
        let (region, _) = component_by_id(ADDRESS_COMPONENTS, "region").unwrap();
        let (city, _) = component_by_id(ADDRESS_COMPONENTS, "city").unwrap();
        assert_eq!(fias_specificity(&["region_fias_id"], ADDRESS_COMPONENTS), Some(region));
        assert_eq!(
            fias_specificity(&["city_fias_id", "region_fias_id"], ADDRESS_COMPONENTS),
            Some(city)
        );
        assert_eq!(fias_specificity(&["planning_structure_fias_id"], ADDRESS_COMPONENTS), None);
    }
}
