use serde_json::{json, Map, Value};
use tracing::warn;

use super::{bound_ids, AddressComponent};

/// Administrative-level window of a control, e.g. `"city-settlement"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bounds {
    pub from: Option<&'static str>,
    pub to: Option<&'static str>,
    /// Bound components from the top of the schema through `to`.
    pub all: Vec<&'static str>,
    /// The part of `all` starting at `from`.
    pub own: Vec<&'static str>,
}

impl Bounds {
    /// Resolves a `"from-to"` or `"level"` range against the schema.
    ///
    /// Ids that are unknown or can't bound a control are dropped. When
    /// neither end survives the bounds are empty.
    pub fn resolve(range: &str, components: &[AddressComponent]) -> Self {
        let available = bound_ids(components);
        let parts: Vec<&str> = range.trim().split('-').collect();

        let pick = |part: Option<&&str>| -> Option<&'static str> {
            let part = part?;
            let found = available.iter().copied().find(|id| id == part);
            if found.is_none() && !part.is_empty() {
                warn!(bound = %part, "Ignoring unknown address bound");
            }
            found
        };
        let from = pick(parts.first());
        let to = pick(parts.last());

        let mut all = Vec::new();
        let mut own = Vec::new();
        if from.is_some() || to.is_some() {
            let mut is_own = from.is_none();
            for id in available {
                if Some(id) == from {
                    is_own = true;
                }
                all.push(id);
                if is_own {
                    own.push(id);
                }
                if Some(id) == to {
                    break;
                }
            }
        }

        Bounds { from, to, all, own }
    }

    pub fn is_empty(&self) -> bool {
        self.own.is_empty()
    }

    /// `from_bound` / `to_bound` request parameters.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(from) = self.from {
            params.insert("from_bound".to_string(), json!({ "value": from }));
        }
        if let Some(to) = self.to {
            params.insert("to_bound".to_string(), json!({ "value": to }));
        }
        params
    }

    /// Components whose fields make up a bounded value.
    ///
    /// A control showing only the city district needs its FIAS id too, or
    /// the composer would drop the district.
    pub fn value_components(&self) -> Vec<&'static str> {
        let mut components = self.own.clone();
        if components == ["city_district"] {
            components.push("city_district_fias_id");
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ADDRESS_COMPONENTS;

    #[test]
    fn test_resolve_range() {
        let bounds = Bounds::resolve("city-settlement", ADDRESS_COMPONENTS);
        assert_eq!(bounds.from, Some("city"));
        assert_eq!(bounds.to, Some("settlement"));
        assert_eq!(
            bounds.all,
            vec!["country", "region", "area", "city", "city_district", "settlement"]
        );
        assert_eq!(bounds.own, vec!["city", "city_district", "settlement"]);
    }

    #[test]
    fn test_resolve_single_level() {
        let bounds = Bounds::resolve(" street ", ADDRESS_COMPONENTS);
        assert_eq!(bounds.from, Some("street"));
        assert_eq!(bounds.to, Some("street"));
        assert_eq!(bounds.own, vec!["street"]);
        assert_eq!(bounds.all.last(), Some(&"street"));
    }

    #[test]
    fn test_resolve_open_ended() {
        let bounds = Bounds::resolve("street-nowhere", ADDRESS_COMPONENTS);
        assert_eq!(bounds.to, None);
        assert_eq!(bounds.own, vec!["street", "house", "flat"]);
        assert_eq!(bounds.all.len(), 9);

        let bounds = Bounds::resolve("nowhere-region", ADDRESS_COMPONENTS);
        assert_eq!(bounds.from, None);
        assert_eq!(bounds.own, vec!["country", "region"]);
    }

    #[test]
    fn test_resolve_invalid() {
        for range in ["", "planet", "region_fias_id", "-"] {
            let bounds = Bounds::resolve(range, ADDRESS_COMPONENTS);
            assert!(bounds.is_empty(), "{range:?}");
            assert!(bounds.all.is_empty());
            assert!(bounds.params().is_empty());
        }
    }

    #[test]
    fn test_params() {
        let params = Bounds::resolve("city-street", ADDRESS_COMPONENTS).params();
        assert_eq!(params["from_bound"], json!({"value": "city"}));
        assert_eq!(params["to_bound"], json!({"value": "street"}));
    }

    #[test]
    fn test_value_components() {
        let bounds = Bounds::resolve("city_district", ADDRESS_COMPONENTS);
        assert_eq!(bounds.value_components(), vec!["city_district", "city_district_fias_id"]);
        let bounds = Bounds::resolve("city-street", ADDRESS_COMPONENTS);
        assert_eq!(bounds.value_components(), bounds.own);
    }
}
