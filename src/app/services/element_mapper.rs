//! Element code resolution
//!
//! Maps CLIDATA element codes (`RR`, `KTS`, ...) onto observation fields and
//! the unit conversion each needs. Codes are matched case-insensitively and
//! ignore surrounding whitespace.

use crate::config::{ElementRule, MappingConfig};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ElementMapper {
    rules: HashMap<String, ElementRule>,
}

impl ElementMapper {
    pub fn new(mappings: &MappingConfig) -> Self {
        let rules = mappings
            .elements
            .iter()
            .map(|(code, rule)| (normalize_code(code), *rule))
            .collect();
        Self { rules }
    }

    /// Rule for a source element code, `None` when the code is unknown
    pub fn resolve(&self, code: &str) -> Option<ElementRule> {
        self.rules.get(&normalize_code(code)).copied()
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.resolve(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Canonical form of an element code
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{ObservationField, UnitConversion};

    #[test]
    fn test_default_codes_resolve() {
        let mapper = ElementMapper::new(&MappingConfig::default());

        let wind = mapper.resolve("KTS").unwrap();
        assert_eq!(wind.field, ObservationField::WindSpeed);
        assert_eq!(wind.conversion, UnitConversion::KnotsToMetersPerSecond);

        assert_eq!(
            mapper.resolve("TX").unwrap().field,
            ObservationField::MaxTemperature
        );
        assert_eq!(mapper.len(), 6);
    }

    #[test]
    fn test_codes_are_case_insensitive() {
        let mapper = ElementMapper::new(&MappingConfig::default());
        assert_eq!(mapper.resolve(" rr "), mapper.resolve("RR"));
        assert!(mapper.is_known("rh"));
    }

    #[test]
    fn test_unknown_code() {
        let mapper = ElementMapper::new(&MappingConfig::default());
        assert_eq!(mapper.resolve("SUNHR"), None);
        assert_eq!(mapper.resolve(""), None);
    }

    #[test]
    fn test_custom_table_keys_normalized() {
        let mut mappings = MappingConfig::default();
        mappings.elements.clear();
        mappings.elements.insert(
            " tmean".to_string(),
            ElementRule::new(ObservationField::Temperature, UnitConversion::Identity),
        );
        let mapper = ElementMapper::new(&mappings);

        assert!(mapper.is_known("TMEAN"));
        assert!(!mapper.is_known("RR"));
    }
}
