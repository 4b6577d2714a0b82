//! Category Map Module
//! Static bidirectional mapping between CPI division codes and display labels.

use std::collections::HashMap;

/// Division code for the aggregate (all-category) index.
pub const OVERALL_CODE: &str = "overall";

/// Display label for the aggregate index.
pub const OVERALL_LABEL: &str = "Overall";

/// The 13 MCOICOP spending divisions plus the overall aggregate.
const DIVISIONS: [(&str, &str); 14] = [
    ("01", "Food & Beverages"),
    ("02", "Alcoholic Beverages & Tobacco"),
    ("03", "Clothing & Footwear"),
    ("04", "Housing, Water, Electricity, Gas & Other Fuels"),
    ("05", "Furnishings & Household Equipment"),
    ("06", "Health"),
    ("07", "Transport"),
    ("08", "Information & Communication"),
    ("09", "Recreation, Sport & Culture"),
    ("10", "Education"),
    ("11", "Restaurant & Accommodation Services"),
    ("12", "Insurance & Financial Services"),
    ("13", "Personal Care & Miscellaneous"),
    (OVERALL_CODE, OVERALL_LABEL),
];

/// Bidirectional division code <-> label mapping.
///
/// The table is a bijection: both directions have exactly one entry per
/// division, so label lookups round-trip to the original code.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    label_by_code: HashMap<&'static str, &'static str>,
    code_by_label: HashMap<&'static str, &'static str>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryMap {
    pub fn new() -> Self {
        let mut label_by_code = HashMap::with_capacity(DIVISIONS.len());
        let mut code_by_label = HashMap::with_capacity(DIVISIONS.len());
        for (code, label) in DIVISIONS {
            label_by_code.insert(code, label);
            code_by_label.insert(label, code);
        }
        debug_assert_eq!(label_by_code.len(), DIVISIONS.len());
        debug_assert_eq!(code_by_label.len(), DIVISIONS.len());
        Self {
            label_by_code,
            code_by_label,
        }
    }

    /// Display label for a division code.
    pub fn label_for(&self, code: &str) -> Option<&'static str> {
        self.label_by_code.get(code).copied()
    }

    /// Division code for a display label.
    pub fn code_for(&self, label: &str) -> Option<&'static str> {
        self.code_by_label.get(label).copied()
    }

    /// Display label for a code, falling back to the raw code itself when the
    /// code is not part of the mapping.
    pub fn label_or_code(&self, code: &str) -> String {
        self.label_for(code).unwrap_or(code).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_code() {
        let map = CategoryMap::new();
        assert_eq!(DIVISIONS.len(), 14);
        for (code, _) in DIVISIONS {
            let label = map.label_for(code).unwrap();
            assert_eq!(map.code_for(label), Some(code));
        }
    }

    #[test]
    fn overall_maps_both_ways() {
        let map = CategoryMap::new();
        assert_eq!(map.label_for(OVERALL_CODE), Some(OVERALL_LABEL));
        assert_eq!(map.code_for(OVERALL_LABEL), Some(OVERALL_CODE));
    }

    #[test]
    fn unknown_code_falls_back_to_raw_code() {
        let map = CategoryMap::new();
        assert_eq!(map.label_for("99"), None);
        assert_eq!(map.label_or_code("99"), "99");
        assert_eq!(map.label_or_code("01"), "Food & Beverages");
    }
}
