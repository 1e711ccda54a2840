// ABOUTME: Unit normalization, categorization, and conversion for pantry quantities
// ABOUTME: Maps raw unit strings to canonical tokens and converts within volume/weight categories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

//! # Unit Conversion
//!
//! Gives every unit string a canonical form and a category, and converts
//! magnitudes within a category. Volume converts through milliliters, weight
//! through grams. Any other non-empty token is a Count unit; count units of
//! different canonical names ("can" vs "bottle") are never interchangeable.
//!
//! Conversion is never an error: "no conversion available" is an `Option`
//! the caller interprets. Factors are fixed constants, so results are
//! floating-point approximations - round-trips hold only within tolerance.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Milliliters per US cup
const ML_PER_CUP: f64 = 236.588;
/// Milliliters per tablespoon
const ML_PER_TBSP: f64 = 14.7868;
/// Milliliters per teaspoon
const ML_PER_TSP: f64 = 4.92892;
/// Milliliters per fluid ounce
const ML_PER_FL_OZ: f64 = 29.5735;
/// Milliliters per US pint
const ML_PER_PINT: f64 = 473.176;
/// Milliliters per US quart
const ML_PER_QUART: f64 = 946.353;
/// Milliliters per US gallon
const ML_PER_GALLON: f64 = 3785.41;
/// Grams per ounce
const GRAMS_PER_OZ: f64 = 28.3495;
/// Grams per pound
const GRAMS_PER_LB: f64 = 453.592;

/// Category a canonical unit belongs to
///
/// Conversion is only ever performed within one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCategory {
    /// Volume units, converted through milliliters
    Volume,
    /// Weight units, converted through grams
    Weight,
    /// Discrete units (pieces, cans, cloves); identity-convertible only
    Count,
    /// Empty or unnormalizable input
    Unknown,
}

/// Immutable unit lookup tables: aliases plus per-unit conversion factors
///
/// Built once at process start and injected into [`UnitConverter`] so tests
/// can substitute custom tables.
#[derive(Debug, Clone)]
pub struct UnitDefinitions {
    aliases: HashMap<String, String>,
    volume_ml: HashMap<String, f64>,
    weight_g: HashMap<String, f64>,
}

impl UnitDefinitions {
    /// Build the standard alias and factor tables
    #[must_use]
    pub fn standard() -> Self {
        let alias_groups: &[(&[&str], &str)] = &[
            // Volume
            (&["cup", "cups", "c"], "cup"),
            (
                &["tablespoon", "tablespoons", "tbsp", "tbs", "tb"],
                "tbsp",
            ),
            (&["teaspoon", "teaspoons", "tsp", "ts"], "tsp"),
            (
                &["milliliter", "milliliters", "millilitre", "millilitres", "ml"],
                "ml",
            ),
            (&["liter", "liters", "litre", "litres", "l"], "l"),
            (&["fluid ounce", "fluid ounces", "fl oz", "floz"], "fl oz"),
            (&["pint", "pints", "pt"], "pint"),
            (&["quart", "quarts", "qt"], "quart"),
            (&["gallon", "gallons", "gal"], "gallon"),
            // Weight
            (&["gram", "grams", "g", "gr"], "g"),
            (&["kilogram", "kilograms", "kg", "kgs"], "kg"),
            (&["milligram", "milligrams", "mg"], "mg"),
            (&["ounce", "ounces", "oz"], "oz"),
            (&["pound", "pounds", "lb", "lbs"], "lb"),
            // Common count units
            (&["piece", "pieces", "pc", "pcs"], "piece"),
            (&["clove", "cloves"], "clove"),
            (&["can", "cans"], "can"),
            (&["bottle", "bottles"], "bottle"),
            (&["jar", "jars"], "jar"),
            (&["pack", "packs", "package", "packages"], "pack"),
            (&["slice", "slices"], "slice"),
            (&["bunch", "bunches"], "bunch"),
            (&["head", "heads"], "head"),
            (&["stick", "sticks"], "stick"),
            (&["pinch", "pinches"], "pinch"),
            (&["box", "boxes"], "box"),
            (&["bag", "bags"], "bag"),
        ];

        let mut aliases = HashMap::new();
        for (variants, canonical) in alias_groups {
            for variant in *variants {
                aliases.insert((*variant).to_owned(), (*canonical).to_owned());
            }
        }

        let volume_ml = [
            ("ml", 1.0),
            ("l", 1000.0),
            ("tsp", ML_PER_TSP),
            ("tbsp", ML_PER_TBSP),
            ("fl oz", ML_PER_FL_OZ),
            ("cup", ML_PER_CUP),
            ("pint", ML_PER_PINT),
            ("quart", ML_PER_QUART),
            ("gallon", ML_PER_GALLON),
        ]
        .into_iter()
        .map(|(unit, factor)| (unit.to_owned(), factor))
        .collect();

        let weight_g = [
            ("mg", 0.001),
            ("g", 1.0),
            ("kg", 1000.0),
            ("oz", GRAMS_PER_OZ),
            ("lb", GRAMS_PER_LB),
        ]
        .into_iter()
        .map(|(unit, factor)| (unit.to_owned(), factor))
        .collect();

        Self {
            aliases,
            volume_ml,
            weight_g,
        }
    }

    /// Build custom tables (primarily for tests)
    ///
    /// `volume_ml` factors are milliliters per unit, `weight_g` factors are
    /// grams per unit. Aliases map raw tokens to canonical tokens.
    #[must_use]
    pub fn custom(
        aliases: HashMap<String, String>,
        volume_ml: HashMap<String, f64>,
        weight_g: HashMap<String, f64>,
    ) -> Self {
        Self {
            aliases,
            volume_ml,
            weight_g,
        }
    }

    fn is_known(&self, token: &str) -> bool {
        self.volume_ml.contains_key(token) || self.weight_g.contains_key(token)
    }
}

impl Default for UnitDefinitions {
    fn default() -> Self {
        Self::standard()
    }
}

static STANDARD_DEFINITIONS: LazyLock<Arc<UnitDefinitions>> =
    LazyLock::new(|| Arc::new(UnitDefinitions::standard()));

/// Classifies and converts measurement units
#[derive(Debug, Clone)]
pub struct UnitConverter {
    defs: Arc<UnitDefinitions>,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitConverter {
    /// Converter over the standard unit tables
    #[must_use]
    pub fn new() -> Self {
        Self {
            defs: Arc::clone(&STANDARD_DEFINITIONS),
        }
    }

    /// Converter over injected tables
    #[must_use]
    pub fn with_definitions(defs: Arc<UnitDefinitions>) -> Self {
        Self { defs }
    }

    /// Canonical form of a raw unit string
    ///
    /// Lower-cases, trims, and resolves through the alias table. Unknown
    /// non-empty tokens normalize to themselves (they become Count units),
    /// with a simple trailing-"s" plural fold so "crates" and "crate" agree.
    /// Returns `None` for empty input.
    #[must_use]
    pub fn normalize(&self, unit: &str) -> Option<String> {
        let token = unit.trim().to_lowercase();
        if token.is_empty() {
            return None;
        }
        if let Some(canonical) = self.defs.aliases.get(&token) {
            return Some(canonical.clone());
        }
        if self.defs.is_known(&token) {
            return Some(token);
        }
        // Plural fold for tokens the alias table has no entry for. Strip a
        // trailing "es" only when the stem is itself known; otherwise a
        // single trailing "s". Irregular plurals are a known limitation.
        if let Some(stem) = token.strip_suffix("es") {
            if self.defs.aliases.contains_key(stem) || self.defs.is_known(stem) {
                return Some(
                    self.defs
                        .aliases
                        .get(stem)
                        .cloned()
                        .unwrap_or_else(|| stem.to_owned()),
                );
            }
        }
        if token.len() > 2 {
            if let Some(stem) = token.strip_suffix('s') {
                return Some(
                    self.defs
                        .aliases
                        .get(stem)
                        .cloned()
                        .unwrap_or_else(|| stem.to_owned()),
                );
            }
        }
        Some(token)
    }

    /// Category of a raw unit string
    ///
    /// Volume and weight are recognized by the factor tables; any other
    /// non-empty token is a Count unit. `Unknown` only for empty input.
    #[must_use]
    pub fn category_of(&self, unit: &str) -> UnitCategory {
        match self.normalize(unit) {
            None => UnitCategory::Unknown,
            Some(token) => {
                if self.defs.volume_ml.contains_key(&token) {
                    UnitCategory::Volume
                } else if self.defs.weight_g.contains_key(&token) {
                    UnitCategory::Weight
                } else {
                    UnitCategory::Count
                }
            }
        }
    }

    /// Whether quantities in `a` and `b` can be meaningfully compared
    ///
    /// True only when both normalize and share a category, and for Count
    /// units only when they are the *same* canonical unit.
    #[must_use]
    pub fn can_compare(&self, a: &str, b: &str) -> bool {
        let (Some(ca), Some(cb)) = (self.normalize(a), self.normalize(b)) else {
            return false;
        };
        let (cat_a, cat_b) = (self.category_of(a), self.category_of(b));
        if cat_a != cat_b || cat_a == UnitCategory::Unknown {
            return false;
        }
        match cat_a {
            UnitCategory::Count => ca == cb,
            _ => true,
        }
    }

    /// Convert a quantity from one unit to another
    ///
    /// `None` when the units are not comparable. Count-unit "conversion"
    /// between identical canonical units is the identity function.
    #[must_use]
    pub fn convert(&self, quantity: f64, from: &str, to: &str) -> Option<f64> {
        if !self.can_compare(from, to) {
            return None;
        }
        let from_token = self.normalize(from)?;
        let to_token = self.normalize(to)?;
        match self.category_of(from) {
            UnitCategory::Volume => {
                let from_factor = self.defs.volume_ml.get(&from_token)?;
                let to_factor = self.defs.volume_ml.get(&to_token)?;
                Some(quantity * from_factor / to_factor)
            }
            UnitCategory::Weight => {
                let from_factor = self.defs.weight_g.get(&from_token)?;
                let to_factor = self.defs.weight_g.get(&to_token)?;
                Some(quantity * from_factor / to_factor)
            }
            UnitCategory::Count => Some(quantity),
            UnitCategory::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn normalize_folds_aliases_and_case() {
        let conv = UnitConverter::new();
        assert_eq!(conv.normalize("Tablespoons"), Some("tbsp".into()));
        assert_eq!(conv.normalize("tbs"), Some("tbsp".into()));
        assert_eq!(conv.normalize(" TBSP "), Some("tbsp".into()));
        assert_eq!(conv.normalize("Grams"), Some("g".into()));
        assert_eq!(conv.normalize(""), None);
        assert_eq!(conv.normalize("   "), None);
    }

    #[test]
    fn unknown_tokens_become_count_units() {
        let conv = UnitConverter::new();
        assert_eq!(conv.category_of("sprig"), UnitCategory::Count);
        assert_eq!(conv.normalize("sprigs"), Some("sprig".into()));
        assert_eq!(conv.category_of("cup"), UnitCategory::Volume);
        assert_eq!(conv.category_of("kg"), UnitCategory::Weight);
        assert_eq!(conv.category_of(""), UnitCategory::Unknown);
    }

    #[test]
    fn count_units_of_different_names_never_compare() {
        let conv = UnitConverter::new();
        assert!(conv.can_compare("can", "cans"));
        assert!(!conv.can_compare("can", "bottle"));
        assert!(!conv.can_compare("clove", "g"));
        assert_eq!(conv.convert(3.0, "cans", "can"), Some(3.0));
        assert_eq!(conv.convert(3.0, "can", "bottle"), None);
    }

    #[test]
    fn can_compare_is_symmetric() {
        let conv = UnitConverter::new();
        let units = ["g", "kg", "ml", "cup", "can", "bottle", "sprig", ""];
        for a in units {
            for b in units {
                assert_eq!(
                    conv.can_compare(a, b),
                    conv.can_compare(b, a),
                    "symmetry violated for {a:?} / {b:?}"
                );
            }
        }
    }

    #[test]
    fn grams_to_kilograms() {
        let conv = UnitConverter::new();
        let result = conv.convert(1000.0, "g", "kg");
        assert!(result.is_some());
        assert!((result.unwrap_or_default() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn weight_never_converts_to_volume() {
        let conv = UnitConverter::new();
        assert_eq!(conv.convert(500.0, "g", "ml"), None);
        assert!(!conv.can_compare("g", "ml"));
    }

    #[test]
    fn round_trips_stay_within_tolerance() {
        let conv = UnitConverter::new();
        let volume_units = ["ml", "l", "tsp", "tbsp", "fl oz", "cup", "pint", "quart", "gallon"];
        for from in volume_units {
            for to in volume_units {
                let out = conv
                    .convert(2.5, from, to)
                    .and_then(|mid| conv.convert(mid, to, from));
                assert!(
                    out.is_some_and(|v| (v - 2.5).abs() < 1e-6),
                    "round trip failed for {from} -> {to}"
                );
            }
        }
        let weight_units = ["mg", "g", "kg", "oz", "lb"];
        for from in weight_units {
            for to in weight_units {
                let out = conv
                    .convert(2.5, from, to)
                    .and_then(|mid| conv.convert(mid, to, from));
                assert!(
                    out.is_some_and(|v| (v - 2.5).abs() < 1e-6),
                    "round trip failed for {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn cup_factor_matches_constant() {
        let conv = UnitConverter::new();
        let ml = conv.convert(1.0, "cup", "ml");
        assert!(ml.is_some_and(|v| (v - 236.588).abs() < TOLERANCE));
        let g = conv.convert(1.0, "lb", "g");
        assert!(g.is_some_and(|v| (v - 453.592).abs() < TOLERANCE));
    }

    #[test]
    fn custom_tables_are_injectable() {
        let aliases = [("blob", "blob"), ("blobs", "blob")]
            .into_iter()
            .map(|(a, b)| (a.to_owned(), b.to_owned()))
            .collect();
        let volume = [("blob".to_owned(), 2.0), ("ml".to_owned(), 1.0)]
            .into_iter()
            .collect();
        let defs = Arc::new(UnitDefinitions::custom(aliases, volume, HashMap::new()));
        let conv = UnitConverter::with_definitions(defs);
        assert_eq!(conv.category_of("blobs"), UnitCategory::Volume);
        assert_eq!(conv.convert(3.0, "blobs", "ml"), Some(6.0));
    }
}
