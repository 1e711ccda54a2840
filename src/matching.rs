// ABOUTME: Fuzzy ingredient-name matching between recipe lines and pantry items
// ABOUTME: Normalizes names through alias/prefix tables and scores candidates on a three-tier scale
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

//! # Ingredient Matching
//!
//! Decides which pantry item (if any) a recipe's ingredient name refers to.
//! Scoring is three-tiered and the ordering is a deliberate tie-break:
//! exact equality (1.0) always outranks substring containment (<= 0.9),
//! which always outranks token overlap (<= 0.8). The 0.5 default threshold
//! is a pragmatic compromise between matching "onion" to "onion powder" and
//! missing "tomatoes" for "tomato".

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use crate::models::PantryItem;

/// Score multiplier applied to substring matches
const SUBSTRING_SCALE: f64 = 0.9;
/// Score multiplier applied to token-overlap matches
const OVERLAP_SCALE: f64 = 0.8;
/// Default minimum score for a match to count
pub const DEFAULT_MIN_SCORE: f64 = 0.5;

/// Immutable name-normalization tables
///
/// Built once at process start and injected into [`IngredientMatcher`] so
/// tests can substitute custom tables.
#[derive(Debug, Clone)]
pub struct MatcherTables {
    /// Descriptive words stripped from the front of a name, word by word
    prefixes: HashSet<String>,
    /// Phrases stripped from the end of a name
    suffixes: Vec<String>,
    /// Variant spelling -> canonical ingredient name
    aliases: HashMap<String, String>,
}

impl MatcherTables {
    /// Build the standard prefix/suffix/alias tables
    #[must_use]
    pub fn standard() -> Self {
        let prefixes = [
            "fresh", "organic", "raw", "whole", "chopped", "diced", "sliced", "minced", "grated",
            "shredded", "ground", "crushed", "melted", "softened", "cooked", "uncooked", "dried",
            "frozen", "canned", "ripe", "large", "medium", "small", "extra", "boneless",
            "skinless", "lean", "light", "low-fat", "nonfat", "reduced-fat", "unsweetened",
            "sweetened", "toasted", "roasted", "peeled", "pitted", "seeded",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect();

        let suffixes = [
            "to taste",
            "for garnish",
            "for serving",
            "optional",
            "divided",
            "as needed",
            "at room temperature",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect();

        let alias_groups: &[(&[&str], &str)] = &[
            (
                &["unsalted butter", "salted butter", "sweet butter"],
                "butter",
            ),
            (
                &[
                    "ap flour",
                    "all-purpose flour",
                    "all purpose flour",
                    "plain flour",
                    "bread flour",
                ],
                "flour",
            ),
            (
                &["granulated sugar", "white sugar", "caster sugar"],
                "sugar",
            ),
            (&["tomatoes", "roma tomato", "plum tomato"], "tomato"),
            (&["yellow onion", "white onion", "red onion", "onions"], "onion"),
            (&["garlic clove", "garlic cloves"], "garlic"),
            (&["scallion", "scallions", "green onion"], "spring onion"),
            (&["chicken breast", "chicken breasts", "chicken thigh"], "chicken"),
            (&["beef mince", "minced beef", "hamburger meat"], "ground beef"),
            (&["whole milk", "skim milk", "semi-skimmed milk"], "milk"),
            (&["heavy cream", "double cream", "whipping cream"], "cream"),
            (&["olive oil", "extra virgin olive oil", "evoo"], "oil"),
            (&["kosher salt", "sea salt", "table salt"], "salt"),
            (&["black pepper", "white pepper", "cracked pepper"], "pepper"),
            (&["cheddar", "cheddar cheese"], "cheese"),
            (&["eggs"], "egg"),
            (&["potatoes"], "potato"),
            (&["chilies", "chillies", "chili pepper"], "chili"),
            (&["coriander leaves", "fresh coriander"], "cilantro"),
            (&["spaghetti", "penne", "fusilli", "macaroni"], "pasta"),
            (&["basmati rice", "jasmine rice", "long-grain rice"], "rice"),
        ];

        let mut aliases = HashMap::new();
        for (variants, canonical) in alias_groups {
            for variant in *variants {
                aliases.insert((*variant).to_owned(), (*canonical).to_owned());
            }
        }

        Self {
            prefixes,
            suffixes,
            aliases,
        }
    }

    /// Build custom tables (primarily for tests)
    #[must_use]
    pub fn custom(
        prefixes: HashSet<String>,
        suffixes: Vec<String>,
        aliases: HashMap<String, String>,
    ) -> Self {
        Self {
            prefixes,
            suffixes,
            aliases,
        }
    }
}

impl Default for MatcherTables {
    fn default() -> Self {
        Self::standard()
    }
}

static STANDARD_TABLES: LazyLock<Arc<MatcherTables>> =
    LazyLock::new(|| Arc::new(MatcherTables::standard()));

/// A pantry item candidate with its match confidence
#[derive(Debug, Clone, Copy)]
pub struct ScoredMatch<'a> {
    /// The matched pantry item
    pub item: &'a PantryItem,
    /// Match confidence in [0, 1]
    pub score: f64,
}

/// Resolves recipe ingredient names to pantry items
#[derive(Debug, Clone)]
pub struct IngredientMatcher {
    tables: Arc<MatcherTables>,
}

impl Default for IngredientMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientMatcher {
    /// Matcher over the standard tables
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::clone(&STANDARD_TABLES),
        }
    }

    /// Matcher over injected tables
    #[must_use]
    pub fn with_tables(tables: Arc<MatcherTables>) -> Self {
        Self { tables }
    }

    /// Canonical form of an ingredient name
    ///
    /// Lower-cases; strips parenthetical remarks; truncates at the first
    /// comma; strips descriptive prefixes word-by-word and suffix phrases;
    /// resolves through the alias table; finally applies simple
    /// singular/plural folding (trailing "s"/"es") with a second alias
    /// lookup. Irregular plurals ("leaves") are a known limitation.
    #[must_use]
    pub fn normalize_name(&self, name: &str) -> String {
        let mut working = name.trim().to_lowercase();

        // Parenthetical remarks: "(about 2 cups)"
        while let Some(open) = working.find('(') {
            match working[open..].find(')') {
                Some(close) => working.replace_range(open..=open + close, " "),
                None => working.truncate(open),
            }
        }

        // Everything after the first comma is preparation detail
        if let Some(comma) = working.find(',') {
            working.truncate(comma);
        }

        for suffix in &self.tables.suffixes {
            if let Some(stripped) = working.trim_end().strip_suffix(suffix.as_str()) {
                working = stripped.to_owned();
            }
        }

        let mut tokens: Vec<&str> = working.split_whitespace().collect();
        while tokens.len() > 1 && self.tables.prefixes.contains(tokens[0]) {
            tokens.remove(0);
        }
        while tokens.len() > 1 {
            let Some(last) = tokens.last() else { break };
            if self.tables.prefixes.contains(*last) {
                tokens.pop();
            } else {
                break;
            }
        }

        let joined = tokens.join(" ");
        if let Some(canonical) = self.tables.aliases.get(&joined) {
            return canonical.clone();
        }

        // Plural fold, consulting the alias table again on the stem
        if let Some(stem) = joined.strip_suffix("es") {
            if let Some(canonical) = self.tables.aliases.get(stem) {
                return canonical.clone();
            }
        }
        if joined.len() > 3 {
            if let Some(stem) = joined.strip_suffix('s') {
                return self
                    .tables
                    .aliases
                    .get(stem)
                    .cloned()
                    .unwrap_or_else(|| stem.to_owned());
            }
        }

        joined
    }

    /// Confidence that two *normalized* names refer to the same substance
    ///
    /// 1.0 for exact equality; substring containment scores the
    /// shorter-to-longer length ratio scaled by 0.9; otherwise Jaccard
    /// token overlap scaled by 0.8; 0.0 when no tokens overlap.
    #[must_use]
    pub fn match_score(&self, ingredient: &str, pantry: &str) -> f64 {
        if ingredient.is_empty() || pantry.is_empty() {
            return 0.0;
        }
        if ingredient == pantry {
            return 1.0;
        }

        if ingredient.contains(pantry) || pantry.contains(ingredient) {
            let shorter = ingredient.len().min(pantry.len()) as f64;
            let longer = ingredient.len().max(pantry.len()) as f64;
            return (shorter / longer) * SUBSTRING_SCALE;
        }

        let a: HashSet<&str> = ingredient.split_whitespace().collect();
        let b: HashSet<&str> = pantry.split_whitespace().collect();
        let intersection = a.intersection(&b).count();
        if intersection == 0 {
            return 0.0;
        }
        let union = a.union(&b).count();
        (intersection as f64 / union as f64) * OVERLAP_SCALE
    }

    /// Best active pantry match for an ingredient name, if any clears `min_score`
    ///
    /// Archived and wasted items are never candidates.
    #[must_use]
    pub fn find_best_match<'a>(
        &self,
        ingredient_name: &str,
        pantry_items: &'a [PantryItem],
        min_score: f64,
    ) -> Option<ScoredMatch<'a>> {
        let normalized = self.normalize_name(ingredient_name);
        let mut best: Option<ScoredMatch<'a>> = None;
        for item in pantry_items.iter().filter(|i| i.is_active()) {
            let score = self.match_score(&normalized, &self.normalize_name(&item.name));
            if score < min_score {
                continue;
            }
            if best.is_none_or(|current| score > current.score) {
                best = Some(ScoredMatch { item, score });
            }
        }
        best
    }

    /// All active pantry matches at or above `min_score`, best first
    #[must_use]
    pub fn find_all_matches<'a>(
        &self,
        ingredient_name: &str,
        pantry_items: &'a [PantryItem],
        min_score: f64,
    ) -> Vec<ScoredMatch<'a>> {
        let normalized = self.normalize_name(ingredient_name);
        let mut matches: Vec<ScoredMatch<'a>> = pantry_items
            .iter()
            .filter(|i| i.is_active())
            .filter_map(|item| {
                let score = self.match_score(&normalized, &self.normalize_name(&item.name));
                (score >= min_score).then_some(ScoredMatch { item, score })
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(name: &str) -> PantryItem {
        PantryItem {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_owned(),
            quantity: Some(1.0),
            unit: None,
            category: None,
            location: crate::models::StorageLocation::Pantry,
            expiry_date: None,
            is_archived: false,
            is_wasted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn prefix_stripping_and_alias_folding_agree() {
        let m = IngredientMatcher::new();
        assert_eq!(
            m.normalize_name("Fresh Organic Tomatoes"),
            m.normalize_name("tomato")
        );
        assert_eq!(m.normalize_name("unsalted butter"), "butter");
        assert_eq!(m.normalize_name("AP Flour"), "flour");
    }

    #[test]
    fn comma_and_parenthetical_are_stripped() {
        let m = IngredientMatcher::new();
        assert_eq!(m.normalize_name("butter, softened"), "butter");
        assert_eq!(m.normalize_name("flour (sifted)"), "flour");
        assert_eq!(m.normalize_name("salt, to taste"), "salt");
    }

    #[test]
    fn plural_folding_consults_aliases() {
        let m = IngredientMatcher::new();
        assert_eq!(m.normalize_name("carrots"), "carrot");
        assert_eq!(m.normalize_name("eggs"), "egg");
        assert_eq!(m.normalize_name("potatoes"), "potato");
    }

    #[test]
    fn self_match_scores_one() {
        let m = IngredientMatcher::new();
        for name in ["butter", "flour", "spring onion"] {
            assert!((m.match_score(name, name) - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn exact_outranks_substring_outranks_overlap() {
        let m = IngredientMatcher::new();
        let exact = m.match_score("onion", "onion");
        let substring = m.match_score("onion", "onion powder");
        let overlap = m.match_score("red onion flakes", "onion powder");
        assert!(exact > substring, "exact must outrank substring");
        assert!(substring <= SUBSTRING_SCALE);
        assert!(overlap <= OVERLAP_SCALE);
        assert!((m.match_score("basil", "onion") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn best_match_skips_archived_and_wasted() {
        let m = IngredientMatcher::new();
        let mut gone = item("butter");
        gone.is_archived = true;
        let mut binned = item("butter");
        binned.is_wasted = true;
        let items = vec![gone, binned, item("margarine")];
        assert!(m
            .find_best_match("unsalted butter", &items, DEFAULT_MIN_SCORE)
            .is_none());
    }

    #[test]
    fn best_match_prefers_higher_score() {
        let m = IngredientMatcher::new();
        let items = vec![item("onion powder"), item("onion")];
        let best = m.find_best_match("yellow onion", &items, DEFAULT_MIN_SCORE);
        assert!(best.is_some_and(|s| s.item.name == "onion" && s.score > 0.99));
    }

    #[test]
    fn all_matches_sorted_descending() {
        let m = IngredientMatcher::new();
        let items = vec![item("onion powder"), item("onion"), item("basil")];
        let all = m.find_all_matches("onion", &items, 0.1);
        assert_eq!(all.len(), 2);
        assert!(all[0].score >= all[1].score);
        assert_eq!(all[0].item.name, "onion");
    }

    #[test]
    fn custom_tables_are_injectable() {
        let aliases = [("speltmeal", "spelt")]
            .into_iter()
            .map(|(a, b)| (a.to_owned(), b.to_owned()))
            .collect();
        let tables = Arc::new(MatcherTables::custom(
            HashSet::new(),
            Vec::new(),
            aliases,
        ));
        let m = IngredientMatcher::with_tables(tables);
        assert_eq!(m.normalize_name("Speltmeal"), "spelt");
    }
}
