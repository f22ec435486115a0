//! Drink catalog: built-in defaults and JSON seed files.
//!
//! Seed files use the format
//! `{"drinks": [{"name": "Lager", "volume": 330, "alcoholPercentage": 5.0}]}`.
//! Entries without a name or with a non-positive volume are rejected here,
//! so the BAC model only ever sees well-formed drinks.

use crate::similarity::rank;
use crate::{Drink, Error, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Built-in drinks: name, serving volume (ml), alcohol percentage
const DEFAULT_DRINKS: &[(&str, f64, Option<f64>)] = &[
    ("Lager", 330.0, Some(5.0)),
    ("Pale Ale", 355.0, Some(5.5)),
    ("Hazy IPA", 440.0, Some(6.5)),
    ("Stout", 440.0, Some(4.2)),
    ("Alcohol-free Beer", 330.0, None),
    ("Cider", 500.0, Some(4.5)),
    ("Red Wine", 150.0, Some(13.5)),
    ("White Wine", 150.0, Some(12.0)),
    ("Prosecco", 125.0, Some(11.0)),
    ("Champagne", 125.0, Some(12.0)),
    ("Sangria", 200.0, Some(7.0)),
    ("Vodka Shot", 40.0, Some(40.0)),
    ("Tequila Shot", 40.0, Some(38.0)),
    ("Whiskey", 40.0, Some(40.0)),
    ("Rum & Coke", 250.0, Some(8.0)),
    ("Gin & Tonic", 250.0, Some(8.0)),
    ("Vodka Red Bull", 250.0, Some(8.0)),
    ("Martini", 90.0, Some(30.0)),
    ("Mojito", 250.0, Some(10.0)),
    ("Margarita", 150.0, Some(16.0)),
    ("Cosmopolitan", 120.0, Some(20.0)),
    ("Aperol Spritz", 200.0, Some(11.0)),
];

/// One entry of a seed file, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedDrink {
    name: Option<String>,
    volume: Option<f64>,
    alcohol_percentage: Option<f64>,
}

/// Seed file format
#[derive(Debug, Deserialize)]
struct SeedFile {
    drinks: Vec<SeedDrink>,
}

/// The drinks a user can pick from, sorted by name
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub drinks: Vec<Drink>,
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog from the built-in drink table
///
/// **Note**: prefer `get_default_catalog()` which returns a cached reference.
pub fn build_default_catalog() -> Catalog {
    let drinks = DEFAULT_DRINKS
        .iter()
        .filter_map(|(name, volume, pct)| drink_from_seed(name, *volume, *pct))
        .collect();
    Catalog::new(drinks)
}

/// Turn raw seed values into a catalog drink
///
/// Returns `None` for an empty name or a non-positive volume.
fn drink_from_seed(name: &str, volume_ml: f64, alcohol_percentage: Option<f64>) -> Option<Drink> {
    let name = name.trim();
    if name.is_empty() || !(volume_ml > 0.0) {
        return None;
    }

    Some(Drink {
        name: name.to_string(),
        volume_ml,
        abv: alcohol_percentage.unwrap_or(0.0) / 100.0,
        category: infer_category(name).to_string(),
        glyph: infer_glyph(name).to_string(),
    })
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

const BEER_WORDS: &[&str] = &["beer", "ale", "lager", "stout"];
const WINE_WORDS: &[&str] = &["wine", "sangria", "prosecco", "champagne"];
const SPIRIT_WORDS: &[&str] = &["vodka", "gin", "rum", "tequila", "whiskey", "bourbon"];
const COCKTAIL_WORDS: &[&str] = &["martini", "cocktail", "mojito", "margarita"];

/// Display glyph guessed from a drink name
pub fn infer_glyph(name: &str) -> &'static str {
    let lower = name.to_lowercase();

    if contains_any(&lower, BEER_WORDS) {
        "🍺"
    } else if contains_any(&lower, WINE_WORDS) {
        "🍷"
    } else if contains_any(&lower, SPIRIT_WORDS) {
        "🥃"
    } else if contains_any(&lower, COCKTAIL_WORDS) {
        "🍸"
    } else if lower.contains("shot") {
        "🥃"
    } else {
        "🍹"
    }
}

/// Category label guessed from a drink name
pub fn infer_category(name: &str) -> &'static str {
    let lower = name.to_lowercase();

    if contains_any(&lower, BEER_WORDS) {
        "Beer"
    } else if contains_any(&lower, WINE_WORDS) {
        "Wine"
    } else if lower.contains("shot") {
        "Shot"
    } else {
        "Cocktail"
    }
}

impl Catalog {
    /// Build a catalog, sorting drinks by name
    pub fn new(mut drinks: Vec<Drink>) -> Self {
        drinks.sort_by(|a, b| a.name.cmp(&b.name));
        Self { drinks }
    }

    /// Parse a JSON seed document, skipping malformed entries
    pub fn from_seed_json(json: &str) -> Result<Self> {
        let seed: SeedFile = serde_json::from_str(json)?;
        let total = seed.drinks.len();

        let drinks: Vec<Drink> = seed
            .drinks
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                let drink = match (entry.name.as_deref(), entry.volume) {
                    (Some(name), Some(volume)) => {
                        drink_from_seed(name, volume, entry.alcohol_percentage)
                    }
                    _ => None,
                };
                if drink.is_none() {
                    tracing::warn!("Skipping malformed catalog entry #{}: {:?}", idx, entry);
                }
                drink
            })
            .collect();

        tracing::info!("Loaded {} of {} catalog entries", drinks.len(), total);

        if drinks.is_empty() {
            return Err(Error::Catalog("catalog contains no valid drinks".into()));
        }

        Ok(Self::new(drinks))
    }

    /// Load a JSON seed file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_seed_json(&contents)?;
        tracing::info!("Loaded catalog from {:?}", path);
        Ok(catalog)
    }

    /// Load a seed file when one is configured, otherwise the built-in catalog
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(get_default_catalog().clone()),
        }
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.drinks.is_empty() {
            errors.push("Catalog has no drinks".to_string());
        }

        for drink in &self.drinks {
            if drink.name.trim().is_empty() {
                errors.push("Drink has empty name".to_string());
            }
            if !(drink.volume_ml > 0.0) {
                errors.push(format!(
                    "Drink '{}' has non-positive volume {}",
                    drink.name, drink.volume_ml
                ));
            }
            if !(0.0..=1.0).contains(&drink.abv) {
                errors.push(format!(
                    "Drink '{}' has ABV {} outside 0..1",
                    drink.name, drink.abv
                ));
            }
        }

        let mut seen = HashSet::new();
        for drink in &self.drinks {
            if !seen.insert(drink.name.to_lowercase()) {
                errors.push(format!("Duplicate drink name '{}'", drink.name));
            }
        }

        errors
    }

    /// Case-insensitive exact lookup by name
    pub fn find(&self, name: &str) -> Option<&Drink> {
        self.drinks
            .iter()
            .find(|d| d.name.to_lowercase() == name.to_lowercase())
    }

    /// Fuzzy search by name
    pub fn search(&self, query: &str, threshold: f64) -> Vec<&Drink> {
        rank(query.trim(), &self.drinks, |d| d.name.as_str(), threshold)
    }

    /// The single best match for a query
    ///
    /// An exact name wins outright; otherwise the top-ranked fuzzy match.
    pub fn best_match(&self, query: &str, threshold: f64) -> Result<&Drink> {
        if let Some(drink) = self.find(query.trim()) {
            return Ok(drink);
        }

        if query.trim().is_empty() {
            return Err(Error::NoMatch(query.to_string()));
        }

        self.search(query, threshold)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoMatch(query.to_string()))
    }
}
