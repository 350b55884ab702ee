//! Topping catalog loading and validation.
//!
//! The catalog is the only place bit weights are checked. Everything downstream
//! (placement, combination ids, scene composition) assumes a validated catalog.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use super::topping::Topping;

/// On-disk catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    toppings: Vec<Topping>,
}

/// Validated, immutable list of toppings.
#[derive(Debug, Clone)]
pub struct ToppingCatalog {
    toppings: Vec<Topping>,
}

impl ToppingCatalog {
    /// Build a catalog, failing fast on duplicate ids or bad bit weights.
    pub fn new(toppings: Vec<Topping>) -> Result<Self> {
        validate(&toppings)?;
        Ok(Self { toppings })
    }

    /// The demo menu's toppings.
    pub fn builtin() -> Self {
        let toppings = vec![
            Topping::new("mushroom", "Mushroom", 1.50, 1).with_model("models/mushroom.json").with_emoji("🍄"),
            Topping::new("pepper", "Green Pepper", 1.00, 2).with_model("models/pepper.json").with_emoji("🫑"),
            Topping::new("olive", "Black Olive", 1.25, 4).with_model("models/olive.json").with_emoji("🫒"),
            Topping::new("basil", "Fresh Basil", 0.75, 8).with_emoji("🌿"),
            Topping::new("cheese", "Extra Cheese", 2.00, 16).with_emoji("🧀"),
            Topping::new("onion", "Red Onion", 0.75, 32).with_emoji("🧅"),
            Topping::new("tomato", "Cherry Tomato", 1.25, 64).with_model("models/tomato.json").with_emoji("🍅"),
        ];
        Self { toppings }
    }

    /// Parse a catalog from JSON (`{"toppings": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.toppings)
    }

    /// Load from file (sync)
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        log::info!("Loaded {} toppings from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let file = CatalogFile { toppings: self.toppings.clone() };
        let json = serde_json::to_string_pretty(&file)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn toppings(&self) -> &[Topping] {
        &self.toppings
    }

    pub fn len(&self) -> usize {
        self.toppings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toppings.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Topping> {
        self.toppings.iter().find(|t| t.id == id)
    }

    /// Build a selected set from ids. Unknown ids are skipped, repeats collapse,
    /// and the catalog order is kept.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Topping> {
        let wanted: HashSet<&str> = ids.iter().map(|s| s.as_ref()).collect();
        for id in &wanted {
            if self.get(id).is_none() {
                log::warn!("Ignoring unknown topping id '{}'", id);
            }
        }
        self.toppings
            .iter()
            .filter(|t| wanted.contains(t.id.as_str()))
            .cloned()
            .collect()
    }
}

/// Dish price including its toppings.
pub fn price_with_toppings(base_price: f32, selected: &[Topping]) -> f32 {
    base_price + selected.iter().map(|t| t.price).sum::<f32>()
}

fn validate(toppings: &[Topping]) -> Result<()> {
    let mut ids = HashSet::new();
    let mut seen_bits = 0u32;
    for topping in toppings {
        if !ids.insert(topping.id.as_str()) {
            return Err(Error::Catalog(format!("duplicate topping id '{}'", topping.id)));
        }
        if !topping.bit_weight.is_power_of_two() {
            return Err(Error::Catalog(format!(
                "topping '{}' has bit weight {} which is not a power of two",
                topping.id, topping.bit_weight
            )));
        }
        if seen_bits & topping.bit_weight != 0 {
            return Err(Error::Catalog(format!(
                "topping '{}' reuses bit weight {}",
                topping.id, topping.bit_weight
            )));
        }
        seen_bits |= topping.bit_weight;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let catalog = ToppingCatalog::builtin();
        assert_eq!(catalog.len(), 7);
        assert!(validate(catalog.toppings()).is_ok());
    }

    #[test]
    fn test_rejects_bit_collision() {
        let result = ToppingCatalog::new(vec![
            Topping::new("a", "A", 1.0, 1),
            Topping::new("b", "B", 1.0, 1),
        ]);
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(ToppingCatalog::new(vec![Topping::new("a", "A", 1.0, 3)]).is_err());
        assert!(ToppingCatalog::new(vec![Topping::new("a", "A", 1.0, 0)]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let result = ToppingCatalog::new(vec![
            Topping::new("a", "A", 1.0, 1),
            Topping::new("a", "A again", 1.0, 2),
        ]);
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_select_dedups_and_skips_unknown() {
        let catalog = ToppingCatalog::builtin();
        let selected = catalog.select(&["olive", "mushroom", "olive", "anchovy"]);
        let ids: Vec<&str> = selected.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["mushroom", "olive"]);
    }

    #[test]
    fn test_price_with_toppings() {
        let catalog = ToppingCatalog::builtin();
        let selected = catalog.select(&["mushroom", "cheese"]);
        assert!((price_with_toppings(12.0, &selected) - 15.5).abs() < 1e-5);
        assert_eq!(price_with_toppings(12.0, &[]), 12.0);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog").join("toppings.json");
        let catalog = ToppingCatalog::builtin();
        catalog.save_sync(&path).unwrap();

        let loaded = ToppingCatalog::load_sync(&path).unwrap();
        assert_eq!(loaded.toppings(), catalog.toppings());
    }

    #[test]
    fn test_from_json_collision_fails() {
        let json = r#"{"toppings": [
            {"id": "a", "name": "A", "price": 1.0, "binary_bit": 2},
            {"id": "b", "name": "B", "price": 1.0, "binary_bit": 2}
        ]}"#;
        assert!(matches!(ToppingCatalog::from_json_str(json), Err(Error::Catalog(_))));
    }
}
