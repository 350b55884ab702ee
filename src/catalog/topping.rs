//! Topping catalog entries

use serde::{Deserialize, Serialize};

/// A selectable add-on ingredient.
///
/// Immutable once the catalog is loaded. `bit_weight` is a power of two unique within
/// the catalog; it is what combination identifiers are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topping {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    pub price: f32,
    #[serde(rename = "binary_bit", alias = "bit_weight")]
    pub bit_weight: u32,
    /// 3D asset reference, resolved by an `AssetLoader`
    #[serde(default)]
    pub model_url: Option<String>,
    /// Palette key or `#rrggbb` used when the asset is missing or fails to load
    #[serde(default)]
    pub color: Option<String>,
}

impl Topping {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f32, bit_weight: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            emoji: None,
            price,
            bit_weight,
            model_url: None,
            color: None,
        }
    }

    pub fn with_model(mut self, url: impl Into<String>) -> Self {
        self.model_url = Some(url.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let t = Topping::new("olive", "Black Olive", 1.25, 4)
            .with_model("/models/olive.json")
            .with_emoji("🫒");
        assert_eq!(t.bit_weight, 4);
        assert_eq!(t.model_url.as_deref(), Some("/models/olive.json"));
        assert!(t.color.is_none());
    }

    #[test]
    fn test_deserialize_row() {
        let json = r#"{
            "id": "basil",
            "name": "Fresh Basil",
            "price": 0.75,
            "binary_bit": 8,
            "model_url": null
        }"#;
        let t: Topping = serde_json::from_str(json).unwrap();
        assert_eq!(t.id, "basil");
        assert_eq!(t.bit_weight, 8);
        assert!(t.model_url.is_none());
        assert!(t.emoji.is_none());
    }

    #[test]
    fn test_bit_weight_alias() {
        let json = r#"{"id": "x", "name": "X", "price": 1.0, "bit_weight": 2}"#;
        let t: Topping = serde_json::from_str(json).unwrap();
        assert_eq!(t.bit_weight, 2);
    }
}
