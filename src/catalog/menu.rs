//! Menu items that can be placed on the table.

use serde::{Deserialize, Serialize};

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f32,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "modelUrl")]
    pub model_url: Option<String>,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            category: String::new(),
            model_url: None,
        }
    }

    pub fn with_model(mut self, url: impl Into<String>) -> Self {
        self.model_url = Some(url.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_item() {
        let item: MenuItem =
            serde_json::from_str(r#"{"id": "m1", "name": "Margherita", "price": 14.5}"#).unwrap();
        assert_eq!(item, MenuItem::new("m1", "Margherita", 14.5));
    }

    #[test]
    fn test_model_url_alias() {
        let item: MenuItem = serde_json::from_str(
            r#"{"id": "m2", "name": "Calzone", "price": 12.0, "modelUrl": "models/calzone.json"}"#,
        )
        .unwrap();
        assert_eq!(item.model_url.as_deref(), Some("models/calzone.json"));
    }
}
