//! Topping catalog, menu items, and fallback colors.

pub mod topping;
pub mod library;
pub mod palette;
pub mod menu;

pub use topping::Topping;
pub use library::{price_with_toppings, ToppingCatalog};
pub use menu::MenuItem;
pub use palette::{fallback_color, resolve_color, Color, DEFAULT_FALLBACK};
