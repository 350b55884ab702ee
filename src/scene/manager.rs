//! Table manager: several dishes arranged on one surface.

use crate::animation::AnimationEvent;
use crate::assets::AssetLoader;
use crate::catalog::{price_with_toppings, MenuItem, Topping};
use crate::core::Result;

use super::composer::{DishHandle, DishOptions, SceneComposer};
use super::config::SceneConfig;
use super::flatten::FlatDrawEntry;

/// Most dishes the layout table has distinct slots for.
pub const MAX_TABLE_SLOTS: usize = 6;

const LAYOUT_1: [(f32, f32); 1] = [(0.0, 0.0)];
const LAYOUT_2: [(f32, f32); 2] = [(-0.2, 0.0), (0.2, 0.0)];
const LAYOUT_3: [(f32, f32); 3] = [(-0.22, -0.08), (0.22, -0.08), (0.0, 0.16)];
const LAYOUT_4: [(f32, f32); 4] = [(-0.2, -0.12), (0.2, -0.12), (-0.2, 0.12), (0.2, 0.12)];
const LAYOUT_5: [(f32, f32); 5] = [
    (-0.24, -0.12),
    (0.0, -0.14),
    (0.24, -0.12),
    (-0.14, 0.12),
    (0.14, 0.12),
];
const LAYOUT_6: [(f32, f32); 6] = [
    (-0.24, -0.12),
    (0.0, -0.14),
    (0.24, -0.12),
    (-0.24, 0.12),
    (0.0, 0.14),
    (0.24, 0.12),
];

/// Table slots (x, z) for `count` dishes. Counts above six use the six-dish layout,
/// and `TableManager` wraps extra dishes onto its slots (dish `i` takes slot
/// `i % 6`) rather than stacking them all at the table center.
pub fn table_layout(count: usize) -> &'static [(f32, f32)] {
    match count {
        0 => &[],
        1 => &LAYOUT_1,
        2 => &LAYOUT_2,
        3 => &LAYOUT_3,
        4 => &LAYOUT_4,
        5 => &LAYOUT_5,
        _ => &LAYOUT_6,
    }
}

/// A dish placed on the table.
#[derive(Debug, Clone)]
pub struct TableDish {
    pub handle: DishHandle,
    pub item: MenuItem,
    pub toppings: Vec<Topping>,
    /// Slot the dish is moving to (or resting at).
    pub slot: (f32, f32),
}

impl TableDish {
    pub fn price(&self) -> f32 {
        price_with_toppings(self.item.price, &self.toppings)
    }
}

/// Keeps every dish on the table in its layout slot, in insertion order.
pub struct TableManager<L: AssetLoader> {
    composer: SceneComposer<L>,
    dishes: Vec<TableDish>,
}

impl<L: AssetLoader> TableManager<L> {
    pub fn new(loader: L, config: SceneConfig) -> Self {
        Self::from_composer(SceneComposer::new(loader, config))
    }

    pub fn with_seed(loader: L, config: SceneConfig, seed: u64) -> Self {
        Self::from_composer(SceneComposer::with_seed(loader, config, seed))
    }

    pub fn from_composer(composer: SceneComposer<L>) -> Self {
        Self {
            composer,
            dishes: Vec::new(),
        }
    }

    /// Put a dish on the table, hidden until `reveal_all`, and re-lay-out.
    pub fn add_dish(&mut self, item: MenuItem, toppings: &[Topping]) -> Result<DishHandle> {
        let options = DishOptions {
            target_size: Some(self.composer.config().table_dish_target_size),
            start_hidden: true,
        };
        let handle = self
            .composer
            .load_dish_with(&item.name, item.model_url.as_deref(), options);
        if let Err(e) = self.composer.set_toppings(handle, toppings) {
            self.composer.dispose(handle);
            return Err(e);
        }

        log::info!("Added '{}' to the table ({} dishes)", item.name, self.dishes.len() + 1);
        self.dishes.push(TableDish {
            handle,
            item,
            toppings: self.composer.selected_toppings(handle).unwrap_or_default().to_vec(),
            slot: (0.0, 0.0),
        });
        self.relayout()?;
        Ok(handle)
    }

    /// Take a dish off the table. Returns false if it was not on it.
    pub fn remove_dish(&mut self, handle: DishHandle) -> Result<bool> {
        let Some(index) = self.dishes.iter().position(|d| d.handle == handle) else {
            return Ok(false);
        };
        let dish = self.dishes.remove(index);
        self.composer.dispose(handle);
        log::info!("Removed '{}' from the table", dish.item.name);
        self.relayout()?;
        Ok(true)
    }

    /// Remove every dish.
    pub fn clear(&mut self) {
        for dish in self.dishes.drain(..) {
            self.composer.dispose(dish.handle);
        }
    }

    /// Pop every dish in, one after another.
    pub fn reveal_all(&mut self) -> Result<()> {
        let stagger = self.composer.config().pop_stagger_ms;
        for (i, dish) in self.dishes.iter().enumerate() {
            self.composer.pop_in(dish.handle, i as f64 * stagger)?;
        }
        Ok(())
    }

    /// Move every dish to its slot for the current count, all at once.
    fn relayout(&mut self) -> Result<()> {
        let slots = table_layout(self.dishes.len());
        if self.dishes.len() > MAX_TABLE_SLOTS {
            log::warn!(
                "{} dishes on the table, slots beyond {} are shared",
                self.dishes.len(),
                MAX_TABLE_SLOTS
            );
        }
        for (i, dish) in self.dishes.iter_mut().enumerate() {
            let slot = slots[i % slots.len()];
            dish.slot = slot;
            self.composer.slide_to(dish.handle, slot.0, slot.1)?;
        }
        Ok(())
    }

    /// Every dish has its model and toppings loaded.
    pub fn is_ready(&self) -> bool {
        self.dishes.iter().all(|d| self.composer.is_ready(d.handle))
    }

    pub fn is_settled(&self) -> bool {
        self.composer.is_settled()
    }

    pub fn tick(&mut self, now_ms: f64) -> Vec<AnimationEvent> {
        self.composer.tick(now_ms)
    }

    pub fn flatten(&mut self) -> Vec<FlatDrawEntry> {
        self.composer.flatten()
    }

    pub fn dishes(&self) -> &[TableDish] {
        &self.dishes
    }

    pub fn slots(&self) -> Vec<(DishHandle, (f32, f32))> {
        self.dishes.iter().map(|d| (d.handle, d.slot)).collect()
    }

    /// Order total for everything on the table.
    pub fn total_price(&self) -> f32 {
        self.dishes.iter().map(TableDish::price).sum()
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    pub fn composer(&self) -> &SceneComposer<L> {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut SceneComposer<L> {
        &mut self.composer
    }
}
