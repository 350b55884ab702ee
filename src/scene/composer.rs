//! Dish composition: base model, cross-section layers, and placed toppings.
//!
//! Every dish is one subtree under the graph root:
//!
//! ```text
//! dish            position on the table, pop-in scale
//! ├── base        sinks in the exploded view
//! │   └── model   normalized dish model or fallback disc
//! ├── layers      dough / sauce / cheese discs, hidden until exploded
//! └── toppings
//!     └── group   one per selected topping, lifted by group index when exploded
//!         └── instance ...
//! ```
//!
//! Loads are requested through an `AssetLoader` and picked up in `tick`. Topping
//! loads carry the dish's generation so completions that arrive after a newer
//! `set_toppings` are dropped instead of adding orphaned nodes.

use std::collections::{HashMap, HashSet};

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{
    AnimationEvent, Animator, Motion, PlatingDirector, PlatingEvent, PlatingLayer,
    PlatingOptions, SequenceId, Tween, TweenProperty,
};
use crate::assets::{AssetLoader, AssetRequestId};
use crate::catalog::{fallback_color, resolve_color, Topping};
use crate::core::{Error, Result};
use crate::math::{Aabb, Ease};
use crate::placement::{group_by_topping, place_toppings};

use super::config::SceneConfig;
use super::flatten::FlatDrawEntry;
use super::graph::SceneGraph;
use super::node::{LocalTransform, NodeContent, PrimitiveShape, SceneNodeId};

/// Handle to a composed dish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DishHandle(pub u64);

/// Cross-section layers revealed by the exploded view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Dough,
    Sauce,
    Cheese,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Dough, LayerKind::Sauce, LayerKind::Cheese];

    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Dough => "dough",
            LayerKind::Sauce => "sauce",
            LayerKind::Cheese => "cheese",
        }
    }

    fn exploded_offset(self, config: &SceneConfig) -> f32 {
        match self {
            LayerKind::Dough => config.dough_offset,
            LayerKind::Sauce => config.sauce_offset,
            LayerKind::Cheese => config.cheese_offset,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DishOptions {
    /// Overrides `SceneConfig::dish_target_size`.
    pub target_size: Option<f32>,
    /// Start collapsed to the hidden scale, waiting for `pop_in`.
    pub start_hidden: bool,
}

struct Dish {
    name: String,
    root: SceneNodeId,
    base: SceneNodeId,
    layers: Vec<(LayerKind, SceneNodeId)>,
    toppings_root: SceneNodeId,
    /// (topping index in the selection, group node)
    groups: Vec<(usize, SceneNodeId)>,
    selected: Vec<Topping>,
    target_size: f32,
    generation: u64,
    exploded: bool,
    base_ready: bool,
    pending_toppings: usize,
}

#[derive(Clone, Copy, Debug)]
struct Spot {
    x: f32,
    z: f32,
    rotation: f32,
    occurrence: usize,
    /// Position in the whole placement run; drives the drop stagger.
    drop_index: usize,
}

enum PendingLoad {
    DishModel {
        dish: DishHandle,
    },
    ToppingModel {
        dish: DishHandle,
        generation: u64,
        topping: Topping,
        group: SceneNodeId,
        spots: Vec<Spot>,
    },
}

/// Owns the scene graph and composes dishes into it.
pub struct SceneComposer<L: AssetLoader> {
    graph: SceneGraph,
    animator: Animator,
    loader: L,
    config: SceneConfig,
    rng: StdRng,
    dishes: HashMap<DishHandle, Dish>,
    pending: HashMap<AssetRequestId, PendingLoad>,
    plating: PlatingDirector,
    plating_dish: Option<DishHandle>,
    plating_events: Vec<(DishHandle, PlatingEvent)>,
    draw_list: Vec<FlatDrawEntry>,
    next_dish: u64,
    now_ms: f64,
}

impl<L: AssetLoader> SceneComposer<L> {
    pub fn new(loader: L, config: SceneConfig) -> Self {
        Self::with_rng(loader, config, StdRng::from_os_rng())
    }

    /// Deterministic placements, for tests and reproducible previews.
    pub fn with_seed(loader: L, config: SceneConfig, seed: u64) -> Self {
        Self::with_rng(loader, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(loader: L, config: SceneConfig, rng: StdRng) -> Self {
        Self {
            graph: SceneGraph::new(),
            animator: Animator::new(),
            loader,
            config,
            rng,
            dishes: HashMap::new(),
            pending: HashMap::new(),
            plating: PlatingDirector::new(PlatingOptions::default()),
            plating_dish: None,
            plating_events: Vec::new(),
            draw_list: Vec::new(),
            next_dish: 0,
            now_ms: 0.0,
        }
    }

    /// Add a dish and start loading its model. Without a model reference the
    /// fallback disc is built right away.
    pub fn load_dish(&mut self, name: &str, model_ref: Option<&str>) -> DishHandle {
        self.load_dish_with(name, model_ref, DishOptions::default())
    }

    pub fn load_dish_with(
        &mut self,
        name: &str,
        model_ref: Option<&str>,
        options: DishOptions,
    ) -> DishHandle {
        let handle = DishHandle(self.next_dish);
        self.next_dish += 1;

        let target_size = options.target_size.unwrap_or(self.config.dish_target_size);
        let graph_root = self.graph.root();
        let root = self.graph.add_child(graph_root, format!("dish/{name}"), NodeContent::Group);
        let base = self.graph.add_child(root, "base", NodeContent::Group);
        let layers_root = self.graph.add_child(root, "layers", NodeContent::Group);
        let toppings_root = self.graph.add_child(root, "toppings", NodeContent::Group);

        let layer_radius = target_size * 0.45;
        let layers = LayerKind::ALL
            .iter()
            .map(|&kind| {
                let node = self.graph.add_child(
                    layers_root,
                    kind.label(),
                    NodeContent::Primitive {
                        shape: PrimitiveShape::Disc {
                            radius: layer_radius,
                            thickness: 0.008,
                        },
                        color: fallback_color(kind.label()),
                    },
                );
                self.graph.set_visible(node, false);
                self.graph.set_opacity(node, 0.0);
                (kind, node)
            })
            .collect();

        if options.start_hidden {
            if let Some(node) = self.graph.get_mut(root) {
                node.local_transform.scale = self.config.hidden_scale;
                node.visible = false;
            }
        }

        let mut dish = Dish {
            name: name.to_string(),
            root,
            base,
            layers,
            toppings_root,
            groups: Vec::new(),
            selected: Vec::new(),
            target_size,
            generation: 0,
            exploded: false,
            base_ready: false,
            pending_toppings: 0,
        };

        match model_ref {
            Some(url) => {
                let id = self.loader.request(url);
                self.pending.insert(id, PendingLoad::DishModel { dish: handle });
                log::debug!("Requested dish model {} for '{}'", url, name);
            }
            None => {
                let content = fallback_dish(&dish, &self.config);
                attach_base(&mut self.graph, &mut dish, content);
                log::debug!("No model for '{}', using fallback disc", name);
            }
        }

        self.dishes.insert(handle, dish);
        handle
    }

    /// Replace the dish's toppings with a fresh placement of `selected`.
    /// Returns how many instances were placed.
    pub fn set_toppings(&mut self, handle: DishHandle, selected: &[Topping]) -> Result<usize> {
        self.finish_plating(handle);
        let dish = self
            .dishes
            .get_mut(&handle)
            .ok_or(Error::UnknownDish(handle.0))?;

        // Tear down the previous set, including anything still dropping
        for (_, group) in dish.groups.drain(..) {
            let nodes = self.graph.subtree(group);
            self.animator.cancel_nodes(&nodes);
            self.graph.remove(group);
        }
        dish.generation += 1;
        dish.pending_toppings = 0;

        let mut seen = HashSet::new();
        let toppings: Vec<Topping> = selected
            .iter()
            .filter(|t| seen.insert(t.id.clone()))
            .cloned()
            .collect();
        dish.selected = toppings.clone();

        let placements = place_toppings(&toppings, &self.config.placement, &mut self.rng);
        let mut drop_index = 0;

        for (topping_index, points) in group_by_topping(&placements) {
            let topping = &toppings[topping_index];
            let group = self.graph.add_child(
                dish.toppings_root,
                format!("toppings/{}", topping.id),
                NodeContent::Group,
            );
            if dish.exploded {
                if let Some(node) = self.graph.get_mut(group) {
                    node.local_transform.position.y = self.config.topping_lift(topping_index);
                }
            }
            dish.groups.push((topping_index, group));

            let spots: Vec<Spot> = points
                .iter()
                .map(|p| {
                    let spot = Spot {
                        x: p.x,
                        z: p.z,
                        rotation: p.rotation,
                        occurrence: p.occurrence,
                        drop_index,
                    };
                    drop_index += 1;
                    spot
                })
                .collect();

            match &topping.model_url {
                Some(url) => {
                    let id = self.loader.request(url);
                    self.pending.insert(
                        id,
                        PendingLoad::ToppingModel {
                            dish: handle,
                            generation: dish.generation,
                            topping: topping.clone(),
                            group,
                            spots,
                        },
                    );
                    dish.pending_toppings += 1;
                }
                None => {
                    let content = fallback_topping(topping, &self.config);
                    instantiate_toppings(
                        &mut self.graph,
                        &mut self.animator,
                        &self.config,
                        self.now_ms,
                        group,
                        topping,
                        content,
                        &spots,
                    );
                }
            }
        }

        log::info!(
            "Dish '{}': {} toppings, {} instances placed",
            dish.name,
            toppings.len(),
            placements.len()
        );
        Ok(placements.len())
    }

    /// Animate into or out of the exploded cross-section view.
    pub fn set_exploded(&mut self, handle: DishHandle, exploded: bool) -> Result<()> {
        self.finish_plating(handle);
        let dish = self
            .dishes
            .get_mut(&handle)
            .ok_or(Error::UnknownDish(handle.0))?;
        dish.exploded = exploded;

        let motion = if exploded { Motion::Explode } else { Motion::Collapse };
        let now = self.now_ms;
        let duration = self.config.explode_duration_ms;
        let tween = |node: SceneNodeId, property: TweenProperty, to: f32| {
            Tween::new(node, property, to, motion)
                .starting_at(now)
                .over(duration)
                .eased(Ease::InOutQuad)
        };

        for &(kind, node) in &dish.layers {
            let (y, opacity) = if exploded {
                (kind.exploded_offset(&self.config), 1.0)
            } else {
                (0.0, 0.0)
            };
            let mut lift = tween(node, TweenProperty::PositionY, y);
            let mut fade = tween(node, TweenProperty::Opacity, opacity);
            if exploded {
                lift = lift.revealing();
                fade = fade.revealing();
            } else {
                lift = lift.hiding();
                fade = fade.hiding();
            }
            self.animator.schedule_from_current(lift, &self.graph);
            self.animator.schedule_from_current(fade, &self.graph);
        }

        for &(index, group) in &dish.groups {
            let y = if exploded { self.config.topping_lift(index) } else { 0.0 };
            self.animator
                .schedule_from_current(tween(group, TweenProperty::PositionY, y), &self.graph);
        }

        let sink = if exploded { -self.config.base_sink } else { 0.0 };
        self.animator
            .schedule_from_current(tween(dish.base, TweenProperty::PositionY, sink), &self.graph);

        log::debug!("Dish '{}' exploded={}", dish.name, exploded);
        Ok(())
    }

    pub fn is_exploded(&self, handle: DishHandle) -> Option<bool> {
        self.dishes.get(&handle).map(|d| d.exploded)
    }

    /// Grow the dish from the hidden scale to full size after `delay_ms`.
    pub fn pop_in(&mut self, handle: DishHandle, delay_ms: f64) -> Result<()> {
        let root = self.dish_root(handle).ok_or(Error::UnknownDish(handle.0))?;
        if let Some(node) = self.graph.get_mut(root) {
            node.local_transform.scale = self.config.hidden_scale;
            node.visible = false;
        }
        self.animator.schedule(
            Tween::new(root, TweenProperty::Scale, 1.0, Motion::PopIn)
                .from(self.config.hidden_scale)
                .starting_at(self.now_ms + delay_ms)
                .over(self.config.pop_duration_ms)
                .eased(Ease::OutBackCubic)
                .revealing(),
        );
        Ok(())
    }

    /// Shrink the dish away and hide it.
    pub fn pop_out(&mut self, handle: DishHandle, delay_ms: f64) -> Result<()> {
        let root = self.dish_root(handle).ok_or(Error::UnknownDish(handle.0))?;
        self.animator.schedule_from_current(
            Tween::new(root, TweenProperty::Scale, self.config.hidden_scale, Motion::PopOut)
                .starting_at(self.now_ms + delay_ms)
                .over(self.config.pop_duration_ms * 0.5)
                .eased(Ease::InOutCubic)
                .hiding(),
            &self.graph,
        );
        Ok(())
    }

    /// Ease the dish to a new table position, starting from where it is now.
    pub fn slide_to(&mut self, handle: DishHandle, x: f32, z: f32) -> Result<()> {
        let root = self.dish_root(handle).ok_or(Error::UnknownDish(handle.0))?;
        for (property, to) in [(TweenProperty::PositionX, x), (TweenProperty::PositionZ, z)] {
            self.animator.schedule_from_current(
                Tween::new(root, property, to, Motion::Relayout)
                    .starting_at(self.now_ms)
                    .over(self.config.relayout_duration_ms)
                    .eased(Ease::InOutQuad),
                &self.graph,
            );
        }
        Ok(())
    }

    /// Run the plating sequence on a dish: base first, then each topping group.
    /// Returns `None` while another plating sequence is still running.
    pub fn plate(&mut self, handle: DishHandle) -> Result<Option<SequenceId>> {
        let dish = self.dishes.get(&handle).ok_or(Error::UnknownDish(handle.0))?;

        let base_y = if dish.exploded { -self.config.base_sink } else { 0.0 };
        let mut layers = vec![PlatingLayer::new("base", vec![dish.base], base_y)];
        for &(index, group) in &dish.groups {
            let label = dish
                .selected
                .get(index)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| format!("topping {index}"));
            let y = if dish.exploded { self.config.topping_lift(index) } else { 0.0 };
            layers.push(PlatingLayer::new(label, vec![group], y));
        }

        let started = self
            .plating
            .start(layers, &mut self.animator, &mut self.graph, self.now_ms);
        if started.is_some() {
            self.plating_dish = Some(handle);
        }
        Ok(started)
    }

    pub fn cancel_plating(&mut self) -> bool {
        self.plating_dish = None;
        self.plating.cancel(&mut self.animator)
    }

    /// Jump a plating sequence running on `handle` to its end state, so its
    /// nodes can be rebuilt or re-tweened without leaving it waiting forever.
    fn finish_plating(&mut self, handle: DishHandle) {
        if self.plating_dish != Some(handle) {
            return;
        }
        self.plating_dish = None;
        for event in self.plating.complete(&mut self.animator, &mut self.graph) {
            self.plating_events.push((handle, event));
        }
    }

    pub fn is_plating(&self) -> bool {
        self.plating.is_running()
    }

    /// Plating progress gathered since the last call.
    pub fn drain_plating_events(&mut self) -> Vec<(DishHandle, PlatingEvent)> {
        std::mem::take(&mut self.plating_events)
    }

    /// Remove the dish and every node it owns. Loads still in flight for it are
    /// discarded when they arrive.
    pub fn dispose(&mut self, handle: DishHandle) -> bool {
        let Some(dish) = self.dishes.remove(&handle) else {
            return false;
        };
        if self.plating_dish == Some(handle) {
            self.cancel_plating();
        }
        let nodes = self.graph.subtree(dish.root);
        self.animator.cancel_nodes(&nodes);
        let removed = self.graph.remove(dish.root);
        log::debug!("Disposed dish '{}' ({} nodes)", dish.name, removed);
        true
    }

    /// Pick up finished loads and advance animations to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Vec<AnimationEvent> {
        self.now_ms = now_ms;

        for result in self.loader.poll() {
            let Some(pending) = self.pending.remove(&result.id) else {
                log::debug!("Ignoring completion for unknown request {:?}", result.id);
                continue;
            };

            match pending {
                PendingLoad::DishModel { dish: handle } => {
                    let Some(dish) = self.dishes.get_mut(&handle) else {
                        log::debug!("Discarding {} for disposed dish", result.url);
                        continue;
                    };
                    let content = match result.outcome {
                        Ok(asset) => {
                            log::info!("Loaded dish model {} for '{}'", result.url, dish.name);
                            NodeContent::Model { asset }
                        }
                        Err(e) => {
                            log::warn!("{}; using fallback for '{}'", e, dish.name);
                            fallback_dish(dish, &self.config)
                        }
                    };
                    attach_base(&mut self.graph, dish, content);
                }
                PendingLoad::ToppingModel {
                    dish: handle,
                    generation,
                    topping,
                    group,
                    spots,
                } => {
                    let Some(dish) = self.dishes.get_mut(&handle) else {
                        log::debug!("Discarding {} for disposed dish", result.url);
                        continue;
                    };
                    if dish.generation != generation {
                        log::warn!(
                            "Discarding stale {} for '{}' (toppings changed)",
                            result.url,
                            dish.name
                        );
                        continue;
                    }
                    dish.pending_toppings = dish.pending_toppings.saturating_sub(1);

                    let content = match result.outcome {
                        Ok(asset) => NodeContent::Model { asset },
                        Err(e) => {
                            log::warn!("{}; using fallback for '{}'", e, topping.name);
                            fallback_topping(&topping, &self.config)
                        }
                    };
                    instantiate_toppings(
                        &mut self.graph,
                        &mut self.animator,
                        &self.config,
                        now_ms,
                        group,
                        &topping,
                        content,
                        &spots,
                    );
                }
            }
        }

        let events = self.animator.tick(now_ms, &mut self.graph);

        if let Some(handle) = self.plating_dish {
            for event in self.plating.observe(&events) {
                self.plating_events.push((handle, event));
            }
            if !self.plating.is_running() {
                self.plating_dish = None;
            }
        }
        events
    }

    /// Base model attached and no topping loads outstanding.
    pub fn is_ready(&self, handle: DishHandle) -> bool {
        self.dishes
            .get(&handle)
            .is_some_and(|d| d.base_ready && d.pending_toppings == 0)
    }

    /// Nothing loading and nothing animating.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty() && self.animator.is_idle()
    }

    /// Draw list for the current state. Reused as long as the graph is unchanged.
    pub fn flatten(&mut self) -> Vec<FlatDrawEntry> {
        if self.graph.is_dirty() {
            self.draw_list = self.graph.flatten();
        }
        self.draw_list.clone()
    }

    pub fn dish_root(&self, handle: DishHandle) -> Option<SceneNodeId> {
        self.dishes.get(&handle).map(|d| d.root)
    }

    pub fn base_node(&self, handle: DishHandle) -> Option<SceneNodeId> {
        self.dishes.get(&handle).map(|d| d.base)
    }

    pub fn layer_node(&self, handle: DishHandle, kind: LayerKind) -> Option<SceneNodeId> {
        self.dishes
            .get(&handle)?
            .layers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, node)| *node)
    }

    /// Group node per selected topping, with the topping's selection index.
    pub fn topping_groups(&self, handle: DishHandle) -> Vec<(usize, SceneNodeId)> {
        self.dishes
            .get(&handle)
            .map(|d| d.groups.clone())
            .unwrap_or_default()
    }

    /// Every topping instance node on the dish.
    pub fn topping_nodes(&self, handle: DishHandle) -> Vec<SceneNodeId> {
        self.topping_groups(handle)
            .into_iter()
            .flat_map(|(_, group)| self.graph.children(group).collect::<Vec<_>>())
            .collect()
    }

    pub fn selected_toppings(&self, handle: DishHandle) -> Option<&[Topping]> {
        self.dishes.get(&handle).map(|d| d.selected.as_slice())
    }

    /// Table position (x, z) of the dish root.
    pub fn dish_position(&self, handle: DishHandle) -> Option<(f32, f32)> {
        let root = self.dish_root(handle)?;
        let p = self.graph.get(root)?.local_transform.position;
        Some((p.x, p.z))
    }

    pub fn dish_name(&self, handle: DishHandle) -> Option<&str> {
        self.dishes.get(&handle).map(|d| d.name.as_str())
    }

    pub fn contains(&self, handle: DishHandle) -> bool {
        self.dishes.contains_key(&handle)
    }

    pub fn dish_count(&self) -> usize {
        self.dishes.len()
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

/// Scale so the largest extent equals `target`, and the offset that then puts
/// the bounds center at the origin.
fn normalize(bounds: &Aabb, target: f32) -> (f32, Vec3) {
    let dim = bounds.max_dimension();
    let scale = if dim > 0.0 { target / dim } else { 1.0 };
    (scale, -bounds.center() * scale)
}

fn fallback_dish(dish: &Dish, config: &SceneConfig) -> NodeContent {
    NodeContent::Primitive {
        shape: PrimitiveShape::Disc {
            radius: dish.target_size * 0.5,
            thickness: config.fallback_dish_thickness,
        },
        color: fallback_color(&dish.name),
    }
}

fn fallback_topping(topping: &Topping, config: &SceneConfig) -> NodeContent {
    NodeContent::Primitive {
        shape: PrimitiveShape::Sphere {
            radius: config.fallback_topping_radius,
        },
        color: resolve_color(topping.color.as_deref(), &topping.name),
    }
}

fn attach_base(graph: &mut SceneGraph, dish: &mut Dish, content: NodeContent) {
    // A second completion replaces the first
    let old: Vec<SceneNodeId> = graph.children(dish.base).collect();
    for node in old {
        graph.remove(node);
    }

    let bounds = content.local_bounds().unwrap_or_else(Aabb::empty);
    let (scale, offset) = normalize(&bounds, dish.target_size);
    let model = graph.add_child(dish.base, "model", content);
    graph.set_transform(
        model,
        LocalTransform {
            position: offset,
            rotation: Quat::IDENTITY,
            scale,
        },
    );
    dish.base_ready = true;
}

/// Create one node per spot, parked above its rest height and hidden, with a
/// staggered drop scheduled for each.
#[allow(clippy::too_many_arguments)]
fn instantiate_toppings(
    graph: &mut SceneGraph,
    animator: &mut Animator,
    config: &SceneConfig,
    now_ms: f64,
    group: SceneNodeId,
    topping: &Topping,
    content: NodeContent,
    spots: &[Spot],
) -> usize {
    if !graph.contains(group) {
        return 0;
    }
    let bounds = content.local_bounds().unwrap_or_else(Aabb::empty);
    let (scale, _) = normalize(&bounds, config.topping_target_size);
    let half_height = bounds.size().y.max(0.0) * scale * 0.5;

    for spot in spots {
        let rotation = Quat::from_rotation_y(spot.rotation);
        let rest = Vec3::new(spot.x, config.surface_base_y + half_height, spot.z)
            - rotation * (bounds.center() * scale);

        // Clones of a model share its Arc
        let node = graph.add_child(
            group,
            format!("{}#{}", topping.id, spot.occurrence),
            content.clone(),
        );
        graph.set_transform(
            node,
            LocalTransform {
                position: rest + Vec3::Y * config.drop_height,
                rotation,
                scale,
            },
        );
        graph.set_visible(node, false);

        animator.schedule(
            Tween::new(node, TweenProperty::PositionY, rest.y, Motion::Drop)
                .from(rest.y + config.drop_height)
                .starting_at(now_ms + spot.drop_index as f64 * config.drop_stagger_ms)
                .over(config.drop_duration_ms)
                .eased(Ease::OutBackCubic)
                .revealing(),
        );
    }
    spots.len()
}
