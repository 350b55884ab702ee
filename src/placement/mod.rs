//! Topping placement on a dish surface.
//!
//! Rejection sampling on a disc: each instance draws uniform points inside the inner
//! radius until one clears the minimum distance to every point already accepted in
//! this run, across all toppings. Instances that exhaust the attempt cap are dropped.

use std::f32::consts::TAU;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Topping;
use crate::core::{Error, Result};

/// Upper bound on `instances_per_topping` accepted from a config file.
pub const MAX_INSTANCES_PER_TOPPING: usize = 256;

/// Surface geometry and sampling limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Max distance from the center; keeps instances off the crust.
    pub inner_radius: f32,
    /// Minimum center-to-center gap between any two instances.
    pub min_distance: f32,
    pub instances_per_topping: usize,
    /// Candidates drawn per instance before it is skipped.
    pub max_attempts: u32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            inner_radius: 0.11,
            min_distance: 0.028,
            instances_per_topping: 6,
            max_attempts: 80,
        }
    }
}

impl PlacementParams {
    /// Load from file (sync). Missing fields keep their defaults.
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.inner_radius.is_finite() && self.inner_radius > 0.0) {
            return Err(Error::Config(format!(
                "inner_radius must be positive, got {}",
                self.inner_radius
            )));
        }
        if !(self.min_distance.is_finite() && self.min_distance > 0.0) {
            return Err(Error::Config(format!(
                "min_distance must be positive, got {}",
                self.min_distance
            )));
        }
        if self.instances_per_topping > MAX_INSTANCES_PER_TOPPING {
            return Err(Error::Config(format!(
                "instances_per_topping {} exceeds {}",
                self.instances_per_topping, MAX_INSTANCES_PER_TOPPING
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// One accepted instance.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementPoint {
    pub topping_id: String,
    /// Position of the topping in the selected set; doubles as its group index.
    pub topping_index: usize,
    /// Which of the requested instances of this topping this is.
    pub occurrence: usize,
    pub x: f32,
    pub z: f32,
    pub rotation: f32,
}

impl PlacementPoint {
    pub fn distance_to(&self, other: &PlacementPoint) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Scatter `params.instances_per_topping` instances of every topping.
pub fn place_toppings<R: Rng + ?Sized>(
    toppings: &[Topping],
    params: &PlacementParams,
    rng: &mut R,
) -> Vec<PlacementPoint> {
    let requested = toppings.len().saturating_mul(params.instances_per_topping);
    let cap = toppings.len().saturating_mul(MAX_INSTANCES_PER_TOPPING);
    let mut results = Vec::with_capacity(requested.min(cap));
    if toppings.is_empty() {
        return results;
    }

    let mut accepted: Vec<(f32, f32)> = Vec::with_capacity(results.capacity());
    let mut skipped = 0usize;

    for (topping_index, topping) in toppings.iter().enumerate() {
        for occurrence in 0..params.instances_per_topping {
            let Some((x, z)) = try_place(&accepted, params, rng) else {
                skipped += 1;
                continue;
            };
            accepted.push((x, z));
            results.push(PlacementPoint {
                topping_id: topping.id.clone(),
                topping_index,
                occurrence,
                x,
                z,
                rotation: rng.random::<f32>() * TAU,
            });
        }
    }

    if skipped > 0 {
        log::debug!(
            "Placement skipped {} of {} instances (surface too crowded)",
            skipped,
            requested
        );
    }
    results
}

/// Draw candidates until one clears every accepted point, or give up.
fn try_place<R: Rng + ?Sized>(
    accepted: &[(f32, f32)],
    params: &PlacementParams,
    rng: &mut R,
) -> Option<(f32, f32)> {
    let min_sq = params.min_distance * params.min_distance;
    for _ in 0..params.max_attempts {
        // sqrt keeps the density uniform over area rather than over radius
        let angle = rng.random::<f32>() * TAU;
        let radius = params.inner_radius * rng.random::<f32>().sqrt();
        let x = angle.cos() * radius;
        let z = angle.sin() * radius;

        let clear = accepted.iter().all(|&(px, pz)| {
            let dx = x - px;
            let dz = z - pz;
            dx * dx + dz * dz >= min_sq
        });
        if clear {
            return Some((x, z));
        }
    }
    None
}

/// Group placements by topping, keeping selection order.
pub fn group_by_topping(points: &[PlacementPoint]) -> Vec<(usize, Vec<&PlacementPoint>)> {
    let mut groups: Vec<(usize, Vec<&PlacementPoint>)> = Vec::new();
    for point in points {
        match groups.iter_mut().find(|(index, _)| *index == point.topping_index) {
            Some((_, spots)) => spots.push(point),
            None => groups.push((point.topping_index, vec![point])),
        }
    }
    groups
}
