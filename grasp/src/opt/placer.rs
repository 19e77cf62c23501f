use crate::config::GraspConfig;
use crate::opt::search::{AnchorMode, Target, apply, search};
use crate::time::Deadline;
use curenest::entities::{Exclusion, ExclusionReason, Item, Layout, NestInstance, ResourceConflict};
use itertools::Itertools;
use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::Rng;
use rand::SeedableRng;
use rand::prelude::SmallRng;
use rand_distr::{Distribution, Normal};
use std::cmp::Reverse;

/// The state of a single autoclave during a solve.
#[derive(Clone, Debug)]
pub struct BinLoad {
    pub layout: Layout,
    /// Items assigned to the autoclave that are not placed, with the cause
    pub unplaced: Vec<Exclusion>,
}

impl BinLoad {
    pub fn new(layout: Layout) -> Self {
        BinLoad {
            layout,
            unplaced: vec![],
        }
    }
}

/// Single-bin placer: fills the ground level of one autoclave with a corner-fitting construction,
/// improved by randomized restarts (GRASP) and completed by a gap-filling pass.
pub struct BinPlacer<'a> {
    pub instance: &'a NestInstance,
    pub config: &'a GraspConfig,
    pub bin_id: usize,
    /// Seed of the solve, combined with the autoclave and the attempt for every restart
    pub seed: u64,
}

impl<'a> BinPlacer<'a> {
    pub fn new(
        instance: &'a NestInstance,
        config: &'a GraspConfig,
        bin_id: usize,
        seed: u64,
    ) -> Self {
        Self {
            instance,
            config,
            bin_id,
            seed,
        }
    }

    pub fn solve(&self, item_ids: &[usize], deadline: &Deadline) -> BinLoad {
        let bin = self.instance.autoclave(self.bin_id);
        let order = item_placement_order(self.instance, item_ids);

        let mut best = self.construct(&order, deadline);
        let mut n_constructions = 1;

        let noise = Normal::new(1.0, self.config.perturbation_stddev).ok();

        for attempt in 1..=self.config.n_restarts {
            if best.unplaced.is_empty() || deadline.is_expired() {
                break;
            }
            let Some(noise) = noise.as_ref() else {
                break;
            };
            let mut rng = SmallRng::seed_from_u64(attempt_seed(self.seed, bin.ext_id, attempt));
            let order = perturbed_placement_order(self.instance, item_ids, noise, &mut rng);
            let candidate = self.construct(&order, deadline);
            n_constructions += 1;

            //strict improvement only, ties keep the earlier construction
            if candidate.layout.placed_item_area() > best.layout.placed_item_area() {
                debug!(
                    "[NEST] autoclave {}: restart {attempt} improved placed area {} -> {} mm²",
                    bin.ext_id,
                    best.layout.placed_item_area(),
                    candidate.layout.placed_item_area()
                );
                best = candidate;
            }
        }

        gap_fill(self.instance, &mut best, deadline);

        info!(
            "[NEST] autoclave {}: placed {}/{} tools after {} construction(s), density {:.3}%",
            bin.ext_id,
            best.layout.placed_items.len(),
            item_ids.len(),
            n_constructions,
            best.layout.density() * 100.0
        );
        best
    }

    /// Greedy corner-fitting construction: every item in `order` is placed at its best anchor, if any.
    fn construct(&self, order: &[usize], deadline: &Deadline) -> BinLoad {
        let mut load = BinLoad::new(Layout::new(self.instance, self.bin_id));

        for (i, &item_id) in order.iter().enumerate() {
            if deadline.is_expired() {
                load.unplaced.extend(
                    order[i..]
                        .iter()
                        .map(|id| Exclusion::new(*id, ExclusionReason::Timeout)),
                );
                break;
            }
            let item = self.instance.item(item_id);
            if let Some(reason) = place_on_ground(&mut load.layout, item, AnchorMode::Corners) {
                load.unplaced.push(Exclusion::new(item_id, reason));
            }
        }
        load
    }
}

/// Tries to place the item on the ground level of the layout.
/// Returns the reason it was not placed, if so.
pub fn place_on_ground(
    layout: &mut Layout,
    item: &Item,
    mode: AnchorMode,
) -> Option<ExclusionReason> {
    if let Some(conflict) = layout.resource_conflict(item, None) {
        return Some(conflict_reason(conflict));
    }
    match search(layout, item, Target::Ground, mode) {
        Some(option) => {
            apply(layout, item, &option);
            None
        }
        None => Some(ExclusionReason::AreaUnavailable),
    }
}

pub fn conflict_reason(conflict: ResourceConflict) -> ExclusionReason {
    match conflict {
        ResourceConflict::Weight | ResourceConflict::StandWeight => ExclusionReason::WeightExceeded,
        ResourceConflict::VacuumLines => ExclusionReason::VacuumLinesExceeded,
    }
}

/// Retries every item left out for lack of space (or time) against all edge alignments of the layout,
/// recovering residual gaps the corner anchors miss.
pub fn gap_fill(instance: &NestInstance, load: &mut BinLoad, deadline: &Deadline) {
    let unplaced = std::mem::take(&mut load.unplaced);
    for exclusion in unplaced {
        let retry = matches!(
            exclusion.reason,
            ExclusionReason::AreaUnavailable | ExclusionReason::Timeout
        );
        if !retry || deadline.is_expired() {
            load.unplaced.push(exclusion);
            continue;
        }
        let item = instance.item(exclusion.item_id);
        match place_on_ground(&mut load.layout, item, AnchorMode::Grid) {
            None => debug!("[NEST] gap-filled tool {}", item.ext_id),
            Some(reason) => load.unplaced.push(Exclusion::new(item.id, reason)),
        }
    }
}

/// Descending priority, then descending area, ties broken by ascending external id.
pub fn item_placement_order(instance: &NestInstance, item_ids: &[usize]) -> Vec<usize> {
    item_ids
        .iter()
        .copied()
        .sorted_by_key(|id| {
            let item = instance.item(*id);
            (Reverse(item.priority), Reverse(item.area()), item.ext_id)
        })
        .collect_vec()
}

/// Like [`item_placement_order`], with the area of every item multiplied by a sample of `noise`.
/// Priority remains the primary key.
pub fn perturbed_placement_order(
    instance: &NestInstance,
    item_ids: &[usize],
    noise: &Normal<f64>,
    rng: &mut impl Rng,
) -> Vec<usize> {
    item_ids
        .iter()
        .copied()
        .sorted_by_cached_key(|id| {
            let item = instance.item(*id);
            let factor = f64::max(noise.sample(rng), 0.0);
            let area = OrderedFloat(item.area() as f64 * factor);
            (Reverse(item.priority), Reverse(area), item.ext_id)
        })
        .collect_vec()
}

/// Seed for a restart, derived from the seed of the solve, the autoclave and the attempt index.
pub fn attempt_seed(seed: u64, bin_ext_id: u64, attempt: usize) -> u64 {
    [bin_ext_id, attempt as u64]
        .into_iter()
        .fold(seed, |acc, v| splitmix64(acc ^ v))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
