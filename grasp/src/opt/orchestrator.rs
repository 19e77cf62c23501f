use crate::config::GraspConfig;
use crate::opt::compaction::compact;
use crate::opt::distributor::{Distribution, distribute, rank_bins};
use crate::opt::placer::{BinLoad, BinPlacer, gap_fill, place_on_ground};
use crate::opt::search::AnchorMode;
use crate::opt::two_level::{
    GroundOnly, LevelExtension, StandExtension, is_eligible, place_raised,
};
use crate::time::{Deadline, TimeStamp};
use curenest::Mm2;
use curenest::entities::{
    BatchSolution, CureCycleId, Exclusion, ExclusionReason, Item, Layout, NestInstance,
};
use curenest::io::export::export;
use curenest::io::ext_repr::{SolveRequest, SolveResponse};
use curenest::io::import::import;
use curenest::util::FPA;
use curenest::util::assertions;
use itertools::Itertools;
use log::{debug, info, warn};
use rand::prelude::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::fmt::Display;
use thousands::Separable;

/// Solves a request with the given configuration.
/// Never fails: invalid requests and configurations result in a response with `success: false`.
pub fn solve(request: &SolveRequest, config: &GraspConfig) -> SolveResponse {
    let start = TimeStamp::now();
    if let Err(err) = config.validate() {
        warn!("[GRASP] rejected configuration: {err:#}");
        let message = format!("invalid configuration: {err:#}");
        return SolveResponse::failure(message, start.elapsed_ms());
    }
    let instance = match import(request) {
        Ok(instance) => instance,
        Err(err) => {
            warn!("[GRASP] rejected request: {err:#}");
            let message = format!("invalid request: {err:#}");
            return SolveResponse::failure(message, start.elapsed_ms());
        }
    };
    let solution = GraspOptimizer::new(&instance, *config, start).solve();
    export(&instance, &solution)
}

/// Stages of a solve, in the order they are entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Validation,
    Distribution,
    Level0Solving,
    Level1Solving,
    PostProcessing,
    Finalization,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Multi-autoclave optimizer: distributes the tools per cure cycle and fills every autoclave
/// in parallel with a [`BinPlacer`], extended onto the raised levels where in use.
pub struct GraspOptimizer<'a> {
    pub instance: &'a NestInstance,
    pub config: GraspConfig,
    pub phase: Phase,
    /// Seed all randomized restarts are derived from
    pub seed: u64,
    /// Wall-clock budget of the whole solve
    pub budget_ms: f64,
    start: TimeStamp,
    /// Whether a phase was skipped or cut short because the budget ran out
    interrupted: bool,
}

impl<'a> GraspOptimizer<'a> {
    /// Creates an optimizer whose time budget counts from `start`.
    pub fn new(instance: &'a NestInstance, config: GraspConfig, start: TimeStamp) -> Self {
        let two_level = (0..instance.autoclaves.len()).any(|b| instance.raised_enabled(b));
        let budget_ms = config.time_budget.budget_ms(
            instance.total_item_qty(),
            instance.autoclaves.len(),
            two_level,
        );
        let seed = match config.prng_seed {
            Some(seed) => seed,
            None => SmallRng::from_os_rng().random(),
        };
        Self {
            instance,
            config,
            phase: Phase::Validation,
            seed,
            budget_ms,
            start,
            interrupted: false,
        }
    }

    pub fn solve(&mut self) -> BatchSolution {
        info!(
            "[GRASP] solving {} tool(s) over {} autoclave(s), budget {:.0}ms, seed {}",
            self.instance.total_item_qty(),
            self.instance.autoclaves.len(),
            self.budget_ms,
            self.seed
        );
        if self.instance.options.force_regenerate {
            debug!("[GRASP] force_regenerate set, results are never cached");
        }
        let total = self.deadline(1.0);

        let (candidates, mut exclusions) = pre_filter(self.instance);

        self.enter(Phase::Distribution);
        let distribution = distribute(self.instance, &candidates, &self.config);
        exclusions.extend(distribution.exclusions.iter().cloned());

        let mut loads = match total.is_expired() {
            true => {
                self.interrupted = true;
                self.unattempted(&distribution)
            }
            false => {
                self.enter(Phase::Level0Solving);
                let level_0 = self.deadline(self.config.level_0_share);
                self.solve_ground(&distribution, &level_0)
            }
        };

        if !self.interrupted && loads.iter().any(|l| l.layout.has_raised_level()) {
            match total.is_expired() {
                true => {
                    self.interrupted = true;
                    time_out_raised_candidates(self.instance, &mut loads);
                }
                false => {
                    self.enter(Phase::Level1Solving);
                    let level_1 =
                        self.deadline(self.config.level_0_share + self.config.level_1_share);
                    extend_levels(self.instance, &mut loads, &level_1);
                }
            }
        }

        if !self.interrupted {
            match total.is_expired() {
                true => self.interrupted = true,
                false => {
                    self.enter(Phase::PostProcessing);
                    self.post_process(&mut loads, &distribution.cure_cycles, &total);
                }
            }
        }

        self.enter(Phase::Finalization);
        self.finalize(loads, exclusions)
    }

    fn enter(&mut self, phase: Phase) {
        debug_assert!(phase > self.phase);
        info!(
            "[GRASP] {} -> {} ({:.3}ms)",
            self.phase,
            phase,
            self.start.elapsed_ms()
        );
        self.phase = phase;
    }

    /// Deadline at the given fraction of the budget, measured from the start of the solve.
    fn deadline(&self, share: f64) -> Deadline {
        Deadline::new(self.start, self.budget_ms * share)
    }

    /// Empty layouts, with every assigned item excluded for lack of time.
    fn unattempted(&self, distribution: &Distribution) -> Vec<BinLoad> {
        distribution
            .assignments
            .iter()
            .enumerate()
            .map(|(bin_id, item_ids)| {
                let mut load = BinLoad::new(Layout::new(self.instance, bin_id));
                load.unplaced.extend(
                    item_ids
                        .iter()
                        .map(|id| Exclusion::new(*id, ExclusionReason::Timeout)),
                );
                load
            })
            .collect_vec()
    }

    /// Fills the ground level of every autoclave with its assigned items, autoclaves in parallel.
    fn solve_ground(&self, distribution: &Distribution, deadline: &Deadline) -> Vec<BinLoad> {
        let (instance, config, seed) = (self.instance, &self.config, self.seed);
        distribution
            .assignments
            .par_iter()
            .enumerate()
            .map(|(bin_id, item_ids)| match item_ids.is_empty() {
                true => BinLoad::new(Layout::new(instance, bin_id)),
                false => BinPlacer::new(instance, config, bin_id, seed).solve(item_ids, deadline),
            })
            .collect()
    }

    /// Compacts every layout and retries the leftovers in the space freed up.
    fn post_process(
        &mut self,
        loads: &mut [BinLoad],
        cure_cycles: &[Option<CureCycleId>],
        deadline: &Deadline,
    ) {
        let instance = self.instance;
        let max_sweeps = self.config.max_compaction_sweeps;
        loads.par_iter_mut().for_each(|load| {
            if load.layout.is_empty() && load.unplaced.is_empty() {
                return;
            }
            let n_moves = compact(&mut load.layout, max_sweeps, deadline);
            let n_unplaced = load.unplaced.len();
            gap_fill(instance, load, deadline);
            if load.layout.has_raised_level() {
                let unplaced = std::mem::take(&mut load.unplaced);
                load.unplaced =
                    StandExtension.extend(instance, &mut load.layout, unplaced, deadline);
            }
            debug!(
                "[POST] autoclave {}: {n_moves} compaction move(s), {} leftover(s) recovered",
                instance.autoclave(load.layout.bin_id).ext_id,
                n_unplaced - load.unplaced.len()
            );
        });

        if self.config.cross_bin_retry {
            cross_bin_retry(instance, loads, cure_cycles, deadline);
        }
        if deadline.is_expired() {
            debug!("[POST] time budget ran out during post-processing");
            self.interrupted = true;
        }
    }

    /// Re-validates every layout, rolls back whatever fails and assembles the solution.
    fn finalize(&self, mut loads: Vec<BinLoad>, mut exclusions: Vec<Exclusion>) -> BatchSolution {
        for load in loads.iter_mut() {
            let violations = load.layout.violations();
            if !violations.is_empty() {
                warn!(
                    "[GRASP] autoclave {}: rolling back {} placement(s) failing re-validation",
                    self.instance.autoclave(load.layout.bin_id).ext_id,
                    violations.len()
                );
            }
            for pk in violations {
                let pi = load.layout.remove_item(pk);
                exclusions.push(
                    Exclusion::new(pi.item_id, ExclusionReason::AreaUnavailable)
                        .with_details("placement failed re-validation and was rolled back"),
                );
            }
            exclusions.append(&mut load.unplaced);
        }

        let timed_out = self.interrupted
            || exclusions
                .iter()
                .any(|e| e.reason == ExclusionReason::Timeout);

        let solution = BatchSolution {
            layout_snapshots: loads.iter().map(|l| l.layout.save()).collect_vec(),
            exclusions,
            solve_time_ms: self.start.elapsed_ms(),
            timed_out,
        };
        debug_assert!(assertions::solution_is_total(self.instance, &solution));
        debug_assert!(assertions::solution_is_feasible(self.instance, &solution));
        debug_assert!(assertions::rotations_are_legal(self.instance, &solution));

        info!(
            "[GRASP] finished in {:.3}ms: {}/{} tools placed in {} autoclave(s), {} mm² covered, density {:.3}%{}",
            solution.solve_time_ms,
            solution.n_items_placed(),
            self.instance.total_item_qty(),
            solution.used_layouts().count(),
            solution
                .used_layouts()
                .map(|ls| ls.placed_item_area())
                .sum::<Mm2>()
                .separate_with_commas(),
            solution.density() * 100.0,
            if timed_out { " (timed out)" } else { "" }
        );
        solution
    }
}

/// Runs the level extension of every autoclave on the items its ground level left out.
fn extend_levels(instance: &NestInstance, loads: &mut [BinLoad], deadline: &Deadline) {
    loads.par_iter_mut().for_each(|load| {
        let unplaced = std::mem::take(&mut load.unplaced);
        load.unplaced = match load.layout.has_raised_level() {
            true => StandExtension.extend(instance, &mut load.layout, unplaced, deadline),
            false => GroundOnly.extend(instance, &mut load.layout, unplaced, deadline),
        };
    });
}

/// Relabels the leftovers the raised level never got to try as [`ExclusionReason::Timeout`].
fn time_out_raised_candidates(instance: &NestInstance, loads: &mut [BinLoad]) {
    for load in loads.iter_mut().filter(|l| l.layout.has_raised_level()) {
        for exclusion in load.unplaced.iter_mut() {
            let item = instance.item(exclusion.item_id);
            let untried = exclusion.reason == ExclusionReason::AreaUnavailable;
            if untried && is_eligible(item, &load.layout) {
                exclusion.reason = ExclusionReason::Timeout;
            }
        }
    }
}

/// Offers items left out for lack of space to the other autoclaves running the same cure cycle.
fn cross_bin_retry(
    instance: &NestInstance,
    loads: &mut [BinLoad],
    cure_cycles: &[Option<CureCycleId>],
    deadline: &Deadline,
) {
    for origin in 0..loads.len() {
        let pending = std::mem::take(&mut loads[origin].unplaced);
        for exclusion in pending {
            if exclusion.reason != ExclusionReason::AreaUnavailable || deadline.is_expired() {
                loads[origin].unplaced.push(exclusion);
                continue;
            }
            let item = instance.item(exclusion.item_id);
            let host = (0..loads.len())
                .filter(|b| *b != origin && cure_cycles[*b] == Some(item.cure_cycle))
                .find(|b| place_anywhere(&mut loads[*b].layout, item));
            match host {
                Some(b) => info!(
                    "[POST] tool {} moved from autoclave {} to {}",
                    item.ext_id,
                    instance.autoclave(origin).ext_id,
                    instance.autoclave(b).ext_id
                ),
                None => loads[origin].unplaced.push(exclusion),
            }
        }
    }
}

fn place_anywhere(layout: &mut Layout, item: &Item) -> bool {
    place_on_ground(layout, item, AnchorMode::Grid).is_none()
        || (is_eligible(item, layout) && place_raised(layout, item))
}

/// Excludes the items none of the autoclaves available to the solve could ever hold.
/// Returns the remaining candidates and the exclusions.
pub fn pre_filter(instance: &NestInstance) -> (Vec<usize>, Vec<Exclusion>) {
    let bins = rank_bins(instance);
    let (candidates, exclusions): (Vec<_>, Vec<_>) = instance
        .items
        .iter()
        .map(|item| match rejection(instance, &bins, item) {
            None => Ok(item.id),
            Some(exclusion) => Err(exclusion),
        })
        .partition_result();

    if !exclusions.is_empty() {
        info!(
            "[GRASP] {} tool(s) excluded up front: {:?}",
            exclusions.len(),
            exclusions
                .iter()
                .map(|e| (instance.item(e.item_id).ext_id, e.reason))
                .collect_vec()
        );
    }
    (candidates, exclusions)
}

fn rejection(instance: &NestInstance, bins: &[usize], item: &Item) -> Option<Exclusion> {
    let autoclaves = || bins.iter().map(|b| (*b, instance.autoclave(*b)));

    let fits = autoclaves().any(|(b, bin)| {
        bin.usable_area(instance.clearance(b))
            .is_some_and(|usable| item.fits_in(usable.width(), usable.height()))
    });
    if !fits {
        return Some(
            Exclusion::new(item.id, ExclusionReason::NoBinFits).with_details(format!(
                "{}x{} mm does not fit the usable area of any autoclave",
                item.width, item.height
            )),
        );
    }
    if autoclaves().all(|(_, bin)| !FPA::fits(0.0, item.weight, bin.max_weight)) {
        return Some(
            Exclusion::new(item.id, ExclusionReason::WeightExceeded).with_details(format!(
                "{} kg exceeds the capacity of every autoclave",
                item.weight
            )),
        );
    }
    if autoclaves().all(|(_, bin)| item.vacuum_lines > bin.vacuum_lines) {
        return Some(
            Exclusion::new(item.id, ExclusionReason::VacuumLinesExceeded).with_details(format!(
                "{} vacuum lines exceed the capacity of every autoclave",
                item.vacuum_lines
            )),
        );
    }
    if !autoclaves().any(|(_, bin)| bin.accepts_cure_cycle(item.cure_cycle)) {
        return Some(
            Exclusion::new(item.id, ExclusionReason::CureCycleConflict).with_details(format!(
                "no autoclave runs cure cycle {}",
                item.cure_cycle
            )),
        );
    }
    None
}
