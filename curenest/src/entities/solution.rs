use crate::entities::LayoutSnapshot;
use crate::Mm2;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Why an item ended up outside every autoclave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// No permitted orientation of the item fits in any autoclave
    NoBinFits,
    WeightExceeded,
    VacuumLinesExceeded,
    /// No autoclave is available to run the item's cure cycle
    CureCycleConflict,
    /// The item could fit its autoclave, but no free space was left
    AreaUnavailable,
    /// The time budget ran out before the item could be attempted
    Timeout,
}

impl Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// An item left out of the solution.
#[derive(Clone, Debug, PartialEq)]
pub struct Exclusion {
    pub item_id: usize,
    pub reason: ExclusionReason,
    pub details: Option<String>,
}

impl Exclusion {
    pub fn new(item_id: usize, reason: ExclusionReason) -> Self {
        Exclusion {
            item_id,
            reason,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Snapshot of a finished solve: one layout per autoclave (in instance order) and the excluded items.
/// Immutable once created; solving again creates a new one.
#[derive(Clone, Debug)]
pub struct BatchSolution {
    pub layout_snapshots: Vec<LayoutSnapshot>,
    pub exclusions: Vec<Exclusion>,
    /// Wall-clock time the solve took
    pub solve_time_ms: f64,
    /// Whether the time budget ran out before all phases completed
    pub timed_out: bool,
}

impl BatchSolution {
    pub fn n_items_placed(&self) -> usize {
        self.layout_snapshots
            .iter()
            .map(|ls| ls.placed_items.len())
            .sum()
    }

    /// Autoclaves holding at least one tool.
    pub fn used_layouts(&self) -> impl Iterator<Item = &LayoutSnapshot> {
        self.layout_snapshots.iter().filter(|ls| !ls.is_empty())
    }

    /// Area of all placed items relative to the total area of the used autoclaves.
    pub fn density(&self) -> f64 {
        let item_area: Mm2 = self.used_layouts().map(|ls| ls.placed_item_area()).sum();
        let total_area: Mm2 = self.used_layouts().map(|ls| ls.area_total).sum();
        match total_area > 0 {
            true => item_area as f64 / total_area as f64,
            false => 0.0,
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.layout_snapshots
            .iter()
            .flat_map(|ls| ls.placed_items.values())
            .map(|pi| pi.weight)
            .sum()
    }
}
