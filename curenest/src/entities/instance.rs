use crate::entities::{Autoclave, Item};
use crate::util::assertions::instance_item_bin_ids_correct;
use crate::Mm;

/// Separation distances applied during a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Spacing {
    /// Minimum distance between a tool and the autoclave walls
    pub padding: Mm,
    /// Minimum distance between two tools on the same level
    pub min_distance: Mm,
}

/// Request-wide options that shape the distribution of tools over autoclaves.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct NestOptions {
    /// Maximum number of autoclaves to load, the largest ones are used first
    pub max_autoclaves: Option<usize>,
    /// Tools with a priority at or above this value are distributed before all others
    pub priority_threshold: Option<i32>,
    /// Whether raised levels of autoclaves may be used
    pub enable_level_1: bool,
    /// Carried for callers that cache results; the solve itself is stateless
    pub force_regenerate: bool,
}

/// Instance of the autoclave loading problem: a set of tools to distribute over a set of autoclaves.
#[derive(Debug, Clone)]
pub struct NestInstance {
    /// The tools to be placed
    pub items: Vec<Item>,
    /// Set of autoclaves available
    pub autoclaves: Vec<Autoclave>,
    pub spacing: Spacing,
    pub options: NestOptions,
}

impl NestInstance {
    pub fn new(
        items: Vec<Item>,
        autoclaves: Vec<Autoclave>,
        spacing: Spacing,
        options: NestOptions,
    ) -> Self {
        assert!(instance_item_bin_ids_correct(&items, &autoclaves));

        Self {
            items,
            autoclaves,
            spacing,
            options,
        }
    }

    pub fn item(&self, id: usize) -> &Item {
        &self.items[id]
    }

    pub fn autoclave(&self, id: usize) -> &Autoclave {
        &self.autoclaves[id]
    }

    /// Wall clearance in effect for the given autoclave.
    pub fn clearance(&self, bin_id: usize) -> Mm {
        self.autoclaves[bin_id].effective_clearance(self.spacing.padding)
    }

    /// Whether the raised level of the given autoclave takes part in this solve.
    pub fn raised_enabled(&self, bin_id: usize) -> bool {
        self.options.enable_level_1 && self.autoclaves[bin_id].has_raised_level()
    }

    pub fn total_item_qty(&self) -> usize {
        self.items.len()
    }
}
