use crate::entities::{Autoclave, BatchSolution, Item, Layout, LayoutSnapshot, NestInstance};
use crate::util::FPA;
use itertools::Itertools;
use log::error;
//Various checks to verify correctness of the state of the system
//Used in debug_assertion!() blocks and in tests

pub fn instance_item_bin_ids_correct(items: &[Item], autoclaves: &[Autoclave]) -> bool {
    items.iter().enumerate().all(|(i, item)| item.id == i)
        && autoclaves.iter().enumerate().all(|(i, bin)| bin.id == i)
}

/// Every placement respects containment, separation, stand support and all capacities,
/// and the running tallies of the layout agree with its placements.
pub fn layout_is_valid(layout: &Layout) -> bool {
    let violations = layout.violations();
    if !violations.is_empty() {
        error!(
            "layout of bin {} has {} invalid placements: {:?}",
            layout.bin_id,
            violations.len(),
            violations
                .iter()
                .map(|pk| &layout.placed_items[*pk])
                .collect_vec()
        );
        return false;
    }
    let weight = layout.placed_items.values().map(|pi| pi.weight).sum::<f64>();
    let vacuum_lines = layout
        .placed_items
        .values()
        .map(|pi| pi.vacuum_lines)
        .sum::<u64>();
    if FPA(weight) != FPA(layout.weight_used()) || vacuum_lines != layout.vacuum_lines_used() {
        error!("tallies of bin {} are out of sync", layout.bin_id);
        return false;
    }
    true
}

pub fn snapshot_matches_layout(layout: &Layout, ls: &LayoutSnapshot) -> bool {
    if layout.bin_id != ls.bin_id || layout.placed_items.len() != ls.placed_items.len() {
        return false;
    }
    ls.placed_items
        .values()
        .all(|pi| layout.placed_items.values().any(|lpi| lpi == pi))
}

/// Every item of the instance is either placed exactly once or excluded exactly once.
pub fn solution_is_total(instance: &NestInstance, solution: &BatchSolution) -> bool {
    let mut seen = vec![0usize; instance.items.len()];
    solution
        .layout_snapshots
        .iter()
        .flat_map(|ls| ls.placed_items.values().map(|pi| pi.item_id))
        .chain(solution.exclusions.iter().map(|e| e.item_id))
        .for_each(|id| seen[id] += 1);

    let faulty = seen
        .iter()
        .enumerate()
        .filter(|(_, n)| **n != 1)
        .collect_vec();
    if !faulty.is_empty() {
        error!("items not accounted for exactly once (id, count): {faulty:?}");
        return false;
    }
    true
}

/// No placement of an item that does not allow rotation is rotated.
pub fn rotations_are_legal(instance: &NestInstance, solution: &BatchSolution) -> bool {
    solution
        .layout_snapshots
        .iter()
        .flat_map(|ls| ls.placed_items.values())
        .all(|pi| !pi.rotated() || instance.item(pi.item_id).allow_rotation)
}

/// All layouts of the solution pass [`layout_is_valid`] once restored.
pub fn solution_is_feasible(instance: &NestInstance, solution: &BatchSolution) -> bool {
    solution
        .layout_snapshots
        .iter()
        .all(|ls| layout_is_valid(&Layout::from_snapshot(instance, ls)))
}
