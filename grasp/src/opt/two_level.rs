use crate::opt::placer::item_placement_order;
use crate::opt::search::{AnchorMode, PlacementOption, Target, apply, search};
use crate::time::Deadline;
use curenest::entities::{Exclusion, ExclusionReason, Item, Layout, NestInstance};
use itertools::Itertools;
use log::debug;

/// Strategy to place items the ground level of an autoclave could not hold on additional levels.
pub trait LevelExtension {
    /// Tries to place the `unplaced` items of the ground pass.
    /// Returns the items that remain unplaced, each with its original cause.
    /// Never moves or removes placements already in the layout.
    fn extend(
        &self,
        instance: &NestInstance,
        layout: &mut Layout,
        unplaced: Vec<Exclusion>,
        deadline: &Deadline,
    ) -> Vec<Exclusion>;
}

/// For autoclaves without a raised level in use.
pub struct GroundOnly;

impl LevelExtension for GroundOnly {
    #[inline(always)]
    fn extend(
        &self,
        _instance: &NestInstance,
        _layout: &mut Layout,
        unplaced: Vec<Exclusion>,
        _deadline: &Deadline,
    ) -> Vec<Exclusion> {
        unplaced
    }
}

/// Fills the raised level: every stand is treated as a mini-bin, using the same anchors and loss as the ground.
pub struct StandExtension;

impl LevelExtension for StandExtension {
    fn extend(
        &self,
        instance: &NestInstance,
        layout: &mut Layout,
        mut unplaced: Vec<Exclusion>,
        deadline: &Deadline,
    ) -> Vec<Exclusion> {
        let order = item_placement_order(
            instance,
            &unplaced.iter().map(|e| e.item_id).collect_vec(),
        );
        let mut remaining = Vec::with_capacity(unplaced.len());

        for item_id in order {
            let Some(idx) = unplaced.iter().position(|e| e.item_id == item_id) else {
                continue;
            };
            let exclusion = unplaced.swap_remove(idx);
            let item = instance.item(item_id);

            let attempt = exclusion.reason != ExclusionReason::Timeout
                && is_eligible(item, layout)
                && !deadline.is_expired();

            match attempt && place_raised(layout, item) {
                true => debug!(
                    "[L1] autoclave {}: tool {} placed on the raised level",
                    instance.autoclave(layout.bin_id).ext_id,
                    item.ext_id
                ),
                false => remaining.push(exclusion),
            }
        }
        remaining
    }
}

/// Whether the item may go on the raised level of the layout at all.
pub fn is_eligible(item: &Item, layout: &Layout) -> bool {
    item.level_1_eligible && layout.has_raised_level() && item.weight <= layout.max_weight_per_stand
}

/// Places the item on the stand where it has the lowest loss, returns false if no stand can take it.
/// Ties go to the stand with the lowest index.
pub fn place_raised(layout: &mut Layout, item: &Item) -> bool {
    let best: Option<PlacementOption> = (0..layout.stands.len())
        .filter(|s| layout.resource_conflict(item, Some(*s)).is_none())
        .filter_map(|s| {
            search(layout, item, Target::Stand(s), AnchorMode::Corners)
                .or_else(|| search(layout, item, Target::Stand(s), AnchorMode::Grid))
        })
        .min_by_key(|option| option.loss);

    match best {
        Some(option) => {
            apply(layout, item, &option);
            true
        }
        None => false,
    }
}
