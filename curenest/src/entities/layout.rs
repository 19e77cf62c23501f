use crate::entities::{Item, Level, NestInstance, PItemKey, PlacedItem};
use crate::geometry::{
    GroundObstacle, Orientation, Rect, fits_within_bin, overlaps, stand_interferes,
};
use crate::util::FPA;
use crate::util::assertions;
use crate::{Mm, Mm2};
use itertools::Itertools;
use slotmap::SlotMap;

/// Capacity of an autoclave (or one of its stands) that would be exceeded by an additional tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceConflict {
    Weight,
    VacuumLines,
    StandWeight,
}

/// Defines a configuration of [`Item`]s in an autoclave, over both of its levels.
///It is a mutable representation, and can be modified by placing, moving or removing items.
///All limits of the autoclave for the current solve are resolved at construction, so the layout is self-contained.
#[derive(Clone, Debug)]
pub struct Layout {
    /// The autoclave used for this layout
    pub bin_id: usize,
    /// Complete ground footprint of the autoclave
    pub footprint: Rect,
    /// Keep-out band along the walls in effect for this solve
    pub clearance: Mm,
    /// Ground area available to tools after the wall clearance, `None` if nothing fits
    pub usable: Option<Rect>,
    /// Usable footprint of every stand, empty if the raised level is not in use
    pub stands: Vec<Option<Rect>>,
    /// Minimum distance between two tools on the same level
    pub min_distance: Mm,
    /// Free height under the stands
    pub clearance_height: Mm,
    pub max_weight: f64,
    pub max_vacuum_lines: u64,
    pub max_weight_per_stand: f64,
    /// Area of the complete ground footprint
    pub bin_area: Mm2,
    /// How the items are placed in the autoclave
    pub placed_items: SlotMap<PItemKey, PlacedItem>,
    weight_used: f64,
    vacuum_lines_used: u64,
    stand_weights: Vec<f64>,
}

impl Layout {
    pub fn new(instance: &NestInstance, bin_id: usize) -> Self {
        let bin = instance.autoclave(bin_id);
        let clearance = instance.clearance(bin_id);
        let (stands, clearance_height, max_weight_per_stand) =
            match (instance.raised_enabled(bin_id), &bin.raised) {
                (true, Some(raised)) => (
                    bin.stand_footprints(clearance),
                    raised.clearance_height,
                    raised.max_weight_per_stand,
                ),
                _ => (vec![], 0, 0.0),
            };
        let n_stands = stands.len();
        Layout {
            bin_id,
            footprint: bin.footprint(),
            clearance,
            usable: bin.usable_area(clearance),
            stands,
            min_distance: instance.spacing.min_distance,
            clearance_height,
            max_weight: bin.max_weight,
            max_vacuum_lines: bin.vacuum_lines,
            max_weight_per_stand,
            bin_area: bin.area(),
            placed_items: SlotMap::with_key(),
            weight_used: 0.0,
            vacuum_lines_used: 0,
            stand_weights: vec![0.0; n_stands],
        }
    }

    pub fn from_snapshot(instance: &NestInstance, ls: &LayoutSnapshot) -> Self {
        let mut layout = Layout::new(instance, ls.bin_id);
        layout.restore(ls);
        layout
    }

    pub fn save(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            bin_id: self.bin_id,
            placed_items: self.placed_items.clone(),
            area_total: self.area_total(),
            density: self.density(),
        }
    }

    pub fn restore(&mut self, layout_snapshot: &LayoutSnapshot) {
        assert_eq!(self.bin_id, layout_snapshot.bin_id);
        self.placed_items = layout_snapshot.placed_items.clone();
        self.recompute_tallies();

        debug_assert!(assertions::layout_is_valid(self));
        debug_assert!(assertions::snapshot_matches_layout(self, layout_snapshot));
    }

    /// Whether the raised level of the autoclave is in use for this layout.
    pub fn has_raised_level(&self) -> bool {
        !self.stands.is_empty()
    }

    /// Checks the capacities of the autoclave (and of `stand`, if given) against an additional item.
    pub fn resource_conflict(&self, item: &Item, stand: Option<usize>) -> Option<ResourceConflict> {
        if !FPA::fits(self.weight_used, item.weight, self.max_weight) {
            return Some(ResourceConflict::Weight);
        }
        if self.vacuum_lines_used + item.vacuum_lines > self.max_vacuum_lines {
            return Some(ResourceConflict::VacuumLines);
        }
        if let Some(s) = stand {
            if !FPA::fits(self.stand_weights[s], item.weight, self.max_weight_per_stand) {
                return Some(ResourceConflict::StandWeight);
            }
        }
        None
    }

    /// Checks whether a ground footprint is free: inside the usable area, clear of all other ground tools,
    /// and (for tools taller than the clearance) not underneath any raised tool.
    /// The item at `ignore` is left out of the check, used when moving an item.
    pub fn ground_fits(&self, rect: &Rect, tool_height: Mm, ignore: Option<PItemKey>) -> bool {
        if !fits_within_bin(rect, &self.footprint, self.clearance) {
            return false;
        }
        let tall = tool_height > self.clearance_height;
        self.placed_items
            .iter()
            .filter(|(pk, _)| Some(*pk) != ignore)
            .all(|(_, pi)| match pi.level {
                Level::Ground => !overlaps(&pi.rect, rect, self.min_distance),
                Level::Raised => !(tall && pi.rect.intersects(rect)),
            })
    }

    /// Checks whether a raised footprint is fully supported by `stand`, clear of tall ground tools
    /// and clear of all other raised tools.
    pub fn raised_fits(&self, rect: &Rect, stand: usize, ignore: Option<PItemKey>) -> bool {
        let Some(Some(stand_footprint)) = self.stands.get(stand) else {
            return false;
        };
        let ground = self.ground_obstacles(ignore);
        if stand_interferes(rect, stand_footprint, &ground, self.clearance_height) {
            return false;
        }
        self.placed_items
            .iter()
            .filter(|(pk, pi)| Some(*pk) != ignore && pi.level == Level::Raised)
            .all(|(_, pi)| !overlaps(&pi.rect, rect, self.min_distance))
    }

    /// All ground tools, as obstacles for the raised level.
    pub fn ground_obstacles(&self, ignore: Option<PItemKey>) -> Vec<GroundObstacle> {
        self.placed_items
            .iter()
            .filter(|(pk, pi)| Some(*pk) != ignore && pi.level == Level::Ground)
            .map(|(_, pi)| GroundObstacle {
                rect: pi.rect,
                tool_height: pi.tool_height,
            })
            .collect_vec()
    }

    pub fn place_item(
        &mut self,
        item: &Item,
        level: Level,
        (x, y): (Mm, Mm),
        orientation: Orientation,
        stand: Option<usize>,
    ) -> PItemKey {
        let pi = PlacedItem::new(item, level, x, y, orientation, stand);
        self.weight_used += pi.weight;
        self.vacuum_lines_used += pi.vacuum_lines;
        if let Some(s) = stand {
            self.stand_weights[s] += pi.weight;
        }
        let pk = self.placed_items.insert(pi);

        debug_assert!(assertions::layout_is_valid(self));

        pk
    }

    pub fn remove_item(&mut self, pk: PItemKey) -> PlacedItem {
        let pi = self
            .placed_items
            .remove(pk)
            .expect("key is not valid anymore");

        self.recompute_tallies();
        pi
    }

    /// Moves a placed item to a new top-left corner, keeping its level, orientation and stand.
    pub fn relocate_item(&mut self, pk: PItemKey, (x, y): (Mm, Mm)) {
        let pi = &mut self.placed_items[pk];
        pi.rect = pi.rect.moved_to(x, y);

        debug_assert!(assertions::layout_is_valid(self));
    }

    /// Returns the keys of all placements that break an invariant of the layout.
    /// Placements are replayed in order, every placement is checked against the ones accepted before it.
    pub fn violations(&self) -> Vec<PItemKey> {
        let mut accepted: Vec<&PlacedItem> = vec![];
        let mut weight = 0.0;
        let mut vacuum_lines = 0;
        let mut stand_weights = vec![0.0; self.stands.len()];
        let mut violating = vec![];

        for (pk, pi) in self.placed_items.iter() {
            let valid = self.placement_is_valid(pi, &accepted)
                && FPA::fits(weight, pi.weight, self.max_weight)
                && vacuum_lines + pi.vacuum_lines <= self.max_vacuum_lines
                && pi.stand.is_none_or(|s| {
                    FPA::fits(stand_weights[s], pi.weight, self.max_weight_per_stand)
                });
            match valid {
                true => {
                    weight += pi.weight;
                    vacuum_lines += pi.vacuum_lines;
                    if let Some(s) = pi.stand {
                        stand_weights[s] += pi.weight;
                    }
                    accepted.push(pi);
                }
                false => violating.push(pk),
            }
        }
        violating
    }

    fn placement_is_valid(&self, pi: &PlacedItem, others: &[&PlacedItem]) -> bool {
        let same_level_clear = others
            .iter()
            .filter(|o| o.level == pi.level)
            .all(|o| !overlaps(&o.rect, &pi.rect, self.min_distance));
        if !same_level_clear {
            return false;
        }
        match (pi.level, pi.stand) {
            (Level::Ground, None) => {
                let inside = fits_within_bin(&pi.rect, &self.footprint, self.clearance);
                let tall = pi.tool_height > self.clearance_height;
                inside
                    && others
                        .iter()
                        .filter(|o| o.level == Level::Raised)
                        .all(|o| !(tall && o.rect.intersects(&pi.rect)))
            }
            (Level::Raised, Some(s)) => {
                let Some(Some(stand_footprint)) = self.stands.get(s) else {
                    return false;
                };
                let ground = others
                    .iter()
                    .filter(|o| o.level == Level::Ground)
                    .map(|o| GroundObstacle {
                        rect: o.rect,
                        tool_height: o.tool_height,
                    })
                    .collect_vec();
                !stand_interferes(&pi.rect, stand_footprint, &ground, self.clearance_height)
            }
            _ => false,
        }
    }

    fn recompute_tallies(&mut self) {
        self.weight_used = 0.0;
        self.vacuum_lines_used = 0;
        self.stand_weights.iter_mut().for_each(|w| *w = 0.0);
        for pi in self.placed_items.values() {
            self.weight_used += pi.weight;
            self.vacuum_lines_used += pi.vacuum_lines;
            if let Some(s) = pi.stand {
                self.stand_weights[s] += pi.weight;
            }
        }
    }

    /// True if no items are placed
    pub fn is_empty(&self) -> bool {
        self.placed_items.is_empty()
    }

    pub fn weight_used(&self) -> f64 {
        self.weight_used
    }

    pub fn vacuum_lines_used(&self) -> u64 {
        self.vacuum_lines_used
    }

    pub fn stand_weight(&self, stand: usize) -> f64 {
        self.stand_weights[stand]
    }

    pub fn placed_item_area(&self) -> Mm2 {
        self.placed_items.values().map(|pi| pi.rect.area()).sum()
    }

    /// Total area tools can be placed on: the ground footprint plus the stands in use.
    pub fn area_total(&self) -> Mm2 {
        self.bin_area + self.stands.iter().flatten().map(|s| s.area()).sum::<Mm2>()
    }

    /// Returns the density of the layout: the ratio of the area of the placed items to [`Layout::area_total`].
    pub fn density(&self) -> f64 {
        self.placed_item_area() as f64 / self.area_total() as f64
    }
}

/// Immutable and compact representation of a [`Layout`].
/// Can be used to restore a [`Layout`] back to a previous state.
#[derive(Clone, Debug)]
pub struct LayoutSnapshot {
    /// The autoclave used for this layout
    pub bin_id: usize,
    /// How the items are placed in the autoclave
    pub placed_items: SlotMap<PItemKey, PlacedItem>,
    /// See [`Layout::area_total`]
    pub area_total: Mm2,
    /// The density of the layout at the time of the snapshot
    pub density: f64,
}

impl LayoutSnapshot {
    pub fn placed_item_area(&self) -> Mm2 {
        self.placed_items.values().map(|pi| pi.rect.area()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.placed_items.is_empty()
    }
}
