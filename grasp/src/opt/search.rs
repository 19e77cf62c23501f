use crate::opt::anchors::{Obstacle, corner_anchors, grid_anchors};
use crate::opt::loss::{Envelope, PlacementLoss};
use curenest::Mm;
use curenest::entities::{Item, Layout, Level};
use curenest::geometry::{Orientation, Rect};
use itertools::Itertools;

/// Part of an autoclave a search is performed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Ground,
    /// The raised level resting on the stand with this index
    Stand(usize),
}

impl Target {
    pub fn level(self) -> Level {
        match self {
            Target::Ground => Level::Ground,
            Target::Stand(_) => Level::Raised,
        }
    }

    pub fn stand(self) -> Option<usize> {
        match self {
            Target::Ground => None,
            Target::Stand(s) => Some(s),
        }
    }

    /// Area of the autoclave a footprint on this target has to stay within.
    pub fn region(self, layout: &Layout) -> Option<Rect> {
        match self {
            Target::Ground => layout.usable,
            Target::Stand(s) => layout.stands.get(s).copied().flatten(),
        }
    }

    fn fits(self, layout: &Layout, rect: &Rect, item: &Item) -> bool {
        match self {
            Target::Ground => layout.ground_fits(rect, item.tool_height, None),
            Target::Stand(s) => layout.raised_fits(rect, s, None),
        }
    }
}

/// Which candidate positions are evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorMode {
    /// Corners of the tools already placed, see [`corner_anchors`]
    Corners,
    /// Every alignment with walls and tool edges, see [`grid_anchors`]
    Grid,
}

/// A feasible way to place an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementOption {
    pub item_id: usize,
    pub target: Target,
    /// Top-left corner of the placed footprint
    pub position: (Mm, Mm),
    pub orientation: Orientation,
    pub loss: PlacementLoss,
}

/// Search `target` of the layout for a valid placement of the item, with minimal loss.
/// Capacities (weight, vacuum lines) are not considered, see [`Layout::resource_conflict`].
pub fn search(
    layout: &Layout,
    item: &Item,
    target: Target,
    mode: AnchorMode,
) -> Option<PlacementOption> {
    let region = target.region(layout)?;
    let obstacles = obstacles(layout, item, target);
    let envelope = Envelope::new(
        &region,
        layout
            .placed_items
            .values()
            .filter(|pi| pi.level == target.level() && pi.stand == target.stand())
            .map(|pi| &pi.rect),
    );

    let mut best: Option<PlacementOption> = None;

    for &orientation in item.orientations() {
        let (width, height) = item.footprint(orientation);
        if width > region.width() || height > region.height() {
            continue;
        }
        let anchors = match mode {
            AnchorMode::Corners => corner_anchors(&region, &obstacles),
            AnchorMode::Grid => grid_anchors(&region, &obstacles, width, height),
        };
        for (x, y) in anchors {
            let rect = Rect::from_origin_size(x, y, width, height);
            if !region.contains(&rect) {
                continue;
            }
            let loss = PlacementLoss::new(&envelope, &rect, orientation);

            //only validate the option if it can replace the current best
            let worth_testing = best.as_ref().is_none_or(|b| loss < b.loss);

            if worth_testing && target.fits(layout, &rect, item) {
                best = Some(PlacementOption {
                    item_id: item.id,
                    target,
                    position: (x, y),
                    orientation,
                    loss,
                });
            }
        }
    }
    best
}

/// Everything in the layout a footprint of `item` on `target` has to keep clear of.
fn obstacles(layout: &Layout, item: &Item, target: Target) -> Vec<Obstacle> {
    let tall_item = item.tool_height > layout.clearance_height;
    layout
        .placed_items
        .values()
        .filter_map(|pi| {
            let gap = match (target, pi.level) {
                (Target::Ground, Level::Ground) | (Target::Stand(_), Level::Raised) => {
                    Some(layout.min_distance)
                }
                (Target::Ground, Level::Raised) => tall_item.then_some(0),
                (Target::Stand(_), Level::Ground) => {
                    (pi.tool_height > layout.clearance_height).then_some(0)
                }
            };
            gap.map(|gap| Obstacle { rect: pi.rect, gap })
        })
        .collect_vec()
}

/// Places the item according to the option.
pub fn apply(layout: &mut Layout, item: &Item, option: &PlacementOption) {
    debug_assert_eq!(item.id, option.item_id);
    layout.place_item(
        item,
        option.target.level(),
        option.position,
        option.orientation,
        option.target.stand(),
    );
}
