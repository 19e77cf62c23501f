use crate::time::Deadline;
use curenest::Mm;
use curenest::entities::{Layout, Level, PItemKey};
use curenest::geometry::Rect;
use itertools::Itertools;
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Slides every placed item towards the origin of its region, left then up, by the maximal distance
/// its neighbours allow. Sweeps until nothing moves, at most `max_sweeps` times.
/// Returns the number of moves made.
pub fn compact(layout: &mut Layout, max_sweeps: usize, deadline: &Deadline) -> usize {
    let mut n_moves = 0;
    for sweep in 0..max_sweeps {
        let keys = layout
            .placed_items
            .iter()
            .sorted_by_key(|(_, pi)| (pi.level, pi.rect.y_min, pi.rect.x_min))
            .map(|(pk, _)| pk)
            .collect_vec();

        let mut moved = false;
        for pk in keys {
            if deadline.is_expired() {
                return n_moves;
            }
            for axis in [Axis::X, Axis::Y] {
                if slide(layout, pk, axis) {
                    moved = true;
                    n_moves += 1;
                }
            }
        }
        if !moved {
            debug!(
                "[CMPCT] bin {}: stable after {} sweep(s), {n_moves} move(s)",
                layout.bin_id,
                sweep + 1
            );
            break;
        }
    }
    n_moves
}

/// Moves the item as far as possible towards the origin along `axis`, returns whether it moved.
fn slide(layout: &mut Layout, pk: PItemKey, axis: Axis) -> bool {
    let pi = &layout.placed_items[pk];
    let region = match (pi.level, pi.stand) {
        (Level::Ground, _) => layout.usable,
        (Level::Raised, Some(s)) => layout.stands.get(s).copied().flatten(),
        (Level::Raised, None) => None,
    };
    let Some(region) = region else {
        return false;
    };

    let limit = slide_limit(layout, pk, axis, &region);
    let (x, y) = (pi.rect.x_min, pi.rect.y_min);
    let target = match axis {
        Axis::X => (limit, y),
        Axis::Y => (x, limit),
    };
    if target == (x, y) {
        return false;
    }

    let rect = pi.rect.moved_to(target.0, target.1);
    let valid = match pi.stand {
        None => layout.ground_fits(&rect, pi.tool_height, Some(pk)),
        Some(s) => layout.raised_fits(&rect, s, Some(pk)),
    };
    if valid {
        layout.relocate_item(pk, target);
    }
    valid
}

/// Lowest coordinate along `axis` the item can reach without passing through anything in its way.
fn slide_limit(layout: &Layout, pk: PItemKey, axis: Axis, region: &Rect) -> Mm {
    let pi = &layout.placed_items[pk];
    let tall = pi.tool_height > layout.clearance_height;
    let (region_min, start) = match axis {
        Axis::X => (region.x_min, pi.rect.x_min),
        Axis::Y => (region.y_min, pi.rect.y_min),
    };

    layout
        .placed_items
        .iter()
        .filter(|(k, _)| *k != pk)
        .filter_map(|(_, other)| {
            let gap = match (pi.level, other.level) {
                (Level::Ground, Level::Ground) | (Level::Raised, Level::Raised) => {
                    layout.min_distance
                }
                (Level::Ground, Level::Raised) => match tall {
                    true => 0,
                    false => return None,
                },
                (Level::Raised, Level::Ground) => {
                    match other.tool_height > layout.clearance_height {
                        true => 0,
                        false => return None,
                    }
                }
            };
            //gap between both items across the axis, and the end of the other item along it
            let (a, b) = (&pi.rect, &other.rect);
            let (cross_gap, other_end) = match axis {
                Axis::X => (interval_gap((a.y_min, a.y_max), (b.y_min, b.y_max)), b.x_max),
                Axis::Y => (interval_gap((a.x_min, a.x_max), (b.x_min, b.x_max)), b.y_max),
            };
            let in_the_way = cross_gap < gap && other_end + gap <= start;
            in_the_way.then_some(other_end + gap)
        })
        .fold(region_min, Mm::max)
}

/// Distance between two intervals, negative if they overlap.
fn interval_gap((a_min, a_max): (Mm, Mm), (b_min, b_max): (Mm, Mm)) -> Mm {
    Mm::max(a_min, b_min) - Mm::min(a_max, b_max)
}
