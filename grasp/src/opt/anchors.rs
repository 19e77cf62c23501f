use curenest::Mm;
use curenest::geometry::Rect;
use itertools::Itertools;

/// Something already occupying space near a region, together with the gap a new footprint has to keep to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Obstacle {
    pub rect: Rect,
    pub gap: Mm,
}

/// Corner-fitting candidates: the origin of the region, the top-right and bottom-left corners
/// of every obstacle (pushed out by its gap), and the projections of those corners onto the region's walls.
pub fn corner_anchors(region: &Rect, obstacles: &[Obstacle]) -> Vec<(Mm, Mm)> {
    let mut anchors = vec![(region.x_min, region.y_min)];
    for o in obstacles {
        let right = o.rect.x_max + o.gap;
        let below = o.rect.y_max + o.gap;
        anchors.extend([
            (right, Mm::max(o.rect.y_min, region.y_min)),
            (Mm::max(o.rect.x_min, region.x_min), below),
            (right, region.y_min),
            (region.x_min, below),
        ]);
    }
    anchors
        .into_iter()
        .filter(|(x, y)| {
            region.x_min <= *x && *x < region.x_max && region.y_min <= *y && *y < region.y_max
        })
        .sorted_by_key(|(x, y)| (*y, *x))
        .dedup()
        .collect_vec()
}

/// Gap-filling candidates for a `width` × `height` footprint: every combination of the x and y positions
/// that align the footprint with a wall of the region or with an edge of an obstacle.
/// Contains all [`corner_anchors`] that leave room for the footprint.
pub fn grid_anchors(region: &Rect, obstacles: &[Obstacle], width: Mm, height: Mm) -> Vec<(Mm, Mm)> {
    let xs = aligned_positions(
        region.x_min,
        region.x_max,
        width,
        obstacles.iter().map(|o| (o.rect.x_min, o.rect.x_max, o.gap)),
    );
    let ys = aligned_positions(
        region.y_min,
        region.y_max,
        height,
        obstacles.iter().map(|o| (o.rect.y_min, o.rect.y_max, o.gap)),
    );

    ys.iter()
        .cartesian_product(xs.iter())
        .map(|(y, x)| (*x, *y))
        .collect_vec()
}

/// Positions along one axis where a segment of length `extent` touches `min`, `max`
/// or one of the `(lo, hi, gap)` edges (from either side, or flush with it), while staying within `[min, max)`.
fn aligned_positions(
    min: Mm,
    max: Mm,
    extent: Mm,
    edges: impl Iterator<Item = (Mm, Mm, Mm)>,
) -> Vec<Mm> {
    [min, max - extent]
        .into_iter()
        .chain(edges.flat_map(|(lo, hi, gap)| [hi + gap, lo - gap - extent, lo, hi - extent]))
        .filter(|v| min <= *v && *v + extent <= max)
        .sorted()
        .dedup()
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_of_a_single_obstacle() {
        let region = Rect::from_origin_size(10, 10, 980, 980);
        let obstacles = [Obstacle {
            rect: Rect::from_origin_size(10, 10, 500, 300),
            gap: 20,
        }];
        let anchors = corner_anchors(&region, &obstacles);
        assert_eq!(anchors, vec![(10, 10), (530, 10), (10, 330)]);
    }

    #[test]
    fn corners_outside_the_region_are_dropped() {
        let region = Rect::from_origin_size(0, 0, 600, 600);
        let obstacles = [Obstacle {
            rect: Rect::from_origin_size(0, 0, 600, 300),
            gap: 0,
        }];
        let anchors = corner_anchors(&region, &obstacles);
        assert_eq!(anchors, vec![(0, 0), (0, 300)]);
    }

    #[test]
    fn grid_finds_enclosed_gap() {
        // a 200 wide slot between two tools, only reachable by aligning with the right one
        let region = Rect::from_origin_size(0, 0, 1000, 400);
        let obstacles = [
            Obstacle {
                rect: Rect::from_origin_size(0, 0, 400, 400),
                gap: 0,
            },
            Obstacle {
                rect: Rect::from_origin_size(600, 0, 400, 400),
                gap: 0,
            },
        ];
        let anchors = grid_anchors(&region, &obstacles, 200, 400);
        assert!(anchors.contains(&(400, 0)));
        assert!(anchors.iter().all(|(x, y)| *x + 200 <= 1000 && *y + 400 <= 400));
    }
}
