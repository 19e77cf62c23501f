use crate::Mm;
use crate::geometry::Rect;

/// A tool standing on the ground level, as seen from the raised level above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundObstacle {
    pub rect: Rect,
    /// Vertical height of the tool
    pub tool_height: Mm,
}

/// Checks whether two footprints come closer than `margin` to each other.
///
/// Semantically both rectangles are inflated by `margin / 2` on every side before testing for overlap,
/// so a pair exactly `margin` apart is still valid.
/// Evaluated on the gaps directly to stay exact for odd margins.
#[inline(always)]
pub fn overlaps(a: &Rect, b: &Rect, margin: Mm) -> bool {
    let gap_x = Mm::max(a.x_min, b.x_min) - Mm::min(a.x_max, b.x_max);
    let gap_y = Mm::max(a.y_min, b.y_min) - Mm::min(a.y_max, b.y_max);
    gap_x < margin && gap_y < margin
}

/// Checks whether `rect` lies inside the ground footprint `bin` while keeping `clearance` free along every wall.
#[inline(always)]
pub fn fits_within_bin(rect: &Rect, bin: &Rect, clearance: Mm) -> bool {
    rect.x_min >= bin.x_min + clearance
        && rect.y_min >= bin.y_min + clearance
        && rect.x_max <= bin.x_max - clearance
        && rect.y_max <= bin.y_max - clearance
}

/// Checks whether a raised-level footprint conflicts with its stand or with the ground tools beneath it.
///
/// Returns true if `level_one_rect` is not fully supported by `stand_footprint`,
/// or if any ground tool taller than `clearance_height` projects into it.
pub fn stand_interferes(
    level_one_rect: &Rect,
    stand_footprint: &Rect,
    ground: &[GroundObstacle],
    clearance_height: Mm,
) -> bool {
    if !stand_footprint.contains(level_one_rect) {
        return true;
    }
    ground
        .iter()
        .filter(|g| g.tool_height > clearance_height)
        .any(|g| g.rect.intersects(level_one_rect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_is_minimum_gap() {
        let a = Rect::from_origin_size(0, 0, 100, 100);
        let b = Rect::from_origin_size(110, 0, 100, 100);
        assert!(!overlaps(&a, &b, 10));
        assert!(overlaps(&a, &b, 11));
        assert!(!overlaps(&a, &b, 0));
    }

    #[test]
    fn touching_rects_do_not_overlap_without_margin() {
        let a = Rect::from_origin_size(0, 0, 500, 300);
        let b = Rect::from_origin_size(500, 0, 500, 300);
        assert!(!overlaps(&a, &b, 0));
        assert!(overlaps(&a, &b, 1));
    }

    #[test]
    fn diagonal_neighbours_within_margin_overlap() {
        let a = Rect::from_origin_size(0, 0, 100, 100);
        let b = Rect::from_origin_size(105, 105, 100, 100);
        assert!(overlaps(&a, &b, 10));
        assert!(!overlaps(&a, &b, 5));
    }

    #[test]
    fn clearance_band_along_the_walls() {
        let bin = Rect::from_origin_size(0, 0, 1000, 500);
        assert!(fits_within_bin(&Rect::from_origin_size(40, 40, 920, 420), &bin, 40));
        assert!(!fits_within_bin(&Rect::from_origin_size(39, 40, 100, 100), &bin, 40));
        assert!(!fits_within_bin(&Rect::from_origin_size(900, 40, 61, 100), &bin, 40));
        assert!(fits_within_bin(&Rect::from_origin_size(0, 0, 1000, 500), &bin, 0));
        assert!(!fits_within_bin(&Rect::from_origin_size(0, 0, 1, 1), &bin, 250));
    }

    #[test]
    fn raised_item_needs_support_and_headroom() {
        let stand = Rect::try_new(0, 0, 400, 1000).unwrap();
        let raised = Rect::from_origin_size(50, 50, 300, 300);
        let low_tool = GroundObstacle {
            rect: Rect::from_origin_size(0, 0, 200, 200),
            tool_height: 100,
        };
        let tall_tool = GroundObstacle {
            rect: Rect::from_origin_size(0, 0, 200, 200),
            tool_height: 600,
        };
        assert!(!stand_interferes(&raised, &stand, &[low_tool], 500));
        assert!(stand_interferes(&raised, &stand, &[tall_tool], 500));

        let overhanging = Rect::from_origin_size(300, 50, 300, 300);
        assert!(stand_interferes(&overhanging, &stand, &[], 500));
    }
}
