use curenest::geometry::{Orientation, Rect};
use curenest::{Mm, Mm2};

/// The loss assigned to a placement option, compared lexicographically.
///
/// Primarily the area wasted inside the envelope of the placed tools (measured from the origin of
/// the region being filled), then the position (top before bottom, left before right),
/// then the original orientation before the rotated one.
#[derive(PartialEq, PartialOrd, Copy, Clone, Debug, Eq, Ord)]
pub struct PlacementLoss {
    pub envelope_waste: Mm2,
    pub y: Mm,
    pub x: Mm,
    pub rotated: bool,
}

impl PlacementLoss {
    pub fn new(envelope: &Envelope, candidate: &Rect, orientation: Orientation) -> Self {
        let x_max = Mm::max(envelope.x_max, candidate.x_max);
        let y_max = Mm::max(envelope.y_max, candidate.y_max);
        let envelope_area = (x_max - envelope.x_min) * (y_max - envelope.y_min);
        PlacementLoss {
            envelope_waste: envelope_area - envelope.occupied - candidate.area(),
            y: candidate.y_min,
            x: candidate.x_min,
            rotated: orientation.is_rotated(),
        }
    }
}

/// Smallest rectangle anchored at the origin of a region that holds all tools placed in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub x_min: Mm,
    pub y_min: Mm,
    pub x_max: Mm,
    pub y_max: Mm,
    /// Area covered by the tools inside
    pub occupied: Mm2,
}

impl Envelope {
    pub fn new<'a>(region: &Rect, placed: impl Iterator<Item = &'a Rect>) -> Self {
        placed.fold(
            Envelope {
                x_min: region.x_min,
                y_min: region.y_min,
                x_max: region.x_min,
                y_max: region.y_min,
                occupied: 0,
            },
            |env, r| Envelope {
                x_max: Mm::max(env.x_max, r.x_max),
                y_max: Mm::max(env.y_max, r.y_max),
                occupied: env.occupied + r.area(),
                ..env
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_by_side_beats_stacked_on_position() {
        let region = Rect::from_origin_size(0, 0, 1000, 1000);
        let placed = [Rect::from_origin_size(0, 0, 500, 300)];
        let env = Envelope::new(&region, placed.iter());

        let right = PlacementLoss::new(
            &env,
            &Rect::from_origin_size(500, 0, 500, 300),
            Orientation::Original,
        );
        let below = PlacementLoss::new(
            &env,
            &Rect::from_origin_size(0, 300, 500, 300),
            Orientation::Original,
        );
        assert_eq!(right.envelope_waste, 0);
        assert_eq!(below.envelope_waste, 0);
        assert!(right < below);
    }

    #[test]
    fn waste_dominates_position() {
        let region = Rect::from_origin_size(0, 0, 1000, 1000);
        let placed = [Rect::from_origin_size(0, 0, 500, 300)];
        let env = Envelope::new(&region, placed.iter());

        // a tall tool next to a flat one leaves a hole below the flat one
        let tall_right = PlacementLoss::new(
            &env,
            &Rect::from_origin_size(500, 0, 200, 600),
            Orientation::Rotated,
        );
        let flat_below = PlacementLoss::new(
            &env,
            &Rect::from_origin_size(0, 300, 600, 200),
            Orientation::Original,
        );
        assert_eq!(tall_right.envelope_waste, 700 * 600 - 150_000 - 120_000);
        assert_eq!(flat_below.envelope_waste, 600 * 500 - 150_000 - 120_000);
        assert!(flat_below < tall_right);
    }

    #[test]
    fn original_orientation_breaks_ties() {
        let region = Rect::from_origin_size(0, 0, 1000, 1000);
        let env = Envelope::new(&region, [].iter());
        let square = Rect::from_origin_size(0, 0, 400, 400);
        assert!(
            PlacementLoss::new(&env, &square, Orientation::Original)
                < PlacementLoss::new(&env, &square, Orientation::Rotated)
        );
    }
}
