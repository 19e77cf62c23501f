use serde::{Deserialize, Serialize};

/// The two orientations in which a rectangular tool can be laid down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Footprint as given: width along x, height along y
    Original,
    /// Rotated by 90°: width and height swapped
    Rotated,
}

impl Orientation {
    /// Orientations an item may take, [`Orientation::Original`] first.
    pub fn allowed(allow_rotation: bool) -> &'static [Orientation] {
        match allow_rotation {
            true => &[Orientation::Original, Orientation::Rotated],
            false => &[Orientation::Original],
        }
    }

    pub fn is_rotated(self) -> bool {
        self == Orientation::Rotated
    }
}
