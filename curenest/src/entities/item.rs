use crate::geometry::{Orientation, Rect};
use crate::{Mm, Mm2};

/// Identifier of a cure cycle. Tools sharing an autoclave load must share the cycle.
pub type CureCycleId = u64;

/// Tool to be loaded into an autoclave.
#[derive(Clone, Debug)]
pub struct Item {
    /// Dense index of the item within its [`NestInstance`](crate::entities::NestInstance)
    pub id: usize,
    /// Identifier supplied by the caller
    pub ext_id: u64,
    /// Extent along x in the original orientation
    pub width: Mm,
    /// Extent along y in the original orientation
    pub height: Mm,
    /// Weight in kg
    pub weight: f64,
    pub vacuum_lines: u64,
    pub cure_cycle: CureCycleId,
    /// Higher values are preferred for inclusion
    pub priority: i32,
    /// Whether the footprint may be rotated by 90°
    pub allow_rotation: bool,
    /// Whether the item may be placed on the raised level of an autoclave
    pub level_1_eligible: bool,
    /// Vertical height of the tool, compared against the clearance below raised stands
    pub tool_height: Mm,
}

impl Item {
    pub fn area(&self) -> Mm2 {
        self.width * self.height
    }

    pub fn orientations(&self) -> &'static [Orientation] {
        Orientation::allowed(self.allow_rotation)
    }

    /// Extents `(along x, along y)` of the footprint in the given orientation.
    pub fn footprint(&self, orientation: Orientation) -> (Mm, Mm) {
        match orientation {
            Orientation::Original => (self.width, self.height),
            Orientation::Rotated => (self.height, self.width),
        }
    }

    /// Footprint with its top-left corner at `(x, y)`.
    pub fn rect_at(&self, x: Mm, y: Mm, orientation: Orientation) -> Rect {
        let (w, h) = self.footprint(orientation);
        Rect::from_origin_size(x, y, w, h)
    }

    /// Checks whether any permitted orientation fits inside a `length` × `width` area.
    pub fn fits_in(&self, length: Mm, width: Mm) -> bool {
        self.orientations().iter().any(|o| {
            let (w, h) = self.footprint(*o);
            w <= length && h <= width
        })
    }
}
