use crate::{Mm, Mm2};
use anyhow::Result;
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

///Axis-aligned rectangle in integer millimetres.
///Half-open: covers `[x_min, x_max) × [y_min, y_max)`, so rectangles sharing an edge do not intersect.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Copy, Serialize, Deserialize)]
pub struct Rect {
    pub x_min: Mm,
    pub y_min: Mm,
    pub x_max: Mm,
    pub y_max: Mm,
}

impl Rect {
    pub fn try_new(x_min: Mm, y_min: Mm, x_max: Mm, y_max: Mm) -> Result<Self> {
        ensure!(
            x_min < x_max && y_min < y_max,
            "invalid rectangle, x_min: {x_min}, x_max: {x_max}, y_min: {y_min}, y_max: {y_max}"
        );
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Rectangle with its top-left corner at `(x, y)` and the given extents.
    /// Callers guarantee `width > 0` and `height > 0` (enforced at import).
    #[inline(always)]
    pub fn from_origin_size(x: Mm, y: Mm, width: Mm, height: Mm) -> Self {
        debug_assert!(width > 0 && height > 0);
        Rect {
            x_min: x,
            y_min: y,
            x_max: x + width,
            y_max: y + height,
        }
    }

    /// True if the interiors of both rectangles share any area.
    #[inline(always)]
    pub fn intersects(&self, other: &Rect) -> bool {
        Mm::max(self.x_min, other.x_min) < Mm::min(self.x_max, other.x_max)
            && Mm::max(self.y_min, other.y_min) < Mm::min(self.y_max, other.y_max)
    }

    /// True if `other` lies completely within `self` (edges may touch).
    #[inline(always)]
    pub fn contains(&self, other: &Rect) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
    }

    /// Returns a new rectangle with the same centroid as `self` but expanded by `dx` in both x-directions and by `dy` in both y-directions.
    /// Negative values shrink the rectangle. If the new rectangle is invalid (x_min >= x_max or y_min >= y_max), returns None.
    pub fn resize_by(mut self, dx: Mm, dy: Mm) -> Option<Self> {
        self.x_min -= dx;
        self.y_min -= dy;
        self.x_max += dx;
        self.y_max += dy;

        if self.x_min < self.x_max && self.y_min < self.y_max {
            Some(self)
        } else {
            //resizing would lead to invalid rectangle
            None
        }
    }

    /// Returns a copy of `self` moved so that its top-left corner lies at `(x, y)`.
    pub fn moved_to(&self, x: Mm, y: Mm) -> Rect {
        Rect::from_origin_size(x, y, self.width(), self.height())
    }

    pub fn width(&self) -> Mm {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> Mm {
        self.y_max - self.y_min
    }

    /// Returns the largest rectangle that is contained in both `a` and `b`.
    pub fn intersection(a: Rect, b: Rect) -> Option<Rect> {
        let x_min = Mm::max(a.x_min, b.x_min);
        let y_min = Mm::max(a.y_min, b.y_min);
        let x_max = Mm::min(a.x_max, b.x_max);
        let y_max = Mm::min(a.y_max, b.y_max);
        if x_min < x_max && y_min < y_max {
            Some(Rect {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        } else {
            None
        }
    }

    pub fn area(&self) -> Mm2 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}) x [{}, {})",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}
