use crate::Mm;
use crate::entities::Item;
use crate::geometry::{Orientation, Rect};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Unique key for each [`PlacedItem`] in a [`Layout`](crate::entities::Layout)
    pub struct PItemKey;
}

/// The level of an autoclave a tool is placed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Ground,
    Raised,
}

impl Level {
    pub fn index(self) -> u8 {
        match self {
            Level::Ground => 0,
            Level::Raised => 1,
        }
    }
}

/// Represents an [`Item`] that has been placed in a [`Layout`](crate::entities::Layout)
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedItem {
    /// ID of the item that was placed
    pub item_id: usize,
    pub level: Level,
    /// Footprint occupied by the item, in the coordinates of the autoclave
    pub rect: Rect,
    pub orientation: Orientation,
    /// Index of the supporting stand, only for [`Level::Raised`]
    pub stand: Option<usize>,
    /// Copied from the item, so the layout can keep its tallies without the instance
    pub weight: f64,
    pub vacuum_lines: u64,
    pub tool_height: Mm,
}

impl PlacedItem {
    pub fn new(
        item: &Item,
        level: Level,
        x: Mm,
        y: Mm,
        orientation: Orientation,
        stand: Option<usize>,
    ) -> Self {
        debug_assert!(orientation == Orientation::Original || item.allow_rotation);
        debug_assert_eq!(level == Level::Raised, stand.is_some());
        PlacedItem {
            item_id: item.id,
            level,
            rect: item.rect_at(x, y, orientation),
            orientation,
            stand,
            weight: item.weight,
            vacuum_lines: item.vacuum_lines,
            tool_height: item.tool_height,
        }
    }

    pub fn rotated(&self) -> bool {
        self.orientation.is_rotated()
    }
}
