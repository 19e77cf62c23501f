use crate::entities::CureCycleId;
use crate::geometry::Rect;
use crate::{Mm, Mm2};

/// An autoclave: a rectangular ground level, optionally topped by a raised level resting on stands.
#[derive(Clone, Debug)]
pub struct Autoclave {
    /// Dense index of the autoclave within its [`NestInstance`](crate::entities::NestInstance)
    pub id: usize,
    /// Identifier supplied by the caller
    pub ext_id: u64,
    /// Extent of the ground level along x
    pub length: Mm,
    /// Extent of the ground level along y
    pub width: Mm,
    /// Maximum load in kg, both levels combined
    pub max_weight: f64,
    /// Number of vacuum lines available, both levels combined
    pub vacuum_lines: u64,
    /// Cure cycles this autoclave can run. Empty means any.
    pub allowed_cure_cycles: Vec<CureCycleId>,
    /// Keep-out band along the walls
    pub border_clearance: Mm,
    pub raised: Option<RaisedLevel>,
}

/// Second level of an autoclave, carried by a set of stands ("cavalletti").
#[derive(Clone, Debug)]
pub struct RaisedLevel {
    pub stands: Vec<Stand>,
    /// Load limit in kg of a single stand
    pub max_weight_per_stand: f64,
    /// Free height underneath the stands. Ground tools taller than this cannot sit under a raised tool.
    pub clearance_height: Mm,
}

/// A stand spanning the full usable depth of the autoclave over `[x_min, x_max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stand {
    pub x_min: Mm,
    pub x_max: Mm,
}

impl Autoclave {
    /// Complete ground footprint, with the origin in the top-left corner.
    pub fn footprint(&self) -> Rect {
        Rect::from_origin_size(0, 0, self.length, self.width)
    }

    /// Ground area available to tools when keeping `clearance` free along every wall.
    /// `None` if the clearance consumes the whole autoclave.
    pub fn usable_area(&self, clearance: Mm) -> Option<Rect> {
        self.footprint().resize_by(-clearance, -clearance)
    }

    /// Clearance in effect for a solve with the given request-wide border padding.
    pub fn effective_clearance(&self, padding: Mm) -> Mm {
        Mm::max(self.border_clearance, padding)
    }

    pub fn area(&self) -> Mm2 {
        self.footprint().area()
    }

    pub fn accepts_cure_cycle(&self, cure_cycle: CureCycleId) -> bool {
        self.allowed_cure_cycles.is_empty() || self.allowed_cure_cycles.contains(&cure_cycle)
    }

    pub fn has_raised_level(&self) -> bool {
        self.raised.as_ref().is_some_and(|r| !r.stands.is_empty())
    }

    /// Usable footprints of all stands, clipped to the usable ground area.
    /// Stands falling entirely inside the clearance band yield `None`.
    pub fn stand_footprints(&self, clearance: Mm) -> Vec<Option<Rect>> {
        match (&self.raised, self.usable_area(clearance)) {
            (Some(raised), Some(usable)) => raised
                .stands
                .iter()
                .map(|stand| stand.footprint(usable))
                .collect(),
            (Some(raised), None) => vec![None; raised.stands.len()],
            (None, _) => vec![],
        }
    }
}

impl Stand {
    /// The part of `usable` covered by this stand.
    pub fn footprint(&self, usable: Rect) -> Option<Rect> {
        let band = Rect {
            x_min: self.x_min,
            y_min: usable.y_min,
            x_max: self.x_max,
            y_max: usable.y_max,
        };
        Rect::intersection(band, usable)
    }
}
