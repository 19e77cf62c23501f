use crate::entities::ExclusionReason;
use crate::Mm;
use serde::{Deserialize, Serialize};

/// A request to load a set of tools into a set of autoclaves.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SolveRequest {
    pub items: Vec<ExtItem>,
    pub bins: Vec<ExtBin>,
    #[serde(default)]
    pub options: ExtOptions,
}

/// External representation of an [`Item`](crate::entities::Item).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtItem {
    /// Unique identifier of the item
    pub id: u64,
    /// Extent along x in mm, un-rotated
    pub width: f64,
    /// Extent along y in mm, un-rotated
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    #[serde(default)]
    pub vacuum_lines_required: u32,
    pub cure_cycle_id: u64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub allow_rotation: bool,
    #[serde(default)]
    pub can_use_level_1: bool,
    /// Vertical height of the tool in mm, only relevant underneath raised stands
    #[serde(default)]
    pub tool_height: f64,
}

/// External representation of an [`Autoclave`](crate::entities::Autoclave).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtBin {
    /// Unique identifier of the autoclave
    pub id: u64,
    /// Extent of the ground level along x in mm
    pub usable_length: f64,
    /// Extent of the ground level along y in mm
    pub usable_width: f64,
    /// Maximum load in kg
    pub max_weight: f64,
    pub vacuum_lines_total: u32,
    #[serde(default)]
    pub has_level_1: bool,
    /// Allowed stand positions, required if `has_level_1`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stand_positions: Vec<ExtStand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_1_max_weight_per_stand: Option<f64>,
    /// Free height under the stands in mm
    #[serde(default)]
    pub stand_clearance_height: f64,
    /// Cure cycles the autoclave can run. Any cycle if empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_cure_cycles: Vec<u64>,
    /// Keep-out band along the walls in mm
    #[serde(default)]
    pub border_clearance: f64,
}

/// A stand covering `[x_min, x_max)` over the full depth of the autoclave.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ExtStand {
    pub x_min: f64,
    pub x_max: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ExtOptions {
    /// Minimum distance between tools and the autoclave walls
    pub padding_mm: f64,
    /// Minimum distance between two tools on the same level
    pub min_distance_mm: f64,
    pub force_regenerate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_autoclaves: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_threshold: Option<i32>,
    pub enable_level_1: bool,
}

/// The answer to a [`SolveRequest`]. Always well-formed, failures are reported through `success` and `message`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SolveResponse {
    pub success: bool,
    pub placements: Vec<ExtPlacement>,
    pub exclusions: Vec<ExtExclusion>,
    pub per_bin_metrics: Vec<ExtBinMetrics>,
    pub global_metrics: ExtGlobalMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// External representation of a [`PlacedItem`](crate::entities::PlacedItem).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExtPlacement {
    pub item_id: u64,
    pub bin_id: u64,
    /// 0 for the ground level, 1 for the raised level
    pub level: u8,
    /// Top-left corner of the placed footprint
    pub x: Mm,
    pub y: Mm,
    /// Extents of the placed footprint, after rotation
    pub width: Mm,
    pub height: Mm,
    pub rotated: bool,
    /// Index of the supporting stand for raised placements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stand: Option<usize>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtExclusion {
    pub item_id: u64,
    pub reason: ExclusionReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Metrics of a single autoclave. Areas are in cm², weights in kg.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtBinMetrics {
    pub bin_id: u64,
    pub area_used: f64,
    pub area_total: f64,
    pub efficiency_percentage: f64,
    pub weight_used: f64,
    pub vacuum_lines_used: u64,
    pub rotated_count: usize,
    pub items_placed: usize,
    pub level_1_items: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ExtGlobalMetrics {
    pub efficiency_percentage: f64,
    pub total_weight_kg: f64,
    pub solve_time_ms: f64,
    pub items_placed: usize,
    pub items_excluded: usize,
    pub bins_used: usize,
    pub timed_out: bool,
}
