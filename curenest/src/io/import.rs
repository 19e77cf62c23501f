use crate::Mm;
use crate::entities::{Autoclave, Item, NestInstance, NestOptions, RaisedLevel, Spacing, Stand};
use crate::io::ext_repr::{ExtBin, ExtItem, ExtOptions, SolveRequest};
use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;
use log::warn;
use rayon::prelude::*;

/// Imports a request into the library, validating everything the solver relies on.
/// Malformed geometry, empty inputs and duplicate identifiers are rejected here, before any solving starts.
pub fn import(request: &SolveRequest) -> Result<NestInstance> {
    ensure!(!request.items.is_empty(), "request contains no items");
    ensure!(!request.bins.is_empty(), "request contains no autoclaves");

    let duplicate_items = request.items.iter().map(|i| i.id).duplicates().collect_vec();
    ensure!(
        duplicate_items.is_empty(),
        "item ids must be unique, duplicates: {duplicate_items:?}"
    );
    let duplicate_bins = request.bins.iter().map(|b| b.id).duplicates().collect_vec();
    ensure!(
        duplicate_bins.is_empty(),
        "autoclave ids must be unique, duplicates: {duplicate_bins:?}"
    );

    let items = request
        .items
        .par_iter()
        .enumerate()
        .map(|(id, ext_item)| {
            import_item(id, ext_item).with_context(|| format!("invalid item {}", ext_item.id))
        })
        .collect::<Result<Vec<Item>>>()?;

    let autoclaves = request
        .bins
        .par_iter()
        .enumerate()
        .map(|(id, ext_bin)| {
            import_autoclave(id, ext_bin)
                .with_context(|| format!("invalid autoclave {}", ext_bin.id))
        })
        .collect::<Result<Vec<Autoclave>>>()?;

    let (spacing, options) = import_options(&request.options).context("invalid options")?;

    Ok(NestInstance::new(items, autoclaves, spacing, options))
}

pub fn import_item(id: usize, ext_item: &ExtItem) -> Result<Item> {
    let width = length_to_mm(ext_item.width, "width")?;
    let height = length_to_mm(ext_item.height, "height")?;
    ensure!(
        width > 0 && height > 0,
        "footprint must be at least 1x1 mm, got {}x{}",
        ext_item.width,
        ext_item.height
    );
    ensure!(
        ext_item.weight.is_finite() && ext_item.weight >= 0.0,
        "weight must be a non-negative number, got {}",
        ext_item.weight
    );

    Ok(Item {
        id,
        ext_id: ext_item.id,
        width,
        height,
        weight: ext_item.weight,
        vacuum_lines: ext_item.vacuum_lines_required.into(),
        cure_cycle: ext_item.cure_cycle_id,
        priority: ext_item.priority,
        allow_rotation: ext_item.allow_rotation,
        level_1_eligible: ext_item.can_use_level_1,
        tool_height: length_to_mm(ext_item.tool_height, "tool_height")?,
    })
}

pub fn import_autoclave(id: usize, ext_bin: &ExtBin) -> Result<Autoclave> {
    let length = length_to_mm(ext_bin.usable_length, "usable_length")?;
    let width = length_to_mm(ext_bin.usable_width, "usable_width")?;
    ensure!(
        length > 0 && width > 0,
        "usable area must be at least 1x1 mm, got {}x{}",
        ext_bin.usable_length,
        ext_bin.usable_width
    );
    ensure!(
        ext_bin.max_weight.is_finite() && ext_bin.max_weight >= 0.0,
        "max_weight must be a non-negative number, got {}",
        ext_bin.max_weight
    );

    let raised = match (ext_bin.has_level_1, ext_bin.stand_positions.is_empty()) {
        (true, true) => bail!("has_level_1 is set but no stand positions are given"),
        (true, false) => Some(import_raised_level(ext_bin, length)?),
        (false, false) => {
            warn!(
                "autoclave {} lists stand positions without has_level_1, ignoring them",
                ext_bin.id
            );
            None
        }
        (false, true) => None,
    };

    Ok(Autoclave {
        id,
        ext_id: ext_bin.id,
        length,
        width,
        max_weight: ext_bin.max_weight,
        vacuum_lines: ext_bin.vacuum_lines_total.into(),
        allowed_cure_cycles: ext_bin.allowed_cure_cycles.clone(),
        border_clearance: length_to_mm(ext_bin.border_clearance, "border_clearance")?,
        raised,
    })
}

fn import_raised_level(ext_bin: &ExtBin, length: Mm) -> Result<RaisedLevel> {
    let max_weight_per_stand = ext_bin
        .level_1_max_weight_per_stand
        .context("has_level_1 is set but level_1_max_weight_per_stand is missing")?;
    ensure!(
        max_weight_per_stand.is_finite() && max_weight_per_stand >= 0.0,
        "level_1_max_weight_per_stand must be a non-negative number, got {max_weight_per_stand}"
    );

    let mut stands = ext_bin
        .stand_positions
        .iter()
        .map(|s| {
            let stand = Stand {
                x_min: length_to_mm(s.x_min, "stand x_min")?,
                x_max: length_to_mm(s.x_max, "stand x_max")?,
            };
            ensure!(
                stand.x_min < stand.x_max && stand.x_max <= length,
                "stand [{}, {}) must be a non-empty range within [0, {length}]",
                s.x_min,
                s.x_max
            );
            Ok(stand)
        })
        .collect::<Result<Vec<Stand>>>()?;

    stands.sort_by_key(|s| s.x_min);
    for (a, b) in stands.iter().tuple_windows() {
        ensure!(
            a.x_max <= b.x_min,
            "stands [{}, {}) and [{}, {}) overlap",
            a.x_min,
            a.x_max,
            b.x_min,
            b.x_max
        );
    }

    Ok(RaisedLevel {
        stands,
        max_weight_per_stand,
        clearance_height: length_to_mm(ext_bin.stand_clearance_height, "stand_clearance_height")?,
    })
}

fn import_options(ext_options: &ExtOptions) -> Result<(Spacing, NestOptions)> {
    let spacing = Spacing {
        padding: length_to_mm(ext_options.padding_mm, "padding_mm")?,
        min_distance: length_to_mm(ext_options.min_distance_mm, "min_distance_mm")?,
    };
    if let Some(0) = ext_options.max_autoclaves {
        bail!("max_autoclaves must be at least 1");
    }
    let options = NestOptions {
        max_autoclaves: ext_options.max_autoclaves,
        priority_threshold: ext_options.priority_threshold,
        enable_level_1: ext_options.enable_level_1,
        force_regenerate: ext_options.force_regenerate,
    };
    Ok((spacing, options))
}

/// Longest length accepted on input (1 km). Keeps every area, and every sum of areas, well within [`Mm2`](crate::Mm2).
pub const MAX_LENGTH_MM: Mm = 1_000_000;

/// Converts an external length to whole millimetres.
fn length_to_mm(value: f64, field: &str) -> Result<Mm> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{field} must be a non-negative number, got {value}"
    );
    ensure!(
        value.round() <= MAX_LENGTH_MM as f64,
        "{field} exceeds the maximum of {MAX_LENGTH_MM} mm, got {value}"
    );
    Ok(value.round() as Mm)
}
