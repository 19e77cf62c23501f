use crate::Mm2;
use crate::entities::{BatchSolution, Level, LayoutSnapshot, NestInstance};
use crate::io::ext_repr::{
    ExtBinMetrics, ExtExclusion, ExtGlobalMetrics, ExtPlacement, SolveResponse,
};
use crate::util::assertions;
use itertools::Itertools;

const MM2_PER_CM2: f64 = 100.0;

/// Exports a solution out of the library.
/// Total: every item of the instance appears either as a placement or as an exclusion.
pub fn export(instance: &NestInstance, solution: &BatchSolution) -> SolveResponse {
    debug_assert!(assertions::solution_is_total(instance, solution));

    let placements = solution
        .layout_snapshots
        .iter()
        .flat_map(|ls| export_layout_snapshot(ls, instance))
        .collect_vec();

    let exclusions = solution
        .exclusions
        .iter()
        .sorted_by_key(|e| e.item_id)
        .map(|e| ExtExclusion {
            item_id: instance.item(e.item_id).ext_id,
            reason: e.reason,
            details: e.details.clone(),
        })
        .collect_vec();

    let per_bin_metrics = solution
        .layout_snapshots
        .iter()
        .map(|ls| export_bin_metrics(ls, instance))
        .collect_vec();

    let global_metrics = ExtGlobalMetrics {
        efficiency_percentage: solution.density() * 100.0,
        total_weight_kg: solution.total_weight(),
        solve_time_ms: solution.solve_time_ms,
        items_placed: placements.len(),
        items_excluded: exclusions.len(),
        bins_used: solution.used_layouts().count(),
        timed_out: solution.timed_out,
    };

    let message = {
        let mut message = format!(
            "placed {}/{} tools in {} autoclave(s), efficiency {:.1}%",
            global_metrics.items_placed,
            instance.total_item_qty(),
            global_metrics.bins_used,
            global_metrics.efficiency_percentage
        );
        if solution.timed_out {
            message.push_str(", time budget exhausted before the search completed");
        }
        message
    };

    SolveResponse {
        success: true,
        placements,
        exclusions,
        per_bin_metrics,
        global_metrics,
        message: Some(message),
    }
}

/// Placements of one layout, ordered by level, then top to bottom and left to right.
pub fn export_layout_snapshot(ls: &LayoutSnapshot, instance: &NestInstance) -> Vec<ExtPlacement> {
    let bin = instance.autoclave(ls.bin_id);
    ls.placed_items
        .values()
        .sorted_by_key(|pi| (pi.level, pi.rect.y_min, pi.rect.x_min, pi.item_id))
        .map(|pi| ExtPlacement {
            item_id: instance.item(pi.item_id).ext_id,
            bin_id: bin.ext_id,
            level: pi.level.index(),
            x: pi.rect.x_min,
            y: pi.rect.y_min,
            width: pi.rect.width(),
            height: pi.rect.height(),
            rotated: pi.rotated(),
            stand: pi.stand,
        })
        .collect_vec()
}

pub fn export_bin_metrics(ls: &LayoutSnapshot, instance: &NestInstance) -> ExtBinMetrics {
    let placed_items = ls.placed_items.values().collect_vec();
    ExtBinMetrics {
        bin_id: instance.autoclave(ls.bin_id).ext_id,
        area_used: mm2_to_cm2(ls.placed_item_area()),
        area_total: mm2_to_cm2(ls.area_total),
        efficiency_percentage: ls.density * 100.0,
        weight_used: placed_items.iter().map(|pi| pi.weight).sum(),
        vacuum_lines_used: placed_items.iter().map(|pi| pi.vacuum_lines).sum(),
        rotated_count: placed_items.iter().filter(|pi| pi.rotated()).count(),
        items_placed: placed_items.len(),
        level_1_items: placed_items
            .iter()
            .filter(|pi| pi.level == Level::Raised)
            .count(),
    }
}

impl SolveResponse {
    /// A response for a request that could not be solved at all.
    pub fn failure(message: impl Into<String>, solve_time_ms: f64) -> Self {
        SolveResponse {
            success: false,
            placements: vec![],
            exclusions: vec![],
            per_bin_metrics: vec![],
            global_metrics: ExtGlobalMetrics {
                solve_time_ms,
                ..Default::default()
            },
            message: Some(message.into()),
        }
    }
}

fn mm2_to_cm2(area: Mm2) -> f64 {
    area as f64 / MM2_PER_CM2
}
