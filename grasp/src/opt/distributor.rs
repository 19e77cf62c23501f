use crate::config::GraspConfig;
use crate::opt::placer::item_placement_order;
use curenest::Mm2;
use curenest::entities::{CureCycleId, Exclusion, ExclusionReason, Item, NestInstance};
use itertools::Itertools;
use log::info;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Assignment of items to autoclaves, one cure cycle per autoclave.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    /// Items assigned to every autoclave, indexed by autoclave id
    pub assignments: Vec<Vec<usize>>,
    /// Cure cycle every autoclave runs, `None` if it was not assigned any
    pub cure_cycles: Vec<Option<CureCycleId>>,
    /// Items left without an autoclave
    pub exclusions: Vec<Exclusion>,
}

/// Estimated demand of a set of items, or estimated capacity of an autoclave.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Load {
    area: f64,
    weight: f64,
    vacuum_lines: u64,
}

impl Load {
    fn of_item(item: &Item) -> Self {
        Load {
            area: item.area() as f64,
            weight: item.weight,
            vacuum_lines: item.vacuum_lines,
        }
    }

    fn of_items(instance: &NestInstance, item_ids: &[usize]) -> Self {
        item_ids
            .iter()
            .map(|id| Load::of_item(instance.item(*id)))
            .fold(Load::default(), Load::add)
    }

    fn add(self, other: Load) -> Self {
        Load {
            area: self.area + other.area,
            weight: self.weight + other.weight,
            vacuum_lines: self.vacuum_lines + other.vacuum_lines,
        }
    }

    fn covers(&self, demand: &Load) -> bool {
        demand.area <= self.area
            && demand.weight <= self.weight
            && demand.vacuum_lines <= self.vacuum_lines
    }

    /// Fill ratio of the most constraining dimension of `capacity`.
    fn relative_to(&self, capacity: &Load) -> f64 {
        let ratio = |load: f64, cap: f64| match (cap > 0.0, load > 0.0) {
            (true, _) => load / cap,
            (false, true) => f64::INFINITY,
            (false, false) => 0.0,
        };
        [
            ratio(self.area, capacity.area),
            ratio(self.weight, capacity.weight),
            ratio(self.vacuum_lines as f64, capacity.vacuum_lines as f64),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}

/// Area tools can be placed on in the autoclave: the ground level within the clearance,
/// plus the stands when the raised level is in use.
pub fn usable_area(instance: &NestInstance, bin_id: usize) -> Mm2 {
    let bin = instance.autoclave(bin_id);
    let clearance = instance.clearance(bin_id);
    let ground = bin.usable_area(clearance).map_or(0, |r| r.area());
    let raised = match instance.raised_enabled(bin_id) {
        true => bin
            .stand_footprints(clearance)
            .iter()
            .flatten()
            .map(|r| r.area())
            .sum(),
        false => 0,
    };
    ground + raised
}

/// The autoclaves available to the solve: largest usable area first, ties by ascending external id,
/// limited to the `max_autoclaves` first.
pub fn rank_bins(instance: &NestInstance) -> Vec<usize> {
    let limit = instance
        .options
        .max_autoclaves
        .unwrap_or(instance.autoclaves.len());
    (0..instance.autoclaves.len())
        .sorted_by_key(|b| (Reverse(usable_area(instance, *b)), instance.autoclave(*b).ext_id))
        .take(limit)
        .collect_vec()
}

fn capacity(instance: &NestInstance, config: &GraspConfig, bin_id: usize) -> Load {
    let bin = instance.autoclave(bin_id);
    Load {
        area: usable_area(instance, bin_id) as f64 * config.area_fill_target,
        weight: bin.max_weight,
        vacuum_lines: bin.vacuum_lines,
    }
}

/// Distributes the items over the ranked autoclaves, per cure cycle.
/// A pure function of the instance and configuration.
pub fn distribute(
    instance: &NestInstance,
    item_ids: &[usize],
    config: &GraspConfig,
) -> Distribution {
    let n_bins = instance.autoclaves.len();
    let ranked = rank_bins(instance);
    let threshold = instance.options.priority_threshold;
    let is_urgent = |id: usize| threshold.is_some_and(|t| instance.item(id).priority >= t);

    let mut distribution = Distribution {
        assignments: vec![vec![]; n_bins],
        cure_cycles: vec![None; n_bins],
        exclusions: vec![],
    };

    let groups = item_ids
        .iter()
        .copied()
        .into_group_map_by(|id| instance.item(*id).cure_cycle)
        .into_iter()
        .sorted_by_cached_key(|(cycle, ids)| {
            let urgent = ids.iter().any(|id| is_urgent(*id));
            let max_priority = ids.iter().map(|id| instance.item(*id).priority).max();
            let area: Mm2 = ids.iter().map(|id| instance.item(*id).area()).sum();
            (Reverse(urgent), Reverse(max_priority), Reverse(area), *cycle)
        })
        .collect_vec();

    for (cycle, ids) in groups {
        let order = item_placement_order(instance, &ids);
        let free = ranked
            .iter()
            .copied()
            .filter(|b| {
                distribution.cure_cycles[*b].is_none()
                    && instance.autoclave(*b).accepts_cure_cycle(cycle)
            })
            .collect_vec();

        let total = Load::of_items(instance, &order);
        let required = match threshold {
            Some(_) => Load::of_items(
                instance,
                &order.iter().copied().filter(|id| is_urgent(*id)).collect_vec(),
            ),
            None => total,
        };
        let opened = select_bins(instance, config, &free, &total, &required);

        if opened.is_empty() {
            info!(
                "[DIST] cure cycle {cycle}: no autoclave left, excluding {} tool(s)",
                order.len()
            );
            distribution.exclusions.extend(order.iter().map(|id| {
                Exclusion::new(*id, ExclusionReason::CureCycleConflict)
                    .with_details(format!("no autoclave available to run cure cycle {cycle}"))
            }));
            continue;
        }

        for b in &opened {
            distribution.cure_cycles[*b] = Some(cycle);
        }
        deal(instance, config, &opened, &order, &mut distribution.assignments);

        info!(
            "[DIST] cure cycle {cycle}: {} tool(s) over autoclave(s) {:?}",
            order.len(),
            opened
                .iter()
                .map(|b| instance.autoclave(*b).ext_id)
                .collect_vec()
        );
    }
    distribution
}

/// Picks the autoclaves for one cure cycle group from the `free` ones (in rank order).
/// The smallest autoclave holding the complete group if one exists, otherwise autoclaves in rank order
/// until the `required` demand is covered.
fn select_bins(
    instance: &NestInstance,
    config: &GraspConfig,
    free: &[usize],
    total: &Load,
    required: &Load,
) -> Vec<usize> {
    let single = free
        .iter()
        .copied()
        .filter(|b| capacity(instance, config, *b).covers(total))
        .min_by_key(|b| (usable_area(instance, *b), instance.autoclave(*b).ext_id));
    if let Some(b) = single {
        return vec![b];
    }

    let mut opened = vec![];
    let mut combined = Load::default();
    for &b in free {
        opened.push(b);
        combined = combined.add(capacity(instance, config, b));
        if combined.covers(required) {
            break;
        }
    }
    opened
}

/// Deals the items (in placement order) to the opened autoclave with the lowest relative estimated load
/// that can still take them. Items no autoclave can take by estimate go to the least loaded one.
fn deal(
    instance: &NestInstance,
    config: &GraspConfig,
    opened: &[usize],
    order: &[usize],
    assignments: &mut [Vec<usize>],
) {
    if let [bin_id] = opened {
        assignments[*bin_id].extend_from_slice(order);
        return;
    }
    let capacities = opened
        .iter()
        .map(|b| capacity(instance, config, *b))
        .collect_vec();
    let mut loads = vec![Load::default(); opened.len()];

    for &item_id in order {
        let demand = Load::of_item(instance.item(item_id));
        let least_loaded = |candidates: &mut dyn Iterator<Item = usize>| {
            candidates.min_by_key(|i| OrderedFloat(loads[*i].relative_to(&capacities[*i])))
        };
        let target = least_loaded(
            &mut (0..opened.len()).filter(|i| capacities[*i].covers(&loads[*i].add(demand))),
        )
        .or_else(|| least_loaded(&mut (0..opened.len())));

        if let Some(i) = target {
            loads[i] = loads[i].add(demand);
            assignments[opened[i]].push(item_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curenest::io::ext_repr::SolveRequest;
    use curenest::io::import::import;
    use serde_json::{Value, json};

    fn instance(items: Value, bins: Value, options: Value) -> NestInstance {
        let request: SolveRequest =
            serde_json::from_value(json!({"items": items, "bins": bins, "options": options}))
                .expect("valid request");
        import(&request).expect("valid instance")
    }

    fn item(id: u64, size: f64, cycle: u64, priority: i32) -> Value {
        json!({"id": id, "width": size, "height": size, "weight": 1.0, "cure_cycle_id": cycle, "priority": priority})
    }

    fn bin(id: u64, size: f64) -> Value {
        json!({"id": id, "usable_length": size, "usable_width": size, "max_weight": 1000.0, "vacuum_lines_total": 100})
    }

    #[test]
    fn bins_ranked_by_area_and_limited() {
        let instance = instance(
            json!([item(1, 100.0, 1, 0)]),
            json!([bin(1, 1000.0), bin(2, 3000.0), bin(3, 2000.0), bin(4, 3000.0)]),
            json!({"max_autoclaves": 3}),
        );
        let ext_ids = rank_bins(&instance)
            .iter()
            .map(|b| instance.autoclave(*b).ext_id)
            .collect_vec();
        assert_eq!(ext_ids, vec![2, 4, 3]);
    }

    #[test]
    fn group_goes_to_smallest_bin_holding_it() {
        let instance = instance(
            json!([item(1, 500.0, 1, 0), item(2, 500.0, 1, 0)]),
            json!([bin(1, 3000.0), bin(2, 1200.0), bin(3, 500.0)]),
            json!({}),
        );
        let dist = distribute(&instance, &[0, 1], &GraspConfig::default());
        assert_eq!(dist.assignments[1], vec![0, 1]);
        assert!(dist.assignments[0].is_empty() && dist.assignments[2].is_empty());
        assert_eq!(dist.cure_cycles, vec![None, Some(1), None]);
    }

    #[test]
    fn large_group_is_balanced_over_bins() {
        let items = (1..=8).map(|id| item(id, 500.0, 1, 0)).collect_vec();
        let instance = instance(
            json!(items),
            json!([bin(1, 1100.0), bin(2, 1100.0), bin(3, 1100.0)]),
            json!({}),
        );
        let dist = distribute(&instance, &(0..8).collect_vec(), &GraspConfig::default());
        // 8 tools of 0.25 m² need two 1.21 m² autoclaves at 85% fill
        let counts = dist.assignments.iter().map(|a| a.len()).collect_vec();
        assert_eq!(counts.iter().sum::<usize>(), 8);
        assert!(counts.iter().filter(|c| **c > 0).count() >= 2);
        let used = counts.iter().filter(|c| **c > 0).collect_vec();
        assert!(used.iter().all(|c| (**c as i64 - *used[0] as i64).abs() <= 1));
    }

    #[test]
    fn one_cure_cycle_per_bin() {
        let instance = instance(
            json!([item(1, 100.0, 1, 0), item(2, 100.0, 2, 5)]),
            json!([bin(1, 1000.0)]),
            json!({}),
        );
        let dist = distribute(&instance, &[0, 1], &GraspConfig::default());
        // the group holding the highest priority goes first
        assert_eq!(dist.assignments[0], vec![1]);
        assert_eq!(dist.exclusions.len(), 1);
        assert_eq!(dist.exclusions[0].item_id, 0);
        assert_eq!(dist.exclusions[0].reason, ExclusionReason::CureCycleConflict);
    }

    #[test]
    fn allowed_cure_cycles_are_respected() {
        let mut restricted = bin(1, 2000.0);
        restricted["allowed_cure_cycles"] = json!([2]);
        let instance = instance(
            json!([item(1, 100.0, 1, 0), item(2, 100.0, 2, 0)]),
            json!([restricted, bin(2, 1000.0)]),
            json!({}),
        );
        let dist = distribute(&instance, &[0, 1], &GraspConfig::default());
        assert_eq!(dist.cure_cycles, vec![Some(2), Some(1)]);
        assert!(dist.exclusions.is_empty());
    }

    #[test]
    fn non_urgent_items_never_open_extra_bins() {
        let mut items = vec![item(1, 500.0, 1, 10)];
        items.extend((2..=8).map(|id| item(id, 500.0, 1, 0)));
        let instance = instance(
            json!(items),
            json!([bin(1, 1100.0), bin(2, 1100.0)]),
            json!({"priority_threshold": 5}),
        );
        let dist = distribute(&instance, &(0..8).collect_vec(), &GraspConfig::default());
        assert_eq!(dist.assignments[0].len(), 8);
        assert!(dist.assignments[1].is_empty());
    }
}
