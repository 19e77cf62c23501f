#[cfg(test)]
mod tests {
    use curenest::entities::{
        BatchSolution, Exclusion, ExclusionReason, Layout, Level, NestInstance, PlacedItem,
        ResourceConflict,
    };
    use curenest::geometry::{Orientation, Rect};
    use curenest::io::ext_repr::SolveRequest;
    use curenest::io::{export, import};
    use curenest::util::assertions;
    use serde_json::{Value, json};
    use test_case::test_case;

    fn request(value: Value) -> SolveRequest {
        serde_json::from_value(value).expect("malformed test request")
    }

    fn instance(value: Value) -> NestInstance {
        import::import(&request(value)).expect("test request should import")
    }

    fn item(id: u64, width: f64, height: f64, weight: f64) -> Value {
        json!({
            "id": id, "width": width, "height": height, "weight": weight,
            "vacuum_lines_required": 1, "cure_cycle_id": 1
        })
    }

    fn bin(id: u64, length: f64, width: f64) -> Value {
        json!({
            "id": id, "usable_length": length, "usable_width": width,
            "max_weight": 50.0, "vacuum_lines_total": 4
        })
    }

    fn raised_bin(id: u64, clearance_height: f64) -> Value {
        json!({
            "id": id, "usable_length": 2000, "usable_width": 1000,
            "max_weight": 500.0, "vacuum_lines_total": 20,
            "has_level_1": true,
            "stand_positions": [{"x_min": 0, "x_max": 600}, {"x_min": 1200, "x_max": 1800}],
            "level_1_max_weight_per_stand": 30.0,
            "stand_clearance_height": clearance_height
        })
    }

    #[test]
    fn import_rounds_to_whole_millimetres() {
        let instance = instance(json!({
            "items": [item(7, 499.6, 300.4, 5.0)],
            "bins": [bin(3, 1000.5, 999.4)],
            "options": {"padding_mm": 10.2, "min_distance_mm": 4.5}
        }));
        let item = instance.item(0);
        assert_eq!((item.ext_id, item.width, item.height), (7, 500, 300));
        let bin = instance.autoclave(0);
        assert_eq!((bin.ext_id, bin.length, bin.width), (3, 1001, 999));
        assert_eq!(instance.spacing.padding, 10);
        assert_eq!(instance.spacing.min_distance, 5);
        assert!(!instance.options.enable_level_1);
        assert_eq!(instance.options.max_autoclaves, None);
    }

    #[test]
    fn import_sorts_stands() {
        let mut bin = raised_bin(1, 0.0);
        bin["stand_positions"] = json!([{"x_min": 1200, "x_max": 1800}, {"x_min": 0, "x_max": 600}]);
        let instance = instance(json!({"items": [item(1, 100.0, 100.0, 1.0)], "bins": [bin]}));
        let raised = instance.autoclave(0).raised.as_ref().expect("raised level");
        assert_eq!(raised.stands[0].x_min, 0);
        assert_eq!(raised.stands[1].x_min, 1200);
    }

    #[test_case(json!({"items": [], "bins": [bin(1, 1000.0, 1000.0)]}); "no items")]
    #[test_case(json!({"items": [item(1, 10.0, 10.0, 1.0)], "bins": []}); "no bins")]
    #[test_case(json!({"items": [item(1, 10.0, 10.0, 1.0), item(1, 20.0, 20.0, 1.0)], "bins": [bin(1, 1000.0, 1000.0)]}); "duplicate item ids")]
    #[test_case(json!({"items": [item(1, 10.0, 10.0, 1.0)], "bins": [bin(1, 1000.0, 1000.0), bin(1, 500.0, 500.0)]}); "duplicate bin ids")]
    #[test_case(json!({"items": [item(1, -10.0, 10.0, 1.0)], "bins": [bin(1, 1000.0, 1000.0)]}); "negative width")]
    #[test_case(json!({"items": [item(1, 0.2, 10.0, 1.0)], "bins": [bin(1, 1000.0, 1000.0)]}); "width rounds to zero")]
    #[test_case(json!({"items": [item(1, 10.0, 10.0, -1.0)], "bins": [bin(1, 1000.0, 1000.0)]}); "negative weight")]
    #[test_case(json!({"items": [item(1, 10.0, 10.0, 1.0)], "bins": [bin(1, 0.0, 1000.0)]}); "empty bin")]
    #[test_case(json!({"items": [item(1, 10.0, 10.0, 1.0)], "bins": [bin(1, 1000.0, 1000.0)], "options": {"max_autoclaves": 0}}); "zero max autoclaves")]
    #[test_case(json!({"items": [item(1, 10.0, 10.0, 1.0)], "bins": [bin(1, 1000.0, 1000.0)], "options": {"min_distance_mm": -1.0}}); "negative min distance")]
    #[test_case(json!({"items": [item(1, 4e9, 4e9, 1.0)], "bins": [bin(1, 5e9, 5e9)]}); "lengths beyond a kilometre")]
    #[test_case(json!({"items": [item(1, 10.0, 10.0, 1.0)], "bins": [bin(1, 1000.0, 1000.0)], "options": {"padding_mm": 1e12}}); "padding beyond a kilometre")]
    fn import_rejects(value: Value) {
        assert!(import::import(&request(value)).is_err());
    }

    #[test_case(json!({"has_level_1": true, "level_1_max_weight_per_stand": 10.0}); "no stands")]
    #[test_case(json!({"has_level_1": true, "stand_positions": [{"x_min": 0, "x_max": 100}]}); "no stand capacity")]
    #[test_case(json!({"has_level_1": true, "level_1_max_weight_per_stand": 10.0, "stand_positions": [{"x_min": 0, "x_max": 300}, {"x_min": 200, "x_max": 400}]}); "overlapping stands")]
    #[test_case(json!({"has_level_1": true, "level_1_max_weight_per_stand": 10.0, "stand_positions": [{"x_min": 900, "x_max": 1100}]}); "stand outside bin")]
    #[test_case(json!({"has_level_1": true, "level_1_max_weight_per_stand": 10.0, "stand_positions": [{"x_min": 300, "x_max": 300}]}); "empty stand")]
    fn import_rejects_raised_level(raised: Value) {
        let mut bin = bin(1, 1000.0, 1000.0);
        for (key, value) in raised.as_object().expect("object") {
            bin[key] = value.clone();
        }
        let value = json!({"items": [item(1, 10.0, 10.0, 1.0)], "bins": [bin]});
        assert!(import::import(&request(value)).is_err());
    }

    #[test]
    fn stands_without_raised_level_are_ignored() {
        let mut bin = bin(1, 1000.0, 1000.0);
        bin["stand_positions"] = json!([{"x_min": 0, "x_max": 300}]);
        let instance = instance(json!({"items": [item(1, 10.0, 10.0, 1.0)], "bins": [bin]}));
        assert!(instance.autoclave(0).raised.is_none());
    }

    #[test]
    fn clearance_takes_the_larger_of_padding_and_border() {
        let mut bin = bin(1, 1000.0, 1000.0);
        bin["border_clearance"] = json!(25.0);
        let value = |padding: f64| {
            json!({
                "items": [item(1, 10.0, 10.0, 1.0)],
                "bins": [bin.clone()],
                "options": {"padding_mm": padding}
            })
        };
        assert_eq!(instance(value(10.0)).clearance(0), 25);
        assert_eq!(instance(value(40.0)).clearance(0), 40);

        let layout = Layout::new(&instance(value(40.0)), 0);
        assert_eq!(layout.usable, Some(Rect::from_origin_size(40, 40, 920, 920)));
    }

    #[test_case(100, true; "exactly min distance apart")]
    #[test_case(99, false; "one millimetre short")]
    #[test_case(150, true; "further apart")]
    fn ground_respects_min_distance(gap: i64, fits: bool) {
        let instance = instance(json!({
            "items": [item(1, 300.0, 300.0, 1.0), item(2, 300.0, 300.0, 1.0)],
            "bins": [bin(1, 1000.0, 1000.0)],
            "options": {"min_distance_mm": 100.0}
        }));
        let mut layout = Layout::new(&instance, 0);
        layout.place_item(instance.item(0), Level::Ground, (0, 0), Orientation::Original, None);

        let rect = instance.item(1).rect_at(300 + gap, 0, Orientation::Original);
        assert_eq!(layout.ground_fits(&rect, 0, None), fits);
        let rect = instance.item(1).rect_at(0, 300 + gap, Orientation::Original);
        assert_eq!(layout.ground_fits(&rect, 0, None), fits);
    }

    #[test]
    fn ground_respects_clearance() {
        let instance = instance(json!({
            "items": [item(1, 300.0, 300.0, 1.0)],
            "bins": [bin(1, 1000.0, 1000.0)],
            "options": {"padding_mm": 50.0}
        }));
        let layout = Layout::new(&instance, 0);
        let item = instance.item(0);
        assert!(layout.ground_fits(&item.rect_at(50, 50, Orientation::Original), 0, None));
        assert!(layout.ground_fits(&item.rect_at(650, 650, Orientation::Original), 0, None));
        assert!(!layout.ground_fits(&item.rect_at(49, 50, Orientation::Original), 0, None));
        assert!(!layout.ground_fits(&item.rect_at(651, 50, Orientation::Original), 0, None));
    }

    #[test]
    fn resources_are_shared_between_levels() {
        let instance = instance(json!({
            "items": [item(1, 100.0, 100.0, 20.0), item(2, 100.0, 100.0, 20.0), item(3, 100.0, 100.0, 20.0)],
            "bins": [raised_bin(1, 0.0)],
            "options": {"enable_level_1": true}
        }));
        let mut layout = Layout::new(&instance, 0);
        let stand = layout.stands[0].expect("stand inside the usable area");
        layout.place_item(instance.item(0), Level::Raised, (stand.x_min, 0), Orientation::Original, Some(0));
        assert_eq!(layout.stand_weight(0), 20.0);

        // the stand carries at most 30 kg
        assert_eq!(
            layout.resource_conflict(instance.item(1), Some(0)),
            Some(ResourceConflict::StandWeight)
        );
        assert_eq!(layout.resource_conflict(instance.item(1), Some(1)), None);
        assert_eq!(layout.resource_conflict(instance.item(1), None), None);

        layout.place_item(instance.item(1), Level::Ground, (700, 0), Orientation::Original, None);
        assert_eq!(layout.weight_used(), 40.0);
        assert_eq!(layout.vacuum_lines_used(), 2);
    }

    #[test]
    fn bin_weight_and_vacuum_lines_are_capped() {
        let mut light_item = item(2, 100.0, 100.0, 1.0);
        light_item["vacuum_lines_required"] = json!(4);
        let instance = instance(json!({
            "items": [item(1, 100.0, 100.0, 45.0), item(3, 100.0, 100.0, 6.0), light_item],
            "bins": [bin(1, 1000.0, 1000.0)]
        }));
        let mut layout = Layout::new(&instance, 0);
        layout.place_item(instance.item(0), Level::Ground, (0, 0), Orientation::Original, None);
        assert_eq!(
            layout.resource_conflict(instance.item(1), None),
            Some(ResourceConflict::Weight)
        );
        assert_eq!(
            layout.resource_conflict(instance.item(2), None),
            Some(ResourceConflict::VacuumLines)
        );
    }

    #[test_case(500.0, 200.0, false; "tall tool blocks the raised level")]
    #[test_case(100.0, 200.0, true; "short tool fits underneath")]
    #[test_case(200.0, 200.0, true; "tool exactly at clearance height")]
    fn raised_level_clears_ground_tools(tool_height: f64, clearance_height: f64, fits: bool) {
        let mut ground_item = item(1, 300.0, 300.0, 1.0);
        ground_item["tool_height"] = json!(tool_height);
        let instance = instance(json!({
            "items": [ground_item, item(2, 300.0, 300.0, 1.0)],
            "bins": [raised_bin(1, clearance_height)],
            "options": {"enable_level_1": true}
        }));
        let mut layout = Layout::new(&instance, 0);
        layout.place_item(instance.item(0), Level::Ground, (100, 100), Orientation::Original, None);

        let above = instance.item(1).rect_at(200, 200, Orientation::Original);
        assert_eq!(layout.raised_fits(&above, 0, None), fits);

        // next to the ground tool the raised level is always free
        let beside = instance.item(1).rect_at(0, 500, Orientation::Original);
        assert!(layout.raised_fits(&beside, 0, None));
    }

    #[test]
    fn raised_items_must_rest_on_one_stand() {
        let instance = instance(json!({
            "items": [item(1, 300.0, 300.0, 1.0)],
            "bins": [raised_bin(1, 0.0)],
            "options": {"enable_level_1": true}
        }));
        let layout = Layout::new(&instance, 0);
        let item = instance.item(0);
        assert!(layout.raised_fits(&item.rect_at(300, 0, Orientation::Original), 0, None));
        assert!(!layout.raised_fits(&item.rect_at(301, 0, Orientation::Original), 0, None));
        assert!(!layout.raised_fits(&item.rect_at(0, 0, Orientation::Original), 1, None));
        assert!(!layout.raised_fits(&item.rect_at(0, 0, Orientation::Original), 2, None));
    }

    #[test]
    fn raised_level_disabled_by_option() {
        let instance = instance(json!({
            "items": [item(1, 300.0, 300.0, 1.0)],
            "bins": [raised_bin(1, 0.0)]
        }));
        let layout = Layout::new(&instance, 0);
        assert!(!layout.has_raised_level());
        assert_eq!(layout.area_total(), 2000 * 1000);
    }

    #[test]
    fn violations_replays_placements() {
        let instance = instance(json!({
            "items": [item(1, 300.0, 300.0, 1.0), item(2, 300.0, 300.0, 1.0), item(3, 300.0, 300.0, 1.0)],
            "bins": [bin(1, 1000.0, 1000.0)]
        }));
        let mut layout = Layout::new(&instance, 0);
        let first = layout.place_item(instance.item(0), Level::Ground, (0, 0), Orientation::Original, None);

        // bypass the checks to inject invalid placements
        let overlapping = layout.placed_items.insert(PlacedItem::new(
            instance.item(1),
            Level::Ground,
            100,
            100,
            Orientation::Original,
            None,
        ));
        let outside = layout.placed_items.insert(PlacedItem::new(
            instance.item(2),
            Level::Ground,
            800,
            0,
            Orientation::Original,
            None,
        ));

        let violations = layout.violations();
        assert!(!violations.contains(&first));
        assert!(violations.contains(&overlapping));
        assert!(violations.contains(&outside));
    }

    #[test]
    fn rotated_footprint_swaps_extents() {
        let mut rotatable = item(1, 500.0, 200.0, 1.0);
        rotatable["allow_rotation"] = json!(true);
        let instance = instance(json!({"items": [rotatable, item(2, 500.0, 200.0, 1.0)], "bins": [bin(1, 300.0, 600.0)]}));
        assert!(instance.item(0).fits_in(300, 600));
        assert!(!instance.item(1).fits_in(300, 600));
        assert_eq!(instance.item(0).footprint(Orientation::Rotated), (200, 500));
        assert_eq!(instance.item(1).orientations(), &[Orientation::Original]);
    }

    #[test]
    fn export_accounts_for_every_item() {
        let instance = instance(json!({
            "items": [item(10, 500.0, 300.0, 5.0), item(20, 500.0, 300.0, 5.0), item(30, 1200.0, 1200.0, 5.0)],
            "bins": [bin(1, 1000.0, 1000.0), bin(2, 800.0, 800.0)]
        }));
        let mut layout = Layout::new(&instance, 0);
        layout.place_item(instance.item(1), Level::Ground, (500, 0), Orientation::Original, None);
        layout.place_item(instance.item(0), Level::Ground, (0, 0), Orientation::Original, None);

        let solution = BatchSolution {
            layout_snapshots: vec![layout.save(), Layout::new(&instance, 1).save()],
            exclusions: vec![Exclusion::new(2, ExclusionReason::NoBinFits)],
            solve_time_ms: 1.0,
            timed_out: false,
        };
        assert!(assertions::solution_is_total(&instance, &solution));
        assert!(assertions::solution_is_feasible(&instance, &solution));
        assert!(assertions::rotations_are_legal(&instance, &solution));

        let response = export::export(&instance, &solution);
        assert!(response.success);
        assert_eq!(
            response.placements.iter().map(|p| (p.item_id, p.x, p.y)).collect::<Vec<_>>(),
            vec![(10, 0, 0), (20, 500, 0)]
        );
        assert_eq!(response.exclusions.len(), 1);
        assert_eq!(response.exclusions[0].item_id, 30);
        assert_eq!(response.exclusions[0].reason, ExclusionReason::NoBinFits);

        assert_eq!(response.per_bin_metrics.len(), 2);
        let metrics = &response.per_bin_metrics[0];
        assert_eq!(metrics.bin_id, 1);
        assert_eq!(metrics.area_used, 3000.0);
        assert_eq!(metrics.area_total, 10000.0);
        assert_eq!(metrics.weight_used, 10.0);
        assert_eq!(metrics.vacuum_lines_used, 2);
        assert_eq!(response.per_bin_metrics[1].items_placed, 0);

        // the unused autoclave does not dilute the global efficiency
        assert!((response.global_metrics.efficiency_percentage - 30.0).abs() < 1e-9);
        assert_eq!(response.global_metrics.bins_used, 1);
        assert_eq!(response.global_metrics.total_weight_kg, 10.0);
    }

    #[test]
    fn failure_response_is_well_formed() {
        let response = curenest::io::ext_repr::SolveResponse::failure("invalid request", 0.5);
        assert!(!response.success);
        assert!(response.placements.is_empty());
        let json = serde_json::to_value(&response).expect("serializable");
        assert_eq!(json["message"], "invalid request");
        assert_eq!(json["global_metrics"]["items_placed"], 0);
    }

    #[test]
    fn exclusion_reasons_serialize_in_pascal_case() {
        let value = serde_json::to_value(ExclusionReason::VacuumLinesExceeded).expect("serializable");
        assert_eq!(value, json!("VacuumLinesExceeded"));
    }

    #[cfg(feature = "svg-export")]
    #[test]
    fn layout_renders_to_svg() {
        use curenest::io::svg::{SvgDrawOptions, layout_to_svg};

        let instance = instance(json!({
            "items": [item(11, 300.0, 300.0, 1.0), item(12, 300.0, 300.0, 1.0)],
            "bins": [raised_bin(1, 0.0)],
            "options": {"enable_level_1": true, "padding_mm": 20.0}
        }));
        let mut layout = Layout::new(&instance, 0);
        layout.place_item(instance.item(0), Level::Ground, (700, 20), Orientation::Original, None);
        layout.place_item(instance.item(1), Level::Raised, (20, 20), Orientation::Original, Some(0));

        let document = layout_to_svg(&layout.save(), &instance, SvgDrawOptions::default(), "test");
        let svg = document.to_string();
        assert!(svg.contains("item_11"));
        assert!(svg.contains("item_12"));
        assert!(svg.contains("stand 1"));
    }
}
