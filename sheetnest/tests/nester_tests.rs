#[cfg(test)]
mod tests {
    use std::time::Instant;

    use float_cmp::approx_eq;
    use test_case::test_case;

    use sheetnest::config::{NestConfig, PlacementStrategyKind, StopCriterion};
    use sheetnest::entities::{Bin, import_parts};
    use sheetnest::io::layout_to_svg::{MARK_LENGTH, layout_to_svg, printing_mark_segments};
    use sheetnest::io::svg_util::SvgDrawOptions;
    use sheetnest::nester::Nester;
    use sheetnest::placement::{MinBoundingBox, placement_bounds};
    use sheetnest::util::assertions;
    use stickercut::CutlineError;
    use stickercut::geometry::primitives::{Bounds, Point, Polygon};

    fn init_logger() {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .try_init();
    }

    fn rect(w: f64, h: f64) -> Polygon {
        Polygon::new(vec![
            Point(0.0, 0.0),
            Point(w, 0.0),
            Point(w, h),
            Point(0.0, h),
        ])
    }

    fn l_shape(size: f64) -> Polygon {
        let half = size / 2.0;
        Polygon::new(vec![
            Point(0.0, 0.0),
            Point(size, 0.0),
            Point(size, half),
            Point(half, half),
            Point(half, size),
            Point(0.0, size),
        ])
    }

    fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len_sq = dx * dx + dy * dy;
        let t = match len_sq > 0.0 {
            true => (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0),
            false => 0.0,
        };
        p.distance(&Point(a.0 + t * dx, a.1 + t * dy))
    }

    /// Distance between the outlines of two polygons that do not overlap
    fn polygon_distance(a: &Polygon, b: &Polygon) -> f64 {
        let one_way = |x: &Polygon, y: &Polygon| {
            x.points
                .iter()
                .flat_map(|&p| y.edge_iter().map(move |(s, e)| segment_distance(p, s, e)))
                .fold(f64::INFINITY, f64::min)
        };
        one_way(a, b).min(one_way(b, a))
    }

    fn config(max_generations: usize) -> NestConfig {
        NestConfig {
            stop: StopCriterion {
                max_generations: Some(max_generations),
                max_plateau: None,
                time_limit_secs: None,
            },
            ..NestConfig::default()
        }
    }

    fn nester(shapes: &[Polygon], config: NestConfig) -> Nester {
        let parts = import_parts(shapes, &config).unwrap();
        let bin = Bin::rectangle(100.0, 100.0, &config).unwrap();
        Nester::new(parts, bin, config)
    }

    fn mixed_shapes() -> Vec<Polygon> {
        vec![
            l_shape(40.0),
            rect(30.0, 20.0),
            l_shape(30.0),
            rect(20.0, 20.0),
            rect(50.0, 10.0),
            rect(15.0, 25.0),
        ]
    }

    #[test_case(PlacementStrategyKind::FirstFit, 4, 0.0; "first fit")]
    #[test_case(PlacementStrategyKind::MinBoundingBox, 4, 0.0; "min bounding box")]
    #[test_case(PlacementStrategyKind::FirstFit, 8, 0.0; "eight rotations")]
    #[test_case(PlacementStrategyKind::FirstFit, 4, 2.0; "spacing")]
    #[test_case(PlacementStrategyKind::MinBoundingBox, 8, 2.0; "eight rotations with spacing")]
    fn valid_layout(strategy: PlacementStrategyKind, rotations: usize, spacing: f64) {
        init_logger();
        let config = NestConfig {
            placement: strategy,
            rotations,
            spacing,
            ..config(3)
        };
        let mut nester = nester(&mixed_shapes(), config);
        let result = nester.run().unwrap();

        assert_eq!(nester.generation(), 3);
        assert_eq!(result.placements.len(), 6);
        assert!(result.unplaced.is_empty());
        assert!(assertions::placements_are_unique(&result.placements, &result.unplaced));
        assert!(assertions::layout_is_overlap_free(&nester.parts, &result.placements));
        assert!(assertions::layout_is_contained(&nester.bin, &nester.parts, &result.placements));
        assert!(result.fitness >= -1e-6);

        //parts keep half the spacing from the bin edge
        let margin = spacing / 2.0 - 1e-6;
        for placement in &result.placements {
            let part = nester.parts.iter().find(|p| p.id == placement.id).unwrap();
            let b = assertions::placed_shape(part, placement).bounds().unwrap();
            assert!(b.min_x >= margin && b.min_y >= margin, "{b:?}");
            assert!(b.max_x <= 100.0 - margin && b.max_y <= 100.0 - margin, "{b:?}");
        }
        //and, up to the arc approximation, the full spacing from each other
        let shapes = result
            .placements
            .iter()
            .map(|pl| {
                let part = nester.parts.iter().find(|p| p.id == pl.id).unwrap();
                assertions::placed_shape(part, pl)
            })
            .collect::<Vec<_>>();
        for (i, a) in shapes.iter().enumerate() {
            for b in &shapes[i + 1..] {
                let d = polygon_distance(a, b);
                assert!(d >= spacing - 0.05, "parts {:?} and {:?} are {d} apart", a.id, b.id);
            }
        }

        let bounds = placement_bounds(&nester.parts, &result.placements).unwrap();
        let part_area = nester.parts.iter().map(|p| p.area).sum::<f64>();
        assert!(approx_eq!(f64, result.fitness, bounds.area() - part_area, epsilon = 1e-6));
        assert!(nester.nfp_cache().len() > 6);
    }

    #[test]
    fn spaced_concave_nest_finishes() {
        init_logger();
        let config = NestConfig {
            spacing: 2.0,
            stop: StopCriterion {
                max_generations: Some(1),
                max_plateau: None,
                time_limit_secs: None,
            },
            ..NestConfig::default()
        };
        let shapes = [l_shape(40.0), l_shape(30.0), l_shape(25.0)];
        let start = Instant::now();
        let mut nester = nester(&shapes, config);
        let result = nester.run().unwrap();

        assert!(start.elapsed().as_secs_f64() < 20.0, "took {:?}", start.elapsed());
        assert_eq!(result.placements.len(), 3);
        assert!(assertions::layout_is_overlap_free(&nester.parts, &result.placements));
    }

    #[test]
    fn deterministic_with_seed() {
        init_logger();
        let run = || {
            let mut nester = nester(&mixed_shapes(), config(3));
            nester.run().unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn never_worse_than_start() {
        init_logger();
        let mut nester = nester(&mixed_shapes(), config(5));
        let start = nester.start().unwrap();
        let end = nester.run().unwrap();
        let bin_area = nester.bin.area;
        assert!(end.rank(bin_area) <= start.rank(bin_area));
        assert_eq!(nester.best().and_then(|i| i.fitness), Some(end.rank(bin_area)));
    }

    #[test]
    fn stops_on_plateau() {
        init_logger();
        let config = NestConfig {
            stop: StopCriterion {
                max_generations: Some(100),
                max_plateau: Some(2),
                time_limit_secs: None,
            },
            ..NestConfig::default()
        };
        //identical squares in a row are already optimal, nothing can improve
        let mut nester = nester(&[rect(10.0, 10.0), rect(10.0, 10.0)], config);
        let result = nester.run().unwrap();
        assert_eq!(nester.generation(), 2);
        assert!(approx_eq!(f64, result.fitness, 0.0, epsilon = 1e-6));
    }

    #[test]
    fn stops_on_time_limit() {
        let config = NestConfig {
            stop: StopCriterion {
                max_generations: None,
                max_plateau: None,
                time_limit_secs: Some(0.0),
            },
            ..NestConfig::default()
        };
        let mut nester = nester(&mixed_shapes(), config);
        assert!(nester.run().is_some());
        assert_eq!(nester.generation(), 0);
    }

    #[test]
    fn step_by_step() {
        let mut nester = nester(&mixed_shapes(), config(0));
        assert!(nester.best().is_none());
        nester.step();
        nester.step();
        assert_eq!(nester.generation(), 2);
        assert!(nester.population().iter().all(|i| i.is_evaluated()));
        assert!(nester.best_result().is_some());
    }

    #[test]
    fn custom_strategy() {
        let mut nester = nester(&mixed_shapes(), config(1)).with_strategy(Box::new(MinBoundingBox));
        assert_eq!(nester.run().map(|r| r.placements.len()), Some(6));
    }

    #[test]
    fn unfittable_parts_are_reported_and_skipped() {
        init_logger();
        let shapes = [rect(10.0, 10.0), rect(150.0, 20.0), rect(20.0, 20.0)];
        let mut nester = nester(&shapes, config(2));

        assert_eq!(
            nester.unfittable_parts(),
            vec![CutlineError::UnfittablePart { id: 1, rotations: 4 }]
        );
        let result = nester.run().unwrap();
        assert_eq!(result.placements.len(), 2);
        assert_eq!(result.unplaced, vec![1]);
    }

    #[test]
    fn nothing_to_nest() {
        let mut nester = nester(&[], config(2));
        assert!(nester.run().is_none());
        assert!(nester.unfittable_parts().is_empty());
    }

    #[test]
    fn layout_svg() {
        let config = NestConfig {
            rotations: 1,
            ..config(0)
        };
        let mut nester = nester(&[rect(10.0, 10.0), rect(10.0, 10.0)], config);
        let result = nester.run().unwrap();

        let with_marks = layout_to_svg(
            &nester.bin,
            &nester.parts,
            &result,
            SvgDrawOptions::default(),
            true,
            "test",
        )
        .to_string();
        assert!(with_marks.contains("translate(0 0) rotate(0)"));
        assert!(with_marks.contains("translate(10 0) rotate(0)"));
        assert!(with_marks.contains("xlink:href=\"#part_0\""));
        let marks = with_marks.split("id=\"printing_marks\"").nth(1).unwrap();
        assert_eq!(marks.matches("<path").count(), 8);

        let without_marks = layout_to_svg(
            &nester.bin,
            &nester.parts,
            &result,
            SvgDrawOptions::default(),
            false,
            "test",
        )
        .to_string();
        let marks = without_marks.split("id=\"printing_marks\"").nth(1).unwrap();
        assert_eq!(marks.matches("<path").count(), 0);
    }

    #[test]
    fn printing_marks_surround_bounds() {
        let bounds = Bounds::new(0.0, 0.0, 20.0, 10.0);
        let marks = printing_mark_segments(&bounds);

        assert_eq!(marks.len(), 8);
        assert!(marks.iter().all(|(a, b)| approx_eq!(f64, a.distance(b), MARK_LENGTH)));
        assert!(marks.iter().all(|(a, b)| !bounds.contains(a) && !bounds.contains(b)));
        assert_eq!(marks[0], (Point(-10.0, -30.0), Point(-10.0, -10.0)));
        assert_eq!(marks[7], (Point(50.0, 20.0), Point(30.0, 20.0)));
    }
}
