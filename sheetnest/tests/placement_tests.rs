#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use test_case::test_case;

    use sheetnest::config::NestConfig;
    use sheetnest::entities::{Bin, Part, import_parts};
    use sheetnest::nfp::{NfpCache, NfpKey, compute_nfp};
    use sheetnest::placement::{
        FirstFit, MinBoundingBox, Placement, PlacementStrategy, PlacementWorker,
        placement_bounds, required_nfp_keys,
    };
    use sheetnest::util::assertions;
    use stickercut::geometry::primitives::{Bounds, Point, Polygon};

    fn init_logger() {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
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

    fn filled_cache(parts: &[Part], bin: &Bin, order: &[usize], rotations: &[f64]) -> NfpCache {
        let mut cache = NfpCache::new();
        for key in required_nfp_keys(parts, order, rotations) {
            let b = parts.iter().find(|p| p.id == key.b_id).unwrap();
            let a = parts.iter().find(|p| p.id == key.a_id);
            cache.insert(key, compute_nfp(&key, a, b, bin));
        }
        cache
    }

    fn place(
        shapes: &[Polygon],
        bin: &Polygon,
        config: &NestConfig,
        strategy: &dyn PlacementStrategy,
    ) -> (Vec<Part>, Bin, Option<sheetnest::placement::PlacementResult>) {
        let parts = import_parts(shapes, config).unwrap();
        let bin = Bin::new(bin, config).unwrap();
        let order = (0..parts.len()).collect::<Vec<_>>();
        let rotations = vec![0.0; parts.len()];
        let cache = filled_cache(&parts, &bin, &order, &rotations);
        let result = PlacementWorker::new(&bin, &parts, &cache, strategy).place_parts(&order, &rotations);
        (parts, bin, result)
    }

    fn position(p: &Placement) -> (f64, f64) {
        (p.x, p.y)
    }

    #[test]
    fn two_squares_side_by_side() {
        init_logger();
        let config = NestConfig::default();
        let (parts, bin, result) = place(
            &[rect(10.0, 10.0), rect(10.0, 10.0)],
            &rect(100.0, 100.0),
            &config,
            &FirstFit,
        );
        let result = result.unwrap();

        assert_eq!(result.placements.len(), 2);
        assert!(result.unplaced.is_empty());
        assert_eq!(position(&result.placements[0]), (0.0, 0.0));
        assert_eq!(position(&result.placements[1]), (10.0, 0.0));
        assert!(approx_eq!(f64, result.fitness, 0.0, epsilon = 1e-9));
        assert_eq!(
            placement_bounds(&parts, &result.placements),
            Some(Bounds::new(0.0, 0.0, 20.0, 10.0))
        );
        assert!(assertions::layout_is_overlap_free(&parts, &result.placements));
        assert!(assertions::layout_is_contained(&bin, &parts, &result.placements));
    }

    #[test_case(&FirstFit, (60.0, 0.0), 1200.0; "first fit")]
    #[test_case(&MinBoundingBox, (0.0, 20.0), 800.0; "min bounding box")]
    fn strategies(strategy: &dyn PlacementStrategy, expected: (f64, f64), fitness: f64) {
        init_logger();
        let config = NestConfig::default();
        let (parts, _, result) = place(
            &[rect(60.0, 20.0), rect(40.0, 40.0)],
            &rect(100.0, 100.0),
            &config,
            strategy,
        );
        let result = result.unwrap();

        assert_eq!(position(&result.placements[0]), (0.0, 0.0));
        let (x, y) = position(&result.placements[1]);
        assert!(approx_eq!(f64, x, expected.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, y, expected.1, epsilon = 1e-9));
        assert!(approx_eq!(f64, result.fitness, fitness, epsilon = 1e-6));
        assert!(assertions::layout_is_overlap_free(&parts, &result.placements));
    }

    #[test]
    fn oversized_part_left_unplaced() {
        init_logger();
        let config = NestConfig::default();
        let (_, bin, result) = place(
            &[rect(10.0, 10.0), rect(200.0, 10.0)],
            &rect(100.0, 100.0),
            &config,
            &FirstFit,
        );
        let result = result.unwrap();

        assert_eq!(result.placements.len(), 1);
        assert_eq!(result.unplaced, vec![1]);
        assert!(approx_eq!(f64, result.fitness, 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, result.rank(bin.area), 10_000.0, epsilon = 1e-9));
    }

    #[test]
    fn empty_order() {
        let config = NestConfig::default();
        let bin = Bin::rectangle(100.0, 100.0, &config).unwrap();
        let cache = NfpCache::new();
        let worker = PlacementWorker::new(&bin, &[], &cache, &FirstFit);
        assert!(worker.place_parts(&[], &[]).is_none());
    }

    #[test]
    fn spacing_between_parts() {
        init_logger();
        let config = NestConfig {
            spacing: 4.0,
            ..NestConfig::default()
        };
        let (parts, bin, result) = place(
            &[rect(10.0, 10.0), rect(10.0, 10.0)],
            &rect(100.0, 100.0),
            &config,
            &FirstFit,
        );
        let result = result.unwrap();
        assert!(assertions::layout_is_contained(&bin, &parts, &result.placements));

        //half the spacing to the bin edge, the full spacing between the parts
        let (x0, y0) = position(&result.placements[0]);
        let (x1, y1) = position(&result.placements[1]);
        assert!(approx_eq!(f64, x0, 2.0, epsilon = 0.05));
        assert!(approx_eq!(f64, y0, 2.0, epsilon = 0.05));
        assert!(approx_eq!(f64, x1, 16.0, epsilon = 0.05));
        assert!(approx_eq!(f64, y1, 2.0, epsilon = 0.05));
        assert!(assertions::layout_is_overlap_free(&parts, &result.placements));
    }

    #[test]
    fn non_rectangular_bin_containment() {
        init_logger();
        let config = NestConfig::default();
        let triangle = Polygon::new(vec![Point(0.0, 0.0), Point(100.0, 0.0), Point(0.0, 100.0)]);
        let (parts, bin, result) = place(
            &[rect(40.0, 40.0), rect(40.0, 40.0)],
            &triangle,
            &config,
            &FirstFit,
        );
        let result = result.unwrap();

        assert!(!bin.rectangular);
        assert_eq!(result.placements.len(), 1);
        assert_eq!(position(&result.placements[0]), (0.0, 0.0));
        assert_eq!(result.unplaced, vec![1]);
        assert!(assertions::layout_is_contained(&bin, &parts, &result.placements));

        //the same parts fit side by side in the bounding box of the triangle
        let (_, _, result) = place(
            &[rect(40.0, 40.0), rect(40.0, 40.0)],
            &rect(100.0, 100.0),
            &config,
            &FirstFit,
        );
        assert_eq!(result.unwrap().placements.len(), 2);
    }

    #[test]
    fn required_keys() {
        let config = NestConfig::default();
        let parts = import_parts(&[rect(1.0, 1.0), rect(2.0, 2.0), rect(3.0, 3.0)], &config).unwrap();
        let keys = required_nfp_keys(&parts, &[2, 0, 1], &[90.0, 0.0, 180.0]);

        assert_eq!(keys.len(), 6);
        assert!(keys.contains(&NfpKey::inside(2, 90.0)));
        assert!(keys.contains(&NfpKey::inside(1, 180.0)));
        assert!(keys.contains(&NfpKey::outside(2, 90.0, 0, 0.0)));
        assert!(keys.contains(&NfpKey::outside(2, 90.0, 1, 180.0)));
        assert!(keys.contains(&NfpKey::outside(0, 0.0, 1, 180.0)));
        assert!(!keys.contains(&NfpKey::outside(1, 180.0, 0, 0.0)));
    }

    #[test]
    fn min_bounding_box_cost() {
        let part = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let placed = Bounds::new(0.0, 0.0, 20.0, 10.0);
        let strategy = MinBoundingBox;

        assert!(strategy.exhaustive());
        assert!(!FirstFit.exhaustive());
        assert!(approx_eq!(f64, strategy.cost(Point(5.0, 5.0), &part, None), 100.0));
        assert!(approx_eq!(f64, strategy.cost(Point(20.0, 0.0), &part, Some(&placed)), 300.0));
        assert!(approx_eq!(f64, strategy.cost(Point(0.0, 10.0), &part, Some(&placed)), 400.0));
    }
}
