#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use test_case::test_case;

    use stickercut::geometry::Matrix;
    use stickercut::geometry::convex_hull::{convex_hull_from_points, is_convex};
    use stickercut::geometry::curves::{CubicBezier, QuadraticBezier, SvgArc};
    use stickercut::geometry::geo_util::{
        line_intersect, on_segment, point_in_polygon, point_in_polygon_at, polygon_area,
        polygon_bounds, rotate_polygon, rotated_bounds,
    };
    use stickercut::geometry::primitives::{Bounds, Point, Polygon};

    fn square(size: f64) -> Polygon {
        Polygon::new(vec![
            Point(0.0, 0.0),
            Point(size, 0.0),
            Point(size, size),
            Point(0.0, size),
        ])
    }

    #[test]
    fn matrix_applies_rightmost_first() {
        let m = Matrix::identity().translate(10.0, 0.0).scale(2.0, 2.0);
        let p = m.apply(Point(1.0, 1.0));
        assert!(approx_eq!(f64, p.0, 12.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, p.1, 2.0, epsilon = 1e-12));

        let rel = m.apply_relative(Point(1.0, 1.0));
        assert!(approx_eq!(f64, rel.0, 2.0, epsilon = 1e-12));
    }

    #[test]
    fn matrix_rotates_around_center() {
        let m = Matrix::identity().rotate(90.0, 5.0, 5.0);
        let p = m.apply(Point(10.0, 5.0));
        assert!(approx_eq!(f64, p.0, 5.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, p.1, 10.0, epsilon = 1e-9));
        assert!(Matrix::identity().rotate(0.0, 3.0, 3.0).is_identity());
    }

    #[test]
    fn bounds_of_points() {
        assert_eq!(polygon_bounds(&[]), None);

        let original = square(10.0);
        assert_eq!(original.bounds(), Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));
        //translating carries the cached bounds along
        let moved = original.translated(-5.0, 20.0);
        assert_eq!(
            polygon_bounds(&moved.points),
            Some(Bounds::new(-5.0, 20.0, 5.0, 30.0))
        );
        assert_eq!(moved.bounds(), polygon_bounds(&moved.points));

        let single = [Point(3.0, 4.0)];
        assert_eq!(polygon_bounds(&single), Some(Bounds::new(3.0, 4.0, 3.0, 4.0)));
    }

    #[test_case(Point(5.0, 5.0), Some(true); "inside")]
    #[test_case(Point(15.0, 5.0), Some(false); "outside bounds")]
    #[test_case(Point(0.0, 5.0), None; "on edge")]
    #[test_case(Point(10.0, 10.0), None; "on vertex")]
    fn point_in_square(p: Point, expected: Option<bool>) {
        assert_eq!(point_in_polygon(p, &square(10.0)), expected);
    }

    #[test]
    fn point_in_concave_polygon() {
        //U shape, the notch is outside
        let u = Polygon::new(vec![
            Point(0.0, 0.0),
            Point(30.0, 0.0),
            Point(30.0, 30.0),
            Point(20.0, 30.0),
            Point(20.0, 10.0),
            Point(10.0, 10.0),
            Point(10.0, 30.0),
            Point(0.0, 30.0),
        ]);
        assert_eq!(point_in_polygon(Point(15.0, 20.0), &u), Some(false));
        assert_eq!(point_in_polygon(Point(5.0, 20.0), &u), Some(true));
    }

    #[test]
    fn point_in_polygon_degenerate_and_offset() {
        let line = Polygon::new(vec![Point(0.0, 0.0), Point(1.0, 1.0)]);
        assert_eq!(point_in_polygon(Point(0.5, 0.5), &line), None);

        let sq = square(10.0);
        assert_eq!(point_in_polygon_at(Point(25.0, 5.0), &sq, (20.0, 0.0)), Some(true));
        assert_eq!(point_in_polygon_at(Point(5.0, 5.0), &sq, (20.0, 0.0)), Some(false));
        //the cached local bounds survive the query
        assert_eq!(sq.bounds().map(|b| b.max_x), Some(10.0));
    }

    #[test]
    fn area_sign_follows_winding() {
        let ccw = square(10.0);
        assert!(approx_eq!(f64, polygon_area(&ccw.points), 100.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, ccw.reversed().area(), -100.0, epsilon = 1e-12));
    }

    #[test]
    fn rotation_preserves_metadata() {
        let p = Polygon::new(vec![Point(1.0, 0.0), Point(2.0, 0.0), Point(2.0, 1.0)])
            .with_id(7)
            .with_source(3);
        let r = rotate_polygon(&p, 90.0);
        assert_eq!(r.id, Some(7));
        assert_eq!(r.source, Some(3));
        assert_eq!(r.rotation, Some(90.0));
        assert!(approx_eq!(f64, r.points[0].0, 0.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, r.points[0].1, 1.0, epsilon = 1e-12));

        let b = rotated_bounds(&p, 90.0).unwrap();
        assert!(approx_eq!(f64, b.min_x, -1.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, b.max_y, 2.0, epsilon = 1e-12));
    }

    #[test]
    fn segment_predicates() {
        let (a, b) = (Point(0.0, 0.0), Point(10.0, 10.0));
        assert!(on_segment(a, b, Point(5.0, 5.0)));
        assert!(!on_segment(a, b, a));
        assert!(!on_segment(a, b, Point(5.0, 6.0)));

        let x = line_intersect(a, b, Point(0.0, 10.0), Point(10.0, 0.0), false).unwrap();
        assert!(approx_eq!(f64, x.0, 5.0, epsilon = 1e-12));
        assert!(line_intersect(a, b, Point(0.0, 1.0), Point(10.0, 11.0), true).is_none());
        assert!(line_intersect(a, Point(1.0, 1.0), Point(0.0, 10.0), Point(10.0, 0.0), false).is_none());
    }

    #[test]
    fn bezier_flattening_keeps_endpoints() {
        let q = QuadraticBezier::new(Point(0.0, 0.0), Point(100.0, 0.0), Point(50.0, 100.0));
        let pts = q.linearize(0.5);
        assert!(pts.len() > 4);
        assert_eq!(pts.first(), Some(&Point(0.0, 0.0)));
        assert_eq!(pts.last(), Some(&Point(100.0, 0.0)));
        //monotone in x for this symmetric curve
        assert!(pts.windows(2).all(|w| w[0].0 < w[1].0));

        let c = CubicBezier::new(
            Point(0.0, 0.0),
            Point(100.0, 0.0),
            Point(0.0, 100.0),
            Point(100.0, 100.0),
        );
        let pts = c.linearize(0.5);
        assert_eq!(pts.last(), Some(&Point(100.0, 0.0)));
        assert!(pts.iter().all(|p| p.1 <= 75.0 + 1e-9));

        let flat = QuadraticBezier::new(Point(0.0, 0.0), Point(10.0, 0.0), Point(5.0, 0.0));
        assert_eq!(flat.linearize(0.1).len(), 2);
    }

    #[test]
    fn arc_flattening_stays_on_circle() {
        let arc = SvgArc {
            p1: Point(0.0, 0.0),
            p2: Point(10.0, 0.0),
            rx: 5.0,
            ry: 5.0,
            angle: 0.0,
            large_arc: false,
            sweep: true,
        };
        let pts = arc.linearize(0.05);
        assert!(pts.len() > 4);
        assert_eq!(pts.first(), Some(&Point(0.0, 0.0)));
        assert_eq!(pts.last(), Some(&Point(10.0, 0.0)));
        for p in pts.iter() {
            assert!(approx_eq!(f64, p.distance(&Point(5.0, 0.0)), 5.0, epsilon = 1e-6));
        }

        let center = arc.to_center();
        assert!(approx_eq!(f64, center.extent.abs(), 180.0, epsilon = 1e-9));

        let degenerate = SvgArc { rx: 0.0, ..arc };
        assert_eq!(degenerate.linearize(0.05).len(), 2);
    }

    #[test]
    fn convex_hull_drops_interior_points() {
        let mut pts = square(10.0).points;
        pts.push(Point(5.0, 5.0));
        pts.push(Point(5.0, 0.0));
        let hull = convex_hull_from_points(pts);
        assert_eq!(hull.len(), 4);
        assert!(is_convex(&hull));
        assert!(polygon_area(&hull) > 0.0);
    }
}
