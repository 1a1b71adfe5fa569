#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use test_case::test_case;

    use stickercut::CutlineError;
    use stickercut::geometry::geo_util::polygon_area;
    use stickercut::geometry::primitives::{Point, Polygon};
    use stickercut::raster::{RgbaBuffer, has_transparent_border, trace_contour};
    use stickercut::util::polygon_simplification::{simplify_polygon, smooth_polygon};

    const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn init_logger() {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    fn disc(size: usize, radius: f64) -> RgbaBuffer {
        let mut buffer = RgbaBuffer::filled(size, size, TRANSPARENT);
        let c = size as f64 / 2.0;
        for y in 0..size {
            for x in 0..size {
                let (dx, dy) = (x as f64 + 0.5 - c, y as f64 + 0.5 - c);
                if dx * dx + dy * dy <= radius * radius {
                    buffer.set_pixel(x, y, BLACK);
                }
            }
        }
        buffer
    }

    #[test]
    fn traced_circle_retains_area() {
        init_logger();
        let radius = 80.0;
        let traced = trace_contour(&disc(200, radius)).unwrap();
        let simplified = simplify_polygon(&traced, 1.0);

        let ratio = polygon_area(&simplified.points).abs() / (PI * radius * radius);
        assert!((0.95..=1.02).contains(&ratio), "area ratio {ratio}");
        assert!(simplified.len() < 150, "{} vertices", simplified.len());
        assert!(simplified.len() < traced.len());
    }

    #[test]
    fn noise_speck_is_not_traced() {
        init_logger();
        let mut buffer = RgbaBuffer::filled(100, 100, TRANSPARENT);
        buffer.set_pixel(5, 5, BLACK);
        buffer.fill_rect(50, 50, 61, 61, BLACK);

        let contour = trace_contour(&buffer).unwrap();
        let b = contour.bounds().unwrap();
        for v in [b.min_x, b.min_y, b.max_x, b.max_y] {
            assert!((49.0..=61.0).contains(&v), "bounds {b:?}");
        }
        assert!(contour.len() >= 4);
    }

    #[test_case(TRANSPARENT; "transparent")]
    #[test_case(WHITE; "opaque white")]
    #[test_case([10, 10, 10, 100]; "translucent")]
    fn no_opaque_pixels(fill: [u8; 4]) {
        let buffer = RgbaBuffer::filled(20, 10, fill);
        assert_eq!(
            trace_contour(&buffer),
            Err(CutlineError::NoOpaquePixels {
                width: 20,
                height: 10
            })
        );
    }

    #[test]
    fn rectangle_contour_walks_the_boundary() {
        let mut buffer = RgbaBuffer::filled(30, 30, TRANSPARENT);
        buffer.fill_rect(10, 10, 20, 15, BLACK);
        let contour = trace_contour(&buffer).unwrap();

        //every boundary pixel of a 10x5 block is visited once
        assert_eq!(contour.len(), 2 * 10 + 2 * 5 - 4);
        assert_eq!(contour.points[0], Point(10.0, 10.0));
        assert!(contour.points.iter().all(|p| buffer.is_opaque(p.0 as i64, p.1 as i64)));
    }

    #[test]
    fn isolated_pixel_terminates() {
        let mut buffer = RgbaBuffer::filled(5, 5, TRANSPARENT);
        buffer.set_pixel(2, 2, BLACK);
        let contour = trace_contour(&buffer).unwrap();
        assert_eq!(contour.points, vec![Point(2.0, 2.0)]);
    }

    #[test]
    fn one_pixel_line_terminates() {
        let mut buffer = RgbaBuffer::filled(20, 5, TRANSPARENT);
        buffer.fill_rect(2, 2, 18, 3, BLACK);
        let contour = trace_contour(&buffer).unwrap();
        assert!(contour.len() <= 4 * 16 + 8);
    }

    #[test]
    fn buffer_length_is_validated() {
        assert!(matches!(
            RgbaBuffer::new(4, 4, vec![0; 63]),
            Err(CutlineError::InvalidRaster(_))
        ));
        assert!(RgbaBuffer::new(4, 4, vec![0; 64]).is_ok());
    }

    #[test]
    fn transparent_border_detection() {
        assert!(has_transparent_border(&disc(100, 30.0)));
        assert!(has_transparent_border(&RgbaBuffer::filled(50, 50, WHITE)));
        assert!(!has_transparent_border(&RgbaBuffer::filled(50, 50, BLACK)));

        let mut edge = RgbaBuffer::filled(50, 50, TRANSPARENT);
        edge.fill_rect(0, 20, 1, 30, BLACK);
        assert!(!has_transparent_border(&edge));
    }

    fn wobbly_ring(n: usize) -> Polygon {
        Polygon::new(
            (0..n)
                .map(|i| {
                    let t = i as f64 / n as f64 * 2.0 * PI;
                    let r = 50.0 + 3.0 * (7.0 * t).sin() + ((i * 7919) % 5) as f64 * 0.3;
                    Point(r * t.cos(), r * t.sin())
                })
                .collect(),
        )
    }

    #[test_case(wobbly_ring(500), 1.0; "ring eps 1")]
    #[test_case(wobbly_ring(500), 0.2; "ring eps 0.2")]
    #[test_case(wobbly_ring(64), 5.0; "coarse ring eps 5")]
    fn simplify_is_idempotent(polygon: Polygon, epsilon: f64) {
        let once = simplify_polygon(&polygon, epsilon);
        let twice = simplify_polygon(&once, epsilon);
        assert_eq!(once.points, twice.points);
        assert!(once.len() <= polygon.len());
    }

    #[test]
    fn simplify_collinear_run_keeps_endpoints() {
        let line = Polygon::new((0..10).map(|i| Point(i as f64, 0.0)).collect());
        let s = simplify_polygon(&line, 0.1);
        assert_eq!(s.points, vec![Point(0.0, 0.0), Point(9.0, 0.0)]);

        let short = Polygon::new(vec![Point(0.0, 0.0), Point(1.0, 5.0)]);
        assert_eq!(simplify_polygon(&short, 0.1).points, short.points);
    }

    #[test_case(3, 1)]
    #[test_case(4, 2)]
    #[test_case(7, 3)]
    fn smoothing_doubles_per_iteration(k: usize, iterations: usize) {
        let polygon = wobbly_ring(k);
        let smoothed = smooth_polygon(&polygon, iterations);
        assert_eq!(smoothed.len(), k * 2usize.pow(iterations as u32));
    }

    #[test]
    fn smoothing_cuts_corners() {
        let square = Polygon::new(vec![
            Point(0.0, 0.0),
            Point(4.0, 0.0),
            Point(4.0, 4.0),
            Point(0.0, 4.0),
        ]);
        let s = smooth_polygon(&square, 1);
        assert_eq!(s.points[0], Point(1.0, 0.0));
        assert_eq!(s.points[1], Point(3.0, 0.0));
        assert!(s.area() < square.area());
        assert_eq!(smooth_polygon(&square, 0).points, square.points);
    }
}
