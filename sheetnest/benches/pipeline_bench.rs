use std::f64::consts::TAU;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use sheetnest::config::{NestConfig, StopCriterion};
use sheetnest::entities::{Bin, import_parts};
use sheetnest::nester::Nester;
use stickercut::geometry::primitives::{Point, Polygon};
use stickercut::raster::RgbaBuffer;
use stickercut::session::CutlineSession;
use stickercut::util::CutlineConfig;

criterion_main!(benches);
criterion_group!(benches, cutline_bench, nest_generation_bench);

const RASTER_SIZE: usize = 256;
const N_PARTS: usize = 12;

/// Opaque disc with a square notch on a transparent background
fn synthetic_raster() -> RgbaBuffer {
    let mut buffer = RgbaBuffer::filled(RASTER_SIZE, RASTER_SIZE, [0, 0, 0, 0]);
    let c = RASTER_SIZE as f64 / 2.0;
    let r = c * 0.8;
    for y in 0..RASTER_SIZE {
        for x in 0..RASTER_SIZE {
            let (dx, dy) = (x as f64 - c, y as f64 - c);
            let notch = dx > 0.0 && dy.abs() < r * 0.2;
            if dx * dx + dy * dy <= r * r && !notch {
                buffer.set_pixel(x, y, [200, 40, 40, 255]);
            }
        }
    }
    buffer
}

fn cutline_bench(c: &mut Criterion) {
    let buffer = synthetic_raster();
    let config = CutlineConfig {
        offset: 8.0,
        ..CutlineConfig::default()
    };

    c.bench_function("trace_simplify_offset", |b| {
        b.iter(|| CutlineSession::from_raster(black_box(&buffer), config))
    });
}

/// Star-shaped parts of varying size, the kind of outline a sticker cut-line produces
fn star(r_outer: f64, r_inner: f64, n_tips: usize) -> Polygon {
    let points = (0..2 * n_tips)
        .map(|i| {
            let r = if i % 2 == 0 { r_outer } else { r_inner };
            let theta = i as f64 * TAU / (2 * n_tips) as f64;
            Point(r * theta.cos(), r * theta.sin())
        })
        .collect();
    Polygon::new(points)
}

fn nest_generation_bench(c: &mut Criterion) {
    let config = NestConfig {
        spacing: 2.0,
        stop: StopCriterion {
            max_generations: None,
            max_plateau: None,
            time_limit_secs: None,
        },
        ..NestConfig::default()
    };
    let shapes = (0..N_PARTS)
        .map(|i| star(20.0 + 3.0 * i as f64, 10.0 + i as f64, 5 + i % 3))
        .collect::<Vec<_>>();
    let parts = import_parts(&shapes, &config).unwrap();
    let bin = Bin::rectangle(400.0, 300.0, &config).unwrap();

    //cache warmed up by the initial population, every iteration breeds and evaluates one generation
    let mut nester = Nester::new(parts, bin, config);
    nester.start();

    c.bench_function("nest_generation", |b| b.iter(|| nester.step()));
}
