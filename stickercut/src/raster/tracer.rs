use std::collections::VecDeque;

use log::{debug, info};

use crate::geometry::primitives::{Point, Polygon};
use crate::raster::RgbaBuffer;
use crate::{CutlineError, Result};

/// Moore neighborhood, counterclockwise on screen starting east (y grows downward)
const MOORE_NEIGHBORS: [(i64, i64); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Whether the image border is transparent or white, judged from about 10 samples per edge
pub fn has_transparent_border(buffer: &RgbaBuffer) -> bool {
    let (w, h) = (buffer.width(), buffer.height());
    if w == 0 || h == 0 {
        return true;
    }
    let background = |x: usize, y: usize| !buffer.is_opaque(x as i64, y as i64);

    let x_step = (w / 10).max(1);
    let y_step = (h / 10).max(1);
    (0..w).step_by(x_step).all(|x| background(x, 0) && background(x, h - 1))
        && (0..h).step_by(y_step).all(|y| background(0, y) && background(w - 1, y))
}

/// Traces the outer boundary of the main opaque shape with Moore-neighbor tracing.
///
/// The main shape is the largest 8-connected component of opaque pixels; the walk starts at its
/// first pixel in raster order. The returned polygon is in pixel coordinates.
pub fn trace_contour(buffer: &RgbaBuffer) -> Result<Polygon> {
    let (start, component_size) =
        main_component_start(buffer).ok_or(CutlineError::NoOpaquePixels {
            width: buffer.width(),
            height: buffer.height(),
        })?;

    //a boundary pixel is entered at most once from each side
    let max_steps = 4 * component_size + 8;

    let mut contour = vec![];
    let (mut cx, mut cy) = start;
    let mut last_direction = 6;
    loop {
        contour.push(Point(cx as f64, cy as f64));
        if contour.len() > max_steps {
            debug!("[TRACE] step cap of {max_steps} reached");
            break;
        }

        let next = (0..8)
            .map(|i| (last_direction + 5 + i) % 8)
            .find(|&dir| {
                let (dx, dy) = MOORE_NEIGHBORS[dir];
                buffer.is_opaque(cx + dx, cy + dy)
            });

        match next {
            Some(dir) => {
                cx += MOORE_NEIGHBORS[dir].0;
                cy += MOORE_NEIGHBORS[dir].1;
                last_direction = dir;
            }
            //isolated pixel
            None => break,
        }
        if (cx, cy) == start {
            break;
        }
    }

    info!(
        "[TRACE] traced {} contour points from ({}, {}), component of {} pixels",
        contour.len(),
        start.0,
        start.1,
        component_size
    );
    Ok(Polygon::new(contour))
}

/// First pixel (raster order) and size of the largest 8-connected opaque component.
/// Ties go to the component that appears first.
fn main_component_start(buffer: &RgbaBuffer) -> Option<((i64, i64), usize)> {
    let (w, h) = (buffer.width(), buffer.height());
    let mut visited = vec![false; w * h];
    let mut best: Option<((i64, i64), usize)> = None;
    let mut n_components = 0;

    for y in 0..h {
        for x in 0..w {
            if visited[y * w + x] || !buffer.is_opaque(x as i64, y as i64) {
                continue;
            }
            n_components += 1;
            let size = flood_fill(buffer, &mut visited, (x, y));
            if best.is_none_or(|(_, s)| size > s) {
                best = Some(((x as i64, y as i64), size));
            }
        }
    }
    if n_components > 1 {
        debug!("[TRACE] {n_components} opaque components, tracing the largest");
    }
    best
}

fn flood_fill(buffer: &RgbaBuffer, visited: &mut [bool], seed: (usize, usize)) -> usize {
    let w = buffer.width();
    let mut queue = VecDeque::from([seed]);
    visited[seed.1 * w + seed.0] = true;
    let mut size = 0;
    while let Some((x, y)) = queue.pop_front() {
        size += 1;
        for (dx, dy) in MOORE_NEIGHBORS {
            let (nx, ny) = (x as i64 + dx, y as i64 + dy);
            if !buffer.is_opaque(nx, ny) {
                continue;
            }
            let i = ny as usize * w + nx as usize;
            if !visited[i] {
                visited[i] = true;
                queue.push_back((nx as usize, ny as usize));
            }
        }
    }
    size
}
