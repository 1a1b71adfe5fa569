//! The parts and the bin of a nesting run.

use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use stickercut::geometry::geo_util::{is_rectangle, rotated_bounds};
use stickercut::geometry::primitives::{Bounds, Point, Polygon};
use stickercut::offset::{clean_polygon, offset_polygons};
use stickercut::util::CutlineConfig;
use stickercut::{CutlineError, Result};

use crate::config::NestConfig;

/// A shape to be nested
#[derive(Clone, Debug)]
pub struct Part {
    /// Index of the shape in the imported polygon list
    pub id: usize,
    /// Cleaned, counterclockwise outline whose bounds start at (0, 0)
    pub shape: Polygon,
    /// `shape` grown by half the spacing, the area kept clear around the part
    pub spaced_shape: Polygon,
    pub area: f64,
}

impl Part {
    /// Returns `None` (and logs a warning) when the polygon vanishes during cleaning or is too small to cut.
    pub fn new(id: usize, polygon: &Polygon, config: &NestConfig) -> Result<Option<Part>> {
        let Some(cleaned) = clean_polygon(polygon, config.curve_tolerance) else {
            warn!("[NEST] part {id} skipped: vanished during cleaning");
            return Ok(None);
        };
        let area = cleaned.area();
        if area.abs() <= config.curve_tolerance * config.curve_tolerance {
            warn!("[NEST] part {id} skipped: area {:.3} too small", area.abs());
            return Ok(None);
        }
        let shape = counterclockwise(cleaned).normalized().with_id(id);
        let spaced_shape = offset_shape(&shape, config.spacing / 2.0)?;

        Ok(Some(Part {
            id,
            area: area.abs(),
            shape,
            spaced_shape,
        }))
    }

    /// Bounds of the part's outline rotated by `rotation` degrees around the origin
    pub fn rotated_bounds(&self, rotation: f64) -> Option<Bounds> {
        rotated_bounds(&self.shape, rotation)
    }
}

/// The sheet parts are packed onto
#[derive(Clone, Debug)]
pub struct Bin {
    /// Cleaned, counterclockwise outline
    pub shape: Polygon,
    /// `shape` shrunk by half the spacing, parts must stay inside it
    pub fit_shape: Polygon,
    /// Minimum distance between two placed parts
    pub spacing: f64,
    pub area: f64,
    /// Whether `fit_shape` coincides with its bounding box. Otherwise every placement needs an
    /// explicit containment check.
    pub rectangular: bool,
}

impl Bin {
    pub fn new(polygon: &Polygon, config: &NestConfig) -> Result<Bin> {
        let shape = clean_polygon(polygon, config.curve_tolerance)
            .map(counterclockwise)
            .ok_or_else(|| CutlineError::DegeneratePolygon("bin vanished during cleaning".into()))?;
        let fit_shape = offset_shape(&shape, -config.spacing / 2.0)?;
        let rectangular = is_rectangle(&fit_shape, config.curve_tolerance);
        debug!(
            "[NEST] bin with {} vertices, area {:.1}, rectangular: {rectangular}",
            shape.len(),
            shape.area()
        );
        Ok(Bin {
            area: shape.area().abs(),
            spacing: config.spacing,
            shape,
            fit_shape,
            rectangular,
        })
    }

    /// Rectangular bin with its min corner at the origin
    pub fn rectangle(width: f64, height: f64, config: &NestConfig) -> Result<Bin> {
        let rect = Polygon::new(vec![
            Point(0.0, 0.0),
            Point(width, 0.0),
            Point(width, height),
            Point(0.0, height),
        ]);
        Bin::new(&rect, config)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.shape.bounds()
    }

    /// Bounds of the region the parts must fit in
    pub fn fit_bounds(&self) -> Option<Bounds> {
        self.fit_shape.bounds()
    }
}

/// Converts every polygon into a [`Part`], skipping the ones that are too small to cut
pub fn import_parts(polygons: &[Polygon], config: &NestConfig) -> Result<Vec<Part>> {
    let mut parts = vec![];
    for (id, polygon) in polygons.iter().enumerate() {
        if let Some(part) = Part::new(id, polygon, config)? {
            parts.push(part);
        }
    }
    info!("[NEST] imported {}/{} parts", parts.len(), polygons.len());
    Ok(parts)
}

fn counterclockwise(polygon: Polygon) -> Polygon {
    match polygon.area() < 0.0 {
        true => polygon.reversed(),
        false => polygon,
    }
}

/// Largest contour of `shape` offset by `distance`, counterclockwise
fn offset_shape(shape: &Polygon, distance: f64) -> Result<Polygon> {
    if distance == 0.0 {
        return Ok(shape.clone());
    }
    offset_polygons(std::slice::from_ref(shape), distance, &CutlineConfig::default())?
        .into_iter()
        .max_by_key(|p| OrderedFloat(p.area().abs()))
        .map(|p| counterclockwise(p).with_metadata_of(shape))
        .ok_or_else(|| {
            CutlineError::DegeneratePolygon(format!(
                "polygon {:?} vanished when offset by {distance}",
                shape.id
            ))
        })
}
