use log::error;

use crate::geometry::primitives::{Bounds, Polygon};
//Various checks to verify correctness of the state of the system
//Used in debug_assert!() blocks

/// At least 3 vertices, all finite, no duplicate closing vertex
pub fn polygon_is_well_formed(polygon: &Polygon) -> bool {
    if polygon.len() < 3 {
        error!("polygon has {} vertices", polygon.len());
        return false;
    }
    if let Some(p) = polygon.points.iter().find(|p| !p.0.is_finite() || !p.1.is_finite()) {
        error!("polygon contains non-finite vertex {:?}", p);
        return false;
    }
    if polygon.points.first() == polygon.points.last() {
        error!("polygon stores its closing vertex");
        return false;
    }
    true
}

/// Cached bounds agree with freshly computed ones
pub fn bounds_cache_valid(polygon: &Polygon) -> bool {
    let fresh = Bounds::from_points(&polygon.points);
    match (polygon.bounds(), fresh) {
        (Some(cached), Some(fresh)) => {
            cached.almost_encloses(&fresh) && fresh.almost_encloses(&cached)
        }
        (None, None) => true,
        _ => false,
    }
}
