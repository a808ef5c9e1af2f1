// Whole-track rejection rules based on coarse grid occupancy
//
// Each point is reduced to an integer grid cell of (lat, lon) scaled by a
// factor. Stationary radar returns off towers and buildings occupy very few
// distinct cells no matter how many reports they generate.

use std::collections::HashSet;

use super::cleaner::RemovalRule;
use crate::error::FilterConfigError;
use crate::point::Point;

/// Minimum track size before low variability is even considered
pub const DEFAULT_REQUIRED_POINTS: usize = 1_000;

/// Largest unique-cell fraction regarded as low variability
pub const DEFAULT_UNIQUE_FRACTION: f64 = 0.2;

/// Grid scale for low variability: 1e5 cells per degree
pub const DEFAULT_VARIABILITY_SCALE: f64 = 1e5;

/// Most cells a small traversal region may occupy
pub const DEFAULT_MAX_CELLS: usize = 2;

/// Grid scale for small traversal regions: 1e3 cells per degree
pub const DEFAULT_TRAVERSAL_SCALE: f64 = 1e3;

fn grid_cell<P>(p: &Point<P>, scale: f64) -> (i64, i64) {
    ((p.latitude() * scale) as i64, (p.longitude() * scale) as i64)
}

fn distinct_cells<P>(points: &[Point<P>], scale: f64) -> usize {
    points.iter().map(|p| grid_cell(p, scale)).collect::<HashSet<_>>().len()
}

fn validate_scale(scale: f64) -> Result<(), FilterConfigError> {
    if !(scale > 0.0) || !scale.is_finite() {
        return Err(FilterConfigError::NonPositive { name: "grid scale", value: scale });
    }
    Ok(())
}

/// Flags large tracks whose points pile up in a small fraction of grid cells
#[derive(Debug, Clone, Copy)]
pub struct HasLowVariability {
    required_points: usize,
    unique_fraction: f64,
    scale: f64,
}

impl Default for HasLowVariability {
    fn default() -> Self {
        HasLowVariability {
            required_points: DEFAULT_REQUIRED_POINTS,
            unique_fraction: DEFAULT_UNIQUE_FRACTION,
            scale: DEFAULT_VARIABILITY_SCALE,
        }
    }
}

impl HasLowVariability {
    /// # Arguments
    /// * `required_points` - Tracks smaller than this are never flagged
    /// * `unique_fraction` - Flag when distinct cells / points is at most this
    /// * `scale` - Grid cells per degree
    pub fn new(required_points: usize, unique_fraction: f64, scale: f64) -> Result<Self, FilterConfigError> {
        if required_points == 0 {
            return Err(FilterConfigError::NonPositive { name: "required points", value: 0.0 });
        }
        if !(0.0..=1.0).contains(&unique_fraction) {
            return Err(FilterConfigError::NotAFraction { name: "unique fraction", value: unique_fraction });
        }
        validate_scale(scale)?;
        Ok(HasLowVariability { required_points, unique_fraction, scale })
    }
}

impl<P> RemovalRule<P> for HasLowVariability {
    fn should_remove(&self, points: &[Point<P>]) -> bool {
        if points.len() < self.required_points {
            return false;
        }
        let unique = distinct_cells(points, self.scale);
        (unique as f64 / points.len() as f64) <= self.unique_fraction
    }
}

/// Flags tracks that never leave a handful of coarse grid cells
#[derive(Debug, Clone, Copy)]
pub struct HasSmallTraversalRegion {
    max_cells: usize,
    scale: f64,
}

impl Default for HasSmallTraversalRegion {
    fn default() -> Self {
        HasSmallTraversalRegion { max_cells: DEFAULT_MAX_CELLS, scale: DEFAULT_TRAVERSAL_SCALE }
    }
}

impl HasSmallTraversalRegion {
    pub fn new(max_cells: usize, scale: f64) -> Result<Self, FilterConfigError> {
        if max_cells == 0 {
            return Err(FilterConfigError::NonPositive { name: "maximum cells", value: 0.0 });
        }
        validate_scale(scale)?;
        Ok(HasSmallTraversalRegion { max_cells, scale })
    }
}

impl<P> RemovalRule<P> for HasSmallTraversalRegion {
    fn should_remove(&self, points: &[Point<P>]) -> bool {
        distinct_cells(points, self.scale) <= self.max_cells
    }
}
