// Shared unit conversions and physical constants for trajectory processing

/// Feet per nautical mile.
pub const FEET_PER_NM: f64 = 6076.11;

/// Metres per nautical mile (exact, by definition).
pub const METERS_PER_NM: f64 = 1852.0;

/// Nautical miles spanned by one degree of latitude.
pub const NM_PER_DEGREE_LAT: f64 = 60.0068669107676;

/// Mean earth radius (m) used for every spherical-earth computation.
pub const EARTH_RADIUS_M: f64 = 6371e3;

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = EARTH_RADIUS_M / METERS_PER_NM;

/// Milliseconds per second.
pub const MS_PER_SECOND: f64 = 1_000.0;

/// Milliseconds per hour. Speeds are knots, so this converts elapsed time to NM travelled.
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Distance travelled in NM at `speed_kts` over `delta_ms` (negative deltas travel backwards).
#[inline]
pub fn nm_travelled(speed_kts: f64, delta_ms: i64) -> f64 {
    speed_kts * (delta_ms as f64 / MS_PER_HOUR)
}
