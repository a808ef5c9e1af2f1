// Error types shared across the crate
//
// Absence of a result (a track filtered away, no known altitude) is never an
// error; those paths return `Option`. Everything here is either invalid
// configuration or a caller breaking an input contract.

use thiserror::Error;

/// Rejected point construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    #[error("point is missing a {0}")]
    MissingField(&'static str),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Rejected track construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("a track requires at least one point")]
    Empty,
}

/// Rejected interpolation request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("points are out of time order ({0} > {1})")]
    PointsOutOfOrder(i64, i64),
    #[error("time {time} is outside [{start}, {end}]")]
    TimeOutOfRange { time: i64, start: i64, end: i64 },
    #[error("points are too far apart to interpolate (dLat {dlat}, dLon {dlon})")]
    TooFarApart { dlat: f64, dlon: f64 },
}

/// Invalid filter or smoother configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterConfigError {
    #[error("time step must be strictly positive, got {0}")]
    NonPositiveTimeStep(f64),
    #[error("order of interpolation must be at least 1, got {0}")]
    InvalidOrder(usize),
    #[error("weight array must have odd length, got {0}")]
    EvenWeightCount(usize),
    #[error("weight array is too short ({len}) for a polynomial of order {order}")]
    WindowTooShort { len: usize, order: usize },
    #[error("the weighted normal equations are singular")]
    SingularSystem,
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must lie in [0, 1], got {value}")]
    NotAFraction { name: &'static str, value: f64 },
}

/// A distance query the metric cannot answer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("point at time {time} has no altitude, required for 3-D distance")]
    MissingAltitude { time: i64 },
}

/// Pairing engine failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairingError {
    #[error("time window must exceed 100 ms, got {0} ms")]
    WindowTooSmall(i64),
    #[error("pairing distance must be positive, got {0} NM")]
    NonPositiveDistance(f64),
    #[error("{name} coefficient must be finite and non-negative, got {value}")]
    InvalidCoefficient { name: &'static str, value: f64 },
    #[error("distance threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),
    #[error("point at {received} arrived after point at {current}; input must be time ordered")]
    OutOfOrder { current: i64, received: i64 },
    #[error("time delta {delta} ms exceeds limit of {limit} ms")]
    TimeDeltaTooLarge { delta: i64, limit: i64 },
    #[error(transparent)]
    Metric(#[from] MetricError),
}

/// Separation / CPA computation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeparationError {
    #[error("point at time {time} has no {field}")]
    MissingField { time: i64, field: &'static str },
    #[error("points must share an instant ({0} vs {1})")]
    DifferentTimes(i64, i64),
    #[error("tracks do not overlap in time")]
    NoOverlap,
    #[error("time {time} is outside [{start}, {end}]")]
    OutsideWindow { time: i64, start: i64, end: i64 },
    #[error("a separation series needs at least two samples, got {0}")]
    TooFewSamples(usize),
    #[error("series inputs must have equal lengths")]
    LengthMismatch,
    #[error("series times must be strictly increasing")]
    TimesNotIncreasing,
    #[error("time step must be positive, got {0} ms")]
    NonPositiveStep(i64),
    #[error("time step must not be negative, got {0} ms")]
    NegativeStep(i64),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Unreadable JSON-lines report input
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Json { line: usize, source: serde_json::Error },
    #[error("line {line}: {source}")]
    Point { line: usize, source: PointError },
}
