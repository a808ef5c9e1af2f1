// Pairing - finds reports from different aircraft that are close in space and time

pub mod config;
pub mod distances;
pub mod engine;
pub mod filters;
pub mod metric;
pub mod metric_tree;

pub use config::PairingConfig;
pub use distances::{estimate_distance_in_feet, project_point_at_new_time};
pub use engine::{PointPair, PointPairFinder};
pub use filters::{CylindricalFilter, DistanceFilter, PairPredicate};
pub use metric::{DistanceMetric, FlatDistanceMetric, PointDistanceMetric};
pub use metric_tree::{MetricTree, Neighbor};
