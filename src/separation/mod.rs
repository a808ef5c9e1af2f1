// Separation - closest point of approach and separation over a track pair's overlap

pub mod point_pair;
pub mod prediction;
pub mod time_series;
pub mod track_pair;

pub use point_pair::{ClosestPointOfApproach, SimultaneousPair};
pub use prediction::{format_duration, SeparationPrediction};
pub use time_series::SeparationTimeSeries;
pub use track_pair::TrackPair;
