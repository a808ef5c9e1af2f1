// Track cleaning - composable filters that turn raw reports into plausible trajectories

pub mod acceleration;
pub mod altitude;
pub mod cleaner;
pub mod downsampling;
pub mod gap_filling;
pub mod outliers;
pub mod pipeline;
pub mod point_removal;
pub mod regression;
pub mod savitzky_golay;
pub mod track_filter;
pub mod variability;

pub use acceleration::{AccelerationOutlierDetector, DataGap};
pub use altitude::AltitudeSmoother;
pub use cleaner::{CompositeCleaner, DataCleaner, MutableSmoother, RemovalRule, RemoveTracksMatching};
pub use downsampling::{DistanceDownSampler, TimeDownSampler};
pub use gap_filling::{FillMissingAltitudes, FillMissingSpeeds, ZeroAltitudeToNull};
pub use outliers::{LateralOutlierDetector, VerticalOutlierDetector};
pub use pipeline::{core_smoothing, core_smoothing_with, outage_aware_smoothing, outage_aware_smoothing_with};
pub use point_removal::{CoastedPointRemover, HighFrequencyPointRemover, SmallTrackRemover};
pub use regression::SimpleRegression;
pub use savitzky_golay::{FixedStepDigitalFilter, SavitzkyGolayFilter};
pub use track_filter::TrackFilter;
pub use variability::{HasLowVariability, HasSmallTraversalRegion};
