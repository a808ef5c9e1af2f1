// The canonical track cleaning pipeline
//
// Stage order matters: every stage assumes the ones before it already ran.

use super::acceleration::AccelerationOutlierDetector;
use super::cleaner::{CompositeCleaner, MutableSmoother, RemoveTracksMatching};
use super::downsampling::{DistanceDownSampler, TimeDownSampler};
use super::gap_filling::{FillMissingAltitudes, FillMissingSpeeds, ZeroAltitudeToNull};
use super::outliers::{LateralOutlierDetector, VerticalOutlierDetector};
use super::point_removal::{CoastedPointRemover, HighFrequencyPointRemover, SmallTrackRemover};
use super::track_filter::TrackFilter;
use super::variability::HasLowVariability;
use crate::point::Point;
use crate::track::{MutableTrack, Track};

/// Pipeline for formats without coasted points
pub fn core_smoothing<P: Send + Sync + 'static>() -> CompositeCleaner<Track<P>> {
    build(CoastedPointRemover::default(), CompositeCleaner::new())
}

/// Pipeline that first drops every point `is_coasted` flags
pub fn core_smoothing_with<P, F>(is_coasted: F) -> CompositeCleaner<Track<P>>
where
    P: Send + Sync + 'static,
    F: Fn(&Point<P>) -> bool + Send + Sync + 'static,
{
    build(CoastedPointRemover::new(is_coasted), CompositeCleaner::new())
}

fn build<P: Send + Sync + 'static>(
    coasted: CoastedPointRemover<P>,
    in_place_prefix: CompositeCleaner<MutableTrack<P>>,
) -> CompositeCleaner<Track<P>> {
    CompositeCleaner::new()
        .then(coasted)
        .then(HighFrequencyPointRemover::default())
        .then(SmallTrackRemover::default())
        .then(MutableSmoother::new(in_place_stages(in_place_prefix)))
}

/// Appends the canonical in-place stages to `prefix`
fn in_place_stages<P: Send + Sync + 'static>(
    prefix: CompositeCleaner<MutableTrack<P>>,
) -> CompositeCleaner<MutableTrack<P>> {
    prefix
        .then(TimeDownSampler::default())
        .then(FillMissingSpeeds)
        .then(RemoveTracksMatching::new(HasLowVariability::default()))
        .then(DistanceDownSampler::default())
        .then(ZeroAltitudeToNull)
        .then(FillMissingAltitudes)
        .then(VerticalOutlierDetector::default())
        .then(LateralOutlierDetector::default())
        .then(TrackFilter::default())
}

/// The in-place stages preceded by acceleration outlier removal, for sources
/// known to emit errant points around outages
pub fn outage_aware_smoothing<P: Send + Sync + 'static>() -> CompositeCleaner<Track<P>> {
    build(CoastedPointRemover::default(), outage_prefix())
}

pub fn outage_aware_smoothing_with<P, F>(is_coasted: F) -> CompositeCleaner<Track<P>>
where
    P: Send + Sync + 'static,
    F: Fn(&Point<P>) -> bool + Send + Sync + 'static,
{
    build(CoastedPointRemover::new(is_coasted), outage_prefix())
}

fn outage_prefix<P: Send + Sync + 'static>() -> CompositeCleaner<MutableTrack<P>> {
    CompositeCleaner::new().then(AccelerationOutlierDetector::default())
}
