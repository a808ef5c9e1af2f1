// Cleaner composition - the one-method filter contract and its combinators

use tracing::debug;

use crate::point::Point;
use crate::track::{MutableTrack, Track};

/// A stage that accepts a value and returns either a transformed value or
/// nothing at all
///
/// Cleaners hold only immutable configuration, so a single instance can clean
/// many tracks concurrently.
pub trait DataCleaner<T>: Send + Sync {
    fn clean(&self, data: T) -> Option<T>;

    /// Human readable stage name for diagnostics
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T, F> DataCleaner<T> for F
where
    F: Fn(T) -> Option<T> + Send + Sync,
{
    fn clean(&self, data: T) -> Option<T> {
        self(data)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}

/// Applies cleaners strictly in order and stops at the first absence
pub struct CompositeCleaner<T> {
    stages: Vec<Box<dyn DataCleaner<T>>>,
}

impl<T> CompositeCleaner<T> {
    pub fn new() -> Self {
        CompositeCleaner { stages: Vec::new() }
    }

    /// Appends a stage (builder style)
    pub fn then(mut self, stage: impl DataCleaner<T> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn push(&mut self, stage: Box<dyn DataCleaner<T>>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl<T> Default for CompositeCleaner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DataCleaner<T> for CompositeCleaner<T> {
    fn clean(&self, data: T) -> Option<T> {
        let mut current = data;
        for stage in &self.stages {
            match stage.clean(current) {
                Some(next) => current = next,
                None => {
                    debug!(stage = stage.name(), "cleaning stage produced no result");
                    return None;
                }
            }
        }
        Some(current)
    }

    fn name(&self) -> &'static str {
        "CompositeCleaner"
    }
}

/// Runs a chain of in-place cleaners on a working copy of a track
///
/// The immutable track goes in, the working copy is edited by each stage, and
/// the result is frozen back into an immutable track.
pub struct MutableSmoother<P> {
    inner: CompositeCleaner<MutableTrack<P>>,
}

impl<P> MutableSmoother<P> {
    pub fn new(inner: CompositeCleaner<MutableTrack<P>>) -> Self {
        MutableSmoother { inner }
    }
}

impl<P> DataCleaner<Track<P>> for MutableSmoother<P> {
    fn clean(&self, track: Track<P>) -> Option<Track<P>> {
        self.inner.clean(MutableTrack::from(track))?.into_track()
    }

    fn name(&self) -> &'static str {
        "MutableSmoother"
    }
}

/// Decides whether a whole track should be discarded
pub trait RemovalRule<P>: Send + Sync {
    fn should_remove(&self, points: &[Point<P>]) -> bool;
}

/// Drops any track its rule flags; passes every other track through unchanged
#[derive(Debug, Clone, Default)]
pub struct RemoveTracksMatching<R> {
    rule: R,
}

impl<R> RemoveTracksMatching<R> {
    pub fn new(rule: R) -> Self {
        RemoveTracksMatching { rule }
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }
}

impl<P, R: RemovalRule<P>> DataCleaner<Track<P>> for RemoveTracksMatching<R> {
    fn clean(&self, track: Track<P>) -> Option<Track<P>> {
        (!self.rule.should_remove(track.points())).then_some(track)
    }
}

impl<P, R: RemovalRule<P>> DataCleaner<MutableTrack<P>> for RemoveTracksMatching<R> {
    fn clean(&self, track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        (!self.rule.should_remove(track.points())).then_some(track)
    }
}
