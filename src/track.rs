// Track - an ordered, non-empty sequence of points for one physical aircraft
//
// `Track` is the immutable public form. `MutableTrack` is the working copy the
// cleaning pipeline edits in place; it converts back at the pipeline boundary.

use crate::error::TrackError;
use crate::interpolate::interpolate;
use crate::point::Point;

/// Closed time interval `[start, end]` in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Creates a window, swapping the bounds if they arrive reversed
    pub fn new(a: i64, b: i64) -> Self {
        TimeWindow { start: a.min(b), end: a.max(b) }
    }

    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    pub fn contains(&self, time: i64) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn overlap_with(&self, other: &TimeWindow) -> Option<TimeWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(TimeWindow { start, end })
    }

    /// Position of `time` within the window, 0.0 at start and 1.0 at end
    pub fn fraction_of_range(&self, time: i64) -> f64 {
        if self.duration() == 0 {
            return 0.0;
        }
        (time - self.start) as f64 / self.duration() as f64
    }

    /// `start, start + step, ...` up to and including `end`
    ///
    /// A non-positive step yields just the two bounds.
    pub fn stepped_iteration(&self, step: i64) -> Vec<i64> {
        let mut times = Vec::new();
        if step > 0 {
            let mut t = self.start;
            while t < self.end {
                times.push(t);
                t += step;
            }
        } else {
            times.push(self.start);
        }
        if times.last() != Some(&self.end) {
            times.push(self.end);
        }
        times
    }
}

/// Indices of the `k` points nearest in time to `time`, in time order
///
/// Ties prefer the earlier point. Fewer than `k` indices come back when the
/// slice is shorter than `k`.
pub fn k_nearest_indices<P>(points: &[Point<P>], time: i64, k: usize) -> Vec<usize> {
    let split = points.partition_point(|p| p.time() < time);
    let mut left = split; // next candidate is left - 1
    let mut right = split; // next candidate is right
    let mut chosen = Vec::with_capacity(k.min(points.len()));

    while chosen.len() < k && (left > 0 || right < points.len()) {
        let take_left = match (left > 0, right < points.len()) {
            (true, true) => {
                let dl = time - points[left - 1].time();
                let dr = points[right].time() - time;
                dl <= dr
            }
            (true, false) => true,
            _ => false,
        };
        if take_left {
            left -= 1;
            chosen.push(left);
        } else {
            chosen.push(right);
            right += 1;
        }
    }

    chosen.sort_unstable();
    chosen
}

/// Immutable, time sorted, non-empty collection of points
#[derive(Debug, Clone, PartialEq)]
pub struct Track<P = ()> {
    points: Vec<Point<P>>,
}

impl<P> Track<P> {
    /// Sorts the points and wraps them. An empty batch is rejected.
    pub fn new(mut points: Vec<Point<P>>) -> Result<Self, TrackError> {
        if points.is_empty() {
            return Err(TrackError::Empty);
        }
        points.sort();
        Ok(Track { points })
    }

    /// Wraps a batch that may legitimately be empty after filtering
    pub(crate) fn from_filtered(mut points: Vec<Point<P>>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        points.sort();
        Some(Track { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point<P>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point<P>> {
        self.points
    }

    pub fn first(&self) -> &Point<P> {
        &self.points[0]
    }

    pub fn last(&self) -> &Point<P> {
        &self.points[self.points.len() - 1]
    }

    pub fn time_window(&self) -> TimeWindow {
        TimeWindow::new(self.first().time(), self.last().time())
    }

    pub fn track_id(&self) -> Option<&str> {
        self.first().track_id()
    }

    pub fn k_nearest_points(&self, time: i64, k: usize) -> Vec<&Point<P>> {
        k_nearest_indices(&self.points, time, k)
            .into_iter()
            .map(|i| &self.points[i])
            .collect()
    }

    /// Points whose time lies inside `window`
    pub fn points_in(&self, window: TimeWindow) -> &[Point<P>] {
        let lo = self.points.partition_point(|p| p.time() < window.start);
        let hi = self.points.partition_point(|p| p.time() <= window.end);
        &self.points[lo..hi.max(lo)]
    }
}

impl<P: Clone> Track<P> {
    /// Synthetic point at `time`, or `None` when `time` is outside the track
    pub fn interpolated_point(&self, time: i64) -> Option<Point<P>> {
        if !self.time_window().contains(time) {
            return None;
        }
        let idx = self.points.partition_point(|p| p.time() < time);
        let after = &self.points[idx];
        if after.time() == time || idx == 0 {
            return Some(after.clone());
        }
        interpolate(&self.points[idx - 1], after, time).ok()
    }
}

/// The pipeline's exclusively owned working copy of a track
///
/// May become empty mid-stage; converting back into a [`Track`] reports that
/// as absence.
#[derive(Debug, Clone, PartialEq)]
pub struct MutableTrack<P = ()> {
    points: Vec<Point<P>>,
}

impl<P> MutableTrack<P> {
    pub fn new(mut points: Vec<Point<P>>) -> Self {
        points.sort();
        MutableTrack { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point<P>] {
        &self.points
    }

    /// Mutable access for field edits. Edits must not reorder points.
    pub(crate) fn points_mut(&mut self) -> &mut [Point<P>] {
        &mut self.points
    }

    pub fn retain(&mut self, keep: impl FnMut(&Point<P>) -> bool) {
        self.points.retain(keep);
    }

    /// Removes every point whose flag is set; `flags` is indexed like `points()`
    pub fn remove_flagged(&mut self, flags: &[bool]) -> usize {
        let before = self.points.len();
        let mut i = 0;
        self.points.retain(|_| {
            let keep = !flags.get(i).copied().unwrap_or(false);
            i += 1;
            keep
        });
        before - self.points.len()
    }

    /// Back to the immutable form; `None` if every point was removed
    pub fn into_track(self) -> Option<Track<P>> {
        Track::from_filtered(self.points)
    }
}

impl<P> From<Track<P>> for MutableTrack<P> {
    fn from(track: Track<P>) -> Self {
        MutableTrack { points: track.points }
    }
}
