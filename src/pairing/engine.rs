// PointPairFinder - streaming discovery of reports that are close in space and time
//
// Points live in one arena ordered by arrival. The metric tree is a secondary
// index of arena ids. Points that fall out of the time window are dropped from
// the front of the arena immediately and ignored by queries through their id;
// the tree itself is rebuilt from the live points, in random order, once per
// window.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use super::config::PairingConfig;
use super::metric::{DistanceMetric, FlatDistanceMetric};
use super::metric_tree::MetricTree;
use crate::error::PairingError;
use crate::point::Point;

/// Two reports judged close by the metric; `newer` arrived after `older`
#[derive(Debug)]
pub struct PointPair<P> {
    pub newer: Arc<Point<P>>,
    pub older: Arc<Point<P>>,
    pub distance: f64,
}

impl<P> Clone for PointPair<P> {
    fn clone(&self) -> Self {
        PointPair {
            newer: Arc::clone(&self.newer),
            older: Arc::clone(&self.older),
            distance: self.distance,
        }
    }
}

impl<P> PointPair<P> {
    /// True when both points carry the same (present) track id
    pub fn same_track(&self) -> bool {
        matches!((self.newer.track_id(), self.older.track_id()), (Some(a), Some(b)) if a == b)
    }
}

#[derive(Debug, Clone, Copy)]
struct Clock {
    current: i64,
    next_rebuild: i64,
}

pub struct PointPairFinder<P, M = FlatDistanceMetric> {
    time_window_ms: i64,
    threshold: f64,
    tree: MetricTree<P, M>,
    arena: VecDeque<Arc<Point<P>>>,
    // id of arena[0]; ids grow by one per accepted point
    base_id: u64,
    clock: Option<Clock>,
    size_high_water_mark: usize,
    rebuilds: u64,
}

impl<P> PointPairFinder<P, FlatDistanceMetric> {
    /// Engine using the configuration's flat metric and pairing threshold
    pub fn from_config(config: &PairingConfig) -> Result<Self, PairingError> {
        Self::new(config.time_window_ms(), config.metric(), config.pairing_threshold())
    }
}

impl<P, M: DistanceMetric<P>> PointPairFinder<P, M> {
    /// # Arguments
    /// * `time_window_ms` - How long a point stays eligible for pairing; must exceed 100 ms
    /// * `metric` - Metric backing the index
    /// * `threshold` - Largest metric distance that still forms a pair
    pub fn new(time_window_ms: i64, metric: M, threshold: f64) -> Result<Self, PairingError> {
        if time_window_ms <= 100 {
            return Err(PairingError::WindowTooSmall(time_window_ms));
        }
        if threshold.is_nan() || threshold < 0.0 {
            return Err(PairingError::InvalidThreshold(threshold));
        }
        Ok(PointPairFinder {
            time_window_ms,
            threshold,
            tree: MetricTree::new(metric),
            arena: VecDeque::new(),
            base_id: 0,
            clock: None,
            size_high_water_mark: 0,
            rebuilds: 0,
        })
    }

    /// Points currently eligible for pairing
    pub fn size(&self) -> usize {
        self.arena.len()
    }

    pub fn size_high_water_mark(&self) -> usize {
        self.size_high_water_mark
    }

    /// Number of index rebuilds performed so far
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn metric(&self) -> &M {
        self.tree.metric()
    }

    /// Ingests the next point and returns every pair it forms with earlier points
    ///
    /// Points must arrive in non-decreasing time order. A point the metric
    /// cannot measure is refused before any state changes.
    pub fn accept(&mut self, point: Point<P>) -> Result<Vec<PointPair<P>>, PairingError> {
        self.tree.metric().distance(&point, &point)?;

        let time = point.time();
        self.advance_clock(time)?;
        self.evict_stale(time);

        let base_id = self.base_id;
        let point = Arc::new(point);
        let found = self
            .tree
            .within_range(&point, self.threshold, |id| id >= base_id)
            .and_then(|neighbors| {
                let id = self.base_id + self.arena.len() as u64;
                self.tree.insert(id, Arc::clone(&point))?;
                self.arena.push_back(Arc::clone(&point));
                Ok(neighbors)
            });

        // stale points leave the index even when this point could not be paired
        self.rebuild_if_due(time);
        self.size_high_water_mark = self.size_high_water_mark.max(self.size());

        Ok(found?
            .into_iter()
            .map(|n| PointPair { newer: Arc::clone(&point), older: n.point, distance: n.distance })
            .collect())
    }

    fn advance_clock(&mut self, time: i64) -> Result<(), PairingError> {
        match self.clock.as_mut() {
            None => {
                self.clock = Some(Clock { current: time, next_rebuild: time + self.time_window_ms });
            }
            Some(clock) if time < clock.current => {
                return Err(PairingError::OutOfOrder { current: clock.current, received: time });
            }
            Some(clock) => clock.current = time,
        }
        Ok(())
    }

    // A point is stale once it is a full window older than the newest point
    fn evict_stale(&mut self, now: i64) {
        let oldest_allowed = now - self.time_window_ms;
        while self.arena.front().is_some_and(|p| p.time() <= oldest_allowed) {
            self.arena.pop_front();
            self.base_id += 1;
        }
    }

    fn rebuild_if_due(&mut self, now: i64) {
        let Some(clock) = self.clock.as_mut() else {
            return;
        };
        if now <= clock.next_rebuild {
            return;
        }
        clock.next_rebuild = now + self.time_window_ms;

        let indexed = self.tree.len();
        let mut live: Vec<(u64, Arc<Point<P>>)> = self
            .arena
            .iter()
            .enumerate()
            .map(|(i, p)| (self.base_id + i as u64, Arc::clone(p)))
            .collect();
        live.shuffle(&mut rand::thread_rng());

        self.tree.clear();
        for (id, p) in live {
            // only ever holds points the metric accepted once
            if let Err(e) = self.tree.insert(id, p) {
                warn!(id, "dropping point from pairing index: {}", e);
            }
        }
        self.rebuilds += 1;
        debug!(retained = self.tree.len(), evicted = indexed.saturating_sub(self.tree.len()), "pairing index rebuilt");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::metric::PointDistanceMetric;
    use crate::testing::{full_point, simple_point};

    fn at_altitude(time: i64, alt: f64) -> Point {
        full_point(time, 0.0, 0.0, alt, 0.0, 0.0)
    }

    #[test]
    fn test_accept_publishes_new_old_pairs() {
        let mut finder = PointPairFinder::new(13_000, PointDistanceMetric::new(1.0, 1.0), 1_250.0).unwrap();

        assert!(finder.accept(at_altitude(0, 0.0)).unwrap().is_empty());

        let pairs = finder.accept(at_altitude(0, 10.0)).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].newer.altitude(), Some(10.0));
        assert_eq!(pairs[0].older.altitude(), Some(0.0));
        assert!((pairs[0].distance - 10.0).abs() < 1e-9);

        assert_eq!(finder.accept(at_altitude(1_000, 0.0)).unwrap().len(), 2);
        // 2 s from the first two points exceeds the threshold
        assert_eq!(finder.accept(at_altitude(2_000, 0.0)).unwrap().len(), 1);
    }

    #[test]
    fn test_out_of_order_input_is_an_error() {
        let mut finder = PointPairFinder::new(13_000, PointDistanceMetric::new(1.0, 1.0), 1_250.0).unwrap();
        finder.accept(at_altitude(0, 0.0)).unwrap();
        assert_eq!(
            finder.accept(at_altitude(-1_000, 0.0)).unwrap_err(),
            PairingError::OutOfOrder { current: 0, received: -1_000 }
        );
        // simultaneous points are fine
        assert!(finder.accept(at_altitude(0, 5.0)).is_ok());
    }

    #[test]
    fn test_missing_altitude_surfaces_as_error() {
        let mut finder = PointPairFinder::new(13_000, PointDistanceMetric::new(1.0, 1.0), 1_250.0).unwrap();
        finder.accept(at_altitude(0, 0.0)).unwrap();
        assert!(matches!(finder.accept(simple_point(1_000, 0.0, 0.0)), Err(PairingError::Metric(_))));
    }

    #[test]
    fn test_unmeasurable_first_point_does_not_poison_the_index() {
        let mut finder = PointPairFinder::new(13_000, PointDistanceMetric::new(1.0, 1.0), 1_250.0).unwrap();
        assert!(matches!(finder.accept(simple_point(0, 0.0, 0.0)), Err(PairingError::Metric(_))));
        assert_eq!(finder.size(), 0);

        let mut paired = 0;
        for i in 0..120 {
            let pairs = finder.accept(at_altitude(i * 1_000, 0.0)).unwrap();
            paired += pairs.len();
        }
        // each point after the first pairs with its predecessor, 1 s back
        assert_eq!(paired, 119);
        assert!(finder.rebuilds() > 0);
    }

    #[test]
    fn test_time_weighted_pairing() {
        let mut finder = PointPairFinder::new(13_000, FlatDistanceMetric::new(0.1, 1.0), 1_000.0).unwrap();
        assert!(finder.accept(simple_point(0, 40.0, -75.0)).unwrap().is_empty());
        // 5 s apart and 100 ft apart: 500 + 100 < 1000
        let (lat, lon) = crate::geodesy::project_out(40.0, -75.0, 90.0, 100.0 / crate::constants::FEET_PER_NM);
        assert_eq!(finder.accept(simple_point(5_000, lat, lon)).unwrap().len(), 1);

        let mut finder = PointPairFinder::new(13_000, FlatDistanceMetric::new(0.1, 1.0), 1_000.0).unwrap();
        finder.accept(simple_point(0, 40.0, -75.0)).unwrap();
        assert!(finder.accept(simple_point(20_000, 40.0, -75.0)).unwrap().is_empty());
    }

    #[test]
    fn test_size_is_bounded_by_window() {
        let window = 5_000;
        let mut finder = PointPairFinder::new(window, FlatDistanceMetric::new(1.0, 1.0), 100.0).unwrap();
        let times: Vec<i64> = (0..2_000).map(|i| i * 37).collect();
        for (i, &t) in times.iter().enumerate() {
            finder.accept(simple_point(t, 40.0 + 0.001 * (i % 50) as f64, -75.0)).unwrap();
            let in_window = times[..=i].iter().filter(|&&s| s > t - window).count();
            assert!(finder.size() <= in_window, "size {} > {} at {}", finder.size(), in_window, t);
        }
        assert!(finder.rebuilds() > 10);
        assert!(finder.size_high_water_mark() <= times.iter().filter(|&&s| s < window).count() + 1);
    }

    #[test]
    fn test_pairs_survive_rebuilds() {
        // two aircraft flying together: every point pairs with the other's latest point
        let mut finder = PointPairFinder::from_config(&PairingConfig::standard()).unwrap();
        let mut total = 0;
        for i in 0..120 {
            let t = i * 1_000;
            let a = Point::builder().time(t).lat_long(40.0, -75.0 + 0.001 * i as f64).track_id("A").build().unwrap();
            let b = Point::builder().time(t).lat_long(40.01, -75.0 + 0.001 * i as f64).track_id("B").build().unwrap();
            finder.accept(a).unwrap();
            total += finder.accept(b).unwrap().iter().filter(|p| !p.same_track()).count();
        }
        assert!(finder.rebuilds() > 0);
        assert!(total >= 120, "found {} cross-track pairs", total);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(PointPairFinder::<()>::new(100, FlatDistanceMetric::default(), 1.0).is_err());
        assert!(PointPairFinder::<()>::new(13_000, FlatDistanceMetric::default(), -1.0).is_err());
        assert!(PointPairFinder::<()>::new(13_000, FlatDistanceMetric::default(), f64::NAN).is_err());
    }
}
