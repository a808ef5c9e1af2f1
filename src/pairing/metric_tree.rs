// MetricTree - ball tree supporting "everything within r of q" queries
//
// Every node keeps a pivot point and a covering radius that bounds the
// distance from the pivot to every entry beneath it. The triangle inequality
// then lets a range query skip any node with d(q, pivot) > radius + r.
// Entries carry a caller-assigned id so the owner can ignore entries it has
// already evicted without rebuilding.

use std::sync::Arc;

use super::metric::DistanceMetric;
use crate::error::MetricError;
use crate::point::Point;

/// Entries per leaf before it splits
pub const LEAF_CAPACITY: usize = 16;

#[derive(Debug)]
struct Entry<P> {
    id: u64,
    point: Arc<Point<P>>,
}

impl<P> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Entry { id: self.id, point: Arc::clone(&self.point) }
    }
}

#[derive(Debug)]
enum Children<P> {
    Leaf(Vec<Entry<P>>),
    Split(Box<Node<P>>, Box<Node<P>>),
}

#[derive(Debug)]
struct Node<P> {
    pivot: Arc<Point<P>>,
    radius: f64,
    children: Children<P>,
}

/// One search hit
#[derive(Debug)]
pub struct Neighbor<P> {
    pub id: u64,
    pub point: Arc<Point<P>>,
    pub distance: f64,
}

#[derive(Debug)]
pub struct MetricTree<P, M> {
    metric: M,
    root: Option<Node<P>>,
    len: usize,
}

impl<P, M: DistanceMetric<P>> MetricTree<P, M> {
    pub fn new(metric: M) -> Self {
        MetricTree { metric, root: None, len: 0 }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Adds a point under `id`
    ///
    /// The point is measured against itself first, so a point the metric
    /// cannot handle is refused even by an empty tree.
    pub fn insert(&mut self, id: u64, point: Arc<Point<P>>) -> Result<(), MetricError> {
        self.metric.distance(&point, &point)?;
        let entry = Entry { id, point };
        match self.root.as_mut() {
            None => {
                self.root = Some(Node {
                    pivot: Arc::clone(&entry.point),
                    radius: 0.0,
                    children: Children::Leaf(vec![entry]),
                });
            }
            Some(root) => insert_into(&self.metric, root, entry)?,
        }
        self.len += 1;
        Ok(())
    }

    /// Every entry within `range` of `query`, skipping ids `keep` rejects
    pub fn within_range(
        &self,
        query: &Point<P>,
        range: f64,
        keep: impl Fn(u64) -> bool,
    ) -> Result<Vec<Neighbor<P>>, MetricError> {
        let mut found = Vec::new();
        if let Some(root) = &self.root {
            search(&self.metric, root, query, range, &keep, &mut found)?;
        }
        Ok(found)
    }
}

fn insert_into<P, M: DistanceMetric<P>>(metric: &M, node: &mut Node<P>, entry: Entry<P>) -> Result<(), MetricError> {
    let d = metric.distance(&node.pivot, &entry.point)?;
    node.radius = node.radius.max(d);

    match &mut node.children {
        Children::Split(left, right) => {
            let dl = metric.distance(&left.pivot, &entry.point)?;
            let dr = metric.distance(&right.pivot, &entry.point)?;
            if dl <= dr {
                insert_into(metric, left, entry)
            } else {
                insert_into(metric, right, entry)
            }
        }
        Children::Leaf(entries) => {
            entries.push(entry);
            if entries.len() > LEAF_CAPACITY {
                // a failed split leaves the oversized leaf in place
                if let Some(children) = split(metric, entries)? {
                    node.children = children;
                }
            }
            Ok(())
        }
    }
}

/// Divides an overfull leaf around its two (approximately) farthest entries
///
/// `None` when every entry sits on the first pivot.
fn split<P, M: DistanceMetric<P>>(metric: &M, entries: &[Entry<P>]) -> Result<Option<Children<P>>, MetricError> {
    let far_from_first = farthest(metric, entries, &entries[0].point)?;
    let far_from_that = farthest(metric, entries, &entries[far_from_first].point)?;

    let a = Arc::clone(&entries[far_from_first].point);
    let b = Arc::clone(&entries[far_from_that].point);

    let mut left = Node { pivot: a, radius: 0.0, children: Children::Leaf(Vec::new()) };
    let mut right = Node { pivot: b, radius: 0.0, children: Children::Leaf(Vec::new()) };
    let (mut left_entries, mut right_entries) = (Vec::new(), Vec::new());

    for entry in entries {
        let dl = metric.distance(&left.pivot, &entry.point)?;
        let dr = metric.distance(&right.pivot, &entry.point)?;
        if dl <= dr {
            left.radius = left.radius.max(dl);
            left_entries.push(entry.clone());
        } else {
            right.radius = right.radius.max(dr);
            right_entries.push(entry.clone());
        }
    }

    // identical points all land left; keep an oversized leaf rather than recurse forever
    if right_entries.is_empty() {
        return Ok(None);
    }

    left.children = Children::Leaf(left_entries);
    right.children = Children::Leaf(right_entries);
    Ok(Some(Children::Split(Box::new(left), Box::new(right))))
}

fn farthest<P, M: DistanceMetric<P>>(metric: &M, entries: &[Entry<P>], from: &Point<P>) -> Result<usize, MetricError> {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, e) in entries.iter().enumerate() {
        let d = metric.distance(from, &e.point)?;
        if d > best.1 {
            best = (i, d);
        }
    }
    Ok(best.0)
}

fn search<P, M: DistanceMetric<P>>(
    metric: &M,
    node: &Node<P>,
    query: &Point<P>,
    range: f64,
    keep: &impl Fn(u64) -> bool,
    found: &mut Vec<Neighbor<P>>,
) -> Result<(), MetricError> {
    let d = metric.distance(query, &node.pivot)?;
    if d > node.radius + range {
        return Ok(());
    }
    match &node.children {
        Children::Leaf(entries) => {
            for e in entries.iter().filter(|e| keep(e.id)) {
                let distance = metric.distance(query, &e.point)?;
                if distance <= range {
                    found.push(Neighbor { id: e.id, point: Arc::clone(&e.point), distance });
                }
            }
        }
        Children::Split(left, right) => {
            search(metric, left, query, range, keep, found)?;
            search(metric, right, query, range, keep, found)?;
        }
    }
    Ok(())
}
