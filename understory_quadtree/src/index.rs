// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `SpatialIndex` API: identity map plus adaptive quadtree.

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::config::QuadTreeConfig;
use crate::node::{Entry, Node};
use crate::types::{Aabb2D, Scalar};
use crate::util::event;

/// Spatial index over caller-owned ids and their axis-aligned bounds.
///
/// The index keeps two structures:
/// - an identity map `id → bounds`, the source of truth for membership, and
/// - a quadtree over a fixed world boundary, rebuilt or patched as ids move.
///
/// An id whose bounds straddle a split line is stored in every leaf it
/// overlaps, so query results are deduplicated before they reach the caller.
/// Items partly or fully outside the world are still tracked in the identity
/// map; only the part of them that overlaps the world is reachable by queries.
///
/// The index is single-owner and synchronous. Wrap it in a lock if it must be
/// shared between threads.
///
/// ## Example
///
/// ```rust
/// use understory_quadtree::{Aabb2D, SpatialIndex};
///
/// let mut idx = SpatialIndex::new(Aabb2D::from_xywh(0.0, 0.0, 4000.0, 3000.0));
/// idx.insert("obj-1", Aabb2D::from_xywh(10.0, 20.0, 100.0, 50.0));
///
/// // Dragging an object is just another insert.
/// idx.insert("obj-1", Aabb2D::from_xywh(900.0, 20.0, 100.0, 50.0));
/// assert!(idx.query_rect(Aabb2D::from_xywh(0.0, 0.0, 200.0, 200.0)).is_empty());
/// assert!(idx.query_point(950.0, 40.0).contains("obj-1"));
///
/// idx.remove("obj-1");
/// assert!(idx.is_empty());
/// ```
#[derive(Clone)]
pub struct SpatialIndex<K, T = f64> {
    world: Aabb2D<T>,
    config: QuadTreeConfig,
    root: Node<K, T>,
    bounds: HashMap<K, Aabb2D<T>>,
}

/// Structural summary of the partition tree, for debugging and tuning.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Total number of nodes, interior and leaf.
    pub nodes: usize,
    /// Number of leaf nodes.
    pub leaves: usize,
    /// Number of stored leaf entries; larger than the id count when ids span leaves.
    pub entries: usize,
    /// Depth of the deepest node (the root is at depth 0).
    pub max_depth: usize,
}

impl<K, T: Debug> Debug for SpatialIndex<K, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("world", &self.world)
            .field("config", &self.config)
            .field("len", &self.bounds.len())
            .finish_non_exhaustive()
    }
}

impl<K, T> SpatialIndex<K, T>
where
    K: Clone + Eq + Hash,
    T: Scalar,
{
    /// Create an empty index covering `world` with the default thresholds.
    pub fn new(world: Aabb2D<T>) -> Self {
        Self::with_config(world, QuadTreeConfig::default())
    }

    /// Create an empty index covering `world` with explicit thresholds.
    pub fn with_config(world: Aabb2D<T>, config: QuadTreeConfig) -> Self {
        Self {
            world,
            config,
            root: Node::leaf(world, 0),
            bounds: HashMap::new(),
        }
    }

    /// The fixed root rectangle.
    #[inline]
    pub fn world(&self) -> Aabb2D<T> {
        self.world
    }

    /// The subdivision thresholds this index was created with.
    #[inline]
    pub fn config(&self) -> QuadTreeConfig {
        self.config
    }

    /// Number of distinct ids in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether the index holds no ids.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Whether `id` is present.
    #[inline]
    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.bounds.contains_key(id)
    }

    /// The last bounds recorded for `id`, if present.
    #[inline]
    pub fn bounds<Q>(&self, id: &Q) -> Option<Aabb2D<T>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.bounds.get(id).copied()
    }

    /// Iterate over all `(id, bounds)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, Aabb2D<T>)> + '_ {
        self.bounds.iter().map(|(id, bounds)| (id, *bounds))
    }

    /// Insert `id` with `bounds`, or move it if it is already present.
    ///
    /// Moving removes every stale entry before the new one is stored, so the
    /// old region never reports the id again. Returns the previous bounds.
    pub fn insert(&mut self, id: K, bounds: Aabb2D<T>) -> Option<Aabb2D<T>> {
        let previous = self.bounds.insert(id.clone(), bounds);
        match previous {
            Some(old) if old == bounds => return previous,
            Some(old) => {
                self.root.remove(&id, &old, &self.config);
            }
            None => {}
        }
        self.root.insert(Entry { id, bounds }, &self.config);
        previous
    }

    /// Remove `id`, returning its last bounds. Absent ids are a no-op.
    pub fn remove<Q>(&mut self, id: &Q) -> Option<Aabb2D<T>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bounds = self.bounds.remove(id)?;
        let removed = self.root.remove(id, &bounds, &self.config);
        debug_assert!(
            removed || !self.world.overlaps(&bounds),
            "indexed id was missing from every overlapping leaf"
        );
        Some(bounds)
    }

    /// Drop every id and reset the tree to a single empty leaf over the world.
    pub fn clear(&mut self) {
        event!(debug, len = self.bounds.len(), "clearing spatial index");
        self.bounds.clear();
        self.root = Node::leaf(self.world, 0);
    }

    /// Replace the whole contents with `items`.
    ///
    /// This is the bulk path used after restoring a snapshot (undo/redo or
    /// load). The tree is built top-down in one pass instead of through
    /// repeated inserts, and ends up with the same shape repeated inserts
    /// would produce. If an id appears more than once, the last bounds win.
    ///
    /// ```rust
    /// use understory_quadtree::{Aabb2D, SpatialIndex};
    ///
    /// let mut idx = SpatialIndex::new(Aabb2D::from_xywh(0.0, 0.0, 1000.0, 1000.0));
    /// idx.insert(String::from("stale"), Aabb2D::from_xywh(0.0, 0.0, 5.0, 5.0));
    ///
    /// let snapshot = (0..20).map(|i| {
    ///     (format!("obj-{i}"), Aabb2D::from_xywh(i as f64 * 40.0, 10.0, 20.0, 20.0))
    /// });
    /// idx.rebuild(snapshot);
    ///
    /// assert_eq!(idx.len(), 20);
    /// assert!(!idx.contains("stale"));
    /// assert_eq!(idx.query_point(45.0, 15.0).len(), 1);
    /// ```
    pub fn rebuild<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, Aabb2D<T>)>,
    {
        self.bounds.clear();
        let items = items.into_iter();
        self.bounds.reserve(items.size_hint().0);
        for (id, bounds) in items {
            self.bounds.insert(id, bounds);
        }

        let world = self.world;
        let entries: Vec<Entry<K, T>> = self
            .bounds
            .iter()
            .filter(|(_, bounds)| world.overlaps(bounds))
            .map(|(id, bounds)| Entry {
                id: id.clone(),
                bounds: *bounds,
            })
            .collect();
        event!(
            debug,
            len = self.bounds.len(),
            in_world = entries.len(),
            "rebuilding spatial index"
        );
        self.root = Node::build(world, 0, entries, &self.config);
    }

    /// Ids whose bounds overlap `rect` (edges inclusive).
    pub fn query_rect(&self, rect: Aabb2D<T>) -> HashSet<K> {
        let mut out = HashSet::new();
        self.root.visit_rect(&rect, &mut |entry| {
            if !out.contains(&entry.id) {
                out.insert(entry.id.clone());
            }
        });
        out
    }

    /// Visit ids whose bounds overlap `rect` (does not allocate result storage
    /// beyond a deduplication set).
    ///
    /// Calls `f(id)` once per matching id. The order is unspecified.
    pub fn visit_rect<F: FnMut(&K)>(&self, rect: Aabb2D<T>, mut f: F) {
        let mut seen: HashSet<&K> = HashSet::new();
        self.root.visit_rect(&rect, &mut |entry| {
            if seen.insert(&entry.id) {
                f(&entry.id);
            }
        });
    }

    /// Ids whose bounds contain the point (borders inclusive).
    pub fn query_point(&self, x: T, y: T) -> HashSet<K> {
        let mut out = HashSet::new();
        self.root.visit_point(x, y, &mut |entry| {
            if !out.contains(&entry.id) {
                out.insert(entry.id.clone());
            }
        });
        out
    }

    /// Visit ids whose bounds contain the point.
    ///
    /// Calls `f(id)` once per matching id. The order is unspecified.
    pub fn visit_point<F: FnMut(&K)>(&self, x: T, y: T, mut f: F) {
        let mut seen: HashSet<&K> = HashSet::new();
        self.root.visit_point(x, y, &mut |entry| {
            if seen.insert(&entry.id) {
                f(&entry.id);
            }
        });
    }

    /// Append the boundary of every node, root first, to `out`.
    ///
    /// Useful for drawing a debug overlay of the partition.
    pub fn node_boundaries(&self, out: &mut Vec<Aabb2D<T>>) {
        self.root.visit_nodes(&mut |node| out.push(node.boundary));
    }

    /// Count nodes, leaves, and stored entries.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.root.visit_nodes(&mut |node| {
            stats.nodes += 1;
            stats.max_depth = stats.max_depth.max(node.depth);
            if node.is_leaf() {
                stats.leaves += 1;
                stats.entries += node.entries().len();
            }
        });
        stats
    }

    pub(crate) fn root(&self) -> &Node<K, T> {
        &self.root
    }

    pub(crate) fn identity_map(&self) -> &HashMap<K, Aabb2D<T>> {
        &self.bounds
    }

    #[cfg(test)]
    pub(crate) fn root_mut(&mut self) -> &mut Node<K, T> {
        &mut self.root
    }
}

impl<K, T> Extend<(K, Aabb2D<T>)> for SpatialIndex<K, T>
where
    K: Clone + Eq + Hash,
    T: Scalar,
{
    fn extend<I: IntoIterator<Item = (K, Aabb2D<T>)>>(&mut self, iter: I) {
        for (id, bounds) in iter {
            self.insert(id, bounds);
        }
    }
}
