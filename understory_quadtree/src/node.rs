// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recursive quadrant partition backing [`SpatialIndex`][crate::SpatialIndex].
//!
//! A node is either a leaf holding entries or an interior node owning exactly
//! four children. Entries whose bounds straddle a split line are stored once in
//! every child they overlap; deduplication happens on the query side.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::mem;

use smallvec::SmallVec;

use crate::config::QuadTreeConfig;
use crate::types::{Aabb2D, Scalar};
use crate::util::event;

/// One (id, bounds) pairing stored in a leaf.
#[derive(Clone, Debug)]
pub(crate) struct Entry<K, T> {
    pub(crate) id: K,
    pub(crate) bounds: Aabb2D<T>,
}

impl<K, T> Entry<K, T> {
    #[inline]
    fn is<Q>(&self, id: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        <K as Borrow<Q>>::borrow(&self.id) == id
    }
}

/// Leaf storage; sized so a leaf at capacity stays inline.
pub(crate) type Entries<K, T> = SmallVec<[Entry<K, T>; 8]>;

#[derive(Clone, Debug)]
pub(crate) enum NodeKind<K, T> {
    Leaf(Entries<K, T>),
    Interior(Box<[Node<K, T>; 4]>),
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, T> {
    pub(crate) boundary: Aabb2D<T>,
    pub(crate) depth: usize,
    pub(crate) kind: NodeKind<K, T>,
}

impl<K: Clone + Eq, T: Scalar> Node<K, T> {
    /// An empty leaf covering `boundary`.
    pub(crate) fn leaf(boundary: Aabb2D<T>, depth: usize) -> Self {
        Self {
            boundary,
            depth,
            kind: NodeKind::Leaf(Entries::new()),
        }
    }

    /// Build a subtree top-down from entries already known to overlap `boundary`.
    ///
    /// A node ends up interior exactly when more than `max_items` entries
    /// overlap it and it sits above `max_depth`, which is the shape repeated
    /// [`insert`][Self::insert] calls converge to for the same entries.
    pub(crate) fn build(
        boundary: Aabb2D<T>,
        depth: usize,
        entries: Vec<Entry<K, T>>,
        config: &QuadTreeConfig,
    ) -> Self {
        if entries.len() <= config.max_items || depth >= config.max_depth {
            return Self {
                boundary,
                depth,
                kind: NodeKind::Leaf(SmallVec::from_vec(entries)),
            };
        }

        let quadrants = boundary.quadrants();
        let mut buckets: [Vec<Entry<K, T>>; 4] = core::array::from_fn(|_| Vec::new());
        for entry in entries {
            let mut hits = overlapping(&quadrants, &entry.bounds);
            if let Some(last) = hits.pop() {
                for &i in &hits {
                    buckets[i].push(entry.clone());
                }
                buckets[last].push(entry);
            }
        }

        let [nw, ne, sw, se] = buckets;
        let [q_nw, q_ne, q_sw, q_se] = quadrants;
        let depth_next = depth + 1;
        Self {
            boundary,
            depth,
            kind: NodeKind::Interior(Box::new([
                Self::build(q_nw, depth_next, nw, config),
                Self::build(q_ne, depth_next, ne, config),
                Self::build(q_sw, depth_next, sw, config),
                Self::build(q_se, depth_next, se, config),
            ])),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Entries held directly by this node; always empty for interior nodes.
    #[inline]
    pub(crate) fn entries(&self) -> &[Entry<K, T>] {
        match &self.kind {
            NodeKind::Leaf(entries) => entries.as_slice(),
            NodeKind::Interior(_) => &[],
        }
    }

    #[inline]
    pub(crate) fn children(&self) -> Option<&[Self; 4]> {
        match &self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Interior(children) => Some(&**children),
        }
    }

    /// Store `entry` in every leaf of this subtree whose boundary it overlaps.
    pub(crate) fn insert(&mut self, entry: Entry<K, T>, config: &QuadTreeConfig) {
        if !self.boundary.overlaps(&entry.bounds) {
            return;
        }
        match &mut self.kind {
            NodeKind::Interior(children) => forward(children, entry, config),
            NodeKind::Leaf(entries) => {
                entries.push(entry);
                if entries.len() > config.max_items && self.depth < config.max_depth {
                    self.subdivide(config);
                }
            }
        }
    }

    fn subdivide(&mut self, config: &QuadTreeConfig) {
        let NodeKind::Leaf(entries) = &mut self.kind else {
            return;
        };
        let entries = mem::take(entries);
        event!(
            trace,
            depth = self.depth,
            entries = entries.len(),
            "subdividing quadtree leaf"
        );

        let depth = self.depth + 1;
        let mut children = Box::new(self.boundary.quadrants().map(|q| Self::leaf(q, depth)));
        for entry in entries {
            forward(&mut children, entry, config);
        }
        self.kind = NodeKind::Interior(children);
    }

    /// Remove every entry for `id` from leaves overlapping `bounds`.
    ///
    /// `bounds` must be the bounds the id was inserted with; leaves that do not
    /// overlap them cannot hold an entry for it and are skipped. Returns whether
    /// anything was removed, in which case interior nodes on the way back up
    /// try to collapse.
    pub(crate) fn remove<Q>(&mut self, id: &Q, bounds: &Aabb2D<T>, config: &QuadTreeConfig) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if !self.boundary.overlaps(bounds) {
            return false;
        }
        match &mut self.kind {
            NodeKind::Leaf(entries) => {
                let before = entries.len();
                entries.retain(|e| !e.is(id));
                entries.len() != before
            }
            NodeKind::Interior(children) => {
                let mut removed = false;
                for child in children.iter_mut() {
                    removed |= child.remove(id, bounds, config);
                }
                if removed {
                    self.try_collapse(config);
                }
                removed
            }
        }
    }

    /// Merge four leaf children back into this node if few enough distinct ids remain.
    fn try_collapse(&mut self, config: &QuadTreeConfig) {
        let NodeKind::Interior(children) = &mut self.kind else {
            return;
        };
        if !fits_in_leaf(children, config.max_items) {
            return;
        }

        let mut merged = Entries::new();
        for child in children.iter_mut() {
            if let NodeKind::Leaf(entries) = &mut child.kind {
                for entry in entries.drain(..) {
                    if !merged.iter().any(|m: &Entry<K, T>| m.id == entry.id) {
                        merged.push(entry);
                    }
                }
            }
        }
        event!(
            trace,
            depth = self.depth,
            entries = merged.len(),
            "collapsing quadtree node"
        );
        self.kind = NodeKind::Leaf(merged);
    }

    /// Call `f` for every leaf entry whose bounds overlap `rect`.
    ///
    /// Ids spanning several leaves are reported once per leaf.
    pub(crate) fn visit_rect<'a, F: FnMut(&'a Entry<K, T>)>(&'a self, rect: &Aabb2D<T>, f: &mut F) {
        if !self.boundary.overlaps(rect) {
            return;
        }
        match &self.kind {
            NodeKind::Leaf(entries) => {
                for entry in entries {
                    if entry.bounds.overlaps(rect) {
                        f(entry);
                    }
                }
            }
            NodeKind::Interior(children) => {
                for child in children.iter() {
                    child.visit_rect(rect, f);
                }
            }
        }
    }

    /// Call `f` for every leaf entry whose bounds contain the point.
    pub(crate) fn visit_point<'a, F: FnMut(&'a Entry<K, T>)>(&'a self, x: T, y: T, f: &mut F) {
        if !self.boundary.contains_point(x, y) {
            return;
        }
        match &self.kind {
            NodeKind::Leaf(entries) => {
                for entry in entries {
                    if entry.bounds.contains_point(x, y) {
                        f(entry);
                    }
                }
            }
            NodeKind::Interior(children) => {
                for child in children.iter() {
                    child.visit_point(x, y, f);
                }
            }
        }
    }

    /// Pre-order walk over this node and all of its descendants.
    pub(crate) fn visit_nodes<'a, F: FnMut(&'a Self)>(&'a self, f: &mut F) {
        f(self);
        if let Some(children) = self.children() {
            for child in children {
                child.visit_nodes(f);
            }
        }
    }

    /// Number of leaves in this subtree whose boundary overlaps `bounds`.
    pub(crate) fn count_overlapping_leaves(&self, bounds: &Aabb2D<T>) -> usize {
        if !self.boundary.overlaps(bounds) {
            return 0;
        }
        match self.children() {
            None => 1,
            Some(children) => children
                .iter()
                .map(|c| c.count_overlapping_leaves(bounds))
                .sum(),
        }
    }
}

/// Hand `entry` to every child it overlaps, cloning for all but the last.
fn forward<K: Clone + Eq, T: Scalar>(
    children: &mut [Node<K, T>; 4],
    entry: Entry<K, T>,
    config: &QuadTreeConfig,
) {
    let boundaries = children.each_ref().map(|c| c.boundary);
    let mut hits = overlapping(&boundaries, &entry.bounds);
    let Some(last) = hits.pop() else {
        return;
    };
    for &i in &hits {
        children[i].insert(entry.clone(), config);
    }
    children[last].insert(entry, config);
}

/// Whether `children` are all leaves holding at most `max_items` distinct ids between them.
fn fits_in_leaf<K: Eq, T>(children: &[Node<K, T>; 4], max_items: usize) -> bool {
    let mut distinct: SmallVec<[&K; 8]> = SmallVec::new();
    for child in children {
        let NodeKind::Leaf(entries) = &child.kind else {
            return false;
        };
        for entry in entries {
            if !distinct.contains(&&entry.id) {
                if distinct.len() == max_items {
                    return false;
                }
                distinct.push(&entry.id);
            }
        }
    }
    true
}

/// Indices of the quadrants overlapping `bounds`, in NW, NE, SW, SE order.
fn overlapping<T: Scalar>(quadrants: &[Aabb2D<T>; 4], bounds: &Aabb2D<T>) -> SmallVec<[usize; 4]> {
    (0..4).filter(|&i| quadrants[i].overlaps(bounds)).collect()
}
