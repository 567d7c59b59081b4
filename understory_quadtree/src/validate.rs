// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural self-check for [`SpatialIndex`].

use core::fmt;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::index::SpatialIndex;
use crate::node::Node;
use crate::types::Scalar;

/// A broken structural invariant, reported by [`SpatialIndex::check_invariants`].
///
/// Every variant carries the depth of the offending node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantError {
    /// The root does not cover the world boundary at depth 0.
    RootMismatch,
    /// A child's depth or boundary is not the matching quadrant of its parent.
    BadChild {
        /// Depth of the parent node.
        depth: usize,
    },
    /// A node sits deeper than the configured maximum.
    TooDeep {
        /// Depth of the node.
        depth: usize,
        /// Configured maximum depth.
        max_depth: usize,
    },
    /// A leaf above the maximum depth holds more entries than it may.
    OverfullLeaf {
        /// Depth of the leaf.
        depth: usize,
        /// Number of entries in the leaf.
        len: usize,
        /// Configured leaf capacity.
        max_items: usize,
    },
    /// An interior node with only leaf children that should have collapsed.
    CollapsibleInterior {
        /// Depth of the interior node.
        depth: usize,
        /// Distinct ids held by its children.
        distinct: usize,
    },
    /// A leaf entry whose id is not in the identity map.
    UnknownEntry {
        /// Depth of the leaf.
        depth: usize,
    },
    /// A leaf entry whose bounds differ from the identity map.
    StaleEntry {
        /// Depth of the leaf.
        depth: usize,
    },
    /// A leaf holding an entry whose bounds do not overlap its boundary.
    MisplacedEntry {
        /// Depth of the leaf.
        depth: usize,
    },
    /// A leaf holding the same id more than once.
    DuplicateEntry {
        /// Depth of the leaf.
        depth: usize,
    },
    /// An id missing from at least one leaf its bounds overlap.
    MissingEntry {
        /// Leaves the id's bounds overlap.
        expected: usize,
        /// Leaves that actually hold the id.
        found: usize,
    },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootMismatch => write!(f, "root node does not cover the world at depth 0"),
            Self::BadChild { depth } => {
                write!(f, "children of node at depth {depth} are not its quadrants")
            }
            Self::TooDeep { depth, max_depth } => {
                write!(f, "node at depth {depth} exceeds max depth {max_depth}")
            }
            Self::OverfullLeaf {
                depth,
                len,
                max_items,
            } => write!(
                f,
                "leaf at depth {depth} holds {len} entries (max {max_items})"
            ),
            Self::CollapsibleInterior { depth, distinct } => write!(
                f,
                "interior node at depth {depth} has only {distinct} distinct ids below it"
            ),
            Self::UnknownEntry { depth } => {
                write!(f, "leaf at depth {depth} holds an id not in the index")
            }
            Self::StaleEntry { depth } => {
                write!(f, "leaf at depth {depth} holds stale bounds for an id")
            }
            Self::MisplacedEntry { depth } => {
                write!(f, "leaf at depth {depth} holds an entry outside its boundary")
            }
            Self::DuplicateEntry { depth } => {
                write!(f, "leaf at depth {depth} holds the same id twice")
            }
            Self::MissingEntry { expected, found } => write!(
                f,
                "id overlaps {expected} leaves but is stored in {found}"
            ),
        }
    }
}

impl core::error::Error for InvariantError {}

impl<K, T> SpatialIndex<K, T>
where
    K: Clone + Eq + Hash,
    T: Scalar,
{
    /// Walk the whole tree and verify its structural invariants.
    ///
    /// - Every present id is stored exactly once in each leaf its bounds
    ///   overlap, with its current bounds, and in no other leaf.
    /// - Leaves above the maximum depth hold at most `max_items` entries.
    /// - No node is deeper than `max_depth`, and children are the exact
    ///   quadrants of their parent.
    /// - No interior node with only leaf children could have collapsed.
    ///
    /// This visits every entry and is meant for tests and debugging, not hot paths.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let root = self.root();
        if root.depth != 0 || root.boundary != self.world() {
            return Err(InvariantError::RootMismatch);
        }

        let mut stored: HashMap<&K, usize> = HashMap::new();
        let mut result = Ok(());
        root.visit_nodes(&mut |node| {
            if result.is_ok() {
                result = self.check_node(node, &mut stored);
            }
        });
        result?;

        for (id, bounds) in self.identity_map() {
            let expected = root.count_overlapping_leaves(bounds);
            let found = stored.get(id).copied().unwrap_or(0);
            if expected != found {
                return Err(InvariantError::MissingEntry { expected, found });
            }
        }
        Ok(())
    }

    fn check_node<'a>(
        &self,
        node: &'a Node<K, T>,
        stored: &mut HashMap<&'a K, usize>,
    ) -> Result<(), InvariantError> {
        let config = self.config();
        let depth = node.depth;
        if depth > config.max_depth {
            return Err(InvariantError::TooDeep {
                depth,
                max_depth: config.max_depth,
            });
        }

        if let Some(children) = node.children() {
            let quadrants = node.boundary.quadrants();
            for (child, quadrant) in children.iter().zip(quadrants) {
                if child.depth != depth + 1 || child.boundary != quadrant {
                    return Err(InvariantError::BadChild { depth });
                }
            }
            if children.iter().all(|c| c.is_leaf()) {
                let distinct: HashSet<&K> = children
                    .iter()
                    .flat_map(|c| c.entries())
                    .map(|e| &e.id)
                    .collect();
                if distinct.len() <= config.max_items {
                    return Err(InvariantError::CollapsibleInterior {
                        depth,
                        distinct: distinct.len(),
                    });
                }
            }
            return Ok(());
        }

        let entries = node.entries();
        if entries.len() > config.max_items && depth < config.max_depth {
            return Err(InvariantError::OverfullLeaf {
                depth,
                len: entries.len(),
                max_items: config.max_items,
            });
        }
        for (i, entry) in entries.iter().enumerate() {
            match self.identity_map().get(&entry.id) {
                None => return Err(InvariantError::UnknownEntry { depth }),
                Some(bounds) if *bounds != entry.bounds => {
                    return Err(InvariantError::StaleEntry { depth });
                }
                Some(_) => {}
            }
            if !node.boundary.overlaps(&entry.bounds) {
                return Err(InvariantError::MisplacedEntry { depth });
            }
            if entries[..i].iter().any(|e| e.id == entry.id) {
                return Err(InvariantError::DuplicateEntry { depth });
            }
            *stored.entry(&entry.id).or_insert(0) += 1;
        }
        Ok(())
    }
}
