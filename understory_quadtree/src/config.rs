// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subdivision tuning.

/// Default number of entries a leaf may hold before it subdivides.
pub const MAX_ITEMS: usize = 8;

/// Default depth below which leaves may subdivide. The root is at depth 0.
pub const MAX_DEPTH: usize = 8;

/// Thresholds that drive subdivision and collapse.
///
/// A leaf subdivides once it holds more than `max_items` entries and its
/// depth is below `max_depth`. Leaves at `max_depth` grow without bound.
/// An interior node whose children are all leaves collapses back into a leaf
/// once those children hold `max_items` or fewer distinct ids.
///
/// The configuration is fixed for the life of a
/// [`SpatialIndex`][crate::SpatialIndex].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QuadTreeConfig {
    /// Leaf capacity before subdivision.
    pub max_items: usize,
    /// Maximum node depth.
    pub max_depth: usize,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            max_items: MAX_ITEMS,
            max_depth: MAX_DEPTH,
        }
    }
}

impl QuadTreeConfig {
    /// Create a configuration with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the leaf capacity.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
