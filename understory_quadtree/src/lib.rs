// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Quadtree: an adaptive 2D spatial index for canvas objects.
//!
//! Understory Quadtree answers "which objects intersect this rectangle" and
//! "which objects lie under this point" for a canvas editor that moves,
//! adds, and deletes objects interactively.
//!
//! - Insert, move, and remove axis-aligned bounding boxes keyed by caller-owned ids.
//! - Query by point or intersecting rectangle; every id is reported at most once.
//! - Rebuild the whole index in one pass, for example after an undo restores a snapshot.
//!
//! The index pairs an identity map (`id → bounds`, the source of truth for
//! membership) with a quadtree over a fixed world boundary. Leaves subdivide
//! into four quadrants once they hold more than [`MAX_ITEMS`] entries, down to
//! [`MAX_DEPTH`], and collapse back when removals leave them sparse. Both
//! thresholds can be tuned per index with [`QuadTreeConfig`].
//!
//! An object that straddles a split line is stored in every leaf it overlaps.
//! Query results are deduplicated, so callers never see the same id twice.
//!
//! It is generic over the id type `K` and the scalar type `T` (`f64` by
//! default, also `f32` and `i64`) and does not depend on any geometry crate.
//!
//! ## Features
//!
//! - `kurbo`: `From` conversions between `kurbo::Rect` and `Aabb2D<f64>`.
//! - `tracing`: emit `tracing` events for subdivision, collapse, clear, and rebuild.
//! - `std` / `libm`: forwarded to optional dependencies that support them.
//!
//! # Example
//!
//! ```rust
//! use understory_quadtree::{Aabb2D, SpatialIndex};
//!
//! let mut idx = SpatialIndex::new(Aabb2D::from_xywh(0.0, 0.0, 4000.0, 3000.0));
//! idx.insert(String::from("obj-1"), Aabb2D::from_xywh(10.0, 20.0, 100.0, 50.0));
//!
//! // Marquee selection.
//! let hits = idx.query_rect(Aabb2D::from_xywh(0.0, 0.0, 200.0, 200.0));
//! assert!(hits.contains("obj-1"));
//! assert!(idx.query_rect(Aabb2D::from_xywh(500.0, 500.0, 10.0, 10.0)).is_empty());
//!
//! // Hit testing.
//! assert!(idx.query_point(60.0, 45.0).contains("obj-1"));
//!
//! // Lookups accept borrowed ids.
//! assert_eq!(
//!     idx.bounds("obj-1"),
//!     Some(Aabb2D::from_xywh(10.0, 20.0, 100.0, 50.0))
//! );
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Edges are
//! closed: boxes that only touch still overlap, and zero-sized boxes are
//! valid.

#![no_std]

extern crate alloc;

mod config;
mod index;
mod node;
mod types;
pub(crate) mod util;
mod validate;

pub use config::{MAX_DEPTH, MAX_ITEMS, QuadTreeConfig};
pub use index::{SpatialIndex, TreeStats};
pub use types::{Aabb2D, Scalar};
pub use validate::InvariantError;
