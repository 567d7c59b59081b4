// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
///
/// Edges are inclusive: a box with zero width or height is a valid segment or
/// point, and boxes that merely touch are considered to overlap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB contains the point, borders included.
    #[inline]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        self.min_x <= x && self.min_y <= y && x <= self.max_x && y <= self.max_y
    }

    /// Determines whether this AABB overlaps with another in any way.
    ///
    /// Note that the edge of the AABB is considered to be part of itself, meaning
    /// that two AABBs that share an edge are considered to overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use understory_quadtree::Aabb2D;
    ///
    /// let a = Aabb2D::from_xywh(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.overlaps(&Aabb2D::from_xywh(5.0, 5.0, 10.0, 10.0)));
    ///
    /// // Shared edge.
    /// assert!(a.overlaps(&Aabb2D::from_xywh(10.0, 0.0, 10.0, 10.0)));
    ///
    /// // Zero-sized boxes still count.
    /// assert!(a.overlaps(&Aabb2D::from_xywh(10.0, 10.0, 0.0, 0.0)));
    ///
    /// assert!(!a.overlaps(&Aabb2D::from_xywh(11.0, 0.0, 10.0, 10.0)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create an AABB from an origin and a size.
    ///
    /// Negative sizes are not rejected; the resulting box is inverted and only
    /// overlaps what the min/max comparisons say it does.
    #[inline]
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: T::add(x, w),
            max_y: T::add(y, h),
        }
    }

    /// Extent along the x axis.
    #[inline]
    pub fn width(&self) -> T {
        T::sub(self.max_x, self.min_x)
    }

    /// Extent along the y axis.
    #[inline]
    pub fn height(&self) -> T {
        T::sub(self.max_y, self.min_y)
    }

    /// Split into four quadrants of half width and half height.
    ///
    /// The order is NW, NE, SW, SE (with y growing downwards). Adjacent
    /// quadrants share their edges, so together they cover `self` under the
    /// closed-interval overlap rule.
    #[inline]
    pub fn quadrants(&self) -> [Self; 4] {
        let mid_x = T::mid(self.min_x, self.max_x);
        let mid_y = T::mid(self.min_y, self.max_y);
        [
            Self::new(self.min_x, self.min_y, mid_x, mid_y),
            Self::new(mid_x, self.min_y, self.max_x, mid_y),
            Self::new(self.min_x, mid_y, mid_x, self.max_y),
            Self::new(mid_x, mid_y, self.max_x, self.max_y),
        ]
    }
}

/// Numeric scalar abstraction for 2D AABBs.
///
/// This is the minimal arithmetic the quadtree needs: building boxes from
/// origin and size, and halving a box along each axis.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Midpoint between a and b (used to split nodes into quadrants).
    fn mid(a: Self, b: Self) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        a + 0.5 * (b - a)
    }
}

impl Scalar for f64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        a + 0.5 * (b - a)
    }
}

impl Scalar for i64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        // Average without overflow: (a & b) + ((a ^ b) >> 1)
        (a & b) + ((a ^ b) >> 1)
    }
}

#[cfg(feature = "kurbo")]
impl From<kurbo::Rect> for Aabb2D<f64> {
    #[inline]
    fn from(r: kurbo::Rect) -> Self {
        Self::new(r.x0, r.y0, r.x1, r.y1)
    }
}

#[cfg(feature = "kurbo")]
impl From<Aabb2D<f64>> for kurbo::Rect {
    #[inline]
    fn from(a: Aabb2D<f64>) -> Self {
        Self::new(a.min_x, a.min_y, a.max_x, a.max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2D;

    #[test]
    fn from_xywh_matches_corners() {
        let a = Aabb2D::<f64>::from_xywh(10.0, 20.0, 100.0, 50.0);
        assert_eq!(a, Aabb2D::new(10.0, 20.0, 110.0, 70.0));
        assert_eq!(a.width(), 100.0);
        assert_eq!(a.height(), 50.0);
    }

    #[test]
    fn quadrants_split_in_half() {
        let world = Aabb2D::<f64>::from_xywh(0.0, 0.0, 4000.0, 3000.0);
        let [nw, ne, sw, se] = world.quadrants();
        assert_eq!(nw, Aabb2D::new(0.0, 0.0, 2000.0, 1500.0));
        assert_eq!(ne, Aabb2D::new(2000.0, 0.0, 4000.0, 1500.0));
        assert_eq!(sw, Aabb2D::new(0.0, 1500.0, 2000.0, 3000.0));
        assert_eq!(se, Aabb2D::new(2000.0, 1500.0, 4000.0, 3000.0));
    }

    #[test]
    fn integer_quadrants_cover_parent() {
        let parent = Aabb2D::<i64>::new(-7, -3, 4, 8);
        let quads = parent.quadrants();
        for (x, y) in [(-7, -3), (4, 8), (-2, 2), (-1, 3), (4, -3), (-7, 8)] {
            assert!(
                quads.iter().any(|q| q.contains_point(x, y)),
                "({x}, {y}) not covered"
            );
        }
    }

    #[test]
    fn zero_sized_boxes_overlap_on_edges() {
        let line = Aabb2D::<f64>::from_xywh(5.0, 0.0, 0.0, 10.0);
        let dot = Aabb2D::<f64>::from_xywh(5.0, 10.0, 0.0, 0.0);
        assert!(line.overlaps(&dot));
        assert!(dot.overlaps(&line));
        assert!(dot.contains_point(5.0, 10.0));
        assert!(!dot.contains_point(5.0, 10.5));
    }

    #[test]
    fn point_on_border_is_contained() {
        let a = Aabb2D::<i64>::from_xywh(0, 0, 10, 10);
        assert!(a.contains_point(0, 0));
        assert!(a.contains_point(10, 10));
        assert!(a.contains_point(10, 3));
        assert!(!a.contains_point(11, 3));
    }
}
