// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas editor plumbing: broad-phase selection with `understory_quadtree`.
//!
//! This example shows how a canvas editor would:
//! - keep the index in sync with its objects as they are added and dragged,
//! - run marquee selection and click hit testing against the index,
//! - refine click hits with exact `kurbo` geometry,
//! - restore an undo snapshot with a single bulk rebuild.
//!
//! Run:
//! - `cargo run -p understory_quadtree_demos --example canvas_selection`
//! - `RUST_LOG=understory_quadtree=trace` to watch subdivisions and collapses.

use std::collections::HashMap;

use kurbo::{Circle, Point, Rect, Shape as _, Vec2};
use tracing_subscriber::EnvFilter;
use understory_quadtree::{Aabb2D, SpatialIndex};

/// Geometry for one canvas object.
#[derive(Clone, Copy, Debug)]
enum Shape {
    Rect(Rect),
    Circle(Circle),
}

impl Shape {
    fn bounds(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::Circle(c) => c.bounding_box(),
        }
    }

    fn contains(&self, pt: Point) -> bool {
        match self {
            Self::Rect(r) => r.contains(pt),
            Self::Circle(c) => c.contains(pt),
        }
    }

    fn translated(&self, delta: Vec2) -> Self {
        match self {
            Self::Rect(r) => Self::Rect(*r + delta),
            Self::Circle(c) => Self::Circle(Circle::new(c.center + delta, c.radius)),
        }
    }
}

/// Objects plus the index that mirrors their bounds.
struct Canvas {
    objects: HashMap<String, Shape>,
    index: SpatialIndex<String>,
}

impl Canvas {
    fn new(size: Rect) -> Self {
        Self {
            objects: HashMap::new(),
            index: SpatialIndex::new(size.into()),
        }
    }

    fn add(&mut self, id: &str, shape: Shape) {
        self.objects.insert(id.to_owned(), shape);
        self.index.insert(id.to_owned(), shape.bounds().into());
    }

    fn drag(&mut self, id: &str, delta: Vec2) {
        let Some(shape) = self.objects.get_mut(id) else {
            return;
        };
        *shape = shape.translated(delta);
        self.index.insert(id.to_owned(), shape.bounds().into());
    }

    fn delete(&mut self, id: &str) {
        self.objects.remove(id);
        self.index.remove(id);
    }

    /// Ids whose bounds touch the marquee, sorted for stable output.
    fn marquee(&self, area: Rect) -> Vec<String> {
        let mut ids: Vec<_> = self.index.query_rect(area.into()).into_iter().collect();
        ids.sort();
        ids
    }

    /// Broad phase through the index, narrow phase on the exact shape.
    fn hit(&self, pt: Point) -> Vec<String> {
        let mut ids = Vec::new();
        self.index.visit_point(pt.x, pt.y, |id| {
            if self.objects.get(id).is_some_and(|s| s.contains(pt)) {
                ids.push(id.clone());
            }
        });
        ids.sort();
        ids
    }

    fn snapshot(&self) -> HashMap<String, Shape> {
        self.objects.clone()
    }

    fn restore(&mut self, snapshot: HashMap<String, Shape>) {
        self.index.rebuild(
            snapshot
                .iter()
                .map(|(id, shape)| (id.clone(), Aabb2D::from(shape.bounds()))),
        );
        self.objects = snapshot;
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut canvas = Canvas::new(Rect::new(0.0, 0.0, 4000.0, 3000.0));
    canvas.add("frame", Shape::Rect(Rect::new(10.0, 20.0, 110.0, 70.0)));
    canvas.add("dot", Shape::Circle(Circle::new((300.0, 300.0), 40.0)));
    for i in 0..12 {
        let x = 1000.0 + f64::from(i) * 30.0;
        canvas.add(
            &format!("tile-{i}"),
            Shape::Rect(Rect::new(x, 1000.0, x + 20.0, 1020.0)),
        );
    }
    println!("index after setup: {:?}", canvas.index.stats());

    let area = Rect::new(0.0, 0.0, 200.0, 200.0);
    println!("marquee {area:?}: {:?}", canvas.marquee(area));

    // The circle's bounding box contains this corner point, the circle does not.
    let corner = Point::new(265.0, 265.0);
    println!(
        "hit {corner:?}: bounds say {:?}, geometry says {:?}",
        canvas.index.query_point(corner.x, corner.y),
        canvas.hit(corner)
    );

    let before = canvas.snapshot();
    canvas.drag("frame", Vec2::new(900.0, 0.0));
    canvas.delete("tile-0");
    println!("marquee after drag: {:?}", canvas.marquee(area));
    println!("hit (950, 40): {:?}", canvas.hit(Point::new(950.0, 40.0)));

    let mut overlay = Vec::new();
    canvas.index.node_boundaries(&mut overlay);
    println!("debug overlay: {} node outlines", overlay.len());

    canvas.restore(before);
    println!("marquee after undo: {:?}", canvas.marquee(area));
    println!("index after undo: {:?}", canvas.index.stats());
    if let Err(err) = canvas.index.check_invariants() {
        eprintln!("index is inconsistent: {err}");
    }
}
