//! Links: directed, renderable connections between stages.
//!
//! A link picks its endpoint pivots from the stages' relative positions at
//! construction time and draws a straight line or a one-bend elbow. Runtime
//! activation only toggles the `active` class; the geometry is never re-run.

use crate::canvas::{Canvas, ShapeId};
use crate::flow::StageId;
use crate::geometry::{BBox, Point, Side, pivot};

/// Layout direction of a link.
///
/// Only the horizontal layout is implemented; requesting `Vertical` fails
/// with [`FlowError::VerticalNotImplemented`](crate::error::FlowError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
}

/// A directed edge between two stages of the same flow.
///
/// An active link means the transition along it has already occurred.
#[derive(Debug)]
pub struct Link {
    from: StageId,
    to: StageId,
    direction: Direction,
    is_active: bool,
    line: ShapeId,
}

impl Link {
    pub(crate) fn new(from: StageId, to: StageId, direction: Direction, line: ShapeId) -> Self {
        Self {
            from,
            to,
            direction,
            is_active: false,
            line,
        }
    }

    /// Marks the transition along this link as occurred.
    pub(crate) fn activate<C: Canvas>(&mut self, canvas: &mut C) {
        self.is_active = true;
        canvas.add_class(self.line, "active");
    }

    /// Clears the transition mark.
    pub(crate) fn deactivate<C: Canvas>(&mut self, canvas: &mut C) {
        self.is_active = false;
        canvas.remove_class(self.line, "active");
    }

    pub fn from(&self) -> StageId {
        self.from
    }

    pub fn to(&self) -> StageId {
        self.to
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Picks the endpoint pivots from the stages' relative centres.
///
/// The left stage connects from its right pivot into the other's left pivot
/// (mirrored otherwise). When the vertical centre offset exceeds half the
/// source's height, the source pivot is overridden to the top or bottom so
/// the line leaves towards the other stage.
pub(crate) fn select_pivots(source: &BBox, target: &BBox) -> (Point, Point) {
    let (mut p1, p2) = if source.cx < target.cx {
        (pivot(source, Side::Right), pivot(target, Side::Left))
    } else {
        (pivot(source, Side::Left), pivot(target, Side::Right))
    };
    if (source.cy - target.cy).abs() > source.height / 2.0 {
        p1 = if source.cy < target.cy {
            pivot(source, Side::Bottom)
        } else {
            pivot(source, Side::Top)
        };
    }
    (p1, p2)
}

/// Builds the path: a straight 2-point line when the endpoints share a
/// y-coordinate, otherwise a 3-point elbow bending at `(p1.x, p2.y)`.
pub(crate) fn route(p1: Point, p2: Point) -> Vec<Point> {
    if p1.y == p2.y {
        vec![p1, p2]
    } else {
        vec![p1, Point::new(p1.x, p2.y), p2]
    }
}
