//! Geometric primitives for axis-aligned rectangles.
//!
//! Answers the questions the node graph builder and the assembler ask about
//! pairs of rectangles: do they touch laterally ([`adjacency`]), do their
//! footprints overlap across layers ([`superposed`]), and how long or large
//! is the contact ([`shared_edge_length`], [`shared_area_3d`]).
//!
//! Coordinates compare with a relative tolerance of `1e-9`, so rectangles
//! produced by subdividing a block line up exactly even when their edges
//! accumulate rounding error.

mod resistance;

use approx::relative_eq;
use thiserror::Error;

pub use resistance::{
    Border, Face, NO_CONDUCTION, edge_resistance, face_resistance, half_resistance_2d,
    half_resistance_3d, resistance, resistance_2d, resistance_3d,
};

pub(crate) const REL_TOLERANCE: f64 = 1e-9;
pub(crate) const ABS_TOLERANCE: f64 = 1e-15;

/// An axis-aligned rectangle in the XY plane.
pub trait Rect {
    fn left_x(&self) -> f64;
    fn bottom_y(&self) -> f64;
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn right_x(&self) -> f64 {
        self.left_x() + self.width()
    }

    fn top_y(&self) -> f64 {
        self.bottom_y() + self.height()
    }

    fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// A bare rectangle, used for bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub left_x: f64,
    pub bottom_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Footprint {
    /// Returns the smallest rectangle enclosing all `rects`.
    ///
    /// Returns `None` if `rects` is empty.
    pub fn bounding<'a, R, I>(rects: I) -> Option<Self>
    where
        R: Rect + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut rects = rects.into_iter();
        let first = rects.next()?;
        let init = (first.left_x(), first.bottom_y(), first.right_x(), first.top_y());

        let (left, bottom, right, top) = rects.fold(init, |(l, b, r, t), rect| {
            (
                l.min(rect.left_x()),
                b.min(rect.bottom_y()),
                r.max(rect.right_x()),
                t.max(rect.top_y()),
            )
        });

        Some(Self {
            left_x: left,
            bottom_y: bottom,
            width: right - left,
            height: top - bottom,
        })
    }
}

impl Rect for Footprint {
    fn left_x(&self) -> f64 {
        self.left_x
    }

    fn bottom_y(&self) -> f64 {
        self.bottom_y
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}

/// Lateral position of one rectangle relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjacency {
    /// The rectangles do not share an edge.
    None,
    /// The first rectangle touches the right edge of the second.
    Right,
    /// The first rectangle touches the left edge of the second.
    Left,
    /// The first rectangle touches the top edge of the second.
    Above,
    /// The first rectangle touches the bottom edge of the second.
    Below,
}

impl Adjacency {
    /// Returns `true` if the shared edge is vertical (neighbors along X).
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }

    /// Returns `true` if the shared edge is horizontal (neighbors along Y).
    #[must_use]
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Above | Self::Below)
    }
}

/// Errors raised when a pairwise quantity is requested for a pair that does
/// not have the required relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("rectangles are not laterally adjacent")]
    NotAdjacent,

    #[error("rectangles are not superposed")]
    NotSuperposed,
}

/// Returns `true` if two coordinates are equal within tolerance.
#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    relative_eq!(a, b, epsilon = ABS_TOLERANCE, max_relative = REL_TOLERANCE)
}

/// Returns where `a` sits relative to `b`.
///
/// Two rectangles are adjacent when an edge of one coincides with the
/// opposite edge of the other and their spans along that edge overlap.
/// Spans are compared as half-open intervals, so rectangles meeting only at a
/// corner are not adjacent.
pub fn adjacency<A: Rect + ?Sized, B: Rect + ?Sized>(a: &A, b: &B) -> Adjacency {
    let y_overlap = spans_touch(a.bottom_y(), a.top_y(), b.bottom_y(), b.top_y());
    let x_overlap = spans_touch(a.left_x(), a.right_x(), b.left_x(), b.right_x());

    if y_overlap && approx_eq(a.left_x(), b.right_x()) {
        Adjacency::Right
    } else if y_overlap && approx_eq(a.right_x(), b.left_x()) {
        Adjacency::Left
    } else if x_overlap && approx_eq(a.bottom_y(), b.top_y()) {
        Adjacency::Above
    } else if x_overlap && approx_eq(a.top_y(), b.bottom_y()) {
        Adjacency::Below
    } else {
        Adjacency::None
    }
}

/// Returns the length of the edge shared by two adjacent rectangles.
///
/// # Errors
///
/// Returns [`GeometryError::NotAdjacent`] if the rectangles do not touch.
pub fn shared_edge_length<A: Rect + ?Sized, B: Rect + ?Sized>(
    a: &A,
    b: &B,
) -> Result<f64, GeometryError> {
    edge_length_for(adjacency(a, b), a, b)
}

pub(crate) fn edge_length_for<A: Rect + ?Sized, B: Rect + ?Sized>(
    relation: Adjacency,
    a: &A,
    b: &B,
) -> Result<f64, GeometryError> {
    if relation.is_horizontal() {
        Ok(overlap_length(a.bottom_y(), a.top_y(), b.bottom_y(), b.top_y()))
    } else if relation.is_vertical() {
        Ok(overlap_length(a.left_x(), a.right_x(), b.left_x(), b.right_x()))
    } else {
        Err(GeometryError::NotAdjacent)
    }
}

/// Returns `true` if the footprints of `a` and `b` overlap with positive area.
///
/// Layers are not considered; callers must check that the rectangles sit on
/// adjacent layers.
pub fn superposed<A: Rect + ?Sized, B: Rect + ?Sized>(a: &A, b: &B) -> bool {
    spans_cross(a.bottom_y(), a.top_y(), b.bottom_y(), b.top_y())
        && spans_cross(a.left_x(), a.right_x(), b.left_x(), b.right_x())
}

/// Returns the area of the overlap between two superposed footprints.
///
/// # Errors
///
/// Returns [`GeometryError::NotSuperposed`] if the footprints do not overlap.
pub fn shared_area_3d<A: Rect + ?Sized, B: Rect + ?Sized>(
    a: &A,
    b: &B,
) -> Result<f64, GeometryError> {
    if !superposed(a, b) {
        return Err(GeometryError::NotSuperposed);
    }
    let x = overlap_length(a.left_x(), a.right_x(), b.left_x(), b.right_x());
    let y = overlap_length(a.bottom_y(), a.top_y(), b.bottom_y(), b.top_y());
    Ok(x * y)
}

/// Returns `true` if `x` lies in `[lo, hi)`, tolerantly.
fn starts_within(lo: f64, hi: f64, x: f64) -> bool {
    (x >= lo || approx_eq(x, lo)) && x < hi && !approx_eq(x, hi)
}

/// Half-open overlap test used for lateral adjacency.
fn spans_touch(a_lo: f64, a_hi: f64, b_lo: f64, b_hi: f64) -> bool {
    starts_within(a_lo, a_hi, b_lo) || starts_within(b_lo, b_hi, a_lo)
}

/// Strict overlap test used for superposition: touching spans do not cross.
fn spans_cross(a_lo: f64, a_hi: f64, b_lo: f64, b_hi: f64) -> bool {
    let apart = a_lo >= b_hi || approx_eq(a_lo, b_hi) || b_lo >= a_hi || approx_eq(b_lo, a_hi);
    !apart
}

fn overlap_length(a_lo: f64, a_hi: f64, b_lo: f64, b_hi: f64) -> f64 {
    (a_hi.min(b_hi) - a_lo.max(b_lo)).max(0.0)
}
