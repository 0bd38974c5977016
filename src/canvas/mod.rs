//! The rendering collaborator.
//!
//! The core never talks to a concrete drawing surface; it goes through the
//! [`Canvas`] trait, which covers exactly the primitives the layout needs:
//! grouping, basic shapes, positioning, bounding-box queries, CSS-like class
//! toggling and element removal. [`SvgCanvas`] is the crate's own
//! implementation, producing a standalone SVG document.

mod svg;

pub use svg::SvgCanvas;

use crate::geometry::{BBox, Point};

/// Opaque handle to an element created on a [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub(crate) usize);

/// A 2D vector-drawing surface.
///
/// All mutations are immediate; there is no batching. Coordinates passed to
/// child shapes are local to their parent group.
pub trait Canvas {
    /// The top-level container every free-standing element attaches to.
    fn root(&self) -> ShapeId;

    /// Creates an empty group under `parent`.
    fn group(&mut self, parent: ShapeId) -> ShapeId;

    /// Creates a rectangle with its top-left corner at the parent origin.
    fn rect(&mut self, parent: ShapeId, width: f64, height: f64) -> ShapeId;

    /// Creates an image element. Its centre starts at the parent origin.
    fn image(&mut self, parent: ShapeId, href: &str, width: f64, height: f64) -> ShapeId;

    /// Creates a text element. Its centre starts at the parent origin.
    fn text(&mut self, parent: ShapeId, content: &str) -> ShapeId;

    /// Creates a polyline from absolute points, optionally with an
    /// arrowhead marker at the final point.
    fn polyline(&mut self, parent: ShapeId, points: &[Point], arrow_end: bool) -> ShapeId;

    /// Moves the element so its bounding-box centre lands on `center`.
    fn set_center(&mut self, shape: ShapeId, center: Point);

    /// The element's current bounding-box centre.
    fn center(&self, shape: ShapeId) -> Point {
        self.bbox(shape).center()
    }

    /// The element's bounding box in its parent's coordinate space.
    fn bbox(&self, shape: ShapeId) -> BBox;

    fn add_class(&mut self, shape: ShapeId, class: &str);

    fn remove_class(&mut self, shape: ShapeId, class: &str);

    /// Removes the element (and its children) from the surface.
    fn remove(&mut self, shape: ShapeId);
}
