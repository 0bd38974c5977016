use std::fmt::Write;

use crate::canvas::{Canvas, ShapeId};
use crate::geometry::{BBox, Point};

// Fixed-metric text estimate; layout only ever consumes the centre.
const CHAR_WIDTH: f64 = 8.0;
const TEXT_HEIGHT: f64 = 16.0;

const ARROW_MARKER_ID: &str = "arrowhead";
const ARROW_MARKER_PATH: &str = "M 0 1 L 10 5 L 0 9 z";

/// An in-memory SVG surface.
///
/// Elements live in an arena; removal tombstones the slot so handles held by
/// the flow stay stable. [`SvgCanvas::to_svg`] serializes the live tree into
/// a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: String,
    height: f64,
    elements: Vec<Element>,
}

#[derive(Debug, Clone)]
struct Element {
    kind: ElementKind,
    children: Vec<usize>,
    classes: Vec<String>,
    removed: bool,
}

#[derive(Debug, Clone)]
enum ElementKind {
    Root,
    Group { tx: f64, ty: f64 },
    Rect { center: Point, width: f64, height: f64 },
    Image { href: String, center: Point, width: f64, height: f64 },
    Text { content: String, center: Point },
    Polyline { points: Vec<Point>, arrow_end: bool },
}

impl SvgCanvas {
    /// Creates an empty surface. `width` is an SVG length (`"100%"`,
    /// `"640"`, ...); `height` is in user units.
    pub fn new(width: impl Into<String>, height: f64) -> Self {
        Self {
            width: width.into(),
            height,
            elements: vec![Element {
                kind: ElementKind::Root,
                children: Vec::new(),
                classes: Vec::new(),
                removed: false,
            }],
        }
    }

    fn push(&mut self, parent: ShapeId, kind: ElementKind) -> ShapeId {
        let index = self.elements.len();
        self.elements.push(Element {
            kind,
            children: Vec::new(),
            classes: Vec::new(),
            removed: false,
        });
        self.elements[parent.0].children.push(index);
        ShapeId(index)
    }

    /// Bounding box of an element in its parent's coordinate space.
    fn element_bbox(&self, index: usize) -> BBox {
        let element = &self.elements[index];
        match &element.kind {
            ElementKind::Root => self.children_bbox(index).unwrap_or_default(),
            ElementKind::Group { tx, ty } => self
                .children_bbox(index)
                .unwrap_or_default()
                .translated(*tx, *ty),
            ElementKind::Rect { center, width, height } => {
                BBox::new(center.x, center.y, *width, *height)
            }
            ElementKind::Image { center, width, height, .. } => {
                BBox::new(center.x, center.y, *width, *height)
            }
            ElementKind::Text { content, center } => BBox::new(
                center.x,
                center.y,
                content.chars().count() as f64 * CHAR_WIDTH,
                TEXT_HEIGHT,
            ),
            ElementKind::Polyline { points, .. } => {
                let mut min = Point::new(f64::INFINITY, f64::INFINITY);
                let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
                for p in points {
                    min = Point::new(min.x.min(p.x), min.y.min(p.y));
                    max = Point::new(max.x.max(p.x), max.y.max(p.y));
                }
                if points.is_empty() {
                    BBox::default()
                } else {
                    BBox::from_corners(min, max)
                }
            }
        }
    }

    fn children_bbox(&self, index: usize) -> Option<BBox> {
        self.elements[index]
            .children
            .iter()
            .filter(|&&child| !self.elements[child].removed)
            .map(|&child| self.element_bbox(child))
            .reduce(|acc, bb| acc.union(&bb))
    }

    /// Serializes the live element tree into an SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            &mut out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" class=\"stageline\">",
            escape(&self.width),
            self.height
        );
        let _ = write!(
            &mut out,
            "<defs><marker id=\"{ARROW_MARKER_ID}\" markerWidth=\"10\" markerHeight=\"10\" \
             refX=\"10\" refY=\"5\" orient=\"auto\"><path d=\"{ARROW_MARKER_PATH}\" \
             fill=\"black\"/></marker></defs>"
        );
        let _ = write!(
            &mut out,
            "<rect class=\"frame\" width=\"100%\" height=\"100%\" fill=\"white\"/>"
        );
        for &child in &self.elements[0].children {
            self.write_element(&mut out, child);
        }
        out.push_str("</svg>");
        out
    }

    fn write_element(&self, out: &mut String, index: usize) {
        let element = &self.elements[index];
        if element.removed {
            return;
        }
        let class = class_attr(&element.classes);
        match &element.kind {
            ElementKind::Root => {}
            ElementKind::Group { tx, ty } => {
                let _ = write!(out, "<g{class} transform=\"translate({tx},{ty})\">");
                for &child in &element.children {
                    self.write_element(out, child);
                }
                out.push_str("</g>");
            }
            ElementKind::Rect { center, width, height } => {
                let _ = write!(
                    out,
                    "<rect{class} x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\"/>",
                    center.x - width / 2.0,
                    center.y - height / 2.0,
                );
            }
            ElementKind::Image { href, center, width, height } => {
                let _ = write!(
                    out,
                    "<image{class} href=\"{}\" x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\"/>",
                    escape(href),
                    center.x - width / 2.0,
                    center.y - height / 2.0,
                );
            }
            ElementKind::Text { content, center } => {
                let _ = write!(
                    out,
                    "<text{class} x=\"{}\" y=\"{}\" text-anchor=\"middle\" \
                     dominant-baseline=\"middle\">{}</text>",
                    center.x,
                    center.y,
                    escape(content),
                );
            }
            ElementKind::Polyline { points, arrow_end } => {
                let coords: Vec<String> =
                    points.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
                let marker = if *arrow_end {
                    format!(" marker-end=\"url(#{ARROW_MARKER_ID})\"")
                } else {
                    String::new()
                };
                let _ = write!(
                    out,
                    "<polyline{class} points=\"{}\" fill=\"none\" stroke=\"black\" \
                     stroke-width=\"1\"{marker}/>",
                    coords.join(" "),
                );
            }
        }
    }
}

impl Canvas for SvgCanvas {
    fn root(&self) -> ShapeId {
        ShapeId(0)
    }

    fn group(&mut self, parent: ShapeId) -> ShapeId {
        self.push(parent, ElementKind::Group { tx: 0.0, ty: 0.0 })
    }

    fn rect(&mut self, parent: ShapeId, width: f64, height: f64) -> ShapeId {
        // Top-left at the parent origin, like a freshly drawn SVG rect.
        let center = Point::new(width / 2.0, height / 2.0);
        self.push(parent, ElementKind::Rect { center, width, height })
    }

    fn image(&mut self, parent: ShapeId, href: &str, width: f64, height: f64) -> ShapeId {
        self.push(
            parent,
            ElementKind::Image {
                href: href.to_string(),
                center: Point::default(),
                width,
                height,
            },
        )
    }

    fn text(&mut self, parent: ShapeId, content: &str) -> ShapeId {
        self.push(
            parent,
            ElementKind::Text {
                content: content.to_string(),
                center: Point::default(),
            },
        )
    }

    fn polyline(&mut self, parent: ShapeId, points: &[Point], arrow_end: bool) -> ShapeId {
        self.push(
            parent,
            ElementKind::Polyline {
                points: points.to_vec(),
                arrow_end,
            },
        )
    }

    fn set_center(&mut self, shape: ShapeId, target: Point) {
        let current = self.element_bbox(shape.0).center();
        let (dx, dy) = (target.x - current.x, target.y - current.y);
        match &mut self.elements[shape.0].kind {
            ElementKind::Root => {}
            ElementKind::Group { tx, ty } => {
                *tx += dx;
                *ty += dy;
            }
            ElementKind::Rect { center, .. }
            | ElementKind::Image { center, .. }
            | ElementKind::Text { center, .. } => *center = target,
            ElementKind::Polyline { points, .. } => {
                for p in points.iter_mut() {
                    p.x += dx;
                    p.y += dy;
                }
            }
        }
    }

    fn bbox(&self, shape: ShapeId) -> BBox {
        self.element_bbox(shape.0)
    }

    fn add_class(&mut self, shape: ShapeId, class: &str) {
        let classes = &mut self.elements[shape.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, shape: ShapeId, class: &str) {
        self.elements[shape.0].classes.retain(|c| c != class);
    }

    fn remove(&mut self, shape: ShapeId) {
        self.elements[shape.0].removed = true;
    }
}

fn class_attr(classes: &[String]) -> String {
    if classes.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", escape(&classes.join(" ")))
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
