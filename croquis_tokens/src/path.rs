// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Arc, BezPath, Point, SvgArc, Vec2};

use crate::FillRule;

const ARC_TOLERANCE: f64 = 0.1;

/// One SVG-style path command with absolute coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathSegment {
    /// `M x y`
    MoveTo {
        /// Target x.
        x: f64,
        /// Target y.
        y: f64,
    },
    /// `L x y`
    LineTo {
        /// Target x.
        x: f64,
        /// Target y.
        y: f64,
    },
    /// `H x`
    Horizontal {
        /// Target x.
        x: f64,
    },
    /// `V y`
    Vertical {
        /// Target y.
        y: f64,
    },
    /// `C x1 y1 x2 y2 x y`
    CubicTo {
        /// First control x.
        x1: f64,
        /// First control y.
        y1: f64,
        /// Second control x.
        x2: f64,
        /// Second control y.
        y2: f64,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
    },
    /// `S x2 y2 x y`, first control reflected from the previous curve.
    SmoothCubicTo {
        /// Second control x.
        x2: f64,
        /// Second control y.
        y2: f64,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
    },
    /// `Q x1 y1 x y`
    QuadTo {
        /// Control x.
        x1: f64,
        /// Control y.
        y1: f64,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
    },
    /// `T x y`, control reflected from the previous curve.
    SmoothQuadTo {
        /// End x.
        x: f64,
        /// End y.
        y: f64,
    },
    /// `A rx ry rotation large-arc sweep x y`
    Arc {
        /// Horizontal radius.
        rx: f64,
        /// Vertical radius.
        ry: f64,
        /// Rotation of the ellipse in degrees.
        x_axis_rotation: f64,
        /// Take the longer of the two candidate arcs.
        large_arc: bool,
        /// Sweep clockwise.
        sweep: bool,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
    },
    /// `Z`
    Close,
}

impl PathSegment {
    /// The SVG command letter.
    pub fn command(&self) -> char {
        match self {
            Self::MoveTo { .. } => 'M',
            Self::LineTo { .. } => 'L',
            Self::Horizontal { .. } => 'H',
            Self::Vertical { .. } => 'V',
            Self::CubicTo { .. } => 'C',
            Self::SmoothCubicTo { .. } => 'S',
            Self::QuadTo { .. } => 'Q',
            Self::SmoothQuadTo { .. } => 'T',
            Self::Arc { .. } => 'A',
            Self::Close => 'Z',
        }
    }

    /// The command's coordinate list, in SVG argument order.
    ///
    /// Arc flags are reported as `0.0` or `1.0`.
    pub fn coordinates(&self) -> Vec<f64> {
        match *self {
            Self::MoveTo { x, y } | Self::LineTo { x, y } | Self::SmoothQuadTo { x, y } => {
                vec![x, y]
            }
            Self::Horizontal { x } => vec![x],
            Self::Vertical { y } => vec![y],
            Self::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => vec![x1, y1, x2, y2, x, y],
            Self::SmoothCubicTo { x2, y2, x, y } => vec![x2, y2, x, y],
            Self::QuadTo { x1, y1, x, y } => vec![x1, y1, x, y],
            Self::Arc {
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => vec![
                rx,
                ry,
                x_axis_rotation,
                f64::from(u8::from(large_arc)),
                f64::from(u8::from(sweep)),
                x,
                y,
            ],
            Self::Close => Vec::new(),
        }
    }
}

/// An ordered list of path segments with a fill rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Segments in drawing order.
    pub segments: Vec<PathSegment>,
    /// Rule used for filling and clipping.
    pub fill_rule: FillRule,
}

impl Path {
    /// A non-zero path with the given segments.
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self {
            segments,
            fill_rule: FillRule::NonZero,
        }
    }

    /// The same path with a different fill rule.
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Lowers the path to a [`BezPath`], translated by `(dx, dy)`.
    ///
    /// Shorthand commands resolve against the current point and the previous
    /// control point. Arcs are approximated with cubic curves; degenerate arcs
    /// become lines.
    pub fn to_bez_path(&self, dx: f64, dy: f64) -> BezPath {
        let offset = Vec2::new(dx, dy);
        let mut out = BezPath::new();
        let mut start = Point::ZERO;
        let mut current = Point::ZERO;
        // Last control point of a cubic or quad, for `S`/`T` reflection.
        let mut last_cubic: Option<Point> = None;
        let mut last_quad: Option<Point> = None;

        for segment in &self.segments {
            let mut next_cubic = None;
            let mut next_quad = None;
            match *segment {
                PathSegment::MoveTo { x, y } => {
                    current = Point::new(x, y);
                    start = current;
                    out.move_to(current + offset);
                }
                PathSegment::LineTo { x, y } => {
                    current = Point::new(x, y);
                    out.line_to(current + offset);
                }
                PathSegment::Horizontal { x } => {
                    current = Point::new(x, current.y);
                    out.line_to(current + offset);
                }
                PathSegment::Vertical { y } => {
                    current = Point::new(current.x, y);
                    out.line_to(current + offset);
                }
                PathSegment::CubicTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => {
                    let c2 = Point::new(x2, y2);
                    current = Point::new(x, y);
                    out.curve_to(Point::new(x1, y1) + offset, c2 + offset, current + offset);
                    next_cubic = Some(c2);
                }
                PathSegment::SmoothCubicTo { x2, y2, x, y } => {
                    let c1 = last_cubic.map_or(current, |c| reflect(c, current));
                    let c2 = Point::new(x2, y2);
                    current = Point::new(x, y);
                    out.curve_to(c1 + offset, c2 + offset, current + offset);
                    next_cubic = Some(c2);
                }
                PathSegment::QuadTo { x1, y1, x, y } => {
                    let c = Point::new(x1, y1);
                    current = Point::new(x, y);
                    out.quad_to(c + offset, current + offset);
                    next_quad = Some(c);
                }
                PathSegment::SmoothQuadTo { x, y } => {
                    let c = last_quad.map_or(current, |c| reflect(c, current));
                    current = Point::new(x, y);
                    out.quad_to(c + offset, current + offset);
                    next_quad = Some(c);
                }
                PathSegment::Arc {
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                    x,
                    y,
                } => {
                    let to = Point::new(x, y);
                    let svg_arc = SvgArc {
                        from: current + offset,
                        to: to + offset,
                        radii: Vec2::new(rx, ry),
                        x_rotation: x_axis_rotation.to_radians(),
                        large_arc,
                        sweep,
                    };
                    match Arc::from_svg_arc(&svg_arc) {
                        Some(arc) => {
                            for el in arc.append_iter(ARC_TOLERANCE) {
                                out.push(el);
                            }
                        }
                        None => out.line_to(to + offset),
                    }
                    current = to;
                }
                PathSegment::Close => {
                    out.close_path();
                    current = start;
                }
            }
            last_cubic = next_cubic;
            last_quad = next_quad;
        }
        out
    }
}

fn reflect(control: Point, about: Point) -> Point {
    about + (about - control)
}

#[cfg(test)]
mod tests {
    use kurbo::{PathEl, Shape};

    use super::*;
    use crate::geometry::{BoxRect, rounded_rect_path};

    #[test]
    fn commands_and_coordinates_follow_svg_arity() {
        let arc = PathSegment::Arc {
            rx: 1.0,
            ry: 2.0,
            x_axis_rotation: 0.0,
            large_arc: false,
            sweep: true,
            x: 3.0,
            y: 4.0,
        };
        assert_eq!(arc.command(), 'A');
        assert_eq!(arc.coordinates(), vec![1.0, 2.0, 0.0, 0.0, 1.0, 3.0, 4.0]);
        assert_eq!(PathSegment::Horizontal { x: 5.0 }.coordinates(), vec![5.0]);
        assert!(PathSegment::Close.coordinates().is_empty());
    }

    #[test]
    fn horizontal_and_vertical_use_current_point() {
        let path = Path::new(vec![
            PathSegment::MoveTo { x: 1.0, y: 2.0 },
            PathSegment::Horizontal { x: 5.0 },
            PathSegment::Vertical { y: 7.0 },
            PathSegment::Close,
        ]);
        let bez = path.to_bez_path(10.0, 0.0);
        let els: Vec<_> = bez.elements().to_vec();
        assert_eq!(els[0], PathEl::MoveTo(Point::new(11.0, 2.0)));
        assert_eq!(els[1], PathEl::LineTo(Point::new(15.0, 2.0)));
        assert_eq!(els[2], PathEl::LineTo(Point::new(15.0, 7.0)));
        assert_eq!(els[3], PathEl::ClosePath);
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        let path = Path::new(vec![
            PathSegment::MoveTo { x: 0.0, y: 0.0 },
            PathSegment::CubicTo {
                x1: 0.0,
                y1: 10.0,
                x2: 10.0,
                y2: 10.0,
                x: 10.0,
                y: 0.0,
            },
            PathSegment::SmoothCubicTo {
                x2: 20.0,
                y2: -10.0,
                x: 20.0,
                y: 0.0,
            },
        ]);
        let bez = path.to_bez_path(0.0, 0.0);
        assert_eq!(
            bez.elements()[2],
            PathEl::CurveTo(
                Point::new(10.0, -10.0),
                Point::new(20.0, -10.0),
                Point::new(20.0, 0.0)
            )
        );
    }

    #[test]
    fn rounded_rect_lowers_within_bounds() {
        let path = rounded_rect_path(BoxRect::new(0.0, 0.0, 100.0, 50.0), [10.0; 8]);
        let bbox = path.to_bez_path(5.0, 5.0).bounding_box();
        assert!((bbox.x0 - 5.0).abs() < 1e-6, "left edge: {bbox:?}");
        assert!((bbox.y0 - 5.0).abs() < 1e-6, "top edge: {bbox:?}");
        assert!((bbox.x1 - 105.0).abs() < 1e-6, "right edge: {bbox:?}");
        assert!((bbox.y1 - 55.0).abs() < 1e-6, "bottom edge: {bbox:?}");
    }
}
