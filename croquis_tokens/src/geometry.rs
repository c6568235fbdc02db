// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path builders and box offset math.
//!
//! Radii are always the 8-element sequence
//! `[tl-h, tr-h, tr-v, br-v, br-h, bl-h, bl-v, tl-v]`, walking clockwise from
//! the top-left corner. Side offsets are `[top, right, bottom, left]`.

use crate::{FillRule, Path, PathSegment};

/// Per-corner radii, see the module docs for the order.
pub type Radii = [f64; 8];

/// Axis-aligned box in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoxRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl BoxRect {
    /// Creates a rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when every field is a number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// True when both extents are strictly positive.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// The same rectangle moved by `(dx, dy)`.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Grows a rectangle outward by per-side offsets `[top, right, bottom, left]`.
///
/// Negative offsets shrink it.
pub fn offset_rect(rect: BoxRect, [top, right, bottom, left]: [f64; 4]) -> BoxRect {
    BoxRect::new(
        rect.x - left,
        rect.y - top,
        rect.width + left + right,
        rect.height + top + bottom,
    )
}

/// Adjusts corner radii by the per-side offsets that move each corner's edges.
///
/// Horizontal radii follow the left/right offsets and vertical radii follow
/// the top/bottom offsets. Results are clamped at zero, and a square corner
/// stays square.
pub fn offset_radius(radius: Radii, [top, right, bottom, left]: [f64; 4]) -> Radii {
    let offsets = [left, right, top, bottom, right, left, bottom, top];
    let mut out = radius;
    for (r, offset) in out.iter_mut().zip(offsets) {
        if *r > 0.0 {
            *r = (*r + offset).max(0.0);
        }
    }
    out
}

/// Shrinks radii so adjacent radii along an edge never exceed the edge length.
///
/// All radii sharing an overconstrained edge are scaled by the same factor,
/// per the CSS corner overlap rule.
pub fn clamp_radii(radius: Radii, width: f64, height: f64) -> Radii {
    // Edge k spans radius[2k] and radius[2k + 1]: top, right, bottom, left.
    let mut ratio = [1.0_f64; 4];
    for (k, r) in ratio.iter_mut().enumerate() {
        let edge = if k % 2 == 0 { width } else { height };
        let sum = radius[2 * k] + radius[2 * k + 1];
        if sum > 0.0 {
            *r = (edge / sum).min(1.0);
        }
    }
    let mut out = radius;
    for (i, r) in out.iter_mut().enumerate() {
        // Each radius touches one horizontal and one vertical edge.
        let k = ((i + 7) >> 1) % 4;
        *r *= ratio[k].min(ratio[(k + 1) % 4]);
    }
    out
}

/// Closed rectangle path.
pub fn rect_path(rect: BoxRect) -> Path {
    polygon_path(&[
        (rect.x, rect.y),
        (rect.x + rect.width, rect.y),
        (rect.x + rect.width, rect.y + rect.height),
        (rect.x, rect.y + rect.height),
    ])
}

/// Closed polygon through `points`, non-zero fill.
pub fn polygon_path(points: &[(f64, f64)]) -> Path {
    let mut segments = Vec::with_capacity(points.len() + 1);
    for (i, &(x, y)) in points.iter().enumerate() {
        segments.push(if i == 0 {
            PathSegment::MoveTo { x, y }
        } else {
            PathSegment::LineTo { x, y }
        });
    }
    segments.push(PathSegment::Close);
    Path::new(segments)
}

/// Rounded rectangle with elliptical corners, non-zero fill.
///
/// A corner is drawn square when either of its radii is zero.
pub fn rounded_rect_path(rect: BoxRect, radius: Radii) -> Path {
    let BoxRect {
        x,
        y,
        width: w,
        height: h,
    } = rect;
    let corner = |rh: f64, rv: f64| {
        if rh > 0.0 && rv > 0.0 {
            (rh, rv)
        } else {
            (0.0, 0.0)
        }
    };
    let (tl_h, tl_v) = corner(radius[0], radius[7]);
    let (tr_h, tr_v) = corner(radius[1], radius[2]);
    let (br_h, br_v) = corner(radius[4], radius[3]);
    let (bl_h, bl_v) = corner(radius[5], radius[6]);

    let arc = |rx: f64, ry: f64, x: f64, y: f64| PathSegment::Arc {
        rx,
        ry,
        x_axis_rotation: 0.0,
        large_arc: false,
        sweep: true,
        x,
        y,
    };

    let mut segments = Vec::with_capacity(10);
    segments.push(PathSegment::MoveTo { x: x + tl_h, y });
    segments.push(PathSegment::LineTo {
        x: x + w - tr_h,
        y,
    });
    if tr_h > 0.0 {
        segments.push(arc(tr_h, tr_v, x + w, y + tr_v));
    }
    segments.push(PathSegment::LineTo {
        x: x + w,
        y: y + h - br_v,
    });
    if br_h > 0.0 {
        segments.push(arc(br_h, br_v, x + w - br_h, y + h));
    }
    segments.push(PathSegment::LineTo {
        x: x + bl_h,
        y: y + h,
    });
    if bl_h > 0.0 {
        segments.push(arc(bl_h, bl_v, x, y + h - bl_v));
    }
    segments.push(PathSegment::LineTo { x, y: y + tl_v });
    if tl_h > 0.0 {
        segments.push(arc(tl_h, tl_v, x + tl_h, y));
    }
    segments.push(PathSegment::Close);
    Path::new(segments)
}

/// Concatenates the segments of `paths` under a single fill rule.
///
/// With [`FillRule::EvenOdd`], composing an outer and an inner outline yields
/// the band between them.
pub fn composite_path<'a>(paths: impl IntoIterator<Item = &'a Path>, fill_rule: FillRule) -> Path {
    let segments = paths
        .into_iter()
        .flat_map(|path| path.segments.iter().copied())
        .collect();
    Path {
        segments,
        fill_rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arcs(path: &Path) -> Vec<(f64, f64)> {
        path.segments
            .iter()
            .filter_map(|s| match *s {
                PathSegment::Arc { rx, ry, .. } => Some((rx, ry)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rounded_rect_emits_four_arcs() {
        let path = rounded_rect_path(BoxRect::new(0.0, 0.0, 100.0, 50.0), [10.0; 8]);
        assert_eq!(arcs(&path), vec![(10.0, 10.0); 4]);
        assert_eq!(path.segments.first(), Some(&PathSegment::MoveTo { x: 10.0, y: 0.0 }));
        assert_eq!(path.segments.last(), Some(&PathSegment::Close));
        assert_eq!(path.fill_rule, FillRule::NonZero);
    }

    #[test]
    fn square_corners_skip_arcs() {
        let path = rounded_rect_path(BoxRect::new(0.0, 0.0, 10.0, 10.0), [0.0; 8]);
        assert!(arcs(&path).is_empty());
        // Half-specified corners are square too.
        let mut radii = [0.0; 8];
        radii[1] = 4.0;
        let path = rounded_rect_path(BoxRect::new(0.0, 0.0, 10.0, 10.0), radii);
        assert!(arcs(&path).is_empty());
    }

    #[test]
    fn clamp_leaves_fitting_radii_alone() {
        assert_eq!(clamp_radii([10.0; 8], 100.0, 50.0), [10.0; 8]);
    }

    #[test]
    fn clamp_scales_overconstrained_edges_to_fit_exactly() {
        let out = clamp_radii([60.0; 8], 100.0, 50.0);
        // The vertical edges (50 / 120) constrain every corner.
        let expected = 60.0 * (50.0 / 120.0);
        for r in out {
            assert!((r - expected).abs() < 1e-9, "{r} != {expected}");
        }
        assert!((out[2] + out[3] - 50.0).abs() < 1e-9, "right edge must fit exactly");
        assert!(out[0] + out[1] <= 100.0, "top edge must not overshoot");
    }

    #[test]
    fn clamp_uses_smaller_ratio_of_both_edges() {
        // Only the top edge is overconstrained.
        let radii = [80.0, 80.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0];
        let out = clamp_radii(radii, 100.0, 200.0);
        assert!((out[0] + out[1] - 100.0).abs() < 1e-9, "top edge fits exactly");
        // tr-v shares the top-right corner and shrinks with it.
        assert!((out[2] - 5.0 * 100.0 / 160.0).abs() < 1e-9, "tr-v scales");
        assert_eq!(out[4], 5.0);
    }

    #[test]
    fn offsets_grow_and_shrink() {
        let rect = BoxRect::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(offset_rect(rect, [1.0, 2.0, 3.0, 4.0]), BoxRect::new(6.0, 9.0, 26.0, 24.0));
        assert_eq!(offset_rect(rect, [-5.0; 4]), BoxRect::new(15.0, 15.0, 10.0, 10.0));

        let radius = offset_radius([4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 0.0], [-1.0, -2.0, -3.0, -6.0]);
        assert_eq!(radius, [0.0, 2.0, 3.0, 1.0, 2.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn composite_concatenates_with_rule() {
        let outer = rect_path(BoxRect::new(0.0, 0.0, 10.0, 10.0));
        let inner = rect_path(BoxRect::new(2.0, 2.0, 6.0, 6.0));
        let band = composite_path([&outer, &inner], FillRule::EvenOdd);
        assert_eq!(band.segments.len(), outer.segments.len() + inner.segments.len());
        assert_eq!(band.fill_rule, FillRule::EvenOdd);
    }
}
