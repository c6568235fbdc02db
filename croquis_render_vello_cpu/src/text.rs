// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simple text layout: one glyph per character, no shaping.

use croquis_render::TextRun;
use croquis_tokens::TextAlign;
use kurbo::{BezPath, Point};
use skrifa::instance::{LocationRef, Size};
use skrifa::metrics::GlyphMetrics;
use skrifa::outline::OutlinePen;
use skrifa::{FontRef, GlyphId, MetadataProvider};

/// Writes glyph outlines into a path, flipping font units to y-down.
struct GlyphPen<'a> {
    path: &'a mut BezPath,
    origin: Point,
}

impl GlyphPen<'_> {
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(self.origin.x + f64::from(x), self.origin.y - f64::from(y))
    }
}

impl OutlinePen for GlyphPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.point(x1, y1), self.point(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.point(x1, y1), self.point(x2, y2), self.point(x, y));
        self.path.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Lays `run` out with `font` and returns the outlines of all its glyphs.
///
/// `run.origin` is the top of the em box: at the aligned edge for horizontal
/// runs, and at the horizontal center for vertical ones. Vertical runs give
/// every glyph one em of height.
pub(crate) fn run_path(font: &FontRef<'_>, run: &TextRun) -> BezPath {
    let mut path = BezPath::new();
    if run.font_size.is_nan() || run.font_size <= 0.0 {
        return path;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "font sizes fit comfortably in f32"
    )]
    let size = Size::new(run.font_size as f32);
    let location = LocationRef::default();
    let charmap = font.charmap();
    let advances = GlyphMetrics::new(font, size, location);
    let outlines = font.outline_glyphs();
    let ascent = em_ascent(font, size, run.font_size);

    let glyphs: Vec<(GlyphId, f64)> = run
        .text
        .chars()
        .map(|ch| {
            let gid = charmap.map(ch).unwrap_or(GlyphId::NOTDEF);
            let advance = advances
                .advance_width(gid)
                .map_or(run.font_size * 0.6, f64::from);
            (gid, advance)
        })
        .collect();

    let mut draw = |gid: GlyphId, origin: Point| {
        let Some(outline) = outlines.get(gid) else {
            return;
        };
        let mut pen = GlyphPen {
            path: &mut path,
            origin,
        };
        if let Err(err) = outline.draw((size, location), &mut pen) {
            tracing::debug!(?gid, ?err, "glyph outline failed");
        }
    };

    if run.vertical {
        let step = run.font_size + run.letter_spacing;
        let mut top = run.origin.y;
        for (gid, advance) in glyphs {
            draw(gid, Point::new(run.origin.x - advance / 2.0, top + ascent));
            top += step;
        }
    } else {
        let width: f64 = glyphs
            .iter()
            .map(|(_, advance)| advance + run.letter_spacing)
            .sum();
        let mut x = match run.align {
            TextAlign::Start | TextAlign::Left => run.origin.x,
            TextAlign::Center => run.origin.x - width / 2.0,
            TextAlign::Right | TextAlign::End => run.origin.x - width,
        };
        let baseline = run.origin.y + ascent;
        for (gid, advance) in glyphs {
            draw(gid, Point::new(x, baseline));
            x += advance + run.letter_spacing;
        }
    }
    path
}

/// Distance from the top of the em box to the baseline.
fn em_ascent(font: &FontRef<'_>, size: Size, font_size: f64) -> f64 {
    let metrics = font.metrics(size, LocationRef::default());
    let (ascent, descent) = (f64::from(metrics.ascent), f64::from(metrics.descent));
    if ascent - descent > 0.0 {
        font_size * ascent / (ascent - descent)
    } else {
        font_size * 0.8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::tests::dejavu;
    use kurbo::Shape;
    use peniko::Color;

    fn run(text: &str, align: TextAlign, vertical: bool) -> TextRun {
        TextRun {
            text: text.into(),
            families: vec!["DejaVu Sans".into()],
            weight: 400,
            font_size: 20.0,
            letter_spacing: 0.0,
            color: Color::BLACK,
            origin: Point::new(100.0, 50.0),
            align,
            vertical,
        }
    }

    #[test]
    fn alignment_moves_the_run() {
        let Some((regular, _)) = dejavu() else {
            return;
        };
        let font = FontRef::new(&regular).expect("valid font");
        let left = run_path(&font, &run("Hello", TextAlign::Left, false)).bounding_box();
        let center = run_path(&font, &run("Hello", TextAlign::Center, false)).bounding_box();
        let right = run_path(&font, &run("Hello", TextAlign::Right, false)).bounding_box();

        assert!(left.x0 >= 100.0 - 1.0, "left run starts at the anchor");
        assert!(right.x1 <= 100.0 + 1.0, "right run ends at the anchor");
        assert!(center.x0 < 100.0 && center.x1 > 100.0, "centered run spans it");
        assert!(left.y0 >= 50.0 && left.y1 <= 50.0 + 20.0, "ink inside the em box");
    }

    #[test]
    fn vertical_runs_stack_downward() {
        let Some((regular, _)) = dejavu() else {
            return;
        };
        let font = FontRef::new(&regular).expect("valid font");
        let one = run_path(&font, &run("H", TextAlign::Left, true)).bounding_box();
        let three = run_path(&font, &run("HHH", TextAlign::Left, true)).bounding_box();

        assert!((one.center().x - 100.0).abs() < 2.0, "centered on the line");
        assert!(three.y1 - one.y1 > 39.0, "two more em steps down");
        assert_eq!(three.x0, one.x0, "no horizontal drift");
    }

    #[test]
    fn empty_and_degenerate_runs_have_no_ink() {
        let Some((regular, _)) = dejavu() else {
            return;
        };
        let font = FontRef::new(&regular).expect("valid font");
        assert!(run_path(&font, &run("   ", TextAlign::Left, false)).is_empty());
        let mut zero = run("Hi", TextAlign::Left, false);
        zero.font_size = 0.0;
        assert!(run_path(&font, &zero).is_empty());
    }
}
