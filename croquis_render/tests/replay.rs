// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replays sorted token streams onto a `RecordingSurface`.

use croquis_render::{
    DetectedCapabilities, DrawOp, Event, RecordingSurface, RenderOptions, Renderer, StateOp,
    VerticalText,
};
use croquis_tokens::{Fill, Filter, Shape, StackingContext, Token, sort_by_z_index};
use peniko::Color;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn square(color: &str, filter: Option<Filter>) -> Token {
    Token::Fill(Fill {
        x: 0.0,
        y: 0.0,
        shape: Shape::Rect {
            width: 10.0,
            height: 10.0,
        },
        color: color.into(),
        filter,
    })
}

fn context(z_index: i32, inner: Token) -> [Token; 3] {
    [
        Token::StackingContext(StackingContext {
            z_index,
            reason: format!("position: relative; z-index: {z_index}"),
            isolated: true,
        }),
        inner,
        Token::EndStackingContext,
    ]
}

fn fill_colors(surface: &RecordingSurface) -> Vec<Color> {
    surface
        .draws()
        .filter_map(|(op, _)| match op {
            DrawOp::FillPath { color, .. } => Some(*color),
            _ => None,
        })
        .collect()
}

#[test]
fn paints_in_z_order_after_sorting() {
    init_tracing();
    let mut tokens = Vec::new();
    tokens.extend(context(2, square("rgb(255, 0, 0)", None)));
    tokens.extend(context(-1, square("rgb(0, 0, 255)", None)));
    tokens.push(square("rgb(0, 255, 0)", None));

    let sorted = sort_by_z_index(tokens);
    let mut surface = RecordingSurface::new();
    let probe = DetectedCapabilities::new();
    Renderer::new(&mut surface, &probe, RenderOptions::default())
        .render(&sorted)
        .expect("renders");

    let order: Vec<[u8; 4]> = fill_colors(&surface)
        .iter()
        .map(|c| c.to_rgba8().to_u8_array())
        .collect();
    assert_eq!(
        order,
        [[0, 0, 255, 255], [0, 255, 0, 255], [255, 0, 0, 255]]
    );
}

#[test]
fn detection_runs_once_and_selects_the_fallback() {
    init_tracing();
    let probe = DetectedCapabilities::new();
    let tokens = [square("rgb(0, 0, 0)", Some(Filter::Blur(2.0)))];

    let mut first = RecordingSurface::new();
    let renderer = Renderer::new(&mut first, &probe, RenderOptions::default());
    let capabilities = renderer.capabilities();
    assert!(!capabilities.native_blur);
    assert_eq!(capabilities.vertical_text, VerticalText::Upright);

    let mut second = RecordingSurface::new();
    Renderer::new(&mut second, &probe, RenderOptions::default())
        .render(&tokens)
        .expect("renders");

    let rasterized = |surface: &RecordingSurface| {
        surface
            .events()
            .iter()
            .filter(|e| matches!(e, Event::Rasterize { .. }))
            .count()
    };
    assert_eq!(rasterized(&first), 2, "two probes");
    assert_eq!(rasterized(&second), 1, "only the blur buffer");
    assert!(matches!(
        second.draws().next(),
        Some((DrawOp::DrawPixels { .. }, _))
    ));
}

#[test]
fn every_push_is_popped() {
    init_tracing();
    let tokens = [
        Token::Effect(croquis_tokens::Effect {
            opacity: Some(0.25),
            blend_mode: None,
        }),
        Token::Transform(croquis_tokens::Transform::translate(1.0, 2.0)),
        Token::Clip(croquis_tokens::Clip {
            x: 0.0,
            y: 0.0,
            shape: Shape::Rect {
                width: 5.0,
                height: 5.0,
            },
        }),
        square("rgb(0, 0, 0)", None),
        Token::EndClip,
        Token::EndTransform,
        Token::EndEffect,
    ];
    let mut surface = RecordingSurface::new();
    Renderer::new(
        &mut surface,
        &croquis_render::FixedCapabilities::default(),
        RenderOptions {
            scale: 3.0,
            ..RenderOptions::default()
        },
    )
    .render(&tokens)
    .expect("renders");

    let pushes = surface
        .state_ops()
        .filter(|op| {
            matches!(
                op,
                StateOp::PushClip { .. } | StateOp::PushLayer(_) | StateOp::PushTransform(_)
            )
        })
        .count();
    let pops = surface
        .state_ops()
        .filter(|op| matches!(op, StateOp::PopClip | StateOp::PopLayer | StateOp::PopTransform))
        .count();
    assert_eq!((pushes, pops), (4, 4));
    assert_eq!(surface.current().transform, kurbo::Affine::IDENTITY);
}
