// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use croquis_render::{DetectedCapabilities, RenderError, RenderOptions, render};
use croquis_render_vello_cpu::VelloCpuSurface;
use croquis_tokenizer::{Document, ImageLoader, Tokenizer};
use croquis_tokens::sort_by_z_index;

use crate::{Error, Options};

/// A rendered canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
    /// Device pixels per logical pixel.
    pub scale: f64,
    /// Width the canvas is meant to be displayed at.
    pub logical_width: f64,
    /// Height the canvas is meant to be displayed at.
    pub logical_height: f64,
    /// Unpremultiplied, row-major RGBA8.
    pub rgba: Vec<u8>,
}

impl Snapshot {
    /// The RGBA value at `(x, y)`, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encodes the canvas as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.rgba)?;
        writer.finish()?;
        Ok(out)
    }
}

/// Renders the subtree under `root`.
///
/// Tokenizes the subtree, sorts the tokens into painting order and replays
/// them onto a [`VelloCpuSurface`] of `width * scale` by `height * scale`
/// device pixels. Surface capabilities are detected once per process.
///
/// # Errors
///
/// - [`RenderError::MissingContext`] when the canvas would be empty or too
///   large, before anything is tokenized.
/// - Any [`TokenizeError`](croquis_tokenizer::TokenizeError), including a
///   failed image load.
pub async fn snapshot<D, L>(
    document: &D,
    root: D::Node,
    loader: &L,
    options: &Options,
) -> Result<Snapshot, Error>
where
    D: Document,
    L: ImageLoader,
{
    let tokenizer = Tokenizer::new(document, root, loader)?.with_options(options.tokenizer.clone());
    let root_rect = tokenizer.root_rect();
    let render_options = RenderOptions {
        width: options.width.unwrap_or(root_rect.width),
        height: options.height.unwrap_or(root_rect.height),
        scale: options.scale(),
        engine: options.engine,
    };
    let RenderOptions {
        width,
        height,
        scale,
        ..
    } = render_options;
    let Some((device_width, device_height)) = render_options.device_size() else {
        return Err(RenderError::MissingContext {
            width: width * scale,
            height: height * scale,
        }
        .into());
    };
    let mut surface =
        VelloCpuSurface::with_fonts(device_width, device_height, Arc::clone(&options.fonts))?;
    tracing::info!("canvas [{device_width}, {device_height}, scale={scale}] ({width}, {height})");

    let tokens = sort_by_z_index(tokenizer.tokenize().await?);
    tracing::debug!(count = tokens.len(), "tokenized");
    if options.debug {
        tracing::info!(?tokens, "token stream");
    }

    render(
        &tokens,
        &mut surface,
        DetectedCapabilities::shared(),
        render_options,
    )?;
    Ok(Snapshot {
        width: device_width,
        height: device_height,
        scale,
        logical_width: width,
        logical_height: height,
        rgba: surface.into_rgba8(),
    })
}
