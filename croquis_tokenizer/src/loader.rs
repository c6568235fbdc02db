// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image loading for `background-image` and `<img>`.

use core::future::{Future, ready};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use croquis_tokens::{ImageData, ImageHandle};
use peniko::{Blob, ImageAlphaType, ImageFormat};

/// Why an image could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    /// A `data:` URL without a `,` separator.
    #[error("malformed data URL")]
    InvalidDataUrl,
    /// The base64 payload did not decode.
    #[error("invalid base64 payload")]
    Base64(#[from] base64::DecodeError),
    /// A URL scheme the loader does not fetch.
    #[error("unsupported URL scheme `{0}`")]
    UnsupportedScheme(String),
    /// Reading a local file failed.
    #[error("failed to read {path}")]
    Io {
        /// The resolved path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not an image in a supported format.
    #[error("failed to decode image")]
    Decode(#[from] image::ImageError),
}

/// Resolves image sources to decoded pixels.
///
/// Loads are awaited one at a time by the tokenizer, so token order never
/// depends on load latency.
pub trait ImageLoader {
    /// Loads and decodes `src`.
    fn load(&self, src: &str) -> impl Future<Output = Result<ImageHandle, ImageLoadError>>;
}

impl<L: ImageLoader + ?Sized> ImageLoader for &L {
    fn load(&self, src: &str) -> impl Future<Output = Result<ImageHandle, ImageLoadError>> {
        (**self).load(src)
    }
}

/// Loads images from `data:` URLs and the local filesystem.
///
/// PNG, JPEG, GIF, WebP, BMP and ICO are decoded; animated formats yield
/// their first frame.
///
/// Relative paths and `file://` URLs resolve against the base directory when
/// one is set. Network schemes are rejected.
#[derive(Clone, Debug, Default)]
pub struct LocalImageLoader {
    base_dir: Option<PathBuf>,
}

impl LocalImageLoader {
    /// A loader that resolves relative paths against the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `base_dir`.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Loads `src` synchronously.
    pub fn load_blocking(&self, src: &str) -> Result<ImageHandle, ImageLoadError> {
        let bytes = if let Some(rest) = src.strip_prefix("data:") {
            decode_data_url(rest)?
        } else if let Some((scheme, _)) = src.split_once("://")
            && scheme != "file"
        {
            return Err(ImageLoadError::UnsupportedScheme(scheme.to_owned()));
        } else {
            let path = self.resolve(src.strip_prefix("file://").unwrap_or(src));
            std::fs::read(&path).map_err(|source| ImageLoadError::Io { path, source })?
        };
        let data = decode_image(&bytes)?;
        tracing::debug!(
            src = %abbreviate(src),
            width = data.width,
            height = data.height,
            "decoded image"
        );
        Ok(ImageHandle {
            src: Arc::from(src),
            data,
        })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) if Path::new(path).is_relative() => base.join(path),
            _ => PathBuf::from(path),
        }
    }
}

impl ImageLoader for LocalImageLoader {
    fn load(&self, src: &str) -> impl Future<Output = Result<ImageHandle, ImageLoadError>> {
        ready(self.load_blocking(src))
    }
}

/// Decodes the part of a data URL after `data:`.
///
/// Payloads without a `;base64` marker are percent-decoded.
fn decode_data_url(rest: &str) -> Result<Vec<u8>, ImageLoadError> {
    let (metadata, payload) = rest.split_once(',').ok_or(ImageLoadError::InvalidDataUrl)?;
    if metadata.split(';').any(|part| part == "base64") {
        Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

/// Decodes encoded image bytes to straight-alpha RGBA8.
///
/// The format is sniffed from the bytes, not taken from the source name.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData, ImageLoadError> {
    let rgba = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        data: Blob::from(rgba.into_raw()),
        format: ImageFormat::Rgba8,
        alpha_type: ImageAlphaType::Alpha,
        width,
        height,
    })
}

/// Shortens long sources, data URLs mostly, for logs and errors.
pub(crate) fn abbreviate(src: &str) -> String {
    const MAX: usize = 64;
    match src.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &src[..cut]),
        None => src.to_owned(),
    }
}
