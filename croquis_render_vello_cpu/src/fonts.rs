// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font lookup by family name.

use std::path::Path;

use hashbrown::HashMap;
use peniko::Blob;
use skrifa::{FontRef, MetadataProvider};

/// Errors from registering a font.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// The font file could not be read.
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    /// The bytes are not a font `skrifa` can read.
    #[error("not a usable font: {0}")]
    Invalid(skrifa::raw::ReadError),
}

#[derive(Clone, Debug)]
struct Face {
    weight: f32,
    data: Blob<u8>,
}

impl Face {
    fn new(data: Blob<u8>) -> Result<Self, FontError> {
        let font = FontRef::new(data.data()).map_err(FontError::Invalid)?;
        let weight = font.attributes().weight.value();
        Ok(Self { weight, data })
    }
}

/// Family name to font bytes, with an optional fallback face.
///
/// Family names match case-insensitively and ignore surrounding quotes, so
/// names can be taken straight from a CSS `font-family` list. Several faces
/// may share a family; lookups pick the one whose `OS/2` weight is closest to
/// the request.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    families: HashMap<String, Vec<Face>>,
    fallback: Option<Face>,
}

impl FontBook {
    /// An empty book. Text drawn with it is skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a face under `family`.
    pub fn insert(&mut self, family: &str, data: impl Into<Blob<u8>>) -> Result<(), FontError> {
        let face = Face::new(data.into())?;
        self.families
            .entry(family_key(family))
            .or_default()
            .push(face);
        Ok(())
    }

    /// Reads a font file and registers it under `family`.
    pub fn insert_file(&mut self, family: &str, path: impl AsRef<Path>) -> Result<(), FontError> {
        let bytes = std::fs::read(path)?;
        self.insert(family, bytes)
    }

    /// Sets the face used when no requested family is registered.
    pub fn set_fallback(&mut self, data: impl Into<Blob<u8>>) -> Result<(), FontError> {
        self.fallback = Some(Face::new(data.into())?);
        Ok(())
    }

    /// Whether no face at all is registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty() && self.fallback.is_none()
    }

    /// Font bytes for the first registered family in `families`, else the
    /// fallback.
    pub fn resolve(&self, families: &[String], weight: u16) -> Option<&Blob<u8>> {
        let wanted = f32::from(weight);
        families
            .iter()
            .find_map(|family| self.families.get(&family_key(family)))
            .and_then(|faces| {
                faces.iter().min_by(|a, b| {
                    (a.weight - wanted)
                        .abs()
                        .total_cmp(&(b.weight - wanted).abs())
                })
            })
            .or(self.fallback.as_ref())
            .map(|face| &face.data)
    }
}

fn family_key(name: &str) -> String {
    name.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_ascii_lowercase()
}
