// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A surface that records what it is asked to do.
//!
//! [`RecordingSurface`] draws nothing. It tracks the effective transform and
//! the clip and layer stacks, and logs every operation next to a snapshot of
//! that state, which makes renderer behavior easy to assert on.

use kurbo::Affine;

use crate::RenderError;
use crate::surface::{DrawOp, Layer, Pixels, StateOp, Surface};

/// State in effect when an operation was recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    /// Product of all pushed transforms.
    pub transform: Affine,
    /// Number of open clips.
    pub clip_depth: usize,
    /// Number of open layers.
    pub layer_depth: usize,
    /// Innermost open layer.
    pub layer_top: Option<Layer>,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip_depth: 0,
            layer_depth: 0,
            layer_top: None,
        }
    }
}

/// One recorded call.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A state operation and the state after it.
    State {
        /// The operation.
        op: StateOp,
        /// State after applying `op`.
        state: StateSnapshot,
    },
    /// A draw operation and the state it was drawn under.
    Draw {
        /// The operation.
        op: DrawOp,
        /// State at the time of the draw.
        state: StateSnapshot,
    },
    /// An offscreen rasterization request.
    Rasterize {
        /// Buffer width in device pixels.
        width: u32,
        /// Buffer height in device pixels.
        height: u32,
        /// Transform into the buffer.
        transform: Affine,
        /// The ops drawn into the buffer.
        ops: Vec<DrawOp>,
    },
}

/// Records operations instead of drawing them.
///
/// [`Surface::rasterize`] returns a transparent buffer of the requested size,
/// so capability detection against this surface finds neither native blur
/// nor horizontal-only text.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Vec<Event>,
    state: StateSnapshot,
    transforms: Vec<Affine>,
    layers: Vec<Layer>,
}

impl RecordingSurface {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in call order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Draw operations with their state, in call order.
    pub fn draws(&self) -> impl Iterator<Item = (&DrawOp, &StateSnapshot)> {
        self.events.iter().filter_map(|event| match event {
            Event::Draw { op, state } => Some((op, state)),
            _ => None,
        })
    }

    /// State operations, in call order.
    pub fn state_ops(&self) -> impl Iterator<Item = &StateOp> {
        self.events.iter().filter_map(|event| match event {
            Event::State { op, .. } => Some(op),
            _ => None,
        })
    }

    /// The current state.
    pub fn current(&self) -> &StateSnapshot {
        &self.state
    }

    /// Forget recorded events. The state stacks are kept.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl Surface for RecordingSurface {
    fn state(&mut self, op: StateOp) {
        match &op {
            StateOp::PushClip { .. } => self.state.clip_depth += 1,
            StateOp::PopClip => self.state.clip_depth = self.state.clip_depth.saturating_sub(1),
            StateOp::PushTransform(transform) => {
                self.transforms.push(self.state.transform);
                self.state.transform *= *transform;
            }
            StateOp::PopTransform => {
                self.state.transform = self.transforms.pop().unwrap_or(Affine::IDENTITY);
            }
            StateOp::PushLayer(layer) => {
                self.layers.push(*layer);
                self.state.layer_depth = self.layers.len();
                self.state.layer_top = self.layers.last().copied();
            }
            StateOp::PopLayer => {
                self.layers.pop();
                self.state.layer_depth = self.layers.len();
                self.state.layer_top = self.layers.last().copied();
            }
        }
        self.events.push(Event::State {
            op,
            state: self.state.clone(),
        });
    }

    fn draw(&mut self, op: DrawOp) {
        self.events.push(Event::Draw {
            op,
            state: self.state.clone(),
        });
    }

    fn rasterize(
        &mut self,
        width: u32,
        height: u32,
        transform: Affine,
        ops: &[DrawOp],
    ) -> Result<Pixels, RenderError> {
        self.events.push(Event::Rasterize {
            width,
            height,
            transform,
            ops: ops.to_vec(),
        });
        Ok(Pixels::new(width, height))
    }
}
