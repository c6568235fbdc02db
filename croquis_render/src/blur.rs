// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack blur: a linear-time approximation of a Gaussian blur.
//!
//! Each row, then each column, is swept with a running weighted sum over the
//! last `2r + 1` samples. The triangular weights come from keeping separate
//! sums of the samples entering and leaving the window. Division by the total
//! weight is a multiply and shift from the tables below. Samples outside the
//! buffer replicate the nearest edge pixel.

use crate::surface::Pixels;

/// Largest supported radius; larger requests are clamped.
pub const MAX_RADIUS: u32 = 254;

#[rustfmt::skip]
const MUL_TABLE: [u16; 255] = [
    512, 512, 456, 512, 328, 456, 335, 512, 405, 328, 271, 456, 388, 335, 292,
    512, 454, 405, 364, 328, 298, 271, 496, 456, 420, 388, 360, 335, 312, 292,
    273, 512, 482, 454, 428, 405, 383, 364, 345, 328, 312, 298, 284, 271, 259,
    496, 475, 456, 437, 420, 404, 388, 374, 360, 347, 335, 323, 312, 302, 292,
    282, 273, 265, 512, 497, 482, 468, 454, 441, 428, 417, 405, 394, 383, 373,
    364, 354, 345, 337, 328, 320, 312, 305, 298, 291, 284, 278, 271, 265, 259,
    507, 496, 485, 475, 465, 456, 446, 437, 428, 420, 412, 404, 396, 388, 381,
    374, 367, 360, 354, 347, 341, 335, 329, 323, 318, 312, 307, 302, 297, 292,
    287, 282, 278, 273, 269, 265, 261, 512, 505, 497, 489, 482, 475, 468, 461,
    454, 447, 441, 435, 428, 422, 417, 411, 405, 399, 394, 389, 383, 378, 373,
    368, 364, 359, 354, 350, 345, 341, 337, 332, 328, 324, 320, 316, 312, 309,
    305, 301, 298, 294, 291, 287, 284, 281, 278, 274, 271, 268, 265, 262, 259,
    257, 507, 501, 496, 491, 485, 480, 475, 470, 465, 460, 456, 451, 446, 442,
    437, 433, 428, 424, 420, 416, 412, 408, 404, 400, 396, 392, 388, 385, 381,
    377, 374, 370, 367, 363, 360, 357, 354, 350, 347, 344, 341, 338, 335, 332,
    329, 326, 323, 320, 318, 315, 312, 310, 307, 304, 302, 299, 297, 294, 292,
    289, 287, 285, 282, 280, 278, 275, 273, 271, 269, 267, 265, 263, 261, 259,
];

#[rustfmt::skip]
const SHG_TABLE: [u8; 255] = [
     9, 11, 12, 13, 13, 14, 14, 15, 15, 15, 15, 16, 16, 16, 16, 17,
    17, 17, 17, 17, 17, 17, 18, 18, 18, 18, 18, 18, 18, 18, 18, 19,
    19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 20, 20, 20,
    20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 21,
    21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21,
    21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
];

type Rgba = [u64; 4];

/// Blurs premultiplied RGBA8 pixels in place.
///
/// Runs in `O(width * height)` regardless of `radius`. A radius of zero
/// leaves the buffer untouched.
pub fn stack_blur(pixels: &mut Pixels, radius: u32) {
    let radius = radius.min(MAX_RADIUS) as usize;
    let width = pixels.width as usize;
    let height = pixels.height as usize;
    if radius == 0 || width == 0 || height == 0 || pixels.data.len() < width * height * 4 {
        return;
    }

    let mut blur = LineBlur::new(radius, width.max(height));
    for y in 0..height {
        blur.run(&mut pixels.data, y * width * 4, 4, width);
    }
    for x in 0..width {
        blur.run(&mut pixels.data, x * 4, width * 4, height);
    }
}

/// Scratch state reused across rows and columns.
struct LineBlur {
    radius: usize,
    mul: u64,
    shg: u32,
    stack: Vec<Rgba>,
    line: Vec<Rgba>,
}

impl LineBlur {
    fn new(radius: usize, longest: usize) -> Self {
        Self {
            radius,
            mul: u64::from(MUL_TABLE[radius]),
            shg: u32::from(SHG_TABLE[radius]),
            stack: vec![[0; 4]; 2 * radius + 1],
            line: Vec::with_capacity(longest),
        }
    }

    /// Blurs `len` pixels starting at byte `start`, `stride` bytes apart.
    fn run(&mut self, data: &mut [u8], start: usize, stride: usize, len: usize) {
        let radius = self.radius;
        let div = self.stack.len();
        let last = len - 1;

        self.line.clear();
        self.line.extend((0..len).map(|i| {
            let p = start + i * stride;
            [
                u64::from(data[p]),
                u64::from(data[p + 1]),
                u64::from(data[p + 2]),
                u64::from(data[p + 3]),
            ]
        }));

        let mut sum: Rgba = [0; 4];
        let mut sum_in: Rgba = [0; 4];
        let mut sum_out: Rgba = [0; 4];

        // Left half of the window, all clamped to the first sample.
        let first = self.line[0];
        for (i, slot) in self.stack[..=radius].iter_mut().enumerate() {
            *slot = first;
            for c in 0..4 {
                sum[c] += first[c] * (i as u64 + 1);
                sum_out[c] += first[c];
            }
        }
        for i in 1..=radius {
            let px = self.line[i.min(last)];
            self.stack[radius + i] = px;
            for c in 0..4 {
                sum[c] += px[c] * (radius + 1 - i) as u64;
                sum_in[c] += px[c];
            }
        }

        let mut center = radius;
        for x in 0..len {
            let p = start + x * stride;
            for c in 0..4 {
                data[p + c] = u8::try_from((sum[c] * self.mul) >> self.shg).unwrap_or(u8::MAX);
            }

            let oldest = (center + div - radius) % div;
            let incoming = self.line[(x + radius + 1).min(last)];
            for c in 0..4 {
                sum[c] -= sum_out[c];
                sum_out[c] -= self.stack[oldest][c];
                sum_in[c] += incoming[c];
                sum[c] += sum_in[c];
            }
            self.stack[oldest] = incoming;

            center = (center + 1) % div;
            let mid = self.stack[center];
            for c in 0..4 {
                sum_out[c] += mid[c];
                sum_in[c] -= mid[c];
            }
        }
    }
}
