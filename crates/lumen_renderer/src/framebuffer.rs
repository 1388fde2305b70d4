//! Shared RGBA frame buffer.
//!
//! Pixels are packed into `AtomicU32`s so a render thread can write while
//! any other thread reads a snapshot. Row 0 is the bottom of the image.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::bucket::BucketResult;

/// Opaque black.
pub const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

/// A width x height grid of 8-bit RGBA pixels.
#[derive(Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

#[inline]
fn pack(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

#[inline]
fn unpack(bits: u32) -> [u8; 4] {
    bits.to_le_bytes()
}

impl FrameBuffer {
    /// Create a buffer filled with opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: (0..len).map(|_| AtomicU32::new(pack(CLEAR_COLOR))).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        unpack(self.pixels[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Set the pixel at (x, y).
    pub fn set(&self, x: u32, y: u32, rgba: [u8; 4]) {
        self.pixels[self.index(x, y)].store(pack(rgba), Ordering::Relaxed);
    }

    /// Fill every pixel with `rgba`.
    pub fn clear(&self, rgba: [u8; 4]) {
        let bits = pack(rgba);
        for pixel in &self.pixels {
            pixel.store(bits, Ordering::Relaxed);
        }
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, rgba) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *rgba);
        }
    }

    /// Snapshot as RGBA bytes, bottom row first.
    pub fn to_rgba(&self) -> Vec<u8> {
        let pixels: Vec<[u8; 4]> = self
            .pixels
            .iter()
            .map(|p| unpack(p.load(Ordering::Relaxed)))
            .collect();
        bytemuck::cast_slice(&pixels).to_vec()
    }

    /// Snapshot as RGBA bytes, top row first (image file order).
    pub fn to_rgba_top_down(&self) -> Vec<u8> {
        let row_bytes = self.width as usize * 4;
        if row_bytes == 0 {
            return Vec::new();
        }
        let bottom_up = self.to_rgba();
        bottom_up
            .chunks_exact(row_bytes)
            .rev()
            .flatten()
            .copied()
            .collect()
    }
}
