// Core value types shared by the rasterizer, the canvas and the I/O backends.

use std::sync::Arc;

/// The one raster format we export, copy, share and accept on paste.
pub const PNG_MIME: &str = "image/png";

/// Name used when the surface is wrapped as a file (share, download fallback).
pub const DEFAULT_FILE_NAME: &str = "untitled.png";

/// A pixel coordinate in surface space. Can be negative or past the edges;
/// whoever writes pixels is responsible for clipping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the surface is on screen (pixels)
    pub height: usize,     // how tall the surface is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A buffer of the given size where every pixel is `color`.
    /// Visual: a flat, uniformly colored canvas.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }
}

// Lookup for assertions; the drawing code indexes `pixels` directly.
#[cfg(test)]
impl FrameBuffer {
    /// Pixel at (x,y), or `None` outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }
}

/// Immutable binary payload moved between the surface and the platform.
/// Cloning shares the bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    mime: String,
    bytes: Arc<[u8]>,
}

impl Blob {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { mime: mime.into(), bytes: bytes.into() }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A named blob: what a picker hands back and what we share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct File {
    pub name: String,
    pub blob: Blob,
}

impl File {
    pub fn new(name: impl Into<String>, blob: Blob) -> Self {
        Self { name: name.into(), blob }
    }
}
