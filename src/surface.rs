// The pixel surface: the only thing strokes and pasted images ever write to.
// Visual: exactly what the window shows and what gets exported as PNG.

use image::{Rgba, RgbaImage};

use crate::color::{self, blend_over, pack_rgb, unpack_rgb};
use crate::types::FrameBuffer;

pub struct Surface {
    fb: FrameBuffer,
    fill: color::Rgba, // current ink; only affects later fills
}

impl Surface {
    /// A `width × height` surface painted once with `background`.
    /// The surface is always opaque, so the background's alpha is dropped and
    /// its color written as-is. The fill color starts out as the background
    /// too; callers set the pen color afterwards, like a canvas context is
    /// prepared at mount time.
    pub fn new(width: usize, height: usize, background: color::Rgba) -> Self {
        let [r, g, b, _] = background;
        Self {
            fb: FrameBuffer::filled(width, height, pack_rgb(r, g, b)),
            fill: background,
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.fb
    }

    pub fn set_fill_color(&mut self, fill: color::Rgba) {
        self.fill = fill;
    }

    /// Fill a `w × h` rectangle whose top-left corner is (x,y).
    /// Visual: a solid block of the current ink; the part hanging off the
    /// surface edges is simply not drawn.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + w as i64).min(self.fb.width as i64);
        let y1 = (y as i64 + h as i64).min(self.fb.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let (x0, x1) = (x0 as usize, x1 as usize);
        for row in y0 as usize..y1 as usize {
            let start = row * self.fb.width;
            for px in &mut self.fb.pixels[start + x0..start + x1] {
                *px = blend_over(*px, self.fill);
            }
        }
    }

    /// Composite `image` with its top-left corner at (x,y), unscaled.
    /// Visual: the opened/pasted picture appears on top of the painting;
    /// anything larger than the surface is cut off at the edges.
    pub fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32) {
        for (ix, iy, px) in image.enumerate_pixels() {
            let tx = x as i64 + ix as i64;
            let ty = y as i64 + iy as i64;
            if tx < 0 || ty < 0 || tx >= self.fb.width as i64 || ty >= self.fb.height as i64 {
                continue;
            }
            let idx = ty as usize * self.fb.width + tx as usize;
            self.fb.pixels[idx] = blend_over(self.fb.pixels[idx], px.0);
        }
    }

    /// Copy the visible pixels out as an opaque RGBA image (alpha = 255).
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.fb.width as u32, self.fb.height as u32);
        for (x, y, px) in out.enumerate_pixels_mut() {
            let (r, g, b) = unpack_rgb(self.fb.pixels[y as usize * self.fb.width + x as usize]);
            *px = Rgba([r, g, b, 255]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: color::Rgba = [255, 255, 255, 255];
    const BLACK: color::Rgba = [0, 0, 0, 255];

    #[test]
    fn new_surface_is_uniform_background() {
        let s = Surface::new(4, 3, WHITE);
        assert!(s.frame().pixels.iter().all(|&p| p == 0x00FF_FFFF));
    }

    #[test]
    fn translucent_background_keeps_its_color() {
        let s = Surface::new(3, 2, [200, 100, 50, 64]);
        assert!(s.frame().pixels.iter().all(|&p| p == 0x00C8_6432));
        assert_eq!(s.to_rgba_image().get_pixel(2, 1).0, [200, 100, 50, 255]);

        let clear = Surface::new(1, 1, [255, 255, 255, 0]);
        assert_eq!(clear.frame().get(0, 0), Some(0x00FF_FFFF));
    }

    #[test]
    fn fill_rect_clips_at_edges() {
        let mut s = Surface::new(4, 4, WHITE);
        s.set_fill_color(BLACK);
        s.fill_rect(3, 3, 2, 2);
        s.fill_rect(-1, -1, 2, 2);
        s.fill_rect(10, 10, 2, 2);
        let black: Vec<(i32, i32)> = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .filter(|&(x, y)| s.frame().get(x, y) == Some(0))
            .collect();
        assert_eq!(black, vec![(0, 0), (3, 3)]);
    }

    #[test]
    fn color_change_does_not_repaint() {
        let mut s = Surface::new(2, 1, WHITE);
        s.set_fill_color(BLACK);
        s.fill_rect(0, 0, 1, 1);
        s.set_fill_color([255, 0, 0, 255]);
        assert_eq!(s.frame().get(0, 0), Some(0));
        s.fill_rect(1, 0, 1, 1);
        assert_eq!(s.frame().get(1, 0), Some(0x00FF_0000));
    }

    #[test]
    fn draw_image_clips_and_respects_alpha() {
        let mut s = Surface::new(2, 2, WHITE);
        let mut img = RgbaImage::new(3, 3);
        for px in img.pixels_mut() {
            *px = Rgba([0, 0, 255, 255]);
        }
        img.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
        s.draw_image(&img, 0, 0);
        assert_eq!(s.frame().get(0, 0), Some(0x0000_00FF));
        assert_eq!(s.frame().get(1, 1), Some(0x00FF_FFFF));
        assert_eq!(s.frame().pixels.len(), 4);
    }

    #[test]
    fn rgba_export_is_opaque() {
        let s = Surface::new(2, 2, [10, 20, 30, 255]);
        let img = s.to_rgba_image();
        assert_eq!(img.get_pixel(1, 1).0, [10, 20, 30, 255]);
    }
}
