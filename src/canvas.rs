// Canvas session: stroke state, ink color, and the one encode path and one
// decode path every I/O operation goes through.
// Visual: pointer down + drag leaves a continuous line of small square dabs.

use std::future::Future;
use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, trace, warn};

use crate::color::{self, parse_color};
use crate::error::Error;
use crate::raster;
use crate::surface::Surface;
use crate::types::{Blob, PNG_MIME, Point};

pub struct CanvasSession {
    surface: Surface,
    previous: Option<Point>, // Some(_) only between pointer down and up
    brush: i32,              // side of the square dab, in pixels
}

impl CanvasSession {
    /// Prepare a surface filled with `background`, then switch the ink to `pen`.
    pub fn new(
        width: usize,
        height: usize,
        background: color::Rgba,
        pen: color::Rgba,
        brush: u32,
    ) -> Self {
        let mut surface = Surface::new(width, height, background);
        surface.set_fill_color(pen);
        Self {
            surface,
            previous: None,
            brush: brush.max(1) as i32,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Start a stroke at `p`. A second down without an up just restarts the
    /// stroke from the new point.
    pub fn pointer_down(&mut self, p: Point) {
        trace!(?p, "stroke start");
        self.previous = Some(p);
    }

    /// Extend the stroke to `p`. Returns how many dabs were filled
    /// (0 when no stroke is active).
    /// Visual: every pixel on the segment since the last sample gets a dab.
    pub fn pointer_move(&mut self, p: Point) -> usize {
        let Some(prev) = self.previous else {
            return 0;
        };
        let mut fills = 0;
        for q in raster::line(prev, p) {
            self.surface.fill_rect(q.x, q.y, self.brush, self.brush);
            fills += 1;
        }
        self.previous = Some(p);
        fills
    }

    /// End the stroke.
    pub fn pointer_up(&mut self) {
        if self.previous.take().is_some() {
            trace!("stroke end");
        }
    }

    /// Switch the ink. Unparsable values are ignored and the old ink stays,
    /// the same way a canvas ignores a bad `fillStyle`.
    pub fn set_color(&mut self, value: &str) -> bool {
        match parse_color(value) {
            Ok(rgba) => {
                debug!(color = value, "ink changed");
                self.surface.set_fill_color(rgba);
                true
            }
            Err(e) => {
                warn!("ignoring color: {e}");
                false
            }
        }
    }

    /// Export the surface as a PNG blob.
    /// The pixels are captured right now; encoding happens when the returned
    /// future is polled, so strokes drawn in between do not leak into it.
    pub fn to_blob(&self) -> impl Future<Output = Result<Blob, Error>> + use<> {
        let snapshot = self.surface.to_rgba_image();
        async move {
            let mut buf = Vec::new();
            snapshot.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
            debug!(bytes = buf.len(), "surface encoded");
            Ok(Blob::new(PNG_MIME, buf))
        }
    }

    /// Decode image bytes (any format the `image` crate recognises) into
    /// something `draw_image` can paint.
    pub fn get_image(source: Blob) -> impl Future<Output = Result<RgbaImage, Error>> + 'static {
        async move {
            let decoded = image::load_from_memory(source.bytes())?;
            Ok(decoded.to_rgba8())
        }
    }

    /// Paint a decoded image at the origin, unscaled.
    /// Visual: the picture covers the top-left of the canvas.
    pub fn draw_image(&mut self, image: &RgbaImage) {
        debug!(w = image.width(), h = image.height(), "drawing image");
        self.surface.draw_image(image, 0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    const WHITE: color::Rgba = [255, 255, 255, 255];
    const BLACK: color::Rgba = [0, 0, 0, 255];

    fn session(w: usize, h: usize) -> CanvasSession {
        CanvasSession::new(w, h, WHITE, BLACK, 2)
    }

    fn black_pixels(s: &CanvasSession) -> usize {
        s.surface().frame().pixels.iter().filter(|&&p| p == 0).count()
    }

    #[test]
    fn move_without_down_draws_nothing() {
        let mut s = session(20, 20);
        assert_eq!(s.pointer_move(Point::new(5, 5)), 0);
        assert_eq!(black_pixels(&s), 0);
    }

    #[test]
    fn fills_only_between_down_and_up() {
        let mut s = session(20, 20);
        s.pointer_down(Point::new(1, 1));
        assert_eq!(s.pointer_move(Point::new(3, 1)), 3);
        assert_eq!(s.pointer_move(Point::new(3, 3)), 3);
        s.pointer_up();
        let before = s.surface().frame().clone();
        assert_eq!(s.pointer_move(Point::new(10, 10)), 0);
        assert_eq!(s.surface().frame(), &before);
    }

    #[test]
    fn second_down_restarts_stroke() {
        let mut s = session(30, 30);
        s.pointer_down(Point::new(0, 0));
        s.pointer_down(Point::new(20, 20));
        assert_eq!(s.pointer_move(Point::new(21, 20)), 2);
        // Nothing was drawn along the (0,0)->(20,20) diagonal.
        assert_eq!(s.surface().frame().get(10, 10), Some(0x00FF_FFFF));
        assert_eq!(s.surface().frame().get(20, 20), Some(0));
    }

    #[test]
    fn bad_color_keeps_previous_ink() {
        let mut s = session(4, 4);
        assert!(s.set_color("#00ff00"));
        assert!(!s.set_color("definitely not a color"));
        s.pointer_down(Point::new(0, 0));
        s.pointer_move(Point::new(0, 0));
        assert_eq!(s.surface().frame().get(0, 0), Some(0x0000_FF00));
    }

    #[test]
    fn horizontal_stroke_scenario() {
        let mut s = session(100, 100);
        s.pointer_down(Point::new(10, 10));
        assert_eq!(s.pointer_move(Point::new(13, 10)), 4);
        s.pointer_up();

        let blob = block_on(s.to_blob()).unwrap();
        assert_eq!(blob.mime(), PNG_MIME);
        let img = block_on(CanvasSession::get_image(blob)).unwrap();

        for x in 10..=13 {
            assert_eq!(img.get_pixel(x, 10).0, [0, 0, 0, 255], "x={x}");
            // 2x2 dabs reach one row down and one column past the end.
            assert_eq!(img.get_pixel(x + 1, 11).0, [0, 0, 0, 255], "x={x}");
        }
        for (x, y) in [(0, 0), (9, 10), (15, 10), (12, 12), (50, 50), (99, 99)] {
            assert_eq!(img.get_pixel(x, y).0, [255, 255, 255, 255], "({x},{y})");
        }
    }

    #[test]
    fn export_round_trips_onto_fresh_surface() {
        let mut s = session(40, 30);
        s.set_color("red");
        s.pointer_down(Point::new(2, 3));
        s.pointer_move(Point::new(35, 25));
        s.set_color("#0000ff");
        s.pointer_move(Point::new(5, 28));
        s.pointer_up();

        let blob = block_on(s.to_blob()).unwrap();
        let img = block_on(CanvasSession::get_image(blob)).unwrap();
        let mut fresh = session(40, 30);
        fresh.draw_image(&img);
        assert_eq!(fresh.surface().frame(), s.surface().frame());
    }

    #[test]
    fn export_captures_state_at_call_time() {
        let mut s = session(10, 10);
        let pending = s.to_blob();
        s.pointer_down(Point::new(0, 0));
        s.pointer_move(Point::new(9, 9));
        let blob = block_on(pending).unwrap();
        let img = block_on(CanvasSession::get_image(blob)).unwrap();
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let blob = Blob::new(PNG_MIME, b"hello, not a png".to_vec());
        let err = block_on(CanvasSession::get_image(blob)).unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "{err:?}");
    }
}
