// Color strings in, packed 0x00RRGGBB pixels out.
// Visual: the swatch the user picked becomes the ink of the next stroke.

use crate::error::Error;

/// Straight (non-premultiplied) RGBA, one byte per channel.
pub type Rgba = [u8; 4];

/// Parse any CSS color string ("black", "#f00", "#336699cc", "rgb(0 0 255)").
pub fn parse_color(s: &str) -> Result<Rgba, Error> {
    let parsed = csscolorparser::parse(s.trim())
        .map_err(|e| Error::Config(format!("color {s:?}: {e}")))?;
    Ok(parsed.to_rgba8())
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}

/// Source-over composite of `src` onto an opaque destination pixel.
/// Visual: opaque ink replaces the pixel, translucent ink tints it,
/// fully transparent ink leaves it untouched.
#[inline]
pub fn blend_over(dst: u32, src: Rgba) -> u32 {
    let [r, g, b, a] = src;
    match a {
        255 => pack_rgb(r, g, b),
        0 => dst,
        _ => {
            let (dr, dg, db) = unpack_rgb(dst);
            let a = a as u32;
            let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
            pack_rgb(mix(r, dr), mix(g, dg), mix(b, db))
        }
    }
}
