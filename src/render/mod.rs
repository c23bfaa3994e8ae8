//! Renderer selection and the two drivers.

use crate::foundation::color::Rgb8;
use crate::foundation::error::{MosaicError, MosaicResult};

/// Continuous-redraw driver on a `vello_cpu` surface.
pub mod canvas;
/// Frame scheduling collaborator.
pub mod frame;
/// Renderer mode and selection rule.
pub mod select;
/// Declarative SVG scene.
pub mod svg;

/// Backdrop the mosaic is shown on.
pub const BACKGROUND_COLOR: Rgb8 = Rgb8::new(0x0d, 0x0d, 0x0d);

/// One rendered frame in RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels.
    pub data: Vec<u8>,
    /// `data` carries premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Composite over an opaque `background`, returning opaque RGBA8.
    pub fn flatten(&self, background: Rgb8) -> MosaicResult<Vec<u8>> {
        let expected = (self.width as usize) * (self.height as usize) * 4;
        if self.data.len() != expected {
            return Err(MosaicError::validation(
                "frame data size mismatch with width*height*4",
            ));
        }

        let [bg_r, bg_g, bg_b] = background.channels().map(u16::from);
        let mut out = vec![0u8; expected];
        for (d, s) in out.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
            let a = u16::from(s[3]);
            let inv = 255 - a;
            let src = |c: u8| {
                if self.premultiplied {
                    u16::from(c)
                } else {
                    mul_div255(u16::from(c), a)
                }
            };
            d[0] = (src(s[0]) + mul_div255(bg_r, inv)).min(255) as u8;
            d[1] = (src(s[1]) + mul_div255(bg_g, inv)).min(255) as u8;
            d[2] = (src(s[2]) + mul_div255(bg_b, inv)).min(255) as u8;
            d[3] = 255;
        }
        Ok(out)
    }
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame_rgba.rs"]
mod tests;
