use image::RgbaImage;

use crate::foundation::color::{FALLBACK_COLOR, Rgb8};
use crate::sampling::request::{Sample, SamplingRequest};

/// Largest number of cells per side that is ever laid out.
///
/// Requests above it are sampled as if they asked for exactly this many cells.
pub const MAX_GRID_SIZE: u32 = 1024;

/// Placement of `n` lattice points along one axis of the output box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct AxisLayout {
    pub(crate) spacing: f64,
    pub(crate) offset: f64,
    extent: f64,
}

impl AxisLayout {
    /// Spread `n` points across `extent`, or space them by `gap` and center the lattice.
    ///
    /// A gap wider than the even spacing is narrowed to it so every point stays inside
    /// `[0, extent]`.
    pub(crate) fn new(extent: f64, n: u32, gap: Option<f64>) -> Self {
        let extent = if extent.is_finite() { extent.max(0.0) } else { 0.0 };
        let intervals = f64::from(n.saturating_sub(1));
        let even = extent / intervals.max(1.0);
        let spacing = match gap {
            Some(g) => g.min(even),
            None => even,
        };
        let offset = if n <= 1 {
            extent / 2.0
        } else if spacing < even {
            (extent - spacing * intervals) / 2.0
        } else {
            0.0
        };
        Self {
            spacing,
            offset,
            extent,
        }
    }

    pub(crate) fn position(self, i: u32) -> f64 {
        // Clamp absorbs rounding on the last point (e.g. 9 * (300 / 9) > 300).
        (self.offset + f64::from(i) * self.spacing).clamp(0.0, self.extent)
    }
}

/// Uniform `grid_size x grid_size` lattice in the fallback color, capped at [`MAX_GRID_SIZE`].
pub fn fallback_grid(request: &SamplingRequest) -> Vec<Sample> {
    let n = request.grid_size.min(MAX_GRID_SIZE);
    lattice(request, n, n, |_, _| FALLBACK_COLOR)
}

/// Sample `pixels` (or only its geometry when `None`) at a stride derived from the grid size.
///
/// `image_w`/`image_h` are the natural image dimensions and must be non-zero.
pub(crate) fn sample_pixels(
    image_w: u32,
    image_h: u32,
    pixels: Option<&RgbaImage>,
    request: &SamplingRequest,
) -> Vec<Sample> {
    let grid = request.grid_size.clamp(1, MAX_GRID_SIZE);
    let stride_x = (image_w / grid).max(1);
    let stride_y = (image_h / grid).max(1);
    let cols = image_w.div_ceil(stride_x);
    let rows = image_h.div_ceil(stride_y);

    lattice(request, cols, rows, |gx, gy| {
        let px = gx.saturating_mul(stride_x).min(image_w - 1);
        let py = gy.saturating_mul(stride_y).min(image_h - 1);
        match pixels {
            Some(img) if px < img.width() && py < img.height() => {
                let [r, g, b, _] = img.get_pixel(px, py).0;
                Rgb8::new(r, g, b)
            }
            _ => FALLBACK_COLOR,
        }
    })
}

fn lattice(
    request: &SamplingRequest,
    cols: u32,
    rows: u32,
    mut color_at: impl FnMut(u32, u32) -> Rgb8,
) -> Vec<Sample> {
    let gap = request.effective_gap();
    let xs = AxisLayout::new(request.width, cols, gap);
    let ys = AxisLayout::new(request.height, rows, gap);

    let mut out = Vec::with_capacity((cols as usize).saturating_mul(rows as usize));
    for gy in 0..rows {
        for gx in 0..cols {
            out.push(Sample {
                grid_x: gx,
                grid_y: gy,
                x: xs.position(gx),
                y: ys.position(gy),
                color: color_at(gx, gy).to_hex(),
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/sampling/grid.rs"]
mod tests;
