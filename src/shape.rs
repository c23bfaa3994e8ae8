//! Geometric masks over normalized layout coordinates.
//!
//! Coordinates are normalized to `[0, 1]` on both axes with `(0.5, 0.5)` at the center of the
//! output box.

use serde::{Deserialize, Serialize};

/// Layout mask applied to the sampled grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ShapeKind {
    /// No masking.
    #[default]
    Square,
    /// Inscribed circle of radius 0.5.
    Circle,
    /// Superellipse `|x|^4 + |y|^4 <= 1`.
    Squircle,
    /// Diamond `|dx| + |dy| <= 0.5`.
    Diamond,
    /// Regular hexagon with circumradius 0.5.
    Hexagon,
    /// Right-pointing "play" triangle.
    Play,
}

impl ShapeKind {
    /// Parse a shape identifier. Unknown identifiers yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        Some(match id.trim().to_ascii_lowercase().as_str() {
            "square" => Self::Square,
            "circle" => Self::Circle,
            "squircle" => Self::Squircle,
            "diamond" => Self::Diamond,
            "hexagon" => Self::Hexagon,
            "play" => Self::Play,
            _ => return None,
        })
    }

    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Circle => "circle",
            Self::Squircle => "squircle",
            Self::Diamond => "diamond",
            Self::Hexagon => "hexagon",
            Self::Play => "play",
        }
    }
}

impl From<String> for ShapeKind {
    fn from(id: String) -> Self {
        Self::parse(&id).unwrap_or_else(|| {
            tracing::warn!(shape = %id, "unknown shape, layout left unmasked");
            Self::Square
        })
    }
}

/// Return `true` when `(nx, ny)` lies inside `shape`.
pub fn inside_shape(nx: f64, ny: f64, shape: ShapeKind) -> bool {
    match shape {
        ShapeKind::Square => true,
        ShapeKind::Circle => {
            let dx = nx - 0.5;
            let dy = ny - 0.5;
            dx * dx + dy * dy <= 0.25
        }
        ShapeKind::Squircle => {
            let x = (nx - 0.5).abs() * 2.0;
            let y = (ny - 0.5).abs() * 2.0;
            x.powi(4) + y.powi(4) <= 1.0
        }
        ShapeKind::Diamond => (nx - 0.5).abs() + (ny - 0.5).abs() <= 0.5,
        ShapeKind::Hexagon => point_in_polygon(nx, ny, &hexagon_vertices()),
        ShapeKind::Play => point_in_triangle(nx, ny, PLAY_TRIANGLE),
    }
}

/// Like [`inside_shape`], but keyed by identifier. Unknown identifiers never mask.
pub fn inside_shape_id(nx: f64, ny: f64, id: &str) -> bool {
    ShapeKind::parse(id).is_none_or(|shape| inside_shape(nx, ny, shape))
}

const PLAY_TRIANGLE: [(f64, f64); 3] = [(0.22, 0.28), (0.22, 0.72), (0.82, 0.5)];

/// Vertices in order: top, upper-right, lower-right, bottom, lower-left, upper-left.
fn hexagon_vertices() -> [(f64, f64); 6] {
    let (cx, cy, r) = (0.5, 0.5, 0.5);
    let dx = r * 3f64.sqrt() / 2.0;
    [
        (cx, cy - r),
        (cx + dx, cy - r / 2.0),
        (cx + dx, cy + r / 2.0),
        (cx, cy + r),
        (cx - dx, cy + r / 2.0),
        (cx - dx, cy - r / 2.0),
    ]
}

// Even-odd ray casting.
fn point_in_polygon(px: f64, py: f64, vertices: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = vertices.len().wrapping_sub(1);
    for (i, &(xi, yi)) in vertices.iter().enumerate() {
        let (xj, yj) = vertices[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn point_in_triangle(px: f64, py: f64, [a, b, c]: [(f64, f64); 3]) -> bool {
    fn sign(p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)) -> f64 {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    }
    let p = (px, py);
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
#[path = "../tests/unit/shape.rs"]
mod tests;
