use serde::{Deserialize, Serialize};

/// Visible dot count above which `auto` switches to the canvas driver.
pub const AUTO_CANVAS_THRESHOLD: usize = 520;

/// Requested renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Pick by dot count.
    #[default]
    Auto,
    /// Declarative vector scene.
    Svg,
    /// Continuous redraw.
    Canvas,
}

/// Renderer actually used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// [`crate::render::svg::SvgScene`].
    Svg,
    /// [`crate::render::canvas::CanvasDriver`].
    Canvas,
}

impl RenderMode {
    /// Explicit modes are honored verbatim; `auto` picks canvas past [`AUTO_CANVAS_THRESHOLD`].
    pub fn resolve(self, dot_count: usize) -> RendererKind {
        match self {
            Self::Svg => RendererKind::Svg,
            Self::Canvas => RendererKind::Canvas,
            Self::Auto if dot_count > AUTO_CANVAS_THRESHOLD => RendererKind::Canvas,
            Self::Auto => RendererKind::Svg,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/select.rs"]
mod tests;
