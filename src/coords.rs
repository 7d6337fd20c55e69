// src/coords.rs
use crate::error::OverlayError;
use web_sys::DomRect;

/// Rendered box of a page image, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_rect(rect: &DomRect) -> Self {
        Self::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Fractional position of a pointer inside this box. Not clamped: a click
    /// just outside the image yields values below 0 or above 1.
    pub fn fraction_at(&self, client_x: f64, client_y: f64) -> Result<(f64, f64), OverlayError> {
        if self.is_degenerate() {
            return Err(OverlayError::DegenerateGeometry {
                width: self.width,
                height: self.height,
            });
        }
        Ok((
            (client_x - self.left) / self.width,
            (client_y - self.top) / self.height,
        ))
    }
}

/// CSS `top` for a bubble anchored at `y_pct` of its panel.
pub fn bubble_top(y_pct: f64) -> String {
    format!("{}%", y_pct * 100.0)
}
