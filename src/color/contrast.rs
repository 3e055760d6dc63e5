use crate::foundation::core::Color;

/// Relative luminance in `[0, 1]` using Rec. 601 weights.
pub fn luminance(c: Color) -> f64 {
    (0.299 * f64::from(c.r) + 0.587 * f64::from(c.g) + 0.114 * f64::from(c.b)) / 255.0
}

/// Black for bright colors, white for dark ones.
pub fn outline_for(primary: Color) -> Color {
    if luminance(primary) > 0.5 {
        Color::BLACK
    } else {
        Color::WHITE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/contrast.rs"]
mod tests;
