//! Premultiplied RGBA8 source-over arithmetic.

use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// `src` over `dst` with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite equally sized premultiplied buffers in place.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SlidefigResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SlidefigError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Blend a straight-alpha overlay onto a premultiplied buffer at `opacity`.
///
/// Overlay alpha and `opacity` multiply, so unclassified (alpha 0) pixels leave `dst`
/// untouched.
pub fn blend_straight_in_place(dst: &mut [u8], overlay: &[u8], opacity: f32) -> SlidefigResult<()> {
    if dst.len() != overlay.len() || !dst.len().is_multiple_of(4) {
        return Err(SlidefigError::render(
            "overlay size does not match the base layer",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(overlay.chunks_exact(4)) {
        let a = u16::from(s[3]);
        let src = [
            mul_div255_u8(u16::from(s[0]), a),
            mul_div255_u8(u16::from(s[1]), a),
            mul_div255_u8(u16::from(s[2]), a),
            s[3],
        ];
        let out = over([d[0], d[1], d[2], d[3]], src, opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
