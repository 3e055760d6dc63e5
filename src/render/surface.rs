use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::render::composite::over_in_place;

/// Premultiplied RGBA8 pixel buffer that figures are composed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl Frame {
    /// Fully transparent frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap premultiplied bytes.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> SlidefigResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(SlidefigError::render(format!(
                "frame byte length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiply a straight-alpha image.
    pub fn from_straight(image: &image::RgbaImage) -> Self {
        let mut data = image.as_raw().clone();
        premultiply_rgba8_in_place(&mut data);
        Self {
            width: image.width(),
            height: image.height(),
            data,
        }
    }

    /// Straight-alpha copy for encoders.
    pub fn to_straight(&self) -> SlidefigResult<image::RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| SlidefigError::render("frame buffer does not match its size"))
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Copy of a sub-rectangle, which must lie inside the frame.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> SlidefigResult<Frame> {
        if u64::from(x) + u64::from(width) > u64::from(self.width)
            || u64::from(y) + u64::from(height) > u64::from(self.height)
        {
            return Err(SlidefigError::render(format!(
                "crop {width}x{height}+{x}+{y} exceeds frame {}x{}",
                self.width, self.height
            )));
        }
        let mut out = Vec::with_capacity((width as usize) * (height as usize) * 4);
        let stride = self.width as usize * 4;
        for row in y..y + height {
            let start = row as usize * stride + x as usize * 4;
            out.extend_from_slice(&self.data[start..start + width as usize * 4]);
        }
        Frame::from_premul(width, height, out)
    }

    /// Composite `src` over this frame with its top-left at `(x, y)`, clipped to the frame.
    pub fn composite_at(&mut self, src: &Frame, x: i64, y: i64) -> SlidefigResult<()> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(src.width)).min(i64::from(self.width));
        let y1 = (y + i64::from(src.height)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }
        let span = ((x1 - x0) as usize) * 4;
        let sx = (x0 - x) as usize;
        for dy in y0..y1 {
            let sy = (dy - y) as usize;
            let s_off = (sy * src.width as usize + sx) * 4;
            let d_off = ((dy as usize) * self.width as usize + x0 as usize) * 4;
            over_in_place(
                &mut self.data[d_off..d_off + span],
                &src.data[s_off..s_off + span],
                1.0,
            )?;
        }
        Ok(())
    }

    /// Composite `src` scaled nearest-neighbour into the `width x height` box at `(x, y)`.
    pub fn composite_scaled(
        &mut self,
        src: &Frame,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    ) -> SlidefigResult<()> {
        if src.width == width && src.height == height {
            return self.composite_at(src, x, y);
        }
        if src.width == 0 || src.height == 0 || width == 0 || height == 0 {
            return Ok(());
        }
        let mut scaled = Frame::new(width, height);
        for ty in 0..height {
            let sy = ((u64::from(ty) * u64::from(src.height)) / u64::from(height)) as u32;
            for tx in 0..width {
                let sx = ((u64::from(tx) * u64::from(src.width)) / u64::from(width)) as u32;
                let i = ((ty as usize) * (width as usize) + tx as usize) * 4;
                scaled.data[i..i + 4].copy_from_slice(&src.pixel(sx, sy));
            }
        }
        self.composite_at(&scaled, x, y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
