//! CPU pixel buffers
//!
//! Every visualizer draws into a small `PixelBuffer` which is then stretched
//! onto the display buffer with nearest-neighbor sampling. No filtering is
//! ever applied, so each low-res pixel stays a crisp block.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// RGBA8 color, laid out exactly like canvas `ImageData`
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn gray(v: u8) -> Self {
        Self::rgb(v, v, v)
    }

    /// Mix `other` over `self` with coverage `alpha` in [0, 1]
    pub fn blend(self, other: Rgba, alpha: f32) -> Rgba {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |dst: u8, src: u8| (dst as f32 + (src as f32 - dst as f32) * a).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: 255,
        }
    }

    /// Perceptual brightness in [0, 255]
    pub fn luma(self) -> f32 {
        0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32
    }
}

/// Palette shared by the renderers
pub mod colors {
    use super::Rgba;

    pub const HUD_GREEN: Rgba = Rgba::rgb(0, 255, 0);
    pub const ALERT_RED: Rgba = Rgba::rgb(255, 0, 0);
    pub const STATUS_YELLOW: Rgba = Rgba::rgb(255, 255, 0);
    pub const WARN_ORANGE: Rgba = Rgba::rgb(255, 136, 0);
    pub const WAVE_CYAN: Rgba = Rgba::rgb(0, 255, 255);
    pub const CENTER_LINE: Rgba = Rgba::gray(40);
    pub const DIM_GRAY: Rgba = Rgba::gray(100);
    pub const MID_GRAY: Rgba = Rgba::gray(128);
    pub const SLIDER_IDLE: Rgba = Rgba::gray(136);
    pub const PROXIMITY_FAR: Rgba = Rgba::gray(102);
    pub const PROXIMITY_NEAR: Rgba = Rgba::rgb(255, 170, 0);

    // Cross-section materials
    pub const HABITABLE_SHELL: Rgba = Rgba::rgb(0, 102, 255);
    pub const HIGH_VALUE: Rgba = Rgba::rgb(255, 215, 0);
    pub const ORGANICS: Rgba = Rgba::rgb(0, 255, 0);
    pub const TINT_HABITABLE: Rgba = Rgba::rgb(100, 100, 200);
    pub const TINT_HOSTILE: Rgba = Rgba::rgb(200, 100, 100);
    pub const TINT_NEUTRAL: Rgba = Rgba::rgb(128, 128, 128);
}

/// Row-major RGBA raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Opaque black buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, ready for `ImageData`
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Out-of-bounds writes are dropped
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba, alpha: f32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = self.pixels[i].blend(color, alpha);
        }
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Axis-aligned rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        self.blend_rect(x, y, w, h, color, 1.0);
    }

    pub fn blend_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba, alpha: f32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                if alpha >= 1.0 {
                    self.set(px, py, color);
                } else {
                    self.blend_pixel(px, py, color, alpha);
                }
            }
        }
    }

    /// Filled disc; a pixel is covered when its center is within `radius`
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.blend_circle(center, radius, color, 1.0);
    }

    pub fn blend_circle(&mut self, center: Vec2, radius: f32, color: Rgba, alpha: f32) {
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let x0 = (center.x - radius).floor() as i32;
        let x1 = (center.x + radius).ceil() as i32;
        let y0 = (center.y - radius).floor() as i32;
        let y1 = (center.y + radius).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                if p.distance_squared(center) <= r2 {
                    self.blend_pixel(px, py, color, alpha);
                }
            }
        }
    }

    /// Apply `f` to every pixel
    pub fn map_pixels(&mut self, f: impl Fn(Rgba) -> Rgba) {
        for p in &mut self.pixels {
            *p = f(*p);
        }
    }

    /// Stretch into `dst` by nearest-neighbor sampling
    pub fn upscale_nearest(&self, dst: &mut PixelBuffer) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (sw, sh) = (self.width as u64, self.height as u64);
        let (dw, dh) = (dst.width as u64, dst.height as u64);
        for dy in 0..dh {
            let sy = (dy * sh / dh) as usize;
            let src_row = sy * self.width as usize;
            let dst_row = dy as usize * dst.width as usize;
            for dx in 0..dw {
                let sx = (dx * sw / dw) as usize;
                dst.pixels[dst_row + dx as usize] = self.pixels[src_row + sx];
            }
        }
    }

    /// Binary PPM (P6) snapshot
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut out = Vec::with_capacity(header.len() + self.pixels.len() * 3);
        out.extend_from_slice(header.as_bytes());
        for p in &self.pixels {
            out.extend_from_slice(&[p.r, p.g, p.b]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Rgba>(), 4);
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(1, 0, Rgba::rgb(1, 2, 3));
        assert_eq!(buf.as_bytes(), &[0, 0, 0, 255, 1, 2, 3, 255]);
    }

    #[test]
    fn test_out_of_bounds_writes_ignored() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.set(-1, 0, Rgba::WHITE);
        buf.set(4, 0, Rgba::WHITE);
        buf.fill_rect(-10, -10, 5, 5, Rgba::WHITE);
        assert!(buf.pixels().iter().all(|p| *p == Rgba::BLACK));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.fill_rect(2, 2, 10, 10, Rgba::WHITE);
        let white = buf.pixels().iter().filter(|p| **p == Rgba::WHITE).count();
        assert_eq!(white, 4);
    }

    #[test]
    fn test_blend_halfway() {
        let c = Rgba::BLACK.blend(Rgba::WHITE, 0.5);
        assert!(c.r == 127 || c.r == 128);
        assert_eq!(Rgba::BLACK.blend(Rgba::WHITE, 1.0), Rgba::WHITE);
    }

    #[test]
    fn test_fill_circle_center() {
        let mut buf = PixelBuffer::new(10, 10);
        buf.fill_circle(Vec2::new(5.0, 5.0), 2.0, Rgba::WHITE);
        assert_eq!(buf.get(5, 5), Some(Rgba::WHITE));
        assert_eq!(buf.get(0, 0), Some(Rgba::BLACK));
    }

    #[test]
    fn test_upscale_is_nearest_neighbor() {
        let mut src = PixelBuffer::new(3, 2);
        for y in 0..2 {
            for x in 0..3 {
                src.set(x, y, Rgba::rgb((y * 3 + x) as u8 * 40, 0, 0));
            }
        }
        let mut dst = PixelBuffer::new(640, 480);
        src.upscale_nearest(&mut dst);

        for p in dst.pixels() {
            assert!(src.pixels().contains(p));
        }
        assert_eq!(dst.get(0, 0), src.get(0, 0));
        assert_eq!(dst.get(639, 479), src.get(2, 1));
        assert_eq!(dst.get(320, 0), src.get(1, 0));
    }

    #[test]
    fn test_ppm_header() {
        let buf = PixelBuffer::new(3, 2);
        let ppm = buf.to_ppm();
        assert!(ppm.starts_with(b"P6\n3 2\n255\n"));
        assert_eq!(ppm.len(), b"P6\n3 2\n255\n".len() + 18);
    }
}
