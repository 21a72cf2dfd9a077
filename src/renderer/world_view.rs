//! Low-res scene rasterization in canvas coordinates
//!
//! Each low-res pixel samples the canvas-space point at its top-left corner
//! and asks simple geometric questions about it (near a segment, inside a
//! disc, on a ring). Only pixels inside a primitive's bounding box are
//! visited. A pixel keeps the first color painted onto it, so draw order is
//! priority order.

use glam::Vec2;

use super::framebuffer::{PixelBuffer, Rgba};
use super::hud::distance_to_segment;

#[derive(Debug, Clone)]
pub struct WorldView {
    buf: PixelBuffer,
    world: Vec2,
    painted: Vec<bool>,
}

impl WorldView {
    /// `width × height` pixels covering a `world` sized canvas
    pub fn new(width: u32, height: u32, world: Vec2) -> Self {
        Self {
            buf: PixelBuffer::new(width, height),
            world,
            painted: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buf
    }

    pub fn world_size(&self) -> Vec2 {
        self.world
    }

    /// Back to an unpainted black scene
    pub fn clear(&mut self) {
        self.buf.fill(Rgba::BLACK);
        self.painted.fill(false);
    }

    /// Canvas point sampled by pixel (px, py)
    #[inline]
    pub fn sample_point(&self, px: u32, py: u32) -> Vec2 {
        Vec2::new(
            px as f32 / self.buf.width() as f32 * self.world.x,
            py as f32 / self.buf.height() as f32 * self.world.y,
        )
    }

    /// Paint every unpainted pixel in the canvas box `min..max` whose sample
    /// point satisfies `hit`
    pub fn paint_where(&mut self, min: Vec2, max: Vec2, color: Rgba, hit: impl Fn(Vec2) -> bool) {
        let (w, h) = (self.buf.width(), self.buf.height());
        if w == 0 || h == 0 || self.world.x <= 0.0 || self.world.y <= 0.0 {
            return;
        }
        let sx = w as f32 / self.world.x;
        let sy = h as f32 / self.world.y;
        let x0 = ((min.x * sx).floor().max(0.0)) as u32;
        let y0 = ((min.y * sy).floor().max(0.0)) as u32;
        let x1 = ((max.x * sx).ceil().max(0.0) as u32).min(w - 1);
        let y1 = ((max.y * sy).ceil().max(0.0) as u32).min(h - 1);

        for py in y0..=y1 {
            for px in x0..=x1 {
                let i = py as usize * w as usize + px as usize;
                if self.painted[i] {
                    continue;
                }
                if hit(self.sample_point(px, py)) {
                    self.painted[i] = true;
                    self.buf.set(px as i32, py as i32, color);
                }
            }
        }
    }

    /// Points within `threshold` of the segment
    pub fn segment(&mut self, a: Vec2, b: Vec2, threshold: f32, color: Rgba) {
        let pad = Vec2::splat(threshold);
        self.paint_where(a.min(b) - pad, a.max(b) + pad, color, |p| {
            distance_to_segment(p, a, b) <= threshold
        });
    }

    /// Consecutive segments through `points`
    pub fn polyline(&mut self, points: &[Vec2], threshold: f32, color: Rgba) {
        for pair in points.windows(2) {
            self.segment(pair[0], pair[1], threshold, color);
        }
    }

    pub fn disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let pad = Vec2::splat(radius);
        self.paint_where(center - pad, center + pad, color, |p| p.distance(center) <= radius);
    }

    /// Points whose distance from `center` is within `thickness` of `radius`
    pub fn ring(&mut self, center: Vec2, radius: f32, thickness: f32, color: Rgba) {
        let pad = Vec2::splat(radius + thickness);
        self.paint_where(center - pad, center + pad, color, |p| {
            (p.distance(center) - radius).abs() <= thickness
        });
    }

    /// Whole-canvas pass for rules without a useful bounding box
    pub fn paint_all(&mut self, color: Rgba, hit: impl Fn(Vec2) -> bool) {
        let world = self.world;
        self.paint_where(Vec2::ZERO, world, color, hit);
    }

    /// Stretch the scene onto the display buffer
    pub fn present(&self, out: &mut PixelBuffer) {
        self.buf.upscale_nearest(out);
    }
}
