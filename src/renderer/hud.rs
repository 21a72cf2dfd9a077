//! HUD drawing at display resolution
//!
//! Everything here draws straight onto the full-size buffer after the
//! low-res scene has been upscaled: grid, status text, dials, bars and the
//! completion overlays.

use glam::Vec2;

use super::font::{self, Align};
use super::framebuffer::{PixelBuffer, Rgba, colors};
use crate::consts::hud::*;

/// Distance from `p` to the segment `a..b`
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Segment of the given thickness, anti-aliasing free
pub fn stroke_line(buf: &mut PixelBuffer, a: Vec2, b: Vec2, thickness: f32, color: Rgba, alpha: f32) {
    let half = (thickness / 2.0).max(0.5);
    let min = a.min(b) - Vec2::splat(half + 1.0);
    let max = a.max(b) + Vec2::splat(half + 1.0);
    for py in (min.y.floor() as i32).max(0)..=(max.y.ceil() as i32).min(buf.height() as i32 - 1) {
        for px in (min.x.floor() as i32).max(0)..=(max.x.ceil() as i32).min(buf.width() as i32 - 1) {
            let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            if distance_to_segment(p, a, b) <= half {
                buf.blend_pixel(px, py, color, alpha);
            }
        }
    }
}

/// Horizontal dashed line, 4 on / 4 off
pub fn dashed_hline(buf: &mut PixelBuffer, y: f32, x0: f32, x1: f32, thickness: f32, color: Rgba) {
    let top = (y - thickness / 2.0).round() as i32;
    let mut x = x0;
    while x < x1 {
        let end = (x + 4.0).min(x1);
        buf.fill_rect(x.round() as i32, top, (end - x).round() as i32, thickness as i32, color);
        x += 8.0;
    }
}

pub fn stroke_rect(buf: &mut PixelBuffer, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: Rgba) {
    buf.fill_rect(x, y, w, thickness, color);
    buf.fill_rect(x, y + h - thickness, w, thickness, color);
    buf.fill_rect(x, y, thickness, h, color);
    buf.fill_rect(x + w - thickness, y, thickness, h, color);
}

/// Circle outline centered on the radius
pub fn stroke_circle(buf: &mut PixelBuffer, center: Vec2, radius: f32, thickness: f32, color: Rgba) {
    let half = thickness / 2.0;
    let outer = radius + half;
    let x0 = (center.x - outer).floor() as i32;
    let x1 = (center.x + outer).ceil() as i32;
    let y0 = (center.y - outer).floor() as i32;
    let y1 = (center.y + outer).ceil() as i32;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5).distance(center);
            if (d - radius).abs() <= half {
                buf.set(px, py, color);
            }
        }
    }
}

/// Faint square grid down to `max_y`
pub fn grid(buf: &mut PixelBuffer, max_y: u32, color: Rgba) {
    let w = buf.width() as i32;
    let h = max_y.min(buf.height()) as i32;
    let spacing = GRID_SPACING as usize;
    for x in (0..=w).step_by(spacing) {
        buf.blend_rect(x, 0, 1, h, color, GRID_ALPHA);
    }
    for y in (0..=h).step_by(spacing) {
        buf.blend_rect(0, y, w, 1, color, GRID_ALPHA);
    }
}

/// Stacked status lines starting at the HUD origin
#[derive(Debug)]
pub struct StatusLines<'a> {
    buf: &'a mut PixelBuffer,
    x: i32,
    y: i32,
    align: Align,
}

impl<'a> StatusLines<'a> {
    /// Left column at (20, 25)
    pub fn new(buf: &'a mut PixelBuffer) -> Self {
        Self {
            buf,
            x: TEXT_X,
            y: TEXT_Y,
            align: Align::Left,
        }
    }

    /// Right column ending 20 px from the right edge
    pub fn right(buf: &'a mut PixelBuffer) -> Self {
        let x = buf.width() as i32 - TEXT_X;
        Self {
            buf,
            x,
            y: TEXT_Y,
            align: Align::Right,
        }
    }

    pub fn line(&mut self, text: &str, color: Rgba) -> &mut Self {
        font::draw_text(self.buf, text, self.x, self.y, 1, self.align, color);
        self.y += LINE_HEIGHT;
        self
    }

    /// Leave a gap before the next line
    pub fn skip(&mut self, px: i32) -> &mut Self {
        self.y += px;
        self
    }

    /// Baseline of the next line
    pub fn cursor(&self) -> i32 {
        self.y
    }

    /// Outlined bar with an inset fill, then advance past it
    pub fn progress_bar(&mut self, width: i32, height: i32, progress: f32, color: Rgba) -> &mut Self {
        progress_bar(self.buf, self.x, self.y, width, height, progress, color);
        self.y += height + LINE_HEIGHT;
        self
    }
}

/// 1 px outline with a fill inset by 2 px
pub fn progress_bar(
    buf: &mut PixelBuffer,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    progress: f32,
    color: Rgba,
) {
    stroke_rect(buf, x, y, w, h, 1, color);
    let fill = ((w - 4) as f32 * progress.clamp(0.0, 1.0)) as i32;
    buf.fill_rect(x + 2, y + 2, fill, h - 4, color);
}

/// Proximity dial: needle sweeps 270° from straight up, check mark once won
pub fn proximity_dial(buf: &mut PixelBuffer, center: Vec2, radius: f32, proximity: f32, won: bool) {
    if won {
        buf.blend_circle(center, radius, colors::HUD_GREEN, 0.2);
        stroke_circle(buf, center, radius, 3.0, colors::HUD_GREEN);
        stroke_line(buf, center + Vec2::new(-10.0, 0.0), center + Vec2::new(-3.0, 8.0), 3.0, colors::HUD_GREEN, 1.0);
        stroke_line(buf, center + Vec2::new(-3.0, 8.0), center + Vec2::new(12.0, -8.0), 3.0, colors::HUD_GREEN, 1.0);
        font::draw_text(
            buf,
            "SUCCESS",
            center.x as i32,
            (center.y + radius + 14.0) as i32,
            1,
            Align::Center,
            colors::HUD_GREEN,
        );
        return;
    }

    stroke_circle(buf, center, radius, 2.0, colors::HUD_GREEN);
    let close = proximity > 0.9;
    let color = if close { colors::HUD_GREEN } else { Rgba::WHITE };
    let angle = -std::f32::consts::FRAC_PI_2 + proximity * std::f32::consts::PI * 1.5;
    let tip = center + Vec2::new(angle.cos(), angle.sin()) * (radius - 5.0);
    stroke_line(buf, center, tip, 2.0, color, 1.0);
    buf.fill_circle(center, 3.0, Rgba::WHITE);

    let x = center.x as i32;
    let y = (center.y + radius) as i32;
    font::draw_text(buf, &format!("{:.0}%", proximity * 100.0), x, y + 12, 1, Align::Center, color);
    font::draw_text(buf, "ALIGNMENT", x, y + 22, 1, Align::Center, color);
}

/// Corner bracket marks around a box
pub fn corner_brackets(buf: &mut PixelBuffer, x: i32, y: i32, w: i32, h: i32, len: i32, color: Rgba) {
    for (cx, cy, sx, sy) in [(x, y, 1, 1), (x + w, y, -1, 1), (x, y + h, 1, -1), (x + w, y + h, -1, -1)] {
        let hx = if sx > 0 { cx } else { cx - len };
        let vy = if sy > 0 { cy } else { cy - len };
        buf.fill_rect(hx, cy - (sy < 0) as i32 * 2, len, 2, color);
        buf.fill_rect(cx - (sx < 0) as i32 * 2, vy, 2, len, color);
    }
}

/// Darkened screen with a bracketed message box in the middle
pub fn completion_overlay(buf: &mut PixelBuffer, dim: f32, title: &str, subtitle: &str) {
    let (w, h) = (buf.width() as i32, buf.height() as i32);
    buf.blend_rect(0, 0, w, h, Rgba::BLACK, dim);

    let (box_w, box_h) = (400, 120);
    let bx = (w - box_w) / 2;
    let by = (h - box_h) / 2;
    buf.fill_rect(bx, by, box_w, box_h, Rgba::BLACK);
    stroke_rect(buf, bx, by, box_w, box_h, 2, colors::HUD_GREEN);
    corner_brackets(buf, bx - 6, by - 6, box_w + 12, box_h + 12, 20, colors::HUD_GREEN);

    font::draw_text(buf, title, w / 2, h / 2 - 8, 3, Align::Center, colors::HUD_GREEN);
    font::draw_text(buf, subtitle, w / 2, h / 2 + 24, 1, Align::Center, colors::HUD_GREEN);
}
