//! Deflection puzzle presentation

use glam::Vec2;

use super::font::{self, Align};
use super::framebuffer::{PixelBuffer, Rgba, colors};
use super::hud::{self, StatusLines};
use super::world_view::WorldView;
use crate::consts::deflection::*;
use crate::sim::deflection::{DeflectionGame, MirrorControl};

const BAR_X: i32 = 20;
const BAR_WIDTH: i32 = 180;
const BAR_HEIGHT: i32 = 16;
const BAR_BACKGROUND: Rgba = Rgba::gray(0x22);
const ENGINE_TRAIL: Rgba = Rgba::rgb(0, 0xaa, 0);
const HINT_GRAY: Rgba = Rgba::gray(0x88);

#[derive(Debug, Clone)]
pub struct DeflectionView {
    world: WorldView,
}

impl DeflectionView {
    pub fn new(resolution: u32) -> Self {
        Self {
            world: WorldView::new(
                resolution,
                resolution,
                Vec2::new(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32),
            ),
        }
    }

    pub fn scene(&self) -> &PixelBuffer {
        self.world.buffer()
    }

    pub fn render(&mut self, game: &DeflectionGame, out: &mut PixelBuffer, show_grid: bool) {
        self.draw_scene(game);
        self.world.present(out);
        if show_grid {
            let h = out.height();
            hud::grid(out, h, colors::HUD_GREEN);
        }
        draw_status(game, out);
        if game.overlay_visible() {
            hud::completion_overlay(out, 0.8, "ANALYSIS COMPLETE", "SPECTROSCOPY DATA ACQUIRED");
        }
    }

    fn draw_scene(&mut self, game: &DeflectionGame) {
        let world = &mut self.world;
        world.clear();
        let level = &game.level;

        // Incident segments first, then reflections, in ray order
        for trace in game.traces() {
            world.segment(trace.start, trace.end, 0.8, Rgba::WHITE);
            if let Some(reflection) = trace.reflected {
                let color = if reflection.on_target {
                    colors::HUD_GREEN
                } else {
                    Rgba::WHITE
                };
                world.segment(trace.end, reflection.end, 0.8, color);
            }
        }

        let (a, b) = game.mirror.endpoints();
        world.segment(a, b, 2.0, Rgba::WHITE);

        for ray in &level.rays {
            world.disc(ray.origin, 3.0, Rgba::WHITE);
        }

        let target = level.target;
        world.paint_where(
            Vec2::new(target.left(), target.y - 2.0),
            Vec2::new(target.right(), target.y + 2.0),
            colors::HUD_GREEN,
            |p| (p.y - target.y).abs() < 2.0 && target.contains(p.x),
        );
        world.disc(Vec2::new(target.center_x, target.y), 3.0, colors::HUD_GREEN);
    }
}

fn draw_status(game: &DeflectionGame, out: &mut PixelBuffer) {
    let rays = game.level.rays.len();
    let mut lines = StatusLines::new(out);
    lines
        .line("DEFLECTION PROTOCOL", colors::STATUS_YELLOW)
        .line(&format!("RAYS: {}", rays), colors::HUD_GREEN)
        .line(&format!("HITS: {}/{}", game.hits, rays), colors::HUD_GREEN);

    let analyzing = game.hits >= 1 && !game.is_complete();
    if analyzing {
        lines.line("STATUS: ANALYZING", colors::STATUS_YELLOW);
    } else if game.hits == 0 {
        lines.line("STATUS: ACTIVE", colors::STATUS_YELLOW);
    }
    let bar_y = lines.cursor() - font::GLYPH_HEIGHT;
    if analyzing {
        lines.skip(BAR_HEIGHT + 4);
    }

    lines.line("MOVE: MOUSE", HINT_GRAY);
    if game.control == MirrorControl::Rotatable {
        lines.line("ROTATE: A/D", HINT_GRAY);
    }

    if analyzing {
        ship_bar(out, bar_y, game.hold_progress);
    }
}

/// Hold progress drawn as a small ship crossing the bar
fn ship_bar(out: &mut PixelBuffer, y: i32, progress: f32) {
    out.fill_rect(BAR_X, y, BAR_WIDTH, BAR_HEIGHT, BAR_BACKGROUND);
    hud::stroke_rect(out, BAR_X, y, BAR_WIDTH, BAR_HEIGHT, 1, Rgba::WHITE);

    let fill = progress.clamp(0.0, 100.0) / 100.0 * BAR_WIDTH as f32;
    if fill > 4.0 {
        let body = (fill - 8.0).max(0.0) as i32;
        out.fill_rect(BAR_X + 2, y + 4, body, 8, colors::HUD_GREEN);

        if fill > 8.0 {
            // Nose narrows from 8 px to a point over the last 6 px
            let nose_x = BAR_X + 2 + body;
            let tip = BAR_X as f32 + fill;
            let len = (tip - nose_x as f32).max(1.0);
            let mut x = nose_x;
            while (x as f32) < tip {
                let half = 4.0 * (1.0 - (x - nose_x) as f32 / len);
                let h = (half * 2.0).round() as i32;
                out.fill_rect(x, y + 8 - h / 2, 1, h, colors::HUD_GREEN);
                x += 1;
            }
        }

        if fill > 12.0 {
            let trail = body.min(6);
            out.fill_rect(BAR_X + 2, y + 2, trail, 1, ENGINE_TRAIL);
            out.fill_rect(BAR_X + 2, y + 13, trail, 1, ENGINE_TRAIL);
        }
    }

    font::draw_text(
        out,
        &format!("{}%", progress.floor() as i32),
        BAR_X + BAR_WIDTH + 10,
        y + 11,
        1,
        Align::Left,
        Rgba::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(buf: &PixelBuffer, color: Rgba) -> usize {
        buf.pixels().iter().filter(|p| **p == color).count()
    }

    #[test]
    fn test_solution_paints_green_reflection() {
        let mut game = DeflectionGame::new(11, 50).unwrap();
        let mut view = DeflectionView::new(LOW_RES_WIDTH);
        let mut out = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);

        game.pointer_moved(Vec2::new(-5000.0, -5000.0));
        view.render(&game, &mut out, false);
        let idle_green = count(view.scene(), colors::HUD_GREEN);

        game.pointer_moved(game.level.solution.mirror_pos);
        view.render(&game, &mut out, false);
        assert!(count(view.scene(), colors::HUD_GREEN) > idle_green);
    }

    #[test]
    fn test_overlay_only_during_countdown() {
        let mut game = DeflectionGame::new(3, 50).unwrap();
        let mut view = DeflectionView::new(LOW_RES_WIDTH);
        let mut out = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);

        game.analysis_complete = true;
        game.completion_timer_ms = 500.0;
        view.render(&game, &mut out, false);
        // Box interior under the title is solid black
        assert_eq!(out.get(320, 195), Some(Rgba::BLACK));
        assert!(count(&out, colors::HUD_GREEN) > 0);
    }

    #[test]
    fn test_ship_bar_grows() {
        let mut small = PixelBuffer::new(260, 40);
        ship_bar(&mut small, 10, 10.0);
        let mut large = PixelBuffer::new(260, 40);
        ship_bar(&mut large, 10, 90.0);
        assert!(count(&large, colors::HUD_GREEN) > count(&small, colors::HUD_GREEN));
    }
}
