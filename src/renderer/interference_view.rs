//! Wave interference puzzle presentation

use glam::Vec2;

use super::font::{self, Align};
use super::framebuffer::{PixelBuffer, Rgba, colors};
use super::hud::{self, StatusLines, distance_to_segment};
use super::world_view::WorldView;
use crate::OFFSET_PERIOD;
use crate::consts::interference::*;
use crate::sim::interference::{InterferenceGame, composite_value};

const SLIDER_WIDTH: i32 = 16;
const SLIDER_HEIGHT: i32 = 20;

#[derive(Debug, Clone)]
pub struct InterferenceView {
    world: WorldView,
}

impl InterferenceView {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            world: WorldView::new(
                width,
                height,
                Vec2::new(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32),
            ),
        }
    }

    pub fn scene(&self) -> &PixelBuffer {
        self.world.buffer()
    }

    pub fn render(&mut self, game: &InterferenceGame, out: &mut PixelBuffer, show_grid: bool) {
        self.draw_scene(game);
        self.world.present(out);
        if show_grid {
            hud::grid(out, WAVE_DISPLAY_HEIGHT, colors::HUD_GREEN);
        }
        draw_target_lines(game, out);
        draw_status(game, out);
        hud::proximity_dial(
            out,
            Vec2::new(CANVAS_WIDTH as f32 / 2.0, DIAL_CENTER_Y),
            DIAL_RADIUS,
            game.level.overall_proximity(),
            game.won,
        );
        if game.won && !game.is_complete() {
            draw_win_overlay(out, game.completion_progress());
        }
        draw_controls(game, out);
    }

    /// Composite wave over a faint center line
    fn draw_scene(&mut self, game: &InterferenceGame) {
        let world = &mut self.world;
        world.clear();
        let display = WAVE_DISPLAY_HEIGHT as f32;
        let center_y = display / 2.0;
        let samples = world.buffer().width();

        let points: Vec<Vec2> = (0..samples)
            .map(|i| {
                let t = i as f32 / samples as f32;
                let value = composite_value(&game.level.waves, t * OFFSET_PERIOD);
                Vec2::new(t * CANVAS_WIDTH as f32, center_y - value * AMPLITUDE_SCALE)
            })
            .collect();

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let pad = Vec2::splat(1.5);
            world.paint_where(a.min(b) - pad, a.max(b) + pad, colors::WAVE_CYAN, |p| {
                p.y < display && distance_to_segment(p, a, b) <= 1.5
            });
        }

        world.paint_where(
            Vec2::new(0.0, center_y - 1.0),
            Vec2::new(CANVAS_WIDTH as f32, center_y + 1.0),
            colors::CENTER_LINE,
            |p| (p.y - center_y).abs() < 1.0,
        );
    }
}

fn draw_target_lines(game: &InterferenceGame, out: &mut PixelBuffer) {
    let center_y = WAVE_DISPLAY_HEIGHT as f32 / 2.0;
    let offset = game.level.target_amplitude * AMPLITUDE_SCALE;
    let width = CANVAS_WIDTH as f32;
    hud::dashed_hline(out, center_y - offset, 0.0, width, 2.0, colors::HUD_GREEN);
    hud::dashed_hline(out, center_y + offset, 0.0, width, 2.0, colors::HUD_GREEN);
}

fn draw_status(game: &InterferenceGame, out: &mut PixelBuffer) {
    StatusLines::new(out)
        .line("WAVE INTERFERENCE", colors::HUD_GREEN)
        .line(&format!("AMPLITUDE: {:.2}", game.peak), colors::HUD_GREEN)
        .line(
            &format!("TARGET: {:.2}", game.level.target_amplitude),
            colors::HUD_GREEN,
        );
    StatusLines::right(out)
        .line("DRAG BARS TO ALIGN", colors::HUD_GREEN)
        .line("WAVE PEAKS", colors::HUD_GREEN);
}

fn draw_win_overlay(out: &mut PixelBuffer, progress: f32) {
    let (w, h) = (out.width() as i32, out.height() as i32);
    out.blend_rect(0, 0, w, h, Rgba::BLACK, 0.7);
    font::draw_text(out, "SIGNAL CLEARED", w / 2, h / 2 - 30, 3, Align::Center, colors::HUD_GREEN);

    let (bar_w, bar_h) = (300, 20);
    let bar_x = (w - bar_w) / 2;
    let bar_y = h / 2 + 10;
    hud::stroke_rect(out, bar_x, bar_y, bar_w, bar_h, 2, colors::HUD_GREEN);
    let fill = ((bar_w - 4) as f32 * progress.clamp(0.0, 1.0)) as i32;
    out.fill_rect(bar_x + 2, bar_y + 2, fill, bar_h - 4, colors::HUD_GREEN);
}

/// Slider box, one track per wave, proximity dots
fn draw_controls(game: &InterferenceGame, out: &mut PixelBuffer) {
    let width = CANVAS_WIDTH as i32;
    let display = WAVE_DISPLAY_HEIGHT as i32;
    let control_h = (CANVAS_HEIGHT - WAVE_DISPLAY_HEIGHT) as i32;
    let padding = width / 10;
    let box_right = width - padding;

    hud::stroke_rect(out, padding, display + 10, width - padding * 2, control_h - 20, 2, Rgba::WHITE);

    let row = (control_h - 40) as f32 / WAVE_COUNT as f32;
    for (i, wave) in game.level.waves.iter().enumerate() {
        let proximity = game.level.proximity(i);
        let bar_y = display as f32 + 20.0 + i as f32 * row + row / 2.0;

        hud::stroke_line(
            out,
            Vec2::new(game.track.left, bar_y),
            Vec2::new(game.track.right, bar_y),
            2.0,
            Rgba::WHITE,
            1.0,
        );

        let sx = game.track.x_for(wave.offset) as i32;
        let (left, top) = (sx - SLIDER_WIDTH / 2, bar_y as i32 - SLIDER_HEIGHT / 2);
        out.fill_rect(left, top, SLIDER_WIDTH, SLIDER_HEIGHT, Rgba::WHITE);
        let edge = if proximity > 0.85 {
            Rgba::WHITE
        } else {
            colors::SLIDER_IDLE
        };
        hud::stroke_rect(out, left, top, SLIDER_WIDTH, SLIDER_HEIGHT, 2, edge);

        let dot = if proximity > 0.9 {
            colors::HUD_GREEN
        } else if proximity > 0.7 {
            colors::PROXIMITY_NEAR
        } else {
            colors::PROXIMITY_FAR
        };
        out.fill_circle(Vec2::new((box_right - 15) as f32, bar_y), 3.0, dot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(buf: &PixelBuffer, color: Rgba) -> usize {
        buf.pixels().iter().filter(|p| **p == color).count()
    }

    #[test]
    fn test_wave_stays_in_display_area() {
        let game = InterferenceGame::new(4);
        let mut view = InterferenceView::new(LOW_RES_WIDTH, LOW_RES_HEIGHT);
        let mut out = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        view.render(&game, &mut out, true);

        let scene = view.scene();
        assert!(count(scene, colors::WAVE_CYAN) > 0);
        // Rows at or below the display boundary (y = 75 in the low-res scene)
        for py in 75..LOW_RES_HEIGHT as i32 {
            for px in 0..LOW_RES_WIDTH as i32 {
                assert_ne!(scene.get(px, py), Some(colors::WAVE_CYAN));
            }
        }
    }

    #[test]
    fn test_sliders_drawn_for_each_wave() {
        let game = InterferenceGame::new(4);
        let mut view = InterferenceView::new(LOW_RES_WIDTH, LOW_RES_HEIGHT);
        let mut out = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        view.render(&game, &mut out, false);

        for i in 0..WAVE_COUNT {
            let y = 330 + 20 * i as i32;
            let x = game.track.x_for(game.level.waves[i].offset) as i32;
            assert_eq!(out.get(x, y), Some(Rgba::WHITE));
        }
    }
}
