//! Orbit game presentation
//!
//! Scene at low resolution (progress wedge, preview path, aim line,
//! obstacles, planet, probe), then grid and status text at full size.

use glam::Vec2;

use super::framebuffer::{PixelBuffer, Rgba, colors};
use super::hud::{self, StatusLines};
use super::world_view::WorldView;
use crate::consts::orbit::*;
use crate::sim::orbit::{OrbitGame, OrbitPhase};

/// Half-size of the obstacle X mark
const MARK_SIZE: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct OrbitView {
    world: WorldView,
}

impl OrbitView {
    /// Square low-res scene of `resolution` pixels per side
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

    pub fn render(&mut self, game: &OrbitGame, out: &mut PixelBuffer, show_grid: bool) {
        self.draw_scene(game);
        self.world.present(out);
        if show_grid {
            let h = out.height();
            hud::grid(out, h, colors::HUD_GREEN);
        }
        draw_status(game, out);
    }

    fn draw_scene(&mut self, game: &OrbitGame) {
        let world = &mut self.world;
        world.clear();
        let planet = game.level.planet;

        if let (OrbitPhase::Launching | OrbitPhase::Orbiting, Some(flight)) = (game.phase, game.flight) {
            let inner = planet.radius - 2.0;
            let sweep = flight.sweep;
            world.paint_where(
                planet.pos - Vec2::splat(inner),
                planet.pos + Vec2::splat(inner),
                Rgba::WHITE,
                |p| {
                    let d = p - planet.pos;
                    d.length() < inner && sweep.total != 0.0 && sweep.covers(d.y.atan2(d.x))
                },
            );
        }

        if game.phase == OrbitPhase::Aiming {
            if let Some(preview) = game.preview.as_ref().filter(|t| t.path.len() > 1) {
                let color = if preview.will_crash() {
                    colors::ALERT_RED
                } else if preview.will_escape() {
                    colors::MID_GRAY
                } else {
                    colors::HUD_GREEN
                };
                world.polyline(&preview.path, 1.5, color);
            }
            world.segment(game.level.probe_start, game.pointer, 0.8, colors::DIM_GRAY);
        }

        for obstacle in &game.level.obstacles {
            world.ring(obstacle.pos, obstacle.radius, 2.0, colors::MID_GRAY);
            let c = obstacle.pos;
            let m = MARK_SIZE;
            world.segment(c + Vec2::new(-m, -m), c + Vec2::new(m, m), 0.8, colors::DIM_GRAY);
            world.segment(c + Vec2::new(m, -m), c + Vec2::new(-m, m), 0.8, colors::DIM_GRAY);
        }

        world.ring(planet.pos, planet.radius, 2.0, Rgba::WHITE);
        world.disc(game.probe_pos(), PROBE_RADIUS, Rgba::WHITE);
    }
}

fn draw_status(game: &OrbitGame, out: &mut PixelBuffer) {
    let mut lines = StatusLines::new(out);
    match game.phase {
        OrbitPhase::Idle => {
            lines
                .line("STATUS: STANDBY", colors::STATUS_YELLOW)
                .line("[CLICK TO ENGAGE]", colors::HUD_GREEN);
        }
        OrbitPhase::Aiming => {
            lines
                .line("STATUS: TARGETING", colors::STATUS_YELLOW)
                .line(
                    &format!("LAUNCH VEL: {:.2} U/S", game.launch_speed),
                    colors::HUD_GREEN,
                );
            match game.preview.as_ref() {
                Some(t) if t.will_crash() => lines.line("ALERT: COLLISION", colors::ALERT_RED),
                Some(t) if t.will_escape() => lines.line("WARN: ESCAPE VECTOR", colors::WARN_ORANGE),
                _ => lines.line("TRAJ: NOMINAL", colors::HUD_GREEN),
            };
        }
        OrbitPhase::Launching => {
            lines
                .line("STATUS: IN FLIGHT", colors::HUD_GREEN)
                .line(
                    &format!("TIME: {:.2}s", game.mission_time_ms / 1000.0),
                    colors::HUD_GREEN,
                )
                .line(&format!("VEL: {:.2} U/S", game.probe_speed()), colors::HUD_GREEN)
                .line(
                    &format!("ORBIT: {:.0}%", game.orbit_progress() * 100.0),
                    colors::HUD_GREEN,
                );
        }
        OrbitPhase::Orbiting => {
            lines
                .line("STATUS: ORBIT STABLE", colors::HUD_GREEN)
                .line("MISSION: SUCCESS", colors::HUD_GREEN);
        }
        OrbitPhase::Failed => {
            lines
                .line("STATUS: MISSION FAIL", colors::ALERT_RED)
                .line("[CLICK TO RETRY]", colors::ALERT_RED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::orbit::OrbitLevel;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn game() -> OrbitGame {
        let level = OrbitLevel::new(640.0, 480.0, Vec2::new(320.0, 240.0), Vec2::new(470.0, 240.0), Vec::new());
        OrbitGame::with_level(level, Pcg32::seed_from_u64(1))
    }

    fn count(buf: &PixelBuffer, color: Rgba) -> usize {
        buf.pixels().iter().filter(|p| **p == color).count()
    }

    #[test]
    fn test_idle_scene_has_planet_and_probe() {
        let mut view = OrbitView::new(LOW_RES_WIDTH);
        let mut out = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let game = game();
        view.render(&game, &mut out, true);

        let scene = view.scene();
        // Probe center: 470/640*200, 240/480*200
        assert_eq!(scene.get(146, 100), Some(Rgba::WHITE));
        // Planet interior stays dark while idle
        assert_eq!(scene.get(100, 100), Some(Rgba::BLACK));
        assert!(count(&out, colors::STATUS_YELLOW) > 0);
    }

    #[test]
    fn test_crash_preview_is_red() {
        let mut view = OrbitView::new(LOW_RES_WIDTH);
        let mut out = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let mut game = game();
        game.click(Vec2::ZERO);
        game.pointer_moved(Vec2::new(400.0, 240.0));
        view.render(&game, &mut out, false);
        assert!(count(view.scene(), colors::ALERT_RED) > 0);
        assert_eq!(count(view.scene(), colors::HUD_GREEN), 0);
    }
}
