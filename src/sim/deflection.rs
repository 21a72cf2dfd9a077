//! Ray deflection puzzle
//!
//! Light rays fan out from a single origin. The player moves one mirror so
//! that a reflected ray lands on a target bar near the bottom of the screen.
//! Levels are only handed out once a solution has been found by search.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::tick::{FrameDriven, TickControl};
use crate::consts::deflection::*;
use crate::error::GenerationError;
use crate::polar_to_cartesian;

/// How far unreflected rays are drawn
const RAY_DRAW_LENGTH: f32 = 1000.0;
/// How far reflected rays that miss the target are drawn
const REFLECTION_DRAW_LENGTH: f32 = 2000.0;

/// A flat mirror segment centered on `pos`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mirror {
    pub pos: Vec2,
    /// Radians
    pub angle: f32,
    pub length: f32,
}

impl Mirror {
    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle,
            length: MIRROR_LENGTH,
        }
    }

    pub fn endpoints(&self) -> (Vec2, Vec2) {
        let half = polar_to_cartesian(self.length / 2.0, self.angle);
        (self.pos - half, self.pos + half)
    }

    pub fn normal(&self) -> Vec2 {
        Vec2::new(-self.angle.sin(), self.angle.cos())
    }
}

/// A ray leaving the shared origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRay {
    pub origin: Vec2,
    /// Radians, screen space (y down)
    pub angle: f32,
}

impl LightRay {
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin())
    }
}

/// Horizontal target bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub center_x: f32,
    pub y: f32,
    pub width: f32,
}

impl Target {
    pub fn left(&self) -> f32 {
        self.center_x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.width / 2.0
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.left() && x <= self.right()
    }

    /// Same center, band widened by `factor`
    pub fn widened(&self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            ..*self
        }
    }

    /// Where a ray from `start` along `dir` meets the target line
    pub fn crossing(&self, start: Vec2, dir: Vec2) -> Option<f32> {
        if dir.y.abs() <= PARALLEL_EPSILON {
            return None;
        }
        let t = (self.y - start.y) / dir.y;
        (t > 0.0).then(|| start.x + dir.x * t)
    }
}

/// Known-good mirror placement for a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub mirror_pos: Vec2,
    pub mirror_angle: f32,
    pub ray_index: usize,
}

impl Solution {
    pub fn mirror(&self) -> Mirror {
        Mirror::new(self.mirror_pos, self.mirror_angle)
    }
}

/// Reflect a direction about a unit normal
#[inline]
pub fn reflect(dir: Vec2, normal: Vec2) -> Vec2 {
    dir - 2.0 * dir.dot(normal) * normal
}

/// Ray against segment `a..b`; hit needs `t > 0` and `u` in [0, 1]
pub fn ray_segment_intersection(origin: Vec2, dir: Vec2, a: Vec2, b: Vec2) -> Option<Vec2> {
    let seg = b - a;
    let denom = dir.perp_dot(seg);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let to_a = a - origin;
    let t = to_a.perp_dot(seg) / denom;
    let u = to_a.perp_dot(dir) / denom;
    (t > 0.0 && (0.0..=1.0).contains(&u)).then(|| origin + dir * t)
}

/// Drawable path of one ray against the current mirror
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTrace {
    pub start: Vec2,
    /// Mirror hit, or a far point if the ray misses
    pub end: Vec2,
    pub reflected: Option<Reflection>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflection {
    pub end: Vec2,
    pub on_target: bool,
}

impl RayTrace {
    pub fn on_target(&self) -> bool {
        self.reflected.is_some_and(|r| r.on_target)
    }
}

/// Follow a ray through one reflection
pub fn trace_ray(ray: &LightRay, mirror: &Mirror, target: &Target) -> RayTrace {
    let dir = ray.direction();
    let (a, b) = mirror.endpoints();

    let Some(hit) = ray_segment_intersection(ray.origin, dir, a, b) else {
        return RayTrace {
            start: ray.origin,
            end: ray.origin + dir * RAY_DRAW_LENGTH,
            reflected: None,
        };
    };

    let bounced = reflect(dir, mirror.normal());
    let reflected = target.crossing(hit, bounced).map(|x| {
        if target.contains(x) {
            Reflection {
                end: Vec2::new(x, target.y),
                on_target: true,
            }
        } else {
            Reflection {
                end: hit + bounced * REFLECTION_DRAW_LENGTH,
                on_target: false,
            }
        }
    });

    RayTrace {
        start: ray.origin,
        end: hit,
        reflected,
    }
}

/// Minimum circular distance between two angles
fn angular_distance(a: f32, b: f32) -> f32 {
    ((a - b + std::f32::consts::PI).rem_euclid(TAU) - std::f32::consts::PI).abs()
}

/// Sample well-separated rays that do not reach the target unaided
fn sample_rays<R: Rng>(rng: &mut R, origin: Vec2, target: &Target) -> Vec<LightRay> {
    let wanted = rng.random_range(MIN_RAYS..=MAX_RAYS);
    let avoid = target.widened(AVOIDANCE_FACTOR);
    let min_separation = MIN_RAY_SEPARATION_DEG.to_radians();
    let mut rays: Vec<LightRay> = Vec::with_capacity(wanted);

    for _ in 0..wanted {
        for _ in 0..RAY_ATTEMPTS {
            let angle = rng.random::<f32>() * TAU;
            if rays
                .iter()
                .any(|r| angular_distance(angle, r.angle) < min_separation)
            {
                continue;
            }
            let ray = LightRay { origin, angle };
            if avoid
                .crossing(origin, ray.direction())
                .is_some_and(|x| avoid.contains(x))
            {
                continue;
            }
            rays.push(ray);
            break;
        }
    }
    rays
}

/// Random search for a mirror placement that lands a ray on the target
///
/// Tries random (position, ray) pairs, each against every 5 degree angle.
pub fn solve<R: Rng>(
    rng: &mut R,
    rays: &[LightRay],
    target: &Target,
    width: f32,
) -> Option<Solution> {
    if rays.is_empty() {
        return None;
    }

    for trial in 0..SOLVER_TRIALS {
        let ray_index = rng.random_range(0..rays.len());
        let ray = &rays[ray_index];
        let pos = Vec2::new(
            MIRROR_EDGE_MARGIN_X + rng.random::<f32>() * (width - 2.0 * MIRROR_EDGE_MARGIN_X),
            MIRROR_EDGE_MARGIN_Y
                + rng.random::<f32>() * (target.y - MIRROR_TARGET_CLEARANCE - MIRROR_EDGE_MARGIN_Y),
        );

        if pos.distance(ray.origin) < MIRROR_ORIGIN_CLEARANCE
            || (target.y - pos.y).abs() < MIRROR_TARGET_CLEARANCE
        {
            continue;
        }

        let dir = ray.direction();
        for step in 0..SOLVER_ANGLE_STEPS {
            let angle = step as f32 / SOLVER_ANGLE_STEPS as f32 * TAU;
            let mirror = Mirror::new(pos, angle);
            let (a, b) = mirror.endpoints();
            let Some(hit) = ray_segment_intersection(ray.origin, dir, a, b) else {
                continue;
            };
            let bounced = reflect(dir, mirror.normal());
            if bounced.y <= MIN_REFLECTED_DY {
                continue;
            }
            if target.crossing(hit, bounced).is_some_and(|x| target.contains(x)) {
                log::debug!(
                    "Solution after {} trials: ray {}, mirror ({:.0}, {:.0}) at {:.0} deg",
                    trial,
                    ray_index,
                    pos.x,
                    pos.y,
                    angle.to_degrees()
                );
                return Some(Solution {
                    mirror_pos: pos,
                    mirror_angle: angle,
                    ray_index,
                });
            }
        }
    }
    None
}

/// A solvable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionLevel {
    pub width: f32,
    pub height: f32,
    pub origin: Vec2,
    pub target: Target,
    pub rays: Vec<LightRay>,
    pub solution: Solution,
    /// Where the mirror first appears, already at the solution angle
    pub start_mirror: Mirror,
}

impl DeflectionLevel {
    /// Regenerate from scratch until a level has enough rays and a solution
    pub fn generate<R: Rng>(
        rng: &mut R,
        width: f32,
        height: f32,
        max_attempts: u32,
    ) -> Result<Self, GenerationError> {
        for attempt in 1..=max_attempts {
            if let Some(level) = Self::try_generate(rng, width, height) {
                log::info!(
                    "Deflection level: {} rays, target at {:.0} (attempt {})",
                    level.rays.len(),
                    level.target.center_x,
                    attempt
                );
                return Ok(level);
            }
        }
        Err(GenerationError::RetriesExhausted {
            puzzle: "deflection",
            attempts: max_attempts,
        })
    }

    fn try_generate<R: Rng>(rng: &mut R, width: f32, height: f32) -> Option<Self> {
        let origin = Vec2::new(
            width / 2.0 + (rng.random::<f32>() - 0.5) * ORIGIN_JITTER_X,
            height / 2.0 + (rng.random::<f32>() - 0.5) * ORIGIN_JITTER_Y,
        );
        let target = Target {
            center_x: TARGET_EDGE_MARGIN + rng.random::<f32>() * (width - 2.0 * TARGET_EDGE_MARGIN),
            y: height - TARGET_BOTTOM_OFFSET,
            width: TARGET_WIDTH,
        };

        let rays = sample_rays(rng, origin, &target);
        if rays.len() < MIN_RAYS {
            log::warn!("Only {} usable rays, regenerating", rays.len());
            return None;
        }

        let Some(solution) = solve(rng, &rays, &target, width) else {
            log::warn!("No mirror solution found, regenerating");
            return None;
        };

        let reveal = Vec2::new(
            REVEAL_MARGIN_X + rng.random::<f32>() * (width - 2.0 * REVEAL_MARGIN_X),
            REVEAL_MARGIN_Y + rng.random::<f32>() * (height - 2.0 * REVEAL_MARGIN_Y),
        );

        Some(Self {
            width,
            height,
            origin,
            target,
            rays,
            solution,
            start_mirror: Mirror::new(reveal, solution.mirror_angle),
        })
    }

    pub fn trace(&self, mirror: &Mirror) -> Vec<RayTrace> {
        self.rays
            .iter()
            .map(|ray| trace_ray(ray, mirror, &self.target))
            .collect()
    }

    /// Rays currently landing on the target
    pub fn hits(&self, mirror: &Mirror) -> usize {
        self.rays
            .iter()
            .filter(|ray| trace_ray(ray, mirror, &self.target).on_target())
            .count()
    }
}

/// Whether the player may rotate the mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MirrorControl {
    /// Angle is locked to the solution; only position moves
    #[default]
    PositionOnly,
    /// Left/right input rotates in 5 degree steps
    Rotatable,
}

/// Deflection puzzle session state
#[derive(Debug, Clone)]
pub struct DeflectionGame {
    pub level: DeflectionLevel,
    pub mirror: Mirror,
    pub control: MirrorControl,
    pub hits: usize,
    /// 0..=100
    pub hold_progress: f32,
    pub analysis_complete: bool,
    pub completion_timer_ms: f32,
    max_attempts: u32,
    rng: Pcg32,
}

impl DeflectionGame {
    pub fn new(seed: u64, max_attempts: u32) -> Result<Self, GenerationError> {
        Self::with_rng(Pcg32::seed_from_u64(seed), max_attempts, MirrorControl::PositionOnly)
    }

    pub fn with_rng(
        mut rng: Pcg32,
        max_attempts: u32,
        control: MirrorControl,
    ) -> Result<Self, GenerationError> {
        let level = DeflectionLevel::generate(
            &mut rng,
            CANVAS_WIDTH as f32,
            CANVAS_HEIGHT as f32,
            max_attempts,
        )?;
        let mirror = level.start_mirror;
        let mut game = Self {
            level,
            mirror,
            control,
            hits: 0,
            hold_progress: 0.0,
            analysis_complete: false,
            completion_timer_ms: 0.0,
            max_attempts,
            rng,
        };
        game.recount();
        Ok(game)
    }

    /// New level and cleared progress; the old level stays on error
    pub fn reset(&mut self) -> Result<(), GenerationError> {
        let level = DeflectionLevel::generate(
            &mut self.rng,
            self.level.width,
            self.level.height,
            self.max_attempts,
        )?;
        self.mirror = level.start_mirror;
        self.level = level;
        self.hold_progress = 0.0;
        self.analysis_complete = false;
        self.completion_timer_ms = 0.0;
        self.recount();
        Ok(())
    }

    fn recount(&mut self) {
        self.hits = self.level.hits(&self.mirror);
    }

    pub fn traces(&self) -> Vec<RayTrace> {
        self.level.trace(&self.mirror)
    }

    /// Mirror follows the pointer
    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.mirror.pos = pos;
        self.recount();
    }

    /// Rotate by `steps` increments of 5 degrees; false if locked
    pub fn rotate(&mut self, steps: i32) -> bool {
        if self.control != MirrorControl::Rotatable {
            return false;
        }
        self.mirror.angle =
            (self.mirror.angle + steps as f32 * ROTATE_STEP_DEG.to_radians()).rem_euclid(TAU);
        self.recount();
        true
    }

    /// Overlay is showing
    pub fn overlay_visible(&self) -> bool {
        self.analysis_complete && self.completion_timer_ms <= COMPLETION_OVERLAY_MS
    }

    pub fn is_complete(&self) -> bool {
        self.analysis_complete && self.completion_timer_ms > COMPLETION_OVERLAY_MS
    }
}

impl FrameDriven for DeflectionGame {
    fn tick(&mut self, dt_ms: f32) -> TickControl {
        self.recount();

        if !self.analysis_complete {
            if self.hits >= 1 {
                self.hold_progress += dt_ms / HOLD_FILL_MS;
                if self.hold_progress >= 100.0 {
                    self.hold_progress = 100.0;
                    self.analysis_complete = true;
                    self.completion_timer_ms = 0.0;
                    log::info!("Deflection analysis complete");
                }
            } else {
                self.hold_progress = (self.hold_progress - dt_ms / HOLD_DECAY_MS).max(0.0);
            }
        } else {
            self.completion_timer_ms += dt_ms;
        }

        TickControl::from_bool(!self.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(seed: u64) -> DeflectionLevel {
        let mut rng = Pcg32::seed_from_u64(seed);
        DeflectionLevel::generate(&mut rng, 640.0, 480.0, 50).unwrap()
    }

    #[test]
    fn test_reflect() {
        let r = reflect(Vec2::new(1.0, -1.0), Vec2::Y);
        assert!((r - Vec2::new(1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_ray_segment_intersection() {
        let hit = ray_segment_intersection(
            Vec2::ZERO,
            Vec2::X,
            Vec2::new(5.0, -1.0),
            Vec2::new(5.0, 1.0),
        )
        .unwrap();
        assert!((hit - Vec2::new(5.0, 0.0)).length() < 1e-5);

        // Behind the ray
        assert!(
            ray_segment_intersection(Vec2::ZERO, Vec2::NEG_X, Vec2::new(5.0, -1.0), Vec2::new(5.0, 1.0))
                .is_none()
        );
        // Past the segment end
        assert!(
            ray_segment_intersection(Vec2::ZERO, Vec2::X, Vec2::new(5.0, 1.0), Vec2::new(5.0, 3.0))
                .is_none()
        );
        // Parallel
        assert!(
            ray_segment_intersection(Vec2::ZERO, Vec2::X, Vec2::new(1.0, 1.0), Vec2::new(5.0, 1.0))
                .is_none()
        );
    }

    #[test]
    fn test_angular_distance_wraps() {
        assert!((angular_distance(0.1, TAU - 0.1) - 0.2).abs() < 1e-5);
        assert!((angular_distance(TAU - 0.1, 0.1) - 0.2).abs() < 1e-5);
        assert!((angular_distance(1.0, 2.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stored_solution_hits_target() {
        for seed in 0..10 {
            let level = level(seed);
            let mirror = level.solution.mirror();
            assert!(level.hits(&mirror) >= 1, "seed {}", seed);

            let ray = &level.rays[level.solution.ray_index];
            assert!(trace_ray(ray, &mirror, &level.target).on_target());
        }
    }

    #[test]
    fn test_generated_rays_respect_constraints() {
        for seed in 0..10 {
            let level = level(seed);
            assert!((MIN_RAYS..=MAX_RAYS).contains(&level.rays.len()));
            let avoid = level.target.widened(AVOIDANCE_FACTOR);
            for (i, a) in level.rays.iter().enumerate() {
                let x = avoid.crossing(a.origin, a.direction());
                assert!(!x.is_some_and(|x| avoid.contains(x)));
                for b in &level.rays[i + 1..] {
                    assert!(angular_distance(a.angle, b.angle) >= MIN_RAY_SEPARATION_DEG.to_radians());
                }
            }
            assert!(level.target.center_x >= TARGET_EDGE_MARGIN);
            assert!(level.target.center_x <= 640.0 - TARGET_EDGE_MARGIN);
            assert!((level.target.y - 440.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_solution_mirror_clearances() {
        for seed in 0..10 {
            let level = level(seed);
            let pos = level.solution.mirror_pos;
            assert!(pos.distance(level.origin) >= MIRROR_ORIGIN_CLEARANCE);
            assert!(level.target.y - pos.y >= MIRROR_TARGET_CLEARANCE);
        }
    }

    #[test]
    fn test_reveal_uses_solution_angle() {
        let level = level(4);
        assert_eq!(level.start_mirror.angle, level.solution.mirror_angle);
    }

    #[test]
    fn test_zero_attempts_is_error() {
        let mut rng = Pcg32::seed_from_u64(1);
        let err = DeflectionLevel::generate(&mut rng, 640.0, 480.0, 0).unwrap_err();
        assert_eq!(
            err,
            GenerationError::RetriesExhausted {
                puzzle: "deflection",
                attempts: 0
            }
        );
    }

    #[test]
    fn test_hold_progress_and_completion() {
        let mut game = DeflectionGame::new(11, 50).unwrap();
        game.pointer_moved(game.level.solution.mirror_pos);
        assert!(game.hits >= 1);

        // About 3 seconds of hits fills the bar
        let mut ticks = 0;
        while !game.analysis_complete {
            assert_eq!(game.tick(100.0), TickControl::Continue);
            ticks += 1;
            assert!(ticks <= 31);
        }
        assert!(ticks >= 30);
        assert_eq!(game.completion_timer_ms, 0.0);
        assert!(game.overlay_visible());
        assert!(!game.is_complete());

        let mut frames = 0;
        while game.tick(100.0) == TickControl::Continue {
            frames += 1;
        }
        assert_eq!(frames, 20);
        assert!(game.is_complete());
    }

    #[test]
    fn test_progress_decays_without_hits() {
        let mut game = DeflectionGame::new(5, 50).unwrap();
        game.pointer_moved(game.level.solution.mirror_pos);
        game.tick(100.0);
        let filled = game.hold_progress;
        assert!(filled > 0.0);

        // Far off screen, nothing reflects
        game.pointer_moved(Vec2::new(-5000.0, -5000.0));
        assert_eq!(game.hits, 0);
        game.tick(10.0);
        assert!((game.hold_progress - (filled - 1.0)).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_locked_by_default() {
        let mut game = DeflectionGame::new(2, 50).unwrap();
        let angle = game.mirror.angle;
        assert!(!game.rotate(1));
        assert_eq!(game.mirror.angle, angle);

        game.control = MirrorControl::Rotatable;
        assert!(game.rotate(-2));
        let expected = (angle - 10f32.to_radians()).rem_euclid(TAU);
        assert!((game.mirror.angle - expected).abs() < 1e-5);
    }

    #[test]
    fn test_reset_clears_progress() {
        let mut game = DeflectionGame::new(8, 50).unwrap();
        game.hold_progress = 50.0;
        game.analysis_complete = true;
        game.reset().unwrap();
        assert_eq!(game.hold_progress, 0.0);
        assert!(!game.analysis_complete);
        assert_eq!(game.mirror, game.level.start_mirror);
    }
}
