//! Orbital insertion game
//!
//! One planet, a few gravitating obstacles and a probe. The player aims,
//! launches, and wins once the probe sweeps a full turn around the planet.
//! Integration is semi-implicit Euler with a unit step; the gravity
//! multiplier plays the role of the timestep.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::tick::{FrameDriven, TickControl};
use crate::consts::orbit::*;
use crate::{normalize_angle, polar_to_cartesian};

/// A point mass with a collision radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub mass: f32,
    pub radius: f32,
}

impl Body {
    pub fn fixed(pos: Vec2, mass: f32, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            mass,
            radius,
        }
    }

    /// Obstacle whose mass follows its radius
    pub fn obstacle(pos: Vec2, radius: f32) -> Self {
        Self::fixed(pos, radius * OBSTACLE_DENSITY, radius)
    }
}

/// Current phase of the orbit game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitPhase {
    /// Waiting for the first click
    Idle,
    /// Previewing trajectories under the pointer
    Aiming,
    /// Probe in live flight
    Launching,
    /// Full revolution completed
    Orbiting,
    /// Crashed or escaped
    Failed,
}

impl OrbitPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitPhase::Idle => "idle",
            OrbitPhase::Aiming => "aiming",
            OrbitPhase::Launching => "launching",
            OrbitPhase::Orbiting => "orbiting",
            OrbitPhase::Failed => "failed",
        }
    }
}

/// How a flight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Orbit,
    Crash,
    Escape,
    /// Step limit ran out first (preview only)
    Unresolved,
}

/// Planet, probe start and obstacles for one attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitLevel {
    pub width: f32,
    pub height: f32,
    pub planet: Body,
    /// Launch position; velocity is zero until launch
    pub probe_start: Vec2,
    pub obstacles: Vec<Body>,
}

impl OrbitLevel {
    /// Level with explicit placements
    pub fn new(width: f32, height: f32, planet_pos: Vec2, probe_start: Vec2, obstacles: Vec<Body>) -> Self {
        Self {
            width,
            height,
            planet: Body::fixed(planet_pos, PLANET_MASS, PLANET_RADIUS),
            probe_start,
            obstacles,
        }
    }

    /// Random layout: jittered planet, clamped probe, 2-4 obstacles
    pub fn generate<R: Rng>(rng: &mut R, width: f32, height: f32) -> Self {
        let center = Vec2::new(width, height) * 0.5;
        let planet_pos = center
            + Vec2::new(
                (rng.random::<f32>() - 0.5) * PLANET_JITTER,
                (rng.random::<f32>() - 0.5) * PLANET_JITTER,
            );

        let angle = rng.random::<f32>() * TAU;
        let distance = PROBE_MIN_DISTANCE + rng.random::<f32>() * PROBE_DISTANCE_RANGE;
        let probe_start = (planet_pos + polar_to_cartesian(distance, angle)).clamp(
            Vec2::splat(PROBE_EDGE_MARGIN),
            Vec2::new(width - PROBE_EDGE_MARGIN, height - PROBE_EDGE_MARGIN),
        );

        let count = rng.random_range(MIN_OBSTACLES..=MAX_OBSTACLES);
        let mut obstacles = Vec::with_capacity(count);
        for _ in 0..count {
            let mut pos;
            let mut attempts = 0;
            // Gives up after the attempt cap and keeps the last candidate
            loop {
                let angle = rng.random::<f32>() * TAU;
                let distance = OBSTACLE_MIN_DISTANCE + rng.random::<f32>() * OBSTACLE_DISTANCE_RANGE;
                pos = planet_pos + polar_to_cartesian(distance, angle);
                attempts += 1;

                let clear_of_probe = pos.distance(probe_start) >= OBSTACLE_PROBE_CLEARANCE;
                let inside = pos.x >= OBSTACLE_EDGE_MARGIN
                    && pos.x <= width - OBSTACLE_EDGE_MARGIN
                    && pos.y >= OBSTACLE_EDGE_MARGIN
                    && pos.y <= height - OBSTACLE_EDGE_MARGIN;
                if (clear_of_probe && inside) || attempts >= OBSTACLE_PLACEMENT_ATTEMPTS {
                    break;
                }
            }
            let radius = OBSTACLE_MIN_RADIUS + rng.random::<f32>() * OBSTACLE_RADIUS_RANGE;
            obstacles.push(Body::obstacle(pos, radius));
        }

        log::info!(
            "Orbit level: planet ({:.0}, {:.0}), probe ({:.0}, {:.0}), {} obstacles",
            planet_pos.x,
            planet_pos.y,
            probe_start.x,
            probe_start.y,
            obstacles.len()
        );

        Self::new(width, height, planet_pos, probe_start, obstacles)
    }

    fn bodies(&self) -> impl Iterator<Item = &Body> {
        std::iter::once(&self.planet).chain(self.obstacles.iter())
    }

    /// Summed `mass / d^2` pull toward every body
    pub fn gravity_at(&self, pos: Vec2) -> Vec2 {
        self.bodies()
            .map(|body| {
                let delta = body.pos - pos;
                let dist = delta.length();
                if dist > MIN_GRAVITY_DISTANCE {
                    delta / dist * (body.mass / (dist * dist))
                } else {
                    Vec2::ZERO
                }
            })
            .sum()
    }

    /// Inside the planet or any obstacle
    pub fn collides(&self, pos: Vec2) -> bool {
        self.bodies().any(|body| pos.distance(body.pos) < body.radius)
    }

    /// Outside the canvas plus the escape margin
    pub fn escaped(&self, pos: Vec2) -> bool {
        pos.x < -ESCAPE_MARGIN
            || pos.x > self.width + ESCAPE_MARGIN
            || pos.y < -ESCAPE_MARGIN
            || pos.y > self.height + ESCAPE_MARGIN
    }

    /// Angle of `pos` around the planet
    pub fn angle_around_planet(&self, pos: Vec2) -> f32 {
        let d = pos - self.planet.pos;
        d.y.atan2(d.x)
    }
}

/// Signed angle swept around the planet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepTracker {
    pub start_angle: f32,
    last_angle: f32,
    pub total: f32,
}

impl SweepTracker {
    pub fn starting_at(angle: f32) -> Self {
        Self {
            start_angle: angle,
            last_angle: angle,
            total: 0.0,
        }
    }

    /// Accumulate the wrapped change to `angle`
    pub fn observe(&mut self, angle: f32) {
        self.total += normalize_angle(angle - self.last_angle);
        self.last_angle = angle;
    }

    pub fn completed_orbit(&self) -> bool {
        self.total.abs() >= TAU
    }

    /// Fraction of a full revolution, 0..=1
    pub fn progress(&self) -> f32 {
        (self.total.abs() / TAU).min(1.0)
    }

    /// Whether `angle` lies in the wedge swept so far, in the sweep direction
    pub fn covers(&self, angle: f32) -> bool {
        let swept = self.progress() * TAU;
        let offset = if self.total >= 0.0 {
            angle - self.start_angle
        } else {
            self.start_angle - angle
        };
        offset.rem_euclid(TAU) <= swept
    }
}

/// Probe state while flying
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub pos: Vec2,
    pub vel: Vec2,
    pub sweep: SweepTracker,
}

impl Flight {
    pub fn new(level: &OrbitLevel, pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            sweep: SweepTracker::starting_at(level.angle_around_planet(pos)),
        }
    }

    /// One integration step; `Some` once the flight is decided
    ///
    /// Checks run crash, then orbit, then escape.
    pub fn step(&mut self, level: &OrbitLevel) -> Option<Outcome> {
        self.vel += level.gravity_at(self.pos) * GRAVITY_MULTIPLIER;
        self.pos += self.vel;

        if level.collides(self.pos) {
            return Some(Outcome::Crash);
        }

        self.sweep.observe(level.angle_around_planet(self.pos));
        if self.sweep.completed_orbit() {
            return Some(Outcome::Orbit);
        }

        if level.escaped(self.pos) {
            return Some(Outcome::Escape);
        }
        None
    }
}

/// Sampled preview path and its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub path: Vec<Vec2>,
    pub outcome: Outcome,
}

impl Trajectory {
    pub fn will_crash(&self) -> bool {
        self.outcome == Outcome::Crash
    }

    pub fn will_escape(&self) -> bool {
        self.outcome == Outcome::Escape
    }
}

/// Forward-integrate up to the preview step limit
pub fn simulate_trajectory(level: &OrbitLevel, start: Vec2, vel: Vec2) -> Trajectory {
    let mut flight = Flight::new(level, start, vel);
    let mut path = Vec::with_capacity(MAX_PREVIEW_STEPS / PATH_SAMPLE_INTERVAL + 1);
    path.push(start);

    for i in 0..MAX_PREVIEW_STEPS {
        if let Some(outcome) = flight.step(level) {
            return Trajectory { path, outcome };
        }
        if i % PATH_SAMPLE_INTERVAL == 0 {
            path.push(flight.pos);
        }
    }

    Trajectory {
        path,
        outcome: Outcome::Unresolved,
    }
}

/// Velocity toward `target`, speed proportional to the pull distance
pub fn launch_velocity(from: Vec2, target: Vec2) -> Option<Vec2> {
    let delta = target - from;
    let dist = delta.length();
    if dist <= 0.0 {
        return None;
    }
    let speed = (dist * SPEED_SCALE).clamp(MIN_SPEED, MAX_SPEED);
    Some(delta / dist * speed)
}

/// Speed of a circular orbit at distance `d` from a body of mass `mass`
pub fn circular_speed(mass: f32, d: f32) -> f32 {
    (GRAVITY_MULTIPLIER * mass / d).sqrt()
}

/// What a click did, so the host knows whether to start frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickResult {
    Ignored,
    StartedAiming,
    Launched,
    Reset,
}

/// Orbit game session state
#[derive(Debug, Clone)]
pub struct OrbitGame {
    pub level: OrbitLevel,
    pub phase: OrbitPhase,
    /// Last pointer position in canvas space
    pub pointer: Vec2,
    pub preview: Option<Trajectory>,
    pub launch_speed: f32,
    pub flight: Option<Flight>,
    /// Milliseconds since launch
    pub mission_time_ms: f32,
    rng: Pcg32,
}

impl OrbitGame {
    /// New game on the default canvas with a seeded layout RNG
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }

    pub fn with_rng(mut rng: Pcg32) -> Self {
        let level = OrbitLevel::generate(&mut rng, CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32);
        Self::with_level(level, rng)
    }

    pub fn with_level(level: OrbitLevel, rng: Pcg32) -> Self {
        Self {
            level,
            phase: OrbitPhase::Idle,
            pointer: Vec2::ZERO,
            preview: None,
            launch_speed: 0.0,
            flight: None,
            mission_time_ms: 0.0,
            rng,
        }
    }

    /// Fresh random layout, back to idle
    pub fn reset(&mut self) {
        self.level = OrbitLevel::generate(&mut self.rng, self.level.width, self.level.height);
        self.phase = OrbitPhase::Idle;
        self.preview = None;
        self.launch_speed = 0.0;
        self.flight = None;
        self.mission_time_ms = 0.0;
    }

    pub fn is_success(&self) -> bool {
        self.phase == OrbitPhase::Orbiting
    }

    /// Where the probe is drawn
    pub fn probe_pos(&self) -> Vec2 {
        self.flight.map_or(self.level.probe_start, |f| f.pos)
    }

    pub fn probe_speed(&self) -> f32 {
        self.flight.map_or(0.0, |f| f.vel.length())
    }

    /// Revolution progress while flying or after success
    pub fn orbit_progress(&self) -> f32 {
        match (self.phase, self.flight) {
            (OrbitPhase::Launching | OrbitPhase::Orbiting, Some(f)) => f.sweep.progress(),
            _ => 0.0,
        }
    }

    /// Re-simulate the preview while aiming; true if a redraw is needed
    pub fn pointer_moved(&mut self, pos: Vec2) -> bool {
        self.pointer = pos;
        if self.phase != OrbitPhase::Aiming {
            return false;
        }
        match launch_velocity(self.level.probe_start, pos) {
            Some(vel) => {
                self.launch_speed = vel.length();
                self.preview = Some(simulate_trajectory(&self.level, self.level.probe_start, vel));
                true
            }
            None => false,
        }
    }

    pub fn click(&mut self, pos: Vec2) -> ClickResult {
        self.pointer = pos;
        match self.phase {
            OrbitPhase::Idle => {
                self.phase = OrbitPhase::Aiming;
                ClickResult::StartedAiming
            }
            OrbitPhase::Aiming => match launch_velocity(self.level.probe_start, pos) {
                Some(vel) => {
                    self.flight = Some(Flight::new(&self.level, self.level.probe_start, vel));
                    self.phase = OrbitPhase::Launching;
                    self.mission_time_ms = 0.0;
                    log::info!("Probe launched at {:.2} u/s", vel.length());
                    ClickResult::Launched
                }
                None => ClickResult::Ignored,
            },
            OrbitPhase::Launching => ClickResult::Ignored,
            OrbitPhase::Orbiting | OrbitPhase::Failed => {
                self.reset();
                ClickResult::Reset
            }
        }
    }
}

impl FrameDriven for OrbitGame {
    /// One physics step per frame while launching
    fn tick(&mut self, dt_ms: f32) -> TickControl {
        if self.phase != OrbitPhase::Launching {
            return TickControl::Stop;
        }
        let Some(flight) = self.flight.as_mut() else {
            self.phase = OrbitPhase::Failed;
            return TickControl::Stop;
        };

        self.mission_time_ms += dt_ms;
        match flight.step(&self.level) {
            None => TickControl::Continue,
            Some(outcome) => {
                self.phase = if outcome == Outcome::Orbit {
                    OrbitPhase::Orbiting
                } else {
                    OrbitPhase::Failed
                };
                log::info!(
                    "Flight ended: {:?} after {:.1}s",
                    outcome,
                    self.mission_time_ms / 1000.0
                );
                TickControl::Stop
            }
        }
    }
}
