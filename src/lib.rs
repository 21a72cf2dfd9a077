//! Probe Deck - scanner visualizers and mini-games for a space exploration story
//!
//! Core modules:
//! - `geometry`: Parametric solids, analytic ray/point tests, Euler rotation
//! - `sim`: Orbital mechanics, deflection and interference puzzles, frame ticks
//! - `renderer`: Low-res pixel buffers, LIDAR/cross-section/diagram renderers, HUD
//! - `controls`: Rotation orb, navigation keys, outbound signals
//! - `catalog`: Space object metadata loaded from JSON
//! - `api`: Render entrypoints and game sessions for the host UI
//! - `platform`: Browser canvas presentation (wasm32 only)

pub mod api;
pub mod catalog;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Error, GenerationError, Result};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Tuning constants, grouped per visualizer/game
pub mod consts {
    /// LIDAR scan
    pub mod lidar {
        /// Cone half-angle in degrees
        pub const CONE_HALF_ANGLE_DEG: f32 = 25.0;
        /// Camera sits on +Z looking down -Z
        pub const CAMERA_DISTANCE: f32 = 3.0;
        /// Perspective numerator
        pub const FOV: f32 = 400.0;
        /// Added to depth before the perspective divide
        pub const DEPTH_OFFSET: f32 = 5.0;
        /// Resolution snap for plotted points
        pub const PIXEL_SIZE: f32 = 1.0;
        /// Side length of each plotted point
        pub const DOT_SIZE: u32 = 2;
        pub const CANVAS_SIZE: u32 = 400;
    }

    /// Cross-section slice
    pub mod cross_section {
        pub const RESOLUTION: u32 = 400;
        /// Pixels per world unit (before the x2 stretch)
        pub const SCALE: f32 = 150.0;
        /// Grid step and painted block size
        pub const STEP: u32 = 3;
        pub const DOT_SIZE: f32 = 3.0;
        pub const DENSE_CORE_RADIUS: f32 = 0.3;
        pub const HABITABLE_SHELL_INNER: f32 = 1.1;
        pub const HABITABLE_SHELL_OUTER: f32 = 1.3;
        pub const HABITABLE_SHELL_CHANCE: f32 = 0.8;
        pub const HIGH_VALUE_CHANCE: f32 = 0.3;
        pub const MEDIUM_VALUE_CHANCE: f32 = 0.15;
        pub const DENSITY_SPECKLE_CHANCE: f32 = 0.2;
        pub const DENSITY_SPECKLE_MAX: f32 = 0.8;
        /// Organic markers appear within this distance of slice +-0.5
        pub const ORGANICS_BAND: f32 = 0.1;
        pub const ORGANICS_CHANCE: f32 = 0.1;
    }

    /// Orbital insertion game
    pub mod orbit {
        pub const CANVAS_WIDTH: u32 = 640;
        pub const CANVAS_HEIGHT: u32 = 480;
        pub const LOW_RES_WIDTH: u32 = 200;

        pub const PLANET_RADIUS: f32 = 40.0;
        pub const PLANET_MASS: f32 = 15000.0;
        /// Obstacle mass per unit radius
        pub const OBSTACLE_DENSITY: f32 = 80.0;
        pub const PROBE_RADIUS: f32 = 6.0;

        pub const MIN_SPEED: f32 = 0.5;
        pub const MAX_SPEED: f32 = 3.5;
        /// Launch speed per pixel of pull distance
        pub const SPEED_SCALE: f32 = 0.02;
        /// Scales accumulated gravity, acts as the implicit timestep
        pub const GRAVITY_MULTIPLIER: f32 = 0.1;
        /// Bodies closer than this contribute no force
        pub const MIN_GRAVITY_DISTANCE: f32 = 1.0;

        pub const MAX_PREVIEW_STEPS: usize = 2000;
        /// Every Nth preview step is kept for drawing
        pub const PATH_SAMPLE_INTERVAL: usize = 3;
        pub const ESCAPE_MARGIN: f32 = 200.0;

        pub const PLANET_JITTER: f32 = 150.0;
        pub const PROBE_MIN_DISTANCE: f32 = 150.0;
        pub const PROBE_DISTANCE_RANGE: f32 = 120.0;
        pub const PROBE_EDGE_MARGIN: f32 = 10.0;
        pub const OBSTACLE_MIN_DISTANCE: f32 = 120.0;
        pub const OBSTACLE_DISTANCE_RANGE: f32 = 200.0;
        pub const OBSTACLE_PROBE_CLEARANCE: f32 = 80.0;
        pub const OBSTACLE_EDGE_MARGIN: f32 = 50.0;
        pub const OBSTACLE_MIN_RADIUS: f32 = 15.0;
        pub const OBSTACLE_RADIUS_RANGE: f32 = 20.0;
        pub const OBSTACLE_PLACEMENT_ATTEMPTS: u32 = 20;
        pub const MIN_OBSTACLES: usize = 2;
        pub const MAX_OBSTACLES: usize = 4;
    }

    /// Ray deflection puzzle
    pub mod deflection {
        pub const CANVAS_WIDTH: u32 = 640;
        pub const CANVAS_HEIGHT: u32 = 480;
        pub const LOW_RES_WIDTH: u32 = 200;

        /// Target line sits this far above the bottom edge
        pub const TARGET_BOTTOM_OFFSET: f32 = 40.0;
        pub const TARGET_WIDTH: f32 = 60.0;
        pub const TARGET_EDGE_MARGIN: f32 = 70.0;
        pub const MIRROR_LENGTH: f32 = 80.0;

        pub const ORIGIN_JITTER_X: f32 = 120.0;
        pub const ORIGIN_JITTER_Y: f32 = 100.0;

        pub const MIN_RAYS: usize = 3;
        pub const MAX_RAYS: usize = 7;
        pub const RAY_ATTEMPTS: u32 = 100;
        pub const MIN_RAY_SEPARATION_DEG: f32 = 15.0;
        /// Target width multiplier for the band rays may not cross unaided
        pub const AVOIDANCE_FACTOR: f32 = 1.2;

        pub const SOLVER_TRIALS: u32 = 5000;
        pub const SOLVER_ANGLE_STEPS: u32 = 72;
        pub const MIRROR_EDGE_MARGIN_X: f32 = 100.0;
        pub const MIRROR_EDGE_MARGIN_Y: f32 = 80.0;
        pub const MIRROR_ORIGIN_CLEARANCE: f32 = 100.0;
        pub const MIRROR_TARGET_CLEARANCE: f32 = 80.0;
        pub const REVEAL_MARGIN_X: f32 = 150.0;
        pub const REVEAL_MARGIN_Y: f32 = 100.0;

        pub const PARALLEL_EPSILON: f32 = 1e-4;
        /// Reflected rays must head down the screen by at least this much
        pub const MIN_REFLECTED_DY: f32 = 0.001;

        /// Milliseconds of sustained hits per percent of progress
        pub const HOLD_FILL_MS: f32 = 30.0;
        /// Milliseconds without hits per percent lost
        pub const HOLD_DECAY_MS: f32 = 10.0;
        pub const COMPLETION_OVERLAY_MS: f32 = 2000.0;
        pub const ROTATE_STEP_DEG: f32 = 5.0;
    }

    /// Wave interference puzzle
    pub mod interference {
        pub const CANVAS_WIDTH: u32 = 640;
        pub const CANVAS_HEIGHT: u32 = 400;
        pub const WAVE_DISPLAY_HEIGHT: u32 = 300;
        pub const LOW_RES_WIDTH: u32 = 160;
        pub const LOW_RES_HEIGHT: u32 = 100;

        pub const WAVE_COUNT: usize = 3;
        pub const HARMONICS: usize = 10;
        /// Samples taken over one 4pi window when measuring peak amplitude
        pub const AMPLITUDE_SAMPLES: usize = 500;
        /// Lattice points per offset axis
        pub const GRID_STEPS: usize = 8;
        /// Fraction of the best peak the player must reach
        pub const TARGET_RATIO: f32 = 0.96;
        /// Pixels per amplitude unit in the wave display
        pub const AMPLITUDE_SCALE: f32 = 30.0;
        pub const COMPLETION_DELAY_MS: f32 = 3000.0;

        pub const DIAL_RADIUS: f32 = 30.0;
        pub const DIAL_CENTER_Y: f32 = 50.0;
    }

    /// HUD
    pub mod hud {
        pub const GRID_SPACING: u32 = 40;
        pub const GRID_ALPHA: f32 = 0.15;
        pub const TEXT_X: i32 = 20;
        pub const TEXT_Y: i32 = 25;
        pub const LINE_HEIGHT: i32 = 12;
    }
}

/// Period of the wave offset sliders (two full turns)
pub const OFFSET_PERIOD: f32 = 4.0 * std::f32::consts::PI;

/// Normalized angle to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(PI) - PI).abs() < 1e-6);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-6);
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_polar_to_cartesian() {
        let p = polar_to_cartesian(2.0, PI / 2.0);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 2.0).abs() < 1e-6);
    }
}
