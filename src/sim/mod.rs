//! Simulation module
//!
//! Gameplay logic for the three mini-games. Nothing in here draws or touches
//! the platform:
//! - Games advance through `FrameDriven::tick` and only decide whether
//!   another frame is wanted
//! - Level layouts take an explicit `Rng`, so tests can seed them
//! - Reproducible sequences use the generators in `rng`

pub mod deflection;
pub mod interference;
pub mod orbit;
pub mod rng;
pub mod tick;

pub use deflection::{
    DeflectionGame, DeflectionLevel, LightRay, Mirror, MirrorControl, RayTrace, Solution, Target,
    ray_segment_intersection, reflect, trace_ray,
};
pub use interference::{
    Harmonic, InterferenceGame, InterferenceLevel, SliderTrack, Wave, peak_amplitude, proximity,
};
pub use orbit::{
    Body, ClickResult, Flight, OrbitGame, OrbitLevel, OrbitPhase, Outcome, Trajectory,
    circular_speed, launch_velocity, simulate_trajectory,
};
pub use rng::{SineRng, harmonic_hash};
pub use tick::{FrameDriven, FrameHost, FrameLoop, TickControl};
