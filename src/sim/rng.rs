//! Reproducible pseudo-random sources
//!
//! Two hand-specified generators whose exact sequences matter: the LIDAR
//! scan must repeat for the same orientation and the wave harmonics must
//! repeat for the same seed. Level layouts use `rand_pcg::Pcg32` instead.

/// `s = sin(s) * 10000`, returning the fractional part
///
/// State is kept in f64 so sequences do not collapse after a few draws.
#[derive(Debug, Clone)]
pub struct SineRng {
    state: f64,
}

impl SineRng {
    pub fn new(seed: f64) -> Self {
        Self {
            // sin(0) = 0 would yield zeros forever
            state: if seed == 0.0 { 1.0 } else { seed },
        }
    }

    /// Next value in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.state = self.state.sin() * 10000.0;
        let frac = self.state - self.state.floor();
        (frac as f32).min(1.0 - f32::EPSILON)
    }
}

/// Stateless hash in [min, max) keyed by seed and index
pub fn harmonic_hash(seed: f64, min: f32, max: f32, index: u32) -> f32 {
    let x = (seed * 12.9898 + index as f64 * 78.233).sin() * 43758.5453;
    let frac = ((x - x.floor()) as f32).min(1.0 - f32::EPSILON);
    min + frac * (max - min)
}
