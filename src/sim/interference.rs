//! Wave interference puzzle
//!
//! Three noisy waveforms are summed. The player slides each wave's phase
//! offset until the composite peak reaches a target found by a coarse
//! lattice search at generation time.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::rng::harmonic_hash;
use super::tick::{FrameDriven, TickControl};
use crate::OFFSET_PERIOD;
use crate::consts::interference::*;

/// One sine component of a wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    pub frequency: f32,
    pub amplitude: f32,
    pub phase: f32,
}

/// A waveform built from ten harmonics plus a player-controlled offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub components: [Harmonic; HARMONICS],
    /// Phase offset in [0, 4π]
    pub offset: f32,
}

impl Wave {
    /// Same seed, same harmonics
    pub fn from_seed(seed: f64) -> Self {
        let hash = |min: f32, max: f32, index: u32| harmonic_hash(seed, min, max, index);
        let base_freq = 0.8 + hash(0.0, 0.6, 0);

        let components = std::array::from_fn(|i| {
            let index = i as u32;
            let harmonic = (i + 1) as f32;
            Harmonic {
                frequency: base_freq * harmonic * (0.95 + hash(0.0, 0.1, index)),
                amplitude: (0.2 + hash(0.0, 0.3, index + 10)) / (1.0 + i as f32 * 0.2),
                phase: hash(0.0, TAU, index + 20),
            }
        });

        Self {
            components,
            offset: 0.0,
        }
    }

    /// Value at `x` with an explicit offset
    #[inline]
    pub fn value_with_offset(&self, x: f32, offset: f32) -> f32 {
        self.components
            .iter()
            .map(|c| c.amplitude * (c.frequency * x + c.phase + offset).sin())
            .sum()
    }

    #[inline]
    pub fn value(&self, x: f32) -> f32 {
        self.value_with_offset(x, self.offset)
    }
}

/// Sum of every wave at `x`, using their current offsets
pub fn composite_value(waves: &[Wave], x: f32) -> f32 {
    waves.iter().map(|w| w.value(x)).sum()
}

/// Largest |composite| over 500 samples of `[0, 4π)` for the given offsets
pub fn peak_amplitude(waves: &[Wave], offsets: &[f32]) -> f32 {
    (0..AMPLITUDE_SAMPLES)
        .map(|i| {
            let x = i as f32 / AMPLITUDE_SAMPLES as f32 * OFFSET_PERIOD;
            waves
                .iter()
                .zip(offsets)
                .map(|(w, &o)| w.value_with_offset(x, o))
                .sum::<f32>()
                .abs()
        })
        .fold(0.0, f32::max)
}

/// Offset for lattice index `i`
#[inline]
pub fn lattice_offset(i: usize) -> f32 {
    i as f32 / GRID_STEPS as f32 * OFFSET_PERIOD
}

/// Iterate every offset triple of the 8×8×8 lattice
pub fn lattice() -> impl Iterator<Item = [f32; WAVE_COUNT]> {
    (0..GRID_STEPS).flat_map(|i| {
        (0..GRID_STEPS).flat_map(move |j| {
            (0..GRID_STEPS).map(move |k| [lattice_offset(i), lattice_offset(j), lattice_offset(k)])
        })
    })
}

/// Extremes of the lattice search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeSearch {
    pub best_offsets: [f32; WAVE_COUNT],
    pub best_peak: f32,
    pub worst_offsets: [f32; WAVE_COUNT],
    pub worst_peak: f32,
}

/// Single pass over the lattice for both argmax and argmin
pub fn search_lattice(waves: &[Wave]) -> LatticeSearch {
    let mut search = LatticeSearch {
        best_offsets: [0.0; WAVE_COUNT],
        best_peak: 0.0,
        worst_offsets: [0.0; WAVE_COUNT],
        worst_peak: f32::INFINITY,
    };

    for offsets in lattice() {
        let peak = peak_amplitude(waves, &offsets);
        if peak > search.best_peak {
            search.best_peak = peak;
            search.best_offsets = offsets;
        }
        if peak < search.worst_peak {
            search.worst_peak = peak;
            search.worst_offsets = offsets;
        }
    }
    search
}

/// Circular closeness of one offset to its solution, 1 = aligned
pub fn proximity(offset: f32, solution: f32) -> f32 {
    let diff = (offset - solution).abs();
    let wrapped = diff.min(OFFSET_PERIOD - diff);
    (1.0 - wrapped / (OFFSET_PERIOD / 2.0)).max(0.0)
}

/// Horizontal slider track, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderTrack {
    pub left: f32,
    pub right: f32,
}

impl SliderTrack {
    /// Track inside the control box (10% padding, 20 px left inset, 30 px right)
    pub fn for_width(width: f32) -> Self {
        let padding = width * 0.1;
        Self {
            left: padding + 20.0,
            right: width - padding - 30.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn offset_at(&self, x: f32) -> f32 {
        let clamped = x.clamp(self.left, self.right);
        (clamped - self.left) / self.width() * OFFSET_PERIOD
    }

    pub fn x_for(&self, offset: f32) -> f32 {
        self.left + offset / OFFSET_PERIOD * self.width()
    }
}

/// A generated puzzle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterferenceLevel {
    pub seed: f64,
    pub waves: Vec<Wave>,
    pub solution_offsets: [f32; WAVE_COUNT],
    pub target_amplitude: f32,
}

impl InterferenceLevel {
    /// Waves from `seed + 1..=3`, started at the worst lattice alignment
    pub fn from_seed(seed: f64) -> Self {
        let mut waves: Vec<Wave> = (1..=WAVE_COUNT)
            .map(|i| Wave::from_seed(seed + i as f64))
            .collect();

        let search = search_lattice(&waves);
        for (wave, offset) in waves.iter_mut().zip(search.worst_offsets) {
            wave.offset = offset.rem_euclid(OFFSET_PERIOD);
        }

        log::info!(
            "Interference level seed {:.2}: best peak {:.2}, start peak {:.2}",
            seed,
            search.best_peak,
            search.worst_peak
        );

        Self {
            seed,
            waves,
            solution_offsets: search.best_offsets,
            target_amplitude: search.best_peak * TARGET_RATIO,
        }
    }

    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Self::from_seed(rng.random::<f64>() * 1000.0)
    }

    pub fn offsets(&self) -> [f32; WAVE_COUNT] {
        std::array::from_fn(|i| self.waves.get(i).map_or(0.0, |w| w.offset))
    }

    pub fn current_peak(&self) -> f32 {
        peak_amplitude(&self.waves, &self.offsets())
    }

    pub fn proximity(&self, index: usize) -> f32 {
        match (self.waves.get(index), self.solution_offsets.get(index)) {
            (Some(wave), Some(&solution)) => proximity(wave.offset, solution),
            _ => 0.0,
        }
    }

    /// Mean proximity across all waves, shown on the dial
    pub fn overall_proximity(&self) -> f32 {
        if self.waves.is_empty() {
            return 0.0;
        }
        (0..self.waves.len()).map(|i| self.proximity(i)).sum::<f32>() / self.waves.len() as f32
    }
}

/// Wave puzzle session state
#[derive(Debug, Clone)]
pub struct InterferenceGame {
    pub level: InterferenceLevel,
    /// Composite peak at the current offsets
    pub peak: f32,
    pub won: bool,
    pub win_elapsed_ms: f32,
    pub dragging: Option<usize>,
    pub track: SliderTrack,
    rng: Pcg32,
}

impl InterferenceGame {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }

    pub fn with_rng(mut rng: Pcg32) -> Self {
        let level = InterferenceLevel::generate(&mut rng);
        Self::with_level(level, rng)
    }

    pub fn with_level(level: InterferenceLevel, rng: Pcg32) -> Self {
        let mut game = Self {
            peak: 0.0,
            level,
            won: false,
            win_elapsed_ms: 0.0,
            dragging: None,
            track: SliderTrack::for_width(CANVAS_WIDTH as f32),
            rng,
        };
        game.evaluate();
        game
    }

    pub fn reset(&mut self) {
        self.level = InterferenceLevel::generate(&mut self.rng);
        self.won = false;
        self.win_elapsed_ms = 0.0;
        self.dragging = None;
        self.evaluate();
    }

    /// Refresh the peak; latches the win
    fn evaluate(&mut self) {
        self.peak = self.level.current_peak();
        if !self.won && self.peak >= self.level.target_amplitude {
            self.won = true;
            self.win_elapsed_ms = 0.0;
            self.dragging = None;
            log::info!(
                "Signal cleared: peak {:.2} >= target {:.2}",
                self.peak,
                self.level.target_amplitude
            );
        }
    }

    /// Set one wave's offset; ignored after a win
    pub fn set_offset(&mut self, index: usize, offset: f32) -> bool {
        if self.won {
            return false;
        }
        let Some(wave) = self.level.waves.get_mut(index) else {
            return false;
        };
        wave.offset = offset.clamp(0.0, OFFSET_PERIOD);
        self.evaluate();
        true
    }

    /// Press in the control strip picks the slider row
    pub fn pointer_down(&mut self, pos: Vec2) -> Option<usize> {
        if self.won {
            return None;
        }
        let display = WAVE_DISPLAY_HEIGHT as f32;
        if pos.y < display {
            return None;
        }
        let row_height = (CANVAS_HEIGHT - WAVE_DISPLAY_HEIGHT) as f32 / WAVE_COUNT as f32;
        let row = ((pos.y - display) / row_height).floor() as usize;
        self.dragging = (row < WAVE_COUNT).then_some(row);
        self.dragging
    }

    /// Drag the selected slider; true if an offset changed
    pub fn pointer_moved(&mut self, pos: Vec2) -> bool {
        match self.dragging {
            Some(index) if !self.won => self.set_offset(index, self.track.offset_at(pos.x)),
            _ => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.dragging = None;
    }

    /// Countdown progress after the win, 0..=1
    pub fn completion_progress(&self) -> f32 {
        if self.won {
            (self.win_elapsed_ms / COMPLETION_DELAY_MS).min(1.0)
        } else {
            0.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.won && self.win_elapsed_ms >= COMPLETION_DELAY_MS
    }
}

impl FrameDriven for InterferenceGame {
    /// Only animates the post-win countdown
    fn tick(&mut self, dt_ms: f32) -> TickControl {
        if !self.won {
            return TickControl::Stop;
        }
        self.win_elapsed_ms += dt_ms;
        if self.is_complete() {
            log::info!("Interference puzzle complete");
        }
        TickControl::from_bool(!self.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_from_seed_is_deterministic() {
        assert_eq!(Wave::from_seed(42.0), Wave::from_seed(42.0));
        assert_ne!(Wave::from_seed(42.0), Wave::from_seed(43.0));
    }

    #[test]
    fn test_harmonic_ranges() {
        let wave = Wave::from_seed(517.25);
        for (i, c) in wave.components.iter().enumerate() {
            let h = (i + 1) as f32;
            // base in [0.8, 1.4), multiplier in [0.95, 1.05)
            assert!(c.frequency >= 0.8 * h * 0.95 - 1e-4);
            assert!(c.frequency <= 1.4 * h * 1.05 + 1e-4);
            let falloff = 1.0 + i as f32 * 0.2;
            assert!(c.amplitude >= 0.2 / falloff - 1e-5);
            assert!(c.amplitude <= 0.5 / falloff + 1e-5);
            assert!((0.0..TAU).contains(&c.phase));
        }
    }

    #[test]
    fn test_solution_beats_every_lattice_point() {
        let level = InterferenceLevel::from_seed(123.0);
        let best = peak_amplitude(&level.waves, &level.solution_offsets);
        for offsets in lattice() {
            assert!(best >= peak_amplitude(&level.waves, &offsets));
        }
        assert!((level.target_amplitude - best * TARGET_RATIO).abs() < 1e-4);
    }

    #[test]
    fn test_starts_at_worst_alignment() {
        let level = InterferenceLevel::from_seed(77.0);
        let start = level.current_peak();
        for offsets in lattice().step_by(7) {
            assert!(start <= peak_amplitude(&level.waves, &offsets) + 1e-5);
        }
        assert!(start < level.target_amplitude);
    }

    #[test]
    fn test_lattice_size() {
        assert_eq!(lattice().count(), GRID_STEPS.pow(3));
    }

    #[test]
    fn test_proximity_wraps() {
        assert!((proximity(1.0, 1.0) - 1.0).abs() < 1e-6);
        // Half a period away is the floor
        assert!(proximity(0.0, OFFSET_PERIOD / 2.0).abs() < 1e-6);
        // 0 and 4π are the same point
        assert!((proximity(0.0, OFFSET_PERIOD) - 1.0).abs() < 1e-6);
        assert!((proximity(0.1, OFFSET_PERIOD - 0.1) - proximity(0.0, 0.2)).abs() < 1e-5);
    }

    #[test]
    fn test_slider_track_mapping() {
        let track = SliderTrack::for_width(640.0);
        assert!((track.left - 84.0).abs() < 1e-4);
        assert!((track.right - 546.0).abs() < 1e-4);
        assert_eq!(track.offset_at(0.0), 0.0);
        assert!((track.offset_at(1000.0) - OFFSET_PERIOD).abs() < 1e-5);
        let mid = track.offset_at(315.0);
        assert!((track.x_for(mid) - 315.0).abs() < 1e-3);
    }

    #[test]
    fn test_pointer_rows() {
        let mut game = InterferenceGame::new(3);
        assert_eq!(game.pointer_down(Vec2::new(300.0, 100.0)), None);
        assert_eq!(game.pointer_down(Vec2::new(300.0, 310.0)), Some(0));
        assert_eq!(game.pointer_down(Vec2::new(300.0, 350.0)), Some(1));
        assert_eq!(game.pointer_down(Vec2::new(300.0, 399.0)), Some(2));
        game.pointer_up();
        assert!(!game.pointer_moved(Vec2::new(200.0, 399.0)));
    }

    #[test]
    fn test_win_is_sticky_and_counts_down() {
        let mut game = InterferenceGame::new(9);
        assert_eq!(game.tick(16.0), TickControl::Stop);
        assert!(!game.won);

        let solution = game.level.solution_offsets;
        for (i, offset) in solution.iter().enumerate() {
            game.set_offset(i, *offset);
        }
        assert!(game.won);

        // Interaction is disabled once won
        assert!(!game.set_offset(0, 0.0));
        assert_eq!(game.pointer_down(Vec2::new(300.0, 310.0)), None);

        let mut frames = 0;
        while game.tick(100.0) == TickControl::Continue {
            frames += 1;
        }
        assert_eq!(frames, 29);
        assert!(game.is_complete());
        assert!((game.completion_progress() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_win() {
        let mut game = InterferenceGame::new(5);
        let solution = game.level.solution_offsets;
        for (i, offset) in solution.iter().enumerate() {
            game.set_offset(i, *offset);
        }
        assert!(game.won);
        game.reset();
        assert!(!game.won);
        assert_eq!(game.win_elapsed_ms, 0.0);
    }
}
