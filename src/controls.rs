//! Input widgets and outbound signals
//!
//! The host UI hears about what happens here through `Signal`s queued on a
//! `SignalQueue` and drained once per event or frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::EulerRotation;
use crate::renderer::framebuffer::{PixelBuffer, Rgba};
use crate::renderer::hud;

/// Side of the orb widget in pixels
pub const ORB_SIZE: u32 = 120;
const ORB_RADIUS: f32 = 30.0;
/// Degrees of rotation per pixel dragged
const DRAG_GAIN: f32 = 2.0;

/// Which puzzle finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleKind {
    Orbit,
    Deflection,
    Interference,
}

/// Keys forwarded to the host for menu navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
}

impl NavKey {
    /// Map a DOM `KeyboardEvent.key` value; other keys are ignored
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(NavKey::ArrowLeft),
            "ArrowRight" => Some(NavKey::ArrowRight),
            "ArrowUp" => Some(NavKey::ArrowUp),
            "ArrowDown" => Some(NavKey::ArrowDown),
            "Enter" => Some(NavKey::Enter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavKey::ArrowLeft => "ArrowLeft",
            NavKey::ArrowRight => "ArrowRight",
            NavKey::ArrowUp => "ArrowUp",
            NavKey::ArrowDown => "ArrowDown",
            NavKey::Enter => "Enter",
        }
    }
}

/// Messages from the core to the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Signal {
    /// Orb orientation in whole degrees
    RotationChanged { x: i32, y: i32 },
    KeyPressed { key: NavKey },
    PuzzleSolved { puzzle: PuzzleKind },
}

/// Pending signals, drained by the host
#[derive(Debug, Default)]
pub struct SignalQueue {
    signals: Vec<Signal>,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: Signal) {
        log::debug!("Signal {:?}", signal);
        self.signals.push(signal);
    }

    /// Take every pending signal in order
    pub fn drain(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }
}

/// Drag-to-rotate widget steering the LIDAR view
#[derive(Debug, Clone)]
pub struct RotationOrb {
    pub rotation: EulerRotation,
    dragging: bool,
    last: Vec2,
}

impl Default for RotationOrb {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationOrb {
    pub fn new() -> Self {
        Self {
            rotation: EulerRotation::new(20.0, 30.0, 0.0),
            dragging: false,
            last: Vec2::ZERO,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.dragging = true;
        self.last = pos;
    }

    /// Apply a drag step. Returns the rotation signal when the orb is held;
    /// the caller redraws the LIDAR view with the new rotation.
    pub fn pointer_moved(&mut self, pos: Vec2) -> Option<Signal> {
        if !self.dragging {
            return None;
        }
        let delta = pos - self.last;
        self.last = pos;

        let r = &mut self.rotation;
        r.y = (r.y + delta.x * DRAG_GAIN).clamp(0.0, 360.0);
        r.x = (r.x + delta.y * DRAG_GAIN).clamp(0.0, 360.0);
        Some(Signal::RotationChanged {
            x: r.x.round() as i32,
            y: r.y.round() as i32,
        })
    }

    /// Release on pointer up or when the pointer leaves the widget
    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Wireframe indicator: outline, one bar per axis, center dot
    pub fn draw(&self, buf: &mut PixelBuffer) {
        buf.fill(Rgba::BLACK);
        let center = Vec2::splat(ORB_SIZE as f32 / 2.0);
        hud::stroke_circle(buf, center, ORB_RADIUS, 1.0, Rgba::WHITE);

        let half_w = ORB_RADIUS * self.rotation.y.to_radians().cos();
        hud::stroke_line(
            buf,
            center - Vec2::new(half_w, 0.0),
            center + Vec2::new(half_w, 0.0),
            1.0,
            Rgba::WHITE,
            1.0,
        );
        let half_h = ORB_RADIUS * self.rotation.x.to_radians().cos();
        hud::stroke_line(
            buf,
            center - Vec2::new(0.0, half_h),
            center + Vec2::new(0.0, half_h),
            1.0,
            Rgba::WHITE,
            1.0,
        );

        buf.fill_circle(center, 2.0, Rgba::WHITE);
    }
}
