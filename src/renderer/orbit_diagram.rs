//! Static orbit diagram
//!
//! A tilted orbit is an ellipse with radii `(r, r·cos tilt)` turned by the
//! tilt axis. Drawn small, thresholded to pure black and white, then
//! stretched for the chunky look.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::framebuffer::{PixelBuffer, Rgba};
use super::hud;

/// Logical diagram size before pixelation
pub const DIAGRAM_SIZE: u32 = 400;

const ELLIPSE_SEGMENTS: usize = 180;

/// Diagram parameters, sizes in logical pixels and angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrbitDiagramParams {
    pub main_body_size: f32,
    pub orbiting_body_size: f32,
    pub orbit_radius: f32,
    pub orbit_line_width: f32,
    pub orbit_tilt: f32,
    pub tilt_axis: f32,
    pub orbit_angle: f32,
    pub pixelation: f32,
}

impl Default for OrbitDiagramParams {
    fn default() -> Self {
        Self {
            main_body_size: 30.0,
            orbiting_body_size: 10.0,
            orbit_radius: 120.0,
            orbit_line_width: 2.0,
            orbit_tilt: 60.0,
            tilt_axis: 20.0,
            orbit_angle: 45.0,
            pixelation: 4.0,
        }
    }
}

impl OrbitDiagramParams {
    /// Side of the low-res drawing buffer
    pub fn buffer_size(&self) -> u32 {
        ((DIAGRAM_SIZE as f32 / self.pixelation.max(1.0)).floor() as u32).max(1)
    }

    /// Point on the orbit at `angle_deg`, relative to the main body, in
    /// low-res pixels
    pub fn orbit_point(&self, angle_deg: f32) -> Vec2 {
        let scale = self.pixelation.max(1.0);
        let radius = self.orbit_radius / scale;
        let tilt = self.orbit_tilt.to_radians().cos();
        let local = Vec2::new(
            angle_deg.to_radians().cos() * radius,
            angle_deg.to_radians().sin() * radius * tilt,
        );
        Vec2::from_angle(self.tilt_axis.to_radians()).rotate(local)
    }
}

/// Draw the diagram into `small` at its own resolution
pub fn draw_orbit_diagram(small: &mut PixelBuffer, params: &OrbitDiagramParams) {
    small.fill(Rgba::BLACK);
    let scale = params.pixelation.max(1.0);
    let center = small.size() / 2.0;
    let line = (params.orbit_line_width / scale).max(1.0);

    let points: Vec<Vec2> = (0..=ELLIPSE_SEGMENTS)
        .map(|i| center + params.orbit_point(i as f32 / ELLIPSE_SEGMENTS as f32 * 360.0))
        .collect();
    for pair in points.windows(2) {
        hud::stroke_line(small, pair[0], pair[1], line, Rgba::WHITE, 1.0);
    }

    small.fill_circle(center, params.main_body_size / scale, Rgba::WHITE);
    small.fill_circle(
        center + params.orbit_point(params.orbit_angle),
        params.orbiting_body_size / scale,
        Rgba::WHITE,
    );

    small.map_pixels(|p| if p.luma() > 128.0 { Rgba::WHITE } else { Rgba::BLACK });
}

/// Render the diagram and stretch it onto `out`
pub fn render_orbit_diagram(out: &mut PixelBuffer, params: &OrbitDiagramParams) {
    let size = params.buffer_size();
    let mut small = PixelBuffer::new(size, size);
    draw_orbit_diagram(&mut small, params);
    small.upscale_nearest(out);
    log::debug!(
        "Orbit diagram {}x{} stretched to {}x{}",
        size,
        size,
        out.width(),
        out.height()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_from_pixelation() {
        let mut params = OrbitDiagramParams::default();
        assert_eq!(params.buffer_size(), 100);
        params.pixelation = 3.0;
        assert_eq!(params.buffer_size(), 133);
        params.pixelation = 0.0;
        assert_eq!(params.buffer_size(), 400);
    }

    #[test]
    fn test_tilt_flattens_orbit() {
        let params = OrbitDiagramParams {
            orbit_tilt: 60.0,
            tilt_axis: 0.0,
            pixelation: 1.0,
            ..OrbitDiagramParams::default()
        };
        let side = params.orbit_point(0.0);
        let top = params.orbit_point(90.0);
        assert!((side.x - 120.0).abs() < 1e-3);
        assert!((top.y - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_only_black_and_white() {
        let mut out = PixelBuffer::new(400, 400);
        render_orbit_diagram(&mut out, &OrbitDiagramParams::default());
        assert!(out.pixels().iter().all(|p| *p == Rgba::WHITE || *p == Rgba::BLACK));
        // Main body at the center
        assert_eq!(out.get(200, 200), Some(Rgba::WHITE));
        // Between body and orbit is empty
        assert_eq!(out.get(200 - 60, 200 + 60), Some(Rgba::BLACK));
    }

    #[test]
    fn test_orbiting_body_position() {
        let params = OrbitDiagramParams {
            orbit_angle: 0.0,
            tilt_axis: 0.0,
            ..OrbitDiagramParams::default()
        };
        let mut out = PixelBuffer::new(400, 400);
        render_orbit_diagram(&mut out, &params);
        // Orbit radius 120 to the right of center
        assert_eq!(out.get(320, 200), Some(Rgba::WHITE));
        assert_eq!(out.get(320, 200 - 30), Some(Rgba::BLACK));
    }

    #[test]
    fn test_params_from_json() {
        let params: OrbitDiagramParams =
            serde_json::from_str(r#"{"orbitRadius": 90, "pixelation": 2}"#).unwrap();
        assert!((params.orbit_radius - 90.0).abs() < 1e-6);
        assert_eq!(params.buffer_size(), 200);
        assert!((params.main_body_size - 30.0).abs() < 1e-6);
    }
}
