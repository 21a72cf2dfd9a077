//! LIDAR point cloud
//!
//! A cone of rays is fired from a camera on +Z at the object. Ray
//! directions come from `SineRng` seeded by the orientation, so the same
//! orientation always produces the same cloud.

use glam::{Vec2, Vec3};

use super::framebuffer::{PixelBuffer, Rgba};
use crate::consts::lidar::*;
use crate::geometry::{EulerRotation, Ray, ShapeDescriptor, ShapeKind, intersect};
use crate::sim::rng::SineRng;

/// Rays fired per scan for each shape
pub fn ray_count(kind: ShapeKind) -> usize {
    match kind {
        ShapeKind::Sphere => 4000,
        ShapeKind::Debris => 2000,
        ShapeKind::Satellite => 3500,
        ShapeKind::Spaceship => 3000,
        ShapeKind::RectangularPrism => 2500,
        ShapeKind::Station => 4000,
        ShapeKind::Probe => 1500,
    }
}

/// Generator seed for an orientation
pub fn scan_seed(rotation: &EulerRotation) -> f64 {
    rotation.x as f64 * 1000.0 + rotation.y as f64 * 100.0 + rotation.z as f64
}

/// World-space hit points for one scan, in ray order
pub fn scan(shape: &ShapeDescriptor, rotation: &EulerRotation, rays: usize) -> Vec<Vec3> {
    let mut rng = SineRng::new(scan_seed(rotation));
    let cone = CONE_HALF_ANGLE_DEG.to_radians();
    let camera = Vec3::new(0.0, 0.0, CAMERA_DISTANCE);

    let mut hits = Vec::with_capacity(rays);
    for _ in 0..rays {
        let theta = rng.next_f32() * std::f32::consts::TAU;
        let phi = rng.next_f32() * cone;
        let dir = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), -phi.cos());
        if let Some(hit) = intersect(&Ray::new(camera, dir), shape, rotation) {
            hits.push(hit);
        }
    }
    hits
}

/// Perspective divide onto a `width × height` canvas; `None` if off canvas
pub fn project(point: Vec3, width: f32, height: f32) -> Option<Vec2> {
    let scale = FOV / (point.z + DEPTH_OFFSET);
    let x = point.x * scale + width / 2.0;
    let y = point.y * scale + height / 2.0;
    let on_canvas = (0.0..=width).contains(&x) && (0.0..=height).contains(&y);
    on_canvas.then(|| Vec2::new(x, y))
}

/// Canvas pixels a scan lights up, snapped to the pixel grid
pub fn scan_pixels(kind: ShapeKind, rotation: &EulerRotation, width: f32, height: f32) -> Vec<(i32, i32)> {
    let shape = ShapeDescriptor::nominal(kind);
    scan(&shape, rotation, ray_count(kind))
        .into_iter()
        .filter_map(|p| project(p, width, height))
        .map(|p| {
            (
                ((p.x / PIXEL_SIZE).floor() * PIXEL_SIZE) as i32,
                ((p.y / PIXEL_SIZE).floor() * PIXEL_SIZE) as i32,
            )
        })
        .collect()
}

/// Clear to black and plot the cloud as white squares; returns points drawn
pub fn render_lidar(buf: &mut PixelBuffer, kind: ShapeKind, rotation: &EulerRotation) -> usize {
    buf.fill(Rgba::BLACK);
    let size = buf.size();
    let points = scan_pixels(kind, rotation, size.x, size.y);
    for &(x, y) in &points {
        buf.fill_rect(x, y, DOT_SIZE as i32, DOT_SIZE as i32, Rgba::WHITE);
    }
    log::debug!(
        "LIDAR {} at ({}, {}, {}): {} points",
        kind,
        rotation.x,
        rotation.y,
        rotation.z,
        points.len()
    );
    points.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_orientation_same_cloud() {
        let rotation = EulerRotation::new(310.0, 360.0, 290.0);
        let shape = ShapeDescriptor::new(ShapeKind::Sphere, 1.2);
        let a = scan(&shape, &rotation, 4000);
        let b = scan(&shape, &rotation, 4000);
        assert!(!a.is_empty());
        assert_eq!(a, b);

        let mut buf_a = PixelBuffer::new(CANVAS_SIZE, CANVAS_SIZE);
        let mut buf_b = PixelBuffer::new(CANVAS_SIZE, CANVAS_SIZE);
        render_lidar(&mut buf_a, ShapeKind::Sphere, &rotation);
        render_lidar(&mut buf_b, ShapeKind::Sphere, &rotation);
        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn test_different_orientation_changes_cloud() {
        let shape = ShapeDescriptor::nominal(ShapeKind::Satellite);
        let a = scan(&shape, &EulerRotation::new(20.0, 30.0, 0.0), 500);
        let b = scan(&shape, &EulerRotation::new(40.0, 30.0, 0.0), 500);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sphere_hits_face_camera() {
        let shape = ShapeDescriptor::new(ShapeKind::Sphere, 1.2);
        for p in scan(&shape, &EulerRotation::new(1.0, 2.0, 3.0), 500) {
            assert!((p.length() - 1.2).abs() < 1e-3);
            assert!(p.z > 0.0);
        }
    }

    #[test]
    fn test_projection_bounds() {
        let center = project(Vec3::ZERO, 400.0, 400.0).unwrap();
        assert!((center - Vec2::new(200.0, 200.0)).length() < 1e-4);
        // scale = 80 at z = 0
        let p = project(Vec3::new(1.0, -0.5, 0.0), 400.0, 400.0).unwrap();
        assert!((p - Vec2::new(280.0, 160.0)).length() < 1e-3);
        assert!(project(Vec3::new(10.0, 0.0, 0.0), 400.0, 400.0).is_none());
    }

    #[test]
    fn test_render_draws_points() {
        let mut buf = PixelBuffer::new(CANVAS_SIZE, CANVAS_SIZE);
        let drawn = render_lidar(&mut buf, ShapeKind::Probe, &EulerRotation::new(20.0, 30.0, 0.0));
        assert!(drawn > 0);
        assert!(buf.pixels().iter().any(|p| *p == Rgba::WHITE));
    }

    #[test]
    fn test_every_kind_has_rays() {
        for kind in ShapeKind::ALL {
            assert!(ray_count(kind) >= 1500);
        }
    }
}
