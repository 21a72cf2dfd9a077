//! Cross-section through a solid at a fixed depth
//!
//! The slice plane is z = `slice`. Cells inside the solid are painted from
//! the object's material profile; speckle is drawn from the caller's RNG so
//! repeated renders shimmer like sensor noise.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::framebuffer::{PixelBuffer, Rgba, colors};
use crate::catalog::{Habitability, MaterialProfile, Organics, Value};
use crate::consts::cross_section::*;
use crate::geometry::{ShapeDescriptor, ShapeKind, point_in_solid};

/// Slice offsets where organic markers show up
const ORGANICS_SLICES: [f32; 2] = [0.5, -0.5];

/// World-space point sampled by logical pixel (px, py)
#[inline]
pub fn cell_point(px: u32, py: u32, slice: f32) -> Vec3 {
    let half = RESOLUTION as f32 / 2.0;
    Vec3::new(
        (px as f32 - half) / SCALE * 2.0,
        (py as f32 - half) / SCALE * 2.0,
        slice,
    )
}

/// Background tint chosen by habitability
pub fn base_tint(habitability: &Habitability) -> Rgba {
    match habitability {
        Habitability::HighPossibility => colors::TINT_HABITABLE,
        Habitability::NotHabitable | Habitability::Dangerous => colors::TINT_HOSTILE,
        _ => colors::TINT_NEUTRAL,
    }
}

/// Color of one inside cell; the first matching rule wins
pub fn cell_color<R: Rng>(
    kind: ShapeKind,
    point: Vec3,
    profile: &MaterialProfile,
    rng: &mut R,
) -> Rgba {
    let sphere = kind == ShapeKind::Sphere;
    let distance = point.length();
    let dense = profile.density.is_high();

    if dense && sphere && distance <= DENSE_CORE_RADIUS {
        return Rgba::BLACK;
    }
    if profile.habitability == Habitability::HighPossibility
        && sphere
        && (HABITABLE_SHELL_INNER..=HABITABLE_SHELL_OUTER).contains(&distance)
        && rng.random::<f32>() < HABITABLE_SHELL_CHANCE
    {
        return colors::HABITABLE_SHELL;
    }
    match profile.value {
        Value::High if rng.random::<f32>() < HIGH_VALUE_CHANCE => return colors::HIGH_VALUE,
        Value::Medium if rng.random::<f32>() < MEDIUM_VALUE_CHANCE => return colors::HIGH_VALUE,
        _ => {}
    }
    if dense {
        let chance = if sphere {
            (DENSITY_SPECKLE_CHANCE + 0.6 * (1.0 - distance).max(0.0)).min(DENSITY_SPECKLE_MAX)
        } else {
            DENSITY_SPECKLE_CHANCE
        };
        if rng.random::<f32>() < chance {
            return Rgba::BLACK;
        }
    }
    base_tint(&profile.habitability)
}

/// Whether organic markers can appear at this slice depth
pub fn organics_visible(profile: &MaterialProfile, slice: f32) -> bool {
    profile.organics == Organics::Detected
        && ORGANICS_SLICES
            .iter()
            .any(|s| (slice - s).abs() < ORGANICS_BAND)
}

/// Paint the slice into `buf`, stretching the logical grid to its size.
/// Returns the number of inside cells.
pub fn render_cross_section<R: Rng>(
    buf: &mut PixelBuffer,
    kind: ShapeKind,
    slice: f32,
    profile: &MaterialProfile,
    rng: &mut R,
) -> usize {
    buf.fill(Rgba::BLACK);
    let shape = ShapeDescriptor::nominal(kind);
    let sx = buf.width() as f32 / RESOLUTION as f32;
    let sy = buf.height() as f32 / RESOLUTION as f32;
    let organics = organics_visible(profile, slice);

    let mut inside = 0;
    for px in (0..RESOLUTION).step_by(STEP as usize) {
        for py in (0..RESOLUTION).step_by(STEP as usize) {
            let point = cell_point(px, py, slice);
            if !point_in_solid(point, &shape) {
                continue;
            }
            inside += 1;

            let color = cell_color(kind, point, profile, rng);
            let x = (px as f32 * sx) as i32;
            let y = (py as f32 * sy) as i32;
            let w = (DOT_SIZE * sx).ceil() as i32;
            let h = (DOT_SIZE * sy).ceil() as i32;
            buf.fill_rect(x, y, w, h, color);

            if organics && rng.random::<f32>() < ORGANICS_CHANCE {
                let center = Vec2::new(
                    (px as f32 + DOT_SIZE / 2.0) * sx,
                    (py as f32 + DOT_SIZE / 2.0) * sy,
                );
                buf.fill_circle(center, DOT_SIZE * sx, colors::ORGANICS);
            }
        }
    }

    log::debug!("Cross-section {} at z={:.2}: {} cells", kind, slice, inside);
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Density;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(9)
    }

    fn count(buf: &PixelBuffer, color: Rgba) -> usize {
        buf.pixels().iter().filter(|p| **p == color).count()
    }

    #[test]
    fn test_cell_point_mapping() {
        let p = cell_point(200, 200, 0.4);
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6);
        assert!((p.z - 0.4).abs() < 1e-6);
        let q = cell_point(275, 125, 0.0);
        assert!((q.x - 1.0).abs() < 1e-5);
        assert!((q.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_dense_core_is_black() {
        let profile = MaterialProfile {
            density: Density::VeryHigh,
            value: Value::High,
            ..MaterialProfile::default()
        };
        for _ in 0..50 {
            let c = cell_color(ShapeKind::Sphere, Vec3::new(0.1, 0.1, 0.0), &profile, &mut rng());
            assert_eq!(c, Rgba::BLACK);
        }
    }

    #[test]
    fn test_plain_profile_uses_tint() {
        let mut r = rng();
        let hostile = MaterialProfile {
            habitability: Habitability::Dangerous,
            ..MaterialProfile::default()
        };
        assert_eq!(
            cell_color(ShapeKind::Debris, Vec3::ZERO, &hostile, &mut r),
            colors::TINT_HOSTILE
        );
        assert_eq!(
            cell_color(ShapeKind::Debris, Vec3::ZERO, &MaterialProfile::default(), &mut r),
            colors::TINT_NEUTRAL
        );
    }

    #[test]
    fn test_sphere_slice_area() {
        let mut buf = PixelBuffer::new(RESOLUTION, RESOLUTION);
        let profile = MaterialProfile::default();
        let center = render_cross_section(&mut buf, ShapeKind::Sphere, 0.0, &profile, &mut rng());
        let edge = render_cross_section(&mut buf, ShapeKind::Sphere, 1.0, &profile, &mut rng());
        let outside = render_cross_section(&mut buf, ShapeKind::Sphere, 1.5, &profile, &mut rng());
        assert!(center > edge);
        assert!(edge > 0);
        assert_eq!(outside, 0);
        assert!(buf.pixels().iter().all(|p| *p == Rgba::BLACK));
    }

    #[test]
    fn test_habitable_shell_appears() {
        let mut buf = PixelBuffer::new(RESOLUTION, RESOLUTION);
        let profile = MaterialProfile {
            habitability: Habitability::HighPossibility,
            ..MaterialProfile::default()
        };
        render_cross_section(&mut buf, ShapeKind::Sphere, 0.0, &profile, &mut rng());
        assert!(count(&buf, colors::HABITABLE_SHELL) > 0);
        assert!(count(&buf, colors::TINT_HABITABLE) > 0);
        // Center cell is tint, not shell
        assert_eq!(buf.get(201, 201), Some(colors::TINT_HABITABLE));
    }

    #[test]
    fn test_organics_only_near_marker_slices() {
        let profile = MaterialProfile {
            organics: Organics::Detected,
            ..MaterialProfile::default()
        };
        assert!(organics_visible(&profile, 0.45));
        assert!(organics_visible(&profile, -0.55));
        assert!(!organics_visible(&profile, 0.0));
        assert!(!organics_visible(&MaterialProfile::default(), 0.5));

        let mut buf = PixelBuffer::new(RESOLUTION, RESOLUTION);
        render_cross_section(&mut buf, ShapeKind::Sphere, 0.5, &profile, &mut rng());
        assert!(count(&buf, colors::ORGANICS) > 0);
        render_cross_section(&mut buf, ShapeKind::Sphere, 0.0, &profile, &mut rng());
        assert_eq!(count(&buf, colors::ORGANICS), 0);
    }

    #[test]
    fn test_stretches_to_smaller_buffer() {
        let mut buf = PixelBuffer::new(200, 200);
        render_cross_section(&mut buf, ShapeKind::Sphere, 0.0, &MaterialProfile::default(), &mut rng());
        assert_eq!(buf.get(100, 100), Some(colors::TINT_NEUTRAL));
        assert_eq!(buf.get(2, 2), Some(Rgba::BLACK));
    }
}
