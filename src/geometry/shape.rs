//! Parametric solids built from fixed sphere/box tables
//!
//! Every solid except the plain sphere is defined in object-local space.
//! Rays are carried into local space with `EulerRotation::apply_inverse`
//! and hits are carried back with `apply`.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::primitives::{Part, Ray, ray_sphere};
use super::rotation::EulerRotation;

/// Solid variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum ShapeKind {
    #[default]
    Sphere,
    Debris,
    Satellite,
    Spaceship,
    RectangularPrism,
    Station,
    Probe,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Sphere,
        ShapeKind::Debris,
        ShapeKind::Satellite,
        ShapeKind::Spaceship,
        ShapeKind::RectangularPrism,
        ShapeKind::Station,
        ShapeKind::Probe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Debris => "debris",
            ShapeKind::Satellite => "satellite",
            ShapeKind::Spaceship => "spaceship",
            ShapeKind::RectangularPrism => "rectangular-prism",
            ShapeKind::Station => "station",
            ShapeKind::Probe => "probe",
        }
    }

    /// Parse a catalog shape name; anything unrecognized is a sphere
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "debris" => ShapeKind::Debris,
            "satellite" => ShapeKind::Satellite,
            "spaceship" => ShapeKind::Spaceship,
            "rectangular-prism" | "rectangular_prism" => ShapeKind::RectangularPrism,
            "station" => ShapeKind::Station,
            "probe" => ShapeKind::Probe,
            "sphere" => ShapeKind::Sphere,
            other => {
                log::debug!("Unknown shape {:?}, using sphere", other);
                ShapeKind::Sphere
            }
        }
    }

    /// Size used by both the LIDAR scan and the cross-section view
    pub fn nominal_size(&self) -> f32 {
        match self {
            ShapeKind::Sphere => 1.2,
            ShapeKind::Debris => 1.0,
            ShapeKind::Satellite => 1.0,
            ShapeKind::Spaceship => 1.5,
            ShapeKind::RectangularPrism => 1.0,
            ShapeKind::Station => 1.2,
            ShapeKind::Probe => 0.8,
        }
    }

    /// Sub-primitives in units of the solid's size
    pub fn parts(&self) -> &'static [Part] {
        match self {
            ShapeKind::Sphere => &SPHERE,
            ShapeKind::Debris => &DEBRIS,
            ShapeKind::Satellite => &SATELLITE,
            ShapeKind::Spaceship => &SPACESHIP,
            ShapeKind::RectangularPrism => &RECTANGULAR_PRISM,
            ShapeKind::Station => &STATION,
            ShapeKind::Probe => &PROBE,
        }
    }
}

impl From<String> for ShapeKind {
    fn from(name: String) -> Self {
        ShapeKind::from_name(&name)
    }
}

impl From<Option<&str>> for ShapeKind {
    fn from(name: Option<&str>) -> Self {
        name.map(ShapeKind::from_name).unwrap_or_default()
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SPHERE: [Part; 1] = [Part::sphere(0.0, 0.0, 0.0, 1.0)];

const DEBRIS: [Part; 4] = [
    Part::sphere(0.0, 0.0, 0.0, 0.5),
    Part::sphere(0.4, 0.3, 0.0, 0.3),
    Part::sphere(-0.3, -0.2, 0.2, 0.25),
    Part::sphere(0.0, 0.4, -0.3, 0.2),
];

const SATELLITE: [Part; 3] = [
    Part::cuboid([0.0, 0.0, 0.0], [0.4, 0.4, 0.4]),
    Part::cuboid([-0.6, 0.0, 0.0], [0.8, 0.6, 0.05]),
    Part::cuboid([0.6, 0.0, 0.0], [0.8, 0.6, 0.05]),
];

const SPACESHIP: [Part; 3] = [
    // hull, engine, bridge
    Part::cuboid([0.0, 0.0, 0.0], [1.2, 0.4, 0.3]),
    Part::cuboid([-0.8, 0.0, 0.0], [0.6, 0.3, 0.3]),
    Part::cuboid([0.5, 0.0, 0.2], [0.3, 0.2, 0.2]),
];

const RECTANGULAR_PRISM: [Part; 1] = [Part::cuboid([0.0, 0.0, 0.0], [0.3, 2.0, 0.3])];

/// 0.8 * cos(45deg)
const RING_DIAG: f32 = 0.565_685_4;
const MODULE: [f32; 3] = [0.2, 0.2, 0.3];

const STATION: [Part; 9] = [
    Part::sphere(0.0, 0.0, 0.0, 0.4),
    Part::cuboid([0.8, 0.0, 0.0], MODULE),
    Part::cuboid([RING_DIAG, RING_DIAG, 0.0], MODULE),
    Part::cuboid([0.0, 0.8, 0.0], MODULE),
    Part::cuboid([-RING_DIAG, RING_DIAG, 0.0], MODULE),
    Part::cuboid([-0.8, 0.0, 0.0], MODULE),
    Part::cuboid([-RING_DIAG, -RING_DIAG, 0.0], MODULE),
    Part::cuboid([0.0, -0.8, 0.0], MODULE),
    Part::cuboid([RING_DIAG, -RING_DIAG, 0.0], MODULE),
];

const PROBE: [Part; 4] = [
    Part::sphere(0.0, 0.0, 0.0, 0.3),
    // antenna
    Part::cuboid([0.0, 0.0, 0.6], [0.05, 0.05, 0.8]),
    Part::cuboid([0.4, 0.0, 0.0], [0.6, 0.4, 0.02]),
    Part::cuboid([-0.4, 0.0, 0.0], [0.6, 0.4, 0.02]),
];

/// A solid and its nominal size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    pub size: f32,
}

impl ShapeDescriptor {
    pub fn new(kind: ShapeKind, size: f32) -> Self {
        Self { kind, size }
    }

    /// Descriptor at the kind's nominal size
    pub fn nominal(kind: ShapeKind) -> Self {
        Self::new(kind, kind.nominal_size())
    }

    fn scaled_parts(&self) -> impl Iterator<Item = Part> + '_ {
        self.kind.parts().iter().map(|part| part.scaled(self.size))
    }
}

/// Local-space containment test; true if any sub-primitive holds the point
pub fn point_in_solid(point: Vec3, shape: &ShapeDescriptor) -> bool {
    shape.scaled_parts().any(|part| part.contains(point))
}

/// First surface hit along the ray, in world space
///
/// The plain sphere is rotation invariant and is tested directly. Other
/// solids are tested in local space, keeping the hit closest to the local
/// ray origin.
pub fn intersect(ray: &Ray, shape: &ShapeDescriptor, rotation: &EulerRotation) -> Option<Vec3> {
    if shape.kind == ShapeKind::Sphere {
        return ray_sphere(ray, Vec3::ZERO, shape.size).map(|t| ray.at(t));
    }

    let local = Ray::new(
        rotation.apply_inverse(ray.origin),
        rotation.apply_inverse(ray.direction),
    );

    let closest = shape
        .scaled_parts()
        .filter_map(|part| part.intersect(&local).map(|t| local.at(t)))
        .min_by(|a, b| {
            let da = (*a - local.origin).length_squared();
            let db = (*b - local.origin).length_squared();
            da.total_cmp(&db)
        })?;

    Some(rotation.apply(closest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_origin_inside_centered_solids() {
        for kind in [ShapeKind::Sphere, ShapeKind::Debris, ShapeKind::Station] {
            assert!(point_in_solid(Vec3::ZERO, &ShapeDescriptor::new(kind, 1.0)));
        }
    }

    #[test]
    fn test_unknown_shape_is_sphere() {
        assert_eq!(ShapeKind::from_name("asteroid-field"), ShapeKind::Sphere);
        assert_eq!(ShapeKind::from(None::<&str>), ShapeKind::Sphere);
        assert_eq!(ShapeKind::from_name("Rectangular-Prism"), ShapeKind::RectangularPrism);
    }

    #[test]
    fn test_shape_name_round_trip() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_name(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ShapeKind::RectangularPrism).unwrap();
        assert_eq!(json, "\"rectangular-prism\"");
        let kind: ShapeKind = serde_json::from_str("\"comet\"").unwrap();
        assert_eq!(kind, ShapeKind::Sphere);
    }

    #[test]
    fn test_station_ring_module() {
        let station = ShapeDescriptor::new(ShapeKind::Station, 1.0);
        assert!(point_in_solid(Vec3::new(0.0, 0.8, 0.1), &station));
        assert!(point_in_solid(Vec3::new(0.56, -0.56, 0.0), &station));
        assert!(!point_in_solid(Vec3::new(0.6, 0.0, 0.0), &station));
    }

    #[test]
    fn test_sphere_ray_hits_at_camera_minus_radius() {
        let shape = ShapeDescriptor::nominal(ShapeKind::Sphere);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let hit = intersect(&ray, &shape, &EulerRotation::new(310.0, 360.0, 290.0)).unwrap();
        assert!(((hit - ray.origin).length() - (3.0 - 1.2)).abs() < 1e-5);
    }

    #[test]
    fn test_ray_away_never_hits() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Z);
        for kind in ShapeKind::ALL {
            let shape = ShapeDescriptor::nominal(kind);
            assert!(intersect(&ray, &shape, &EulerRotation::new(20.0, 30.0, 0.0)).is_none());
        }
    }

    #[test]
    fn test_debris_picks_closest_sub_sphere() {
        let shape = ShapeDescriptor::new(ShapeKind::Debris, 1.0);
        // Along +Y the 0.2 sphere at y=0.4 sticks out beyond the core
        let ray = Ray::new(Vec3::new(0.0, 3.0, -0.3), Vec3::NEG_Y);
        let hit = intersect(&ray, &shape, &EulerRotation::IDENTITY).unwrap();
        assert!((hit.y - 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_rotated_prism_hit_is_on_surface() {
        let shape = ShapeDescriptor::new(ShapeKind::RectangularPrism, 1.0);
        let rotation = EulerRotation::new(0.0, 0.0, 90.0);
        // Long axis now lies along X
        let ray = Ray::new(Vec3::new(0.9, 0.0, 3.0), Vec3::NEG_Z);
        let hit = intersect(&ray, &shape, &rotation).unwrap();
        assert!((hit.z - 0.15).abs() < 1e-4);
        assert!((hit.x - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_satellite_panel_hit() {
        let shape = ShapeDescriptor::new(ShapeKind::Satellite, 1.0);
        let ray = Ray::new(Vec3::new(0.8, 0.0, 3.0), Vec3::NEG_Z);
        let hit = intersect(&ray, &shape, &EulerRotation::IDENTITY).unwrap();
        assert!((hit.z - 0.025).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn far_points_are_outside(kind_idx in 0usize..7, size in 0.1f32..3.0,
                                  theta in 0.0f32..std::f32::consts::TAU, phi in 0.0f32..std::f32::consts::PI,
                                  extra in 0.01f32..10.0) {
            let shape = ShapeDescriptor::new(ShapeKind::ALL[kind_idx], size);
            let r = 2.0 * size + extra;
            let p = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()) * r;
            prop_assert!(!point_in_solid(p, &shape));
        }

        #[test]
        fn hits_lie_on_or_near_the_solid(kind_idx in 0usize..7, rx in 0.0f32..360.0, ry in 0.0f32..360.0,
                                          x in -0.5f32..0.5, y in -0.5f32..0.5) {
            let shape = ShapeDescriptor::nominal(ShapeKind::ALL[kind_idx]);
            let rotation = EulerRotation::new(rx, ry, 0.0);
            let ray = Ray::new(Vec3::new(x, y, 3.0), Vec3::NEG_Z);
            if let Some(hit) = intersect(&ray, &shape, &rotation) {
                prop_assert!(hit.length() <= 2.0 * shape.size + 1e-3);
            }
        }
    }
}
