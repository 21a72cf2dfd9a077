//! Sphere and box primitives
//!
//! Ray tests return the ray parameter `t` of the hit. Degenerate inputs
//! (zero-length direction, ray parallel to a slab it starts outside of)
//! are plain misses.

use glam::Vec3;

/// Directions shorter than this along an axis are treated as parallel
const PARALLEL_EPSILON: f32 = 1e-8;

/// A ray in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Expected to be unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// One sphere or box of a compound solid
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Part {
    Sphere { center: Vec3, radius: f32 },
    /// `extent` holds full width, height and depth
    Cuboid { center: Vec3, extent: Vec3 },
}

impl Part {
    pub const fn sphere(x: f32, y: f32, z: f32, radius: f32) -> Self {
        Part::Sphere {
            center: Vec3::new(x, y, z),
            radius,
        }
    }

    pub const fn cuboid(center: [f32; 3], extent: [f32; 3]) -> Self {
        Part::Cuboid {
            center: Vec3::new(center[0], center[1], center[2]),
            extent: Vec3::new(extent[0], extent[1], extent[2]),
        }
    }

    /// Scale offsets and dimensions by the solid's nominal size
    pub fn scaled(&self, size: f32) -> Self {
        match *self {
            Part::Sphere { center, radius } => Part::Sphere {
                center: center * size,
                radius: radius * size,
            },
            Part::Cuboid { center, extent } => Part::Cuboid {
                center: center * size,
                extent: extent * size,
            },
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        match *self {
            Part::Sphere { center, radius } => (p - center).length() <= radius,
            Part::Cuboid { center, extent } => {
                let d = (p - center).abs();
                let half = extent * 0.5;
                d.x <= half.x && d.y <= half.y && d.z <= half.z
            }
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match *self {
            Part::Sphere { center, radius } => ray_sphere(ray, center, radius),
            Part::Cuboid { center, extent } => {
                let half = extent * 0.5;
                ray_box(ray, center - half, center + half)
            }
        }
    }
}

/// Smallest non-negative root of the ray/sphere quadratic
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    if a < PARALLEL_EPSILON {
        return None;
    }
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sq = discriminant.sqrt();
    let near = (-b - sq) / (2.0 * a);
    let far = (-b + sq) / (2.0 * a);
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        // Origin inside the sphere
        Some(far)
    } else {
        None
    }
}

/// Slab test against an axis-aligned box; an origin inside returns the exit
pub fn ray_box(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        if d.abs() < PARALLEL_EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        tmin = tmin.max(t1.min(t2));
        tmax = tmax.min(t1.max(t2));
    }

    if tmax < 0.0 || tmin > tmax {
        return None;
    }
    Some(if tmin < 0.0 { tmax } else { tmin })
}
