//! Analytic 3D geometry
//!
//! All "3D" in the crate is computed here per ray or per point:
//! - No mesh or scene state
//! - Fixed sub-primitive tables per solid
//! - Degenerate cases return `None`, never panic

pub mod primitives;
pub mod rotation;
pub mod shape;

pub use primitives::{Part, Ray, ray_box, ray_sphere};
pub use rotation::EulerRotation;
pub use shape::{ShapeDescriptor, ShapeKind, intersect, point_in_solid};
