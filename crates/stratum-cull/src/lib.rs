//! Visibility primitives for planet-scale scenes: bounding spheres, plane-set
//! culling volumes, perspective frustum plane extraction, and a
//! planet-silhouette occluder.
//!
//! All math is f64 (`DVec3`/`DVec4`) because scene extents span sub-meter
//! objects to planetary radii, well past f32 precision.

pub mod frustum;
pub mod occluder;
pub mod volume;

pub use frustum::PerspectiveFrustum;
pub use occluder::Occluder;
pub use volume::{BoundingSphere, CullingVolume, DepthInterval, Intersection};
