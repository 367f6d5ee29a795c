//! Bounding spheres and plane-set culling volumes with three-way
//! classification.

use glam::{DVec3, DVec4};

/// Result of testing a bounding volume against a culling volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intersection {
    /// The volume is entirely inside every plane.
    Inside,
    /// The volume straddles at least one plane.
    Intersecting,
    /// The volume is entirely behind at least one plane.
    Outside,
}

/// A sphere bounding a renderable object, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere in world space.
    pub center: DVec3,
    /// Radius of the sphere. Negative radii are a producer error and are
    /// rejected at binning time.
    pub radius: f64,
}

impl BoundingSphere {
    /// Create a new bounding sphere.
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Compute the sphere's depth extent along the camera view direction.
    ///
    /// `position` is the camera position and `direction` its unit view
    /// direction. The result brackets the sphere's projection onto the view
    /// axis: `[proj - radius, proj + radius]`.
    pub fn depth_interval(&self, position: DVec3, direction: DVec3) -> DepthInterval {
        let proj = (self.center - position).dot(direction);
        DepthInterval {
            start: proj - self.radius,
            stop: proj + self.radius,
        }
    }
}

/// A near/far distance range along the camera view direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthInterval {
    /// Nearest distance covered by the volume.
    pub start: f64,
    /// Farthest distance covered by the volume.
    pub stop: f64,
}

/// An ordered set of plane equations bounding the visible region.
///
/// Each plane is `DVec4(nx, ny, nz, d)` where `(nx, ny, nz)` is the unit
/// normal pointing *into* the visible region and `d` the signed distance
/// term, so a point `p` is on the visible side when `n.dot(p) + d >= 0`.
///
/// A camera culling volume holds five planes (near, left, right, bottom,
/// top). The far plane is deliberately absent: the far bound is enforced by
/// the depth-slice partition, not the cull test.
#[derive(Clone, Debug)]
pub struct CullingVolume {
    planes: Vec<DVec4>,
}

impl CullingVolume {
    /// Build a culling volume from plane equations.
    ///
    /// Planes are normalized so that `(nx, ny, nz)` is a unit vector.
    pub fn from_planes(mut planes: Vec<DVec4>) -> Self {
        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 1e-12 {
                *plane /= len;
            }
        }
        Self { planes }
    }

    /// The plane equations, in construction order.
    pub fn planes(&self) -> &[DVec4] {
        &self.planes
    }

    /// Classify a bounding sphere against the volume.
    ///
    /// Returns [`Intersection::Outside`] as soon as the sphere is entirely
    /// behind any single plane, so rejection is cheap for off-screen
    /// volumes.
    pub fn visibility(&self, sphere: &BoundingSphere) -> Intersection {
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();
            let signed_dist = normal.dot(sphere.center) + plane.w;

            if signed_dist < -sphere.radius {
                return Intersection::Outside;
            }
            if signed_dist < sphere.radius {
                all_inside = false;
            }
        }

        if all_inside {
            Intersection::Inside
        } else {
            Intersection::Intersecting
        }
    }
}
