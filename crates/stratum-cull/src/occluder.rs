//! Silhouette occlusion by a large spherical body.
//!
//! A planet hides most bounding volumes behind it even when they pass the
//! frustum test. The occluder is derived once per frame from the nearest
//! large body and the camera position, then queried per command.

use glam::DVec3;

use crate::volume::BoundingSphere;

/// Occlusion state computed from the camera and an occluding body.
#[derive(Clone, Debug)]
pub struct Occluder {
    camera_pos: DVec3,
    body_center: DVec3,
    body_radius: f64,
    /// Distance from camera to the body center.
    camera_distance: f64,
}

impl Occluder {
    /// Create an occluder for `body` as seen from `camera_pos`.
    pub fn new(body: &BoundingSphere, camera_pos: DVec3) -> Self {
        let camera_distance = (body.center - camera_pos).length();
        Self {
            camera_pos,
            body_center: body.center,
            body_radius: body.radius,
            camera_distance,
        }
    }

    /// Straight-line distance from the camera to the horizon tangent point,
    /// or 0 when the camera is inside the body.
    pub fn horizon_distance(&self) -> f64 {
        if self.camera_distance <= self.body_radius {
            return 0.0;
        }
        (self.camera_distance * self.camera_distance - self.body_radius * self.body_radius).sqrt()
    }

    /// Test whether any part of `sphere` can be seen past the body.
    ///
    /// Returns `false` only when the sphere is provably hidden in the
    /// body's shadow volume. The test erodes the occluder by the occludee
    /// radius and ray-casts to the occludee center: if the camera-to-center
    /// ray enters the eroded body before reaching the center, every point
    /// within `sphere.radius` of the center is behind the full body.
    pub fn is_sphere_visible(&self, sphere: &BoundingSphere) -> bool {
        if self.camera_distance <= self.body_radius {
            // Camera inside the body: the silhouette test is meaningless.
            return true;
        }

        let eroded = self.body_radius - sphere.radius;
        if eroded <= 0.0 {
            // Occludee at least as large as the body can never be fully hidden.
            return true;
        }

        let to_occludee = sphere.center - self.camera_pos;
        let dist = to_occludee.length();
        if dist < 1e-12 {
            return true;
        }

        let along_ray = to_occludee.dot(self.body_center - self.camera_pos) / dist;
        if along_ray <= 0.0 {
            // Body is behind the camera relative to the occludee.
            return true;
        }

        let c = self.camera_distance * self.camera_distance - eroded * eroded;
        let disc = along_ray * along_ray - c;
        if disc < 0.0 {
            // Ray misses the eroded body.
            return true;
        }

        let entry = along_ray - disc.sqrt();
        entry >= dist
    }
}
