//! Perspective frustum parameters and geometric culling-volume construction.

use glam::{DVec3, DVec4};

use crate::volume::CullingVolume;

/// A symmetric perspective viewing frustum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveFrustum {
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Width / height.
    pub aspect_ratio: f64,
    /// Near clip plane distance (positive).
    pub near: f64,
    /// Far clip plane distance (positive, > near).
    pub far: f64,
}

impl PerspectiveFrustum {
    /// Compute the five-plane culling volume for a camera at `position`
    /// looking along `direction` with `up` completing an orthonormal basis.
    ///
    /// Planes are ordered near, left, right, bottom, top, each with an
    /// inward-pointing unit normal. The side planes pass through the camera
    /// position; the near plane sits at `near` along the view direction.
    /// The far plane is omitted (see [`CullingVolume`]).
    pub fn culling_volume(&self, position: DVec3, direction: DVec3, up: DVec3) -> CullingVolume {
        let right = direction.cross(up);
        let near_center = position + direction * self.near;
        let half_height = self.near * (self.fov_y * 0.5).tan();
        let half_width = half_height * self.aspect_ratio;

        let near_plane = DVec4::new(
            direction.x,
            direction.y,
            direction.z,
            -direction.dot(near_center),
        );

        // Each side plane contains the camera position; its normal comes
        // from the edge direction through the matching near-rectangle edge
        // midpoint, crossed with the basis vector along that edge.
        let to_left = (near_center - right * half_width - position).normalize();
        let to_right = (near_center + right * half_width - position).normalize();
        let to_bottom = (near_center - up * half_height - position).normalize();
        let to_top = (near_center + up * half_height - position).normalize();

        let left_n = to_left.cross(up);
        let right_n = up.cross(to_right);
        let bottom_n = right.cross(to_bottom);
        let top_n = to_top.cross(right);

        let through_position =
            |n: DVec3| DVec4::new(n.x, n.y, n.z, -n.dot(position));

        CullingVolume::from_planes(vec![
            near_plane,
            through_position(left_n),
            through_position(right_n),
            through_position(bottom_n),
            through_position(top_n),
        ])
    }
}
