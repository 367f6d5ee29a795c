//! Camera state and the per-frame context consumed by the scheduler.

use glam::DVec3;
use stratum_cull::{BoundingSphere, CullingVolume, Occluder, PerspectiveFrustum};

/// World-space camera state.
///
/// `direction_wc` and `up_wc` must be unit length and orthogonal; the
/// culling volume construction relies on the orthonormal basis.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Position in world coordinates.
    pub position_wc: DVec3,
    /// Unit view direction in world coordinates.
    pub direction_wc: DVec3,
    /// Unit up vector in world coordinates.
    pub up_wc: DVec3,
    /// Viewing frustum parameters.
    pub frustum: PerspectiveFrustum,
}

impl Camera {
    /// Compute the five-plane culling volume for the current pose.
    pub fn culling_volume(&self) -> CullingVolume {
        self.frustum
            .culling_volume(self.position_wc, self.direction_wc, self.up_wc)
    }
}

/// Scene projection mode. Silhouette occlusion only applies in full 3D.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneMode {
    /// Full 3D globe view.
    Scene3D,
    /// 2.5D flattened view.
    ColumbusView,
    /// Top-down 2D map view.
    Scene2D,
}

/// Everything the scheduler consumes for one frame, borrowed from the host.
///
/// Built once per frame before producers run; the culling volume and
/// occluder are derived here so the per-command hot path only reads them.
pub struct FrameContext<'a> {
    /// The active camera.
    pub camera: &'a Camera,
    /// Culling volume for the camera pose (far plane excluded).
    pub culling_volume: CullingVolume,
    /// Silhouette occluder for the nearest large body, if any.
    pub occluder: Option<Occluder>,
    /// Current projection mode.
    pub mode: SceneMode,
    /// Ratio bounding `far / near` within one depth slice. Must be > 1.
    pub far_to_near_ratio: f64,
}

impl<'a> FrameContext<'a> {
    /// Build a frame context for `camera`, deriving its culling volume.
    pub fn new(camera: &'a Camera, mode: SceneMode, far_to_near_ratio: f64) -> Self {
        Self {
            camera,
            culling_volume: camera.culling_volume(),
            occluder: None,
            mode,
            far_to_near_ratio,
        }
    }

    /// Derive a silhouette occluder from `body` and the camera position.
    pub fn with_occluder(mut self, body: &BoundingSphere) -> Self {
        self.occluder = Some(Occluder::new(body, self.camera.position_wc));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_cull::Intersection;

    fn test_camera() -> Camera {
        Camera {
            position_wc: DVec3::ZERO,
            direction_wc: DVec3::NEG_Z,
            up_wc: DVec3::Y,
            frustum: PerspectiveFrustum {
                fov_y: std::f64::consts::FRAC_PI_2,
                aspect_ratio: 1.0,
                near: 1.0,
                far: 1_000_000.0,
            },
        }
    }

    #[test]
    fn test_frame_context_derives_culling_volume() {
        let camera = test_camera();
        let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);
        let ahead = BoundingSphere::new(DVec3::new(0.0, 0.0, -100.0), 1.0);
        assert_eq!(frame.culling_volume.visibility(&ahead), Intersection::Inside);
    }

    #[test]
    fn test_frame_context_has_no_occluder_by_default() {
        let camera = test_camera();
        let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);
        assert!(frame.occluder.is_none());
    }

    #[test]
    fn test_with_occluder_hides_far_side() {
        let camera = test_camera();
        let body = BoundingSphere::new(DVec3::new(0.0, 0.0, -2_000.0), 500.0);
        let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0).with_occluder(&body);
        let occluder = frame.occluder.expect("occluder derived");
        let behind_body = BoundingSphere::new(DVec3::new(0.0, 0.0, -3_000.0), 10.0);
        assert!(!occluder.is_sphere_visible(&behind_body));
    }
}
