//! End-to-end scheduling scenarios across binning, repartitioning, and
//! execution.

use glam::DVec3;
use stratum_cull::{BoundingSphere, PerspectiveFrustum};
use stratum_scene::{
    Camera, CommandBuffer, DrawCommand, FrameContext, FrustumScheduler, Pass, SceneMode,
};

/// Camera at the origin looking down -Z over `[1, 1e6]`.
fn planet_camera() -> Camera {
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

/// A sphere straight ahead covering view distances `[start, stop]`.
fn sphere_spanning(start: f64, stop: f64) -> BoundingSphere {
    let mid = (start + stop) * 0.5;
    BoundingSphere::new(DVec3::new(0.0, 0.0, -mid), (stop - start) * 0.5)
}

/// An unbounded ground-pass command. Its missing bounds pin the discovered
/// extent to the full camera range, holding the partition at the camera's
/// `[1, 1e6]` (two slices at ratio 1000) while other commands are probed.
fn camera_range_pin() -> DrawCommand {
    DrawCommand::new(Pass::Ground)
}

#[test]
fn test_command_within_near_slice_bins_exactly_once() {
    let camera = planet_camera();
    let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);

    let mut commands = CommandBuffer::new();
    commands.push(camera_range_pin());
    let target = commands.push(
        DrawCommand::new(Pass::Opaque)
            .with_bounding_volume(sphere_spanning(10.0, 50.0))
            .unculled(),
    );

    let mut scheduler = FrustumScheduler::new();
    scheduler.cull_and_bin(&frame, &commands).unwrap();

    let slices = scheduler.slices();
    assert_eq!(slices.len(), 2, "ceil(log(1e6)/log(1000)) slices");
    assert_eq!(slices[0].near(), 1.0);
    assert_eq!(slices[0].far(), 1000.0);
    assert_eq!(slices[1].near(), 1000.0);
    assert_eq!(slices[1].far(), 1_000_000.0);

    let in_near: Vec<_> = slices[0]
        .pass_commands(Pass::Opaque)
        .iter()
        .filter(|id| **id == target)
        .collect();
    assert_eq!(in_near.len(), 1, "command appears exactly once in slice 0");
    assert_eq!(
        slices[1].pass_count(Pass::Opaque),
        0,
        "slice 1 holds no opaque commands"
    );
}

#[test]
fn test_spanning_command_overlaps_both_slices_with_mask() {
    let camera = planet_camera();
    let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);

    let mut commands = CommandBuffer::new();
    commands.push(camera_range_pin());
    let spanning = commands.push(
        DrawCommand::new(Pass::Opaque)
            .with_bounding_volume(sphere_spanning(500.0, 1500.0))
            .unculled(),
    );

    let mut scheduler = FrustumScheduler::new();
    scheduler.enable_diagnostics(true);
    scheduler.cull_and_bin(&frame, &commands).unwrap();

    let slices = scheduler.slices();
    assert!(slices[0].pass_commands(Pass::Opaque).contains(&spanning));
    assert!(slices[1].pass_commands(Pass::Opaque).contains(&spanning));

    let diag = scheduler.diagnostics().unwrap();
    assert_eq!(diag.overlap_mask(spanning), 0b11, "both slice bits set");
}

#[test]
fn test_closest_frustum_command_lands_in_one_slice() {
    let camera = planet_camera();
    let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);

    let mut commands = CommandBuffer::new();
    commands.push(camera_range_pin());
    let clamped = commands.push(
        DrawCommand::new(Pass::Opaque)
            .with_bounding_volume(sphere_spanning(500.0, 500_000.0))
            .unculled()
            .in_closest_frustum(),
    );

    let mut scheduler = FrustumScheduler::new();
    scheduler.cull_and_bin(&frame, &commands).unwrap();

    let occurrences: usize = scheduler
        .slices()
        .iter()
        .map(|s| {
            s.pass_commands(Pass::Opaque)
                .iter()
                .filter(|id| **id == clamped)
                .count()
        })
        .sum();
    assert_eq!(occurrences, 1, "flagged command binds only once");
    assert!(
        scheduler.slices()[0].pass_commands(Pass::Opaque).contains(&clamped),
        "and that slice is the nearest overlapping one"
    );
}

#[test]
fn test_partition_converges_to_discovered_extent() {
    let camera = planet_camera();
    let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);

    let mut commands = CommandBuffer::new();
    commands.push(
        DrawCommand::new(Pass::Opaque)
            .with_bounding_volume(sphere_spanning(10.0, 50.0))
            .unculled(),
    );

    let mut scheduler = FrustumScheduler::new();
    let passes = scheduler.cull_and_bin(&frame, &commands).unwrap();
    assert!(passes <= 2, "refinement settles within one extra pass");

    let slices = scheduler.slices();
    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].near(), 10.0, "partition tightens to observed near");
    assert_eq!(slices[0].far(), 50.0, "partition tightens to observed far");
}

#[test]
fn test_discovered_extent_is_clamped_to_camera_planes() {
    let camera = planet_camera();
    let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);

    // Starts in front of the near plane, cull disabled so it survives.
    let mut commands = CommandBuffer::new();
    commands.push(
        DrawCommand::new(Pass::Opaque)
            .with_bounding_volume(sphere_spanning(0.01, 20.0))
            .unculled(),
    );

    let mut scheduler = FrustumScheduler::new();
    scheduler.cull_and_bin(&frame, &commands).unwrap();
    assert_eq!(
        scheduler.slices()[0].near(),
        1.0,
        "near never precedes the camera near plane"
    );
}

#[test]
fn test_stable_scene_reuses_partition_on_next_frame() {
    let camera = planet_camera();
    let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);

    let mut commands = CommandBuffer::new();
    commands.push(
        DrawCommand::new(Pass::Globe)
            .with_bounding_volume(sphere_spanning(10.0, 50.0))
            .unculled(),
    );

    let mut scheduler = FrustumScheduler::new();
    let first = scheduler.cull_and_bin(&frame, &commands).unwrap();
    assert_eq!(first, 2, "first frame pays one repartition");

    let second = scheduler.cull_and_bin(&frame, &commands).unwrap();
    assert_eq!(second, 1, "unchanged extent reuses last frame's partition");
}

#[test]
fn test_empty_frame_leaves_partition_untouched() {
    let camera = planet_camera();
    let frame = FrameContext::new(&camera, SceneMode::Scene3D, 1000.0);

    let mut commands = CommandBuffer::new();
    commands.push(
        DrawCommand::new(Pass::Globe)
            .with_bounding_volume(sphere_spanning(10.0, 50.0))
            .unculled(),
    );

    let mut scheduler = FrustumScheduler::new();
    scheduler.cull_and_bin(&frame, &commands).unwrap();
    let before: Vec<(f64, f64)> = scheduler
        .slices()
        .iter()
        .map(|s| (s.near(), s.far()))
        .collect();

    commands.clear();
    scheduler.cull_and_bin(&frame, &commands).unwrap();
    let after: Vec<(f64, f64)> = scheduler
        .slices()
        .iter()
        .map(|s| (s.near(), s.far()))
        .collect();
    assert_eq!(before, after, "empty buffer must not disturb the partition");
}
