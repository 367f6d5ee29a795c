//! Demo binary driving the scheduler over a simulated planet-scale scene.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags. Run with `cargo run -p stratum-demo` for a few frames of output,
//! or `cargo run -p stratum-demo -- --show-frustums true` to see overlap
//! statistics.

use clap::Parser;
use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use stratum_config::{CliArgs, Config};
use stratum_cull::{BoundingSphere, PerspectiveFrustum};
use stratum_scene::{
    Camera, CommandBuffer, DebugTint, DrawCommand, ExecutionError, ExecutionOptions, FrameContext,
    FrustumScheduler, OwnerId, Pass, RenderBackend, SceneMode, TintMode,
};
use tracing::{debug, info, warn};

const PLANET_RADIUS: f64 = 6_371_000.0;
const SATELLITE_COUNT: usize = 64;

const GLOBE_OWNER: OwnerId = OwnerId(1);
const SATELLITE_OWNER: OwnerId = OwnerId(2);
const SKY_OWNER: OwnerId = OwnerId(3);

#[derive(Parser, Debug)]
#[command(name = "stratum-demo", about = "Multi-frustum scheduling demo")]
struct DemoArgs {
    #[command(flatten)]
    cli: CliArgs,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 5)]
    frames: u32,
}

/// Backend that narrates the command stream instead of talking to a GPU.
#[derive(Default)]
struct TraceBackend {
    executed: usize,
}

impl RenderBackend for TraceBackend {
    fn begin_frame(&mut self) {
        debug!("frame begin: color cleared");
        self.executed = 0;
    }

    fn set_depth_range(&mut self, near: f64, far: f64) {
        debug!("projection depth range [{near:.2}, {far:.2}]");
    }

    fn clear_depth(&mut self) {
        debug!("depth cleared");
    }

    fn execute(
        &mut self,
        command: &DrawCommand,
        tint: Option<DebugTint>,
    ) -> Result<(), ExecutionError> {
        self.executed += 1;
        debug!(
            "execute {:?} pass={:?} tint={:?}",
            command.owner, command.pass, tint
        );
        Ok(())
    }

    fn accumulate_depth(&mut self, slice_index: usize, inspect: bool) {
        debug!("depth handoff for slice {slice_index} (inspect: {inspect})");
    }

    fn composite(&mut self) {
        debug!("composite to framebuffer");
    }
}

fn load_config(args: &DemoArgs) -> Config {
    let dir = args.cli.config.clone().or_else(Config::default_dir);
    let mut config = match dir {
        Some(dir) => Config::load_or_create(&dir).unwrap_or_else(|err| {
            eprintln!("config unavailable ({err}), using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args.cli);
    config
}

/// Push this frame's commands: the globe, a depth clear, a swarm of
/// satellites from meter scale to planetary orbit, and a sky overlay.
fn produce_commands(
    commands: &mut CommandBuffer,
    satellites: &[BoundingSphere],
) {
    commands.push(DrawCommand::clear_depth());
    commands.push(
        DrawCommand::new(Pass::Globe)
            .with_bounding_volume(BoundingSphere::new(DVec3::ZERO, PLANET_RADIUS))
            .owned_by(GLOBE_OWNER),
    );
    for (i, sphere) in satellites.iter().enumerate() {
        let pass = if i % 5 == 0 {
            Pass::Translucent
        } else {
            Pass::Opaque
        };
        commands.push(
            DrawCommand::new(pass)
                .with_bounding_volume(*sphere)
                .owned_by(SATELLITE_OWNER),
        );
    }
    commands.push(DrawCommand::new(Pass::Overlay).unculled().owned_by(SKY_OWNER));
}

fn spawn_satellites(rng: &mut Xoshiro256StarStar) -> Vec<BoundingSphere> {
    (0..SATELLITE_COUNT)
        .map(|_| {
            // Orbit radii from low orbit out to ten planet radii, sizes
            // from a meter to a hundred kilometers.
            let altitude = rng.gen_range(1.0e3..PLANET_RADIUS * 9.0);
            let radius = 10f64.powf(rng.gen_range(0.0..5.0));
            let theta = rng.gen_range(0.0..std::f64::consts::TAU);
            let phi = rng.gen_range(0.0..std::f64::consts::PI);
            let orbit = PLANET_RADIUS + altitude;
            BoundingSphere::new(
                DVec3::new(
                    orbit * phi.sin() * theta.cos(),
                    orbit * phi.cos(),
                    orbit * phi.sin() * theta.sin(),
                ),
                radius,
            )
        })
        .collect()
}

fn main() {
    let args = DemoArgs::parse();
    let config = load_config(&args);
    stratum_log::init_logging(None, cfg!(debug_assertions), Some(&config));

    info!(
        "starting demo: {} frames, far-to-near ratio {}",
        args.frames, config.scene.far_to_near_ratio
    );

    let mut rng = Xoshiro256StarStar::seed_from_u64(42);
    let satellites = spawn_satellites(&mut rng);
    let planet = BoundingSphere::new(DVec3::ZERO, PLANET_RADIUS);

    let mut scheduler = FrustumScheduler::new();
    scheduler.enable_diagnostics(config.debug.show_frustums);
    let mut commands = CommandBuffer::new();
    let mut backend = TraceBackend::default();

    let tint = if config.debug.show_frustums {
        Some(TintMode::OverlapMask)
    } else if config.debug.show_commands {
        Some(TintMode::CommandHash)
    } else {
        None
    };
    let options = ExecutionOptions {
        tint,
        command_filter: None,
        inspect_depth_slice: config
            .debug
            .show_globe_depth
            .then_some(config.debug.show_globe_depth_frustum as usize),
    };

    for frame_index in 0..args.frames {
        // Climb away from the surface a little each frame so the depth
        // extent, and with it the partition, keeps changing.
        let altitude = 4.0e5 * (1.0 + frame_index as f64);
        let camera = Camera {
            position_wc: DVec3::new(0.0, PLANET_RADIUS + altitude, 0.0),
            direction_wc: DVec3::X,
            up_wc: DVec3::Y,
            frustum: PerspectiveFrustum {
                fov_y: std::f64::consts::FRAC_PI_3,
                aspect_ratio: 16.0 / 9.0,
                near: 1.0,
                far: PLANET_RADIUS * 20.0,
            },
        };
        let frame = FrameContext::new(&camera, SceneMode::Scene3D, config.scene.far_to_near_ratio)
            .with_occluder(&planet);
        if let Some(occluder) = &frame.occluder {
            debug!("horizon at {:.1} km", occluder.horizon_distance() / 1000.0);
        }

        commands.clear();
        produce_commands(&mut commands, &satellites);

        let passes = match scheduler.cull_and_bin(&frame, &commands) {
            Ok(passes) => passes,
            Err(err) => {
                warn!("frame {frame_index} aborted before execution: {err}");
                continue;
            }
        };

        if let Err(err) = scheduler.execute_frame(&frame, &commands, &mut backend, &options) {
            warn!("frame {frame_index} failed during execution: {err}");
            continue;
        }

        info!(
            "frame {frame_index}: {} slices after {passes} binning pass(es), {} executions",
            scheduler.slices().len(),
            backend.executed
        );
        for (i, slice) in scheduler.slices().iter().enumerate() {
            let binned: usize = Pass::BINNED.iter().map(|&p| slice.pass_count(p)).sum();
            debug!(
                "  slice {i} [{:.1}, {:.1}]: {binned} commands",
                slice.near(),
                slice.far()
            );
        }
        if let Some(stats) = scheduler.statistics() {
            info!(
                "  {} executions across overlap patterns {:?}",
                stats.total_commands, stats.commands_in_frustums
            );
        }
    }
}
