use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use propwash::{
    Attitude, BoundingBox, CameraMode, CameraMove, FixedStepClock, FrameOutput, FrameState, Model,
    RenderSink, SceneMode, SimConfig, Simulation, SubGeometry, Vec3,
};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(about = "Headless aircraft attitude driver that prints per-frame transforms as JSON lines", version)]
struct Args {
    /// Simulation config JSON; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// STL file for one sub-geometry; repeat in part order. Uses a built-in aircraft when omitted
    #[arg(long = "part")]
    parts: Vec<PathBuf>,

    /// Attitude algorithm (overrides the config's initial scene mode)
    #[arg(long, value_enum)]
    mode: Option<SceneMode>,

    /// Active camera (overrides the config's initial camera mode)
    #[arg(long, value_enum)]
    camera: Option<CameraMode>,

    /// Pitch in degrees
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f32>,

    /// Roll in degrees
    #[arg(long, allow_hyphen_values = true)]
    roll: Option<f32>,

    /// Yaw in degrees
    #[arg(long, allow_hyphen_values = true)]
    yaw: Option<f32>,

    /// Propeller speed in revolutions per minute
    #[arg(long)]
    rpm: Option<f32>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Turbulence seed (overrides the config's seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Camera nudge applied once before the first frame; repeatable
    #[arg(long = "nudge", value_enum)]
    nudges: Vec<CameraMove>,
}

/// Writes each frame as one JSON object per line.
struct JsonLinesSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesSink<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn finish(mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()
    }
}

impl<W: Write> RenderSink for JsonLinesSink<W> {
    fn submit(&mut self, frame: &FrameOutput) {
        if self.error.is_some() {
            return;
        }
        let objects: Vec<_> = frame
            .objects
            .iter()
            .map(|object| {
                json!({
                    "entity": object.entity.id(),
                    "transforms": object
                        .transforms
                        .iter()
                        .map(|m| m.to_cols_array())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        let line = json!({
            "t": frame.elapsed,
            "rotation": frame.rotation.to_cols_array(),
            "turbulence": frame.turbulence.map(|t| [t.pitch, t.roll]),
            "objects": objects,
            "camera": {
                "transform": frame.camera_transform.to_cols_array(),
                "eye": frame.camera.camera_pos,
                "view_proj": frame.camera.view_proj,
            },
        });
        if let Err(err) = writeln!(self.out, "{line}") {
            self.error = Some(err);
        }
    }
}

/// Propeller, fuselage and canopy boxes, nose toward +Z.
fn builtin_aircraft() -> Result<Model> {
    let parts = vec![
        SubGeometry::new(
            "propeller",
            BoundingBox::new(Vec3::new(-0.9, -0.9, 2.0), Vec3::new(0.9, 0.9, 2.1)),
        ),
        SubGeometry::new(
            "fuselage",
            BoundingBox::new(Vec3::new(-0.35, -0.4, -2.5), Vec3::new(0.35, 0.4, 2.0)),
        ),
        SubGeometry::new(
            "canopy",
            BoundingBox::new(Vec3::new(-0.25, 0.4, -0.3), Vec3::new(0.25, 0.75, 0.6)),
        ),
    ];
    Ok(Model::new(parts)?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    ensure!(
        args.fps.is_finite() && args.fps > 0.0,
        "fps must be positive (got {})",
        args.fps
    );

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path).context("loading simulation config")?,
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let model = if args.parts.is_empty() {
        builtin_aircraft().context("building built-in aircraft")?
    } else {
        Model::from_files(args.parts.as_slice()).context("loading aircraft parts")?
    };

    let mut sim = Simulation::new(&config).context("building simulation")?;
    sim.spawn_aircraft(model, Some(config.propeller_index))
        .context("attaching propeller")?;

    let initial = FrameState::from(&config.initial);
    let attitude = Attitude::new(
        args.pitch.unwrap_or(initial.attitude.pitch),
        args.roll.unwrap_or(initial.attitude.roll),
        args.yaw.unwrap_or(initial.attitude.yaw),
    );
    let state = FrameState {
        attitude,
        scene_mode: args.mode.unwrap_or(initial.scene_mode),
        camera_mode: args.camera.unwrap_or(initial.camera_mode),
        propeller_rpm: args.rpm.unwrap_or(initial.propeller_rpm),
    }
    .clamped(config.max_rpm);

    for movement in &args.nudges {
        sim.cameras_mut().nudge(
            state.camera_mode,
            *movement,
            config.nudge.step,
            config.nudge.turn_degrees,
        );
    }

    let mut clock = FixedStepClock::from_fps(args.fps);
    let mut sink = JsonLinesSink::new(BufWriter::new(io::stdout().lock()));
    for _ in 0..args.frames {
        sim.render_frame(&state, &mut clock, &mut sink);
    }
    sink.finish().context("writing frames to stdout")?;

    log::info!("simulated {} frames at {} fps", args.frames, args.fps);
    Ok(())
}
