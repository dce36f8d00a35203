//! Pipe deformation visualizer.
//!
//! # Commands
//!
//! - `pipe-viz export <INPUT>` - write the synthesized mesh as JSON
//! - `pipe-viz sensors <INPUT>` - print the status of every gauge
//! - `pipe-viz view <INPUT>` - open the interactive viewer
//!
//! `INPUT` is either a JSON array of readings or a logger export whose last
//! row is taken as the current sample. Set `RUST_LOG` to change verbosity.

mod input;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pipe_core::hazard::sensor_summary;
use pipe_core::ingest::SensorLayout;
use pipe_core::wire::PipeModel;
use pipe_core::{synthesize, Calibration, GeometryParameters, Mode, ReadingSet};
use pipe_render::ViewerInput;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use input::InputFormat;

#[derive(Parser)]
#[command(name = "pipe-viz")]
#[command(about = "Turn pipe gauge readings into a coloured 3D mesh", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the synthesized mesh as a JSON wire document
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        synthesis: SynthesisArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print the status of every gauge against the critical threshold
    Sensors {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        synthesis: SynthesisArgs,
    },

    /// Open the interactive viewer
    View {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        synthesis: SynthesisArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Reading batch (JSON) or logger export
    #[arg(name = "INPUT")]
    input: PathBuf,

    /// Input encoding
    #[arg(long, value_enum, default_value = "auto")]
    format: InputFormat,

    /// Physical pipe length used to place logger gauge groups (m)
    #[arg(long, default_value_t = 12.0)]
    pipe_length: f64,

    /// Distance of the outermost gauge groups from the pipe ends (m)
    #[arg(long, default_value_t = 1.0)]
    end_offset: f64,

    /// Number of gauge groups along the pipe
    #[arg(long, default_value_t = 3)]
    groups: u32,
}

impl SourceArgs {
    fn layout(&self) -> SensorLayout {
        SensorLayout {
            pipe_length_m: self.pipe_length,
            end_offset_m: self.end_offset,
            groups: self.groups,
            ..SensorLayout::default()
        }
    }

    fn load(&self) -> Result<ReadingSet> {
        input::load_readings(&self.input, self.format, &self.layout())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Temperature colour per ring
    Angular,
    /// Inverse-distance blend of gauge values against the threshold
    Hazard,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Angular => Mode::AngularSector,
            ModeArg::Hazard => Mode::InverseDistanceHazard,
        }
    }
}

#[derive(Args)]
struct SynthesisArgs {
    /// Colouring mode
    #[arg(long, value_enum, default_value = "angular")]
    mode: ModeArg,

    /// Pipe length along the mesh axis
    #[arg(long)]
    length: Option<f64>,

    /// Undeformed outer radius
    #[arg(long)]
    radius: Option<f64>,

    /// Wall thickness; 0 renders a single wall
    #[arg(long)]
    wall_thickness: Option<f64>,

    /// Vertices per ring
    #[arg(long)]
    segments: Option<usize>,

    /// Intervals of the evenly spaced fill grid
    #[arg(long)]
    sections: Option<usize>,

    /// Value at which a gauge turns critical
    #[arg(long)]
    critical_threshold: Option<f64>,

    /// JSON file overriding calibration constants
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Rescale deformations so the peak is this fraction of the radius
    #[arg(long, num_args = 0..=1, default_missing_value = "0.5")]
    normalize: Option<f64>,
}

impl SynthesisArgs {
    fn geometry(&self) -> GeometryParameters {
        let defaults = GeometryParameters::default();
        GeometryParameters {
            length: self.length.unwrap_or(defaults.length),
            radius: self.radius.unwrap_or(defaults.radius),
            wall_thickness: self.wall_thickness.unwrap_or(defaults.wall_thickness),
            angular_segments: self.segments.unwrap_or(defaults.angular_segments),
            longitudinal_sections: self.sections.unwrap_or(defaults.longitudinal_sections),
            critical_threshold: self
                .critical_threshold
                .unwrap_or(defaults.critical_threshold),
        }
    }

    fn calibration(&self) -> Result<Calibration> {
        input::load_calibration(self.calibration.as_deref())
    }

    /// Readings as they should shape the mesh.
    fn display_readings(
        &self,
        readings: &ReadingSet,
        geometry: &GeometryParameters,
        calibration: &Calibration,
    ) -> ReadingSet {
        match self.normalize {
            Some(peak) => readings.normalized_for_display(peak * geometry.radius, calibration),
            None => readings.clone(),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).init();
}

fn export(
    source: &SourceArgs,
    args: &SynthesisArgs,
    output: Option<&PathBuf>,
    pretty: bool,
) -> Result<()> {
    let readings = source.load()?;
    let geometry = args.geometry();
    let calibration = args.calibration()?;
    let mode = Mode::from(args.mode);

    let display = args.display_readings(&readings, &geometry, &calibration);
    let synthesis =
        synthesize(&display, &geometry, mode, &calibration).context("synthesis failed")?;
    // gauge status always reflects raw values
    let model = PipeModel::new(&synthesis, &readings, &geometry, mode, &calibration);
    let json = if pretty {
        model.to_json_pretty()?
    } else {
        model.to_json()?
    };

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn sensors(source: &SourceArgs, args: &SynthesisArgs) -> Result<()> {
    let readings = source.load()?;
    let geometry = args.geometry();
    let calibration = args.calibration()?;
    geometry.validate().context("invalid geometry")?;

    let summary = sensor_summary(&readings, geometry.critical_threshold, &calibration);
    println!("{:<12} {:<18} {:>12}  STATUS", "ID", "TYPE", "VALUE");
    for info in &summary {
        println!(
            "{:<12} {:<18} {:>12.3}  {:?}",
            info.id, info.label, info.latest_value, info.status
        );
    }
    Ok(())
}

fn view(source: &SourceArgs, args: &SynthesisArgs) -> Result<()> {
    let input = ViewerInput {
        readings: source.load()?,
        geometry: args.geometry(),
        mode: args.mode.into(),
        calibration: args.calibration()?,
        max_deflection: args.normalize,
    };
    pipe_render::run(input).context("viewer event loop failed")
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Export {
            source,
            synthesis,
            output,
            pretty,
        } => export(source, synthesis, output.as_ref(), *pretty),
        Commands::Sensors { source, synthesis } => sensors(source, synthesis),
        Commands::View { source, synthesis } => view(source, synthesis),
    }
}
