#![deny(unsafe_code)]
//! CLI binary for the heartworks fireworks effect.
//!
//! Subcommands:
//! - `render` — shade one frame on the CPU, write PNG + scene sidecar
//! - `cycle` — write evenly spaced frames covering one full cycle
//! - `params` — print current parameter values and their schema
//! - `glsl` — print the generated shader sources

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use heartworks_core::glsl::{fragment_shader, FULLSCREEN_VERTEX_SHADER};
use heartworks_core::{Effect, FireworkParams, HeartFireworks, Scene};
use heartworks_raster::cycle_times;
use heartworks_raster::snapshot::{read_scene, write_scene_png};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "heartworks", about = "Heart-shaped fireworks renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one frame and write a PNG with a JSON scene sidecar.
    Render {
        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: u32,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: u32,

        /// Effect time (already scaled; one cycle is `cycle_length` units).
        #[arg(short, long, default_value_t = 2.5)]
        time: f32,

        /// Effect parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Re-render a scene sidecar; overrides size, time and params.
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Output file path.
        #[arg(short, long, default_value = "heartworks.png")]
        output: PathBuf,
    },
    /// Render evenly spaced frames across one cycle.
    Cycle {
        /// Number of frames.
        #[arg(short, long, default_value_t = 24)]
        frames: usize,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 400)]
        width: u32,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 300)]
        height: u32,

        /// Effect parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Directory to write `frame_NNNN.png` files into.
        #[arg(long, default_value = "frames")]
        out_dir: PathBuf,
    },
    /// Print parameter values and schema.
    Params {
        /// Parameter overrides as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Print the generated fragment shader.
    Glsl {
        /// Parameter overrides as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Print the vertex shader instead.
        #[arg(long)]
        vertex: bool,
    },
}

fn parse_params(raw: &str) -> Result<serde_json::Value, CliError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    if !value.is_object() {
        return Err(CliError::Input("--params must be a JSON object".into()));
    }
    Ok(value)
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:04}.png"))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render {
            width,
            height,
            time,
            params,
            scene,
            output,
        } => {
            let scene = match scene {
                Some(path) => read_scene(&path)?,
                None => {
                    let mut s = Scene::new(width, height, time);
                    s.params = parse_params(&params)?;
                    s
                }
            };
            let sidecar = write_scene_png(&scene, &output)?;

            if cli.json {
                print_json(&serde_json::json!({
                    "width": scene.width,
                    "height": scene.height,
                    "time": scene.time,
                    "params": scene.firework_params().to_json(),
                    "output": output.display().to_string(),
                    "scene": sidecar.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "rendered {}x{} at t={} -> {}",
                    scene.width,
                    scene.height,
                    scene.time,
                    output.display()
                );
            }
        }
        Command::Cycle {
            frames,
            width,
            height,
            params,
            out_dir,
        } => {
            if frames == 0 {
                return Err(CliError::Input("--frames must be at least 1".into()));
            }
            let params = parse_params(&params)?;
            let firework_params = FireworkParams::from_json(&params);
            firework_params.validate()?;
            std::fs::create_dir_all(&out_dir)?;

            let mut written = Vec::with_capacity(frames);
            for (i, time) in cycle_times(frames, firework_params.cycle_length)
                .into_iter()
                .enumerate()
            {
                let mut scene = Scene::new(width, height, time);
                scene.params = params.clone();
                let path = frame_path(&out_dir, i);
                write_scene_png(&scene, &path)?;
                written.push(path.display().to_string());
            }

            if cli.json {
                print_json(&serde_json::json!({
                    "frames": written,
                    "cycle_length": firework_params.cycle_length,
                    "out_dir": out_dir.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "rendered {frames} frames ({width}x{height}) -> {}",
                    out_dir.display()
                );
            }
        }
        Command::Params { params } => {
            let effect = HeartFireworks::from_json(&parse_params(&params)?)?;
            let values = effect.params();
            let schema = effect.param_schema();
            if cli.json {
                print_json(&serde_json::json!({ "params": values, "schema": schema }))?;
            } else if let Some(entries) = schema.as_object() {
                for (name, info) in entries {
                    let value = values.get(name).map(ToString::to_string).unwrap_or_default();
                    let description = info
                        .get("description")
                        .and_then(|d| d.as_str())
                        .unwrap_or_default();
                    println!("{name:<14} {value:<8} {description}");
                }
            }
        }
        Command::Glsl { params, vertex } => {
            let source = if vertex {
                FULLSCREEN_VERTEX_SHADER.to_string()
            } else {
                let effect = HeartFireworks::from_json(&parse_params(&params)?)?;
                fragment_shader(effect.firework_params())
            };
            if cli.json {
                let stage = if vertex { "vertex" } else { "fragment" };
                print_json(&serde_json::json!({ "stage": stage, "source": source }))?;
            } else {
                print!("{source}");
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
