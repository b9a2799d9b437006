#![deny(unsafe_code)]
//! CLI binary for the glquad primitive.
//!
//! Subcommands:
//! - `trace` — build a quad on the recording context, move it, render it,
//!   and print the GL calls it issued
//! - `shaders` — print the embedded flat-color shader sources

mod error;
mod logging;

use clap::{Parser, Subcommand};
use error::CliError;
use glquad_core::render::flat_color::{FLAT_COLOR_FRAGMENT_SHADER, FLAT_COLOR_VERTEX_SHADER};
use glquad_core::transform::{camera_mvp, IDENTITY};
use glquad_core::{Quad, RecordingGl, ShaderLibrary};
use std::process;

#[derive(Parser)]
#[command(name = "glquad", about = "Trace the GL calls of a flat-colored quad")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log construction and upload details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a quad, apply translations, render, and print the GL trace.
    Trace {
        /// Quad id (overrides "id" in --params).
        #[arg(long)]
        id: Option<String>,

        /// Fill color as comma-separated components; anything but four
        /// components keeps the default color.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        color: Option<Vec<f32>>,

        /// Offset applied with translate, as "dx,dy". Repeatable.
        #[arg(long = "translate", value_parser = parse_offset, allow_hyphen_values = true)]
        translate: Vec<(f32, f32)>,

        /// Number of frames to render.
        #[arg(short, long, default_value_t = 1)]
        frames: usize,

        /// Render with the identity transform instead of the camera.
        #[arg(long)]
        identity: bool,

        /// Viewport aspect ratio (width / height) for the camera transform.
        #[arg(long, default_value_t = 1.0)]
        aspect: f32,

        /// Issue calls even when the context is not current.
        #[arg(long)]
        lenient: bool,

        /// Quad parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Print the flat-color shader sources.
    Shaders,
}

fn parse_offset(s: &str) -> Result<(f32, f32), String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"dx,dy\", got \"{s}\""))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid offset component \"{v}\": {e}"))
    };
    Ok((parse(dx)?, parse(dy)?))
}

/// Merges command-line overrides into the `--params` object.
fn merge_params(
    params: &str,
    id: Option<String>,
    color: Option<Vec<f32>>,
    lenient: bool,
) -> Result<serde_json::Value, CliError> {
    let mut params: serde_json::Value = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let Some(obj) = params.as_object_mut() else {
        return Err(CliError::Input("--params must be a JSON object".into()));
    };
    if let Some(id) = id {
        obj.insert("id".into(), id.into());
    }
    if let Some(color) = color {
        obj.insert("color".into(), serde_json::json!(color));
    }
    if lenient {
        obj.insert("strict".into(), false.into());
    }
    Ok(params)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Shaders => {
            if cli.json {
                let info = serde_json::json!({
                    "vertex": FLAT_COLOR_VERTEX_SHADER,
                    "fragment": FLAT_COLOR_FRAGMENT_SHADER,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("// vertex\n{FLAT_COLOR_VERTEX_SHADER}");
                println!("// fragment\n{FLAT_COLOR_FRAGMENT_SHADER}");
            }
        }
        Command::Trace {
            id,
            color,
            translate,
            frames,
            identity,
            aspect,
            lenient,
            params,
        } => {
            let params = merge_params(&params, id, color, lenient)?;

            let gl = RecordingGl::new();
            let mut shaders = ShaderLibrary::new();
            let mut quad = Quad::from_params(&gl, &mut shaders, &params)?;

            for (dx, dy) in translate {
                quad.translate(dx, dy);
            }

            let transform = if identity {
                IDENTITY
            } else {
                camera_mvp(aspect, 3.0)
            };
            (0..frames).try_for_each(|_| quad.render(&gl, &transform))?;

            if cli.json {
                let info = serde_json::json!({
                    "id": quad.id(),
                    "color": quad.color(),
                    "vertices": quad.vertices(),
                    "draw_order": quad.draw_order(),
                    "frames": frames,
                    "calls": gl.calls(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let c = quad.color();
                println!(
                    "quad '{}' color ({}, {}, {}, {})",
                    quad.id(),
                    c.r,
                    c.g,
                    c.b,
                    c.a
                );
                for i in 0..quad.geometry().vertex_count() {
                    if let Some([x, y, z]) = quad.vertex(i) {
                        println!("  v{i}: ({x}, {y}, {z})");
                    }
                }
                for call in gl.calls() {
                    println!("{call:?}");
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
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
