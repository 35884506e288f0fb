use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dot_palette_wasm::{PaletteMethod, dot_art_bytes, extract_palette_bytes};
use tracing::{Level, info};

/// Extract color palettes and render dot art from images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the palette of one or more images
    Palette {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Maximum number of palette colors
        #[arg(short = 'k', long = "colors", default_value_t = 16)]
        n_colors: usize,

        #[arg(short, long, value_enum, default_value_t = Method::MedianCut)]
        method: Method,

        /// Shrink images so the longest side is at most this before extraction
        #[arg(short, long)]
        downscale: Option<u32>,

        /// Print one JSON object per input instead of one color per line
        #[arg(long)]
        json: bool,
    },
    /// Render dot-art PNGs
    DotArt {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Number of colors to extract when no custom palette is provided
        #[arg(short = 'k', long = "colors", default_value_t = 16)]
        n_colors: usize,

        /// Target down-sample size (longest side)
        #[arg(short, long, default_value_t = 64)]
        scale: u32,

        /// Optional upscale size. If omitted, original dimensions are used.
        #[arg(short, long)]
        output_size: Option<u32>,

        /// Comma-separated list of hex colors to use as palette (skip extraction)
        #[arg(short = 'c', long)]
        palette: Option<String>,

        /// Output directory
        #[arg(short = 'd', long)]
        out_dir: Option<PathBuf>,

        /// Output filename prefix (ignored when --out-dir supplied)
        #[arg(short = 'p', long, default_value = "dotart_")]
        prefix: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    MedianCut,
    Kmeans,
}

impl From<Method> for PaletteMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::MedianCut => PaletteMethod::MedianCut,
            Method::Kmeans => PaletteMethod::KMeans,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Palette { inputs, n_colors, method, downscale, json } => {
            for input in &inputs {
                let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
                let palette = extract_palette_bytes(&bytes, n_colors, method.into(), downscale)
                    .with_context(|| format!("palette extraction failed for {}", input.display()))?;

                if json {
                    let out = serde_json::json!({
                        "file": input.display().to_string(),
                        "palette": palette,
                    });
                    println!("{out}");
                } else {
                    for hex in &palette {
                        println!("{hex}");
                    }
                }
            }
        }
        Command::DotArt { inputs, n_colors, scale, output_size, palette, out_dir, prefix } => {
            let palette_vec: Option<Vec<String>> =
                palette.as_ref().map(|s| s.split(',').map(|x| x.trim().to_string()).collect());

            for input in &inputs {
                let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
                let (png, used) = dot_art_bytes(&bytes, n_colors, scale, output_size, palette_vec.as_deref())
                    .context("dot art processing failed")?;

                let out_path = if let Some(dir) = &out_dir {
                    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                    dir.join(format!("{stem}.png"))
                } else {
                    let name = input.file_name().unwrap_or_default().to_string_lossy();
                    PathBuf::from(format!("{prefix}{name}"))
                };

                if let Some(parent) = out_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&out_path, png)?;
                info!(colors = used.len(), "saved {}", out_path.display());
            }
        }
    }

    Ok(())
}
