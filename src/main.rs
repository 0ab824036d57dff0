//! heap-evolution - plots Fibonacci heap evolution traces.

use std::{fs::File, path::PathBuf, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use heap_evolution::{Dataset, ImageSurface, MAX_IMAGE_SIZE, WindowSurface, report};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_INPUT: &str = "heap_evolution_fibonacci.csv";

#[derive(Parser, Debug)]
#[command(name = "heap-evolution")]
#[command(about = "Plot heap height, root list size and cascading cuts of a Fibonacci heap trace")]
struct Args {
  /// CSV trace with step, heapHeight, numTrees and cascadingCuts columns
  #[arg(default_value = DEFAULT_INPUT)]
  input: PathBuf,

  /// Write the charts as PNG files into this directory instead of opening windows
  #[arg(short, long)]
  output_dir: Option<PathBuf>,

  /// Side of the square PNG images, in pixels (a multiple of 64, at most 8192)
  #[arg(
    long,
    default_value_t = 1024,
    value_parser = clap::value_parser!(u32).range(64..=i64::from(MAX_IMAGE_SIZE)),
  )]
  size: u32,

  /// Enable debug logging to the specified file
  #[arg(long)]
  log: Option<PathBuf>,
}

fn main() -> Result<()> {
  let args = Args::parse();
  init_logging(&args)?;

  let dataset = Dataset::load(&args.input)?;

  match &args.output_dir {
    Some(dir) => {
      let mut surface = ImageSurface::new(dir, args.size)?;
      report::run(&dataset, &mut surface)?;
    }
    None => {
      let mut surface = WindowSurface::new()?;
      report::run(&dataset, &mut surface)?;
    }
  }

  tracing::info!("done");
  Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
  match &args.log {
    Some(path) => {
      let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
      let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
      tracing::subscriber::set_global_default(subscriber)?;
    }
    None => {
      let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .finish();
      tracing::subscriber::set_global_default(subscriber)?;
    }
  }

  tracing::info!(input = %args.input.display(), "starting heap-evolution");
  Ok(())
}
