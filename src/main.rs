use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use slidemark::AnnotatorConfig;
use slidemark::domain::Point;
use slidemark::export;
use slidemark::layout::route_arrow;
use slidemark::session::Tutorial;

#[derive(Parser, Debug)]
#[command(name = "slidemark", version, about = "Annotate tutorial screenshots and export slide decks")]
struct Cli {
    /// Settings file instead of the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every slide and write the export bundle
    Export {
        tutorial: PathBuf,
        /// Output directory, defaults to a timestamped folder next to the tutorial
        #[arg(long)]
        out: Option<PathBuf>,
        /// Previously saved annotations.json to restore first
        #[arg(long)]
        annotations: Option<PathBuf>,
        /// Add cover and acknowledgements pages
        #[arg(long)]
        covers: bool,
    },
    /// List the widgets under an image point and the arrow route to the innermost
    Probe {
        tutorial: PathBuf,
        /// Slide number, starting at 1
        #[arg(long, default_value_t = 1)]
        slide: usize,
        #[arg(long)]
        x: f32,
        #[arg(long)]
        y: f32,
    },
    /// Print the effective settings as JSON
    Config {
        /// Also write them to the user config file
        #[arg(long)]
        save: bool,
    },
}

fn load(path: &Path, config: &AnnotatorConfig) -> anyhow::Result<Tutorial> {
    let (tutorial, report) = Tutorial::load(path, config)?;
    for skipped in &report.skipped {
        eprintln!("step {} skipped: {}", skipped.step, skipped.error);
    }
    Ok(tutorial)
}

fn default_out_dir(tutorial: &Path) -> PathBuf {
    let name = chrono::Local::now()
        .format("Tutorial_%Y-%m-%d_%H-%M-%S")
        .to_string();
    tutorial
        .parent()
        .map(|dir| dir.join(&name))
        .unwrap_or_else(|| PathBuf::from(name))
}

fn run_export(
    path: &Path,
    out: Option<PathBuf>,
    annotations: Option<PathBuf>,
    covers: bool,
    config: &AnnotatorConfig,
) -> anyhow::Result<()> {
    let mut tutorial = load(path, config)?;
    if let Some(saved) = annotations {
        export::restore_annotations(&mut tutorial, &saved)?;
    }
    if covers && !tutorial.has_covers() {
        tutorial.add_covers();
    }
    let out = out.unwrap_or_else(|| default_out_dir(path));
    export::export_bundle(&tutorial, &out)?;
    println!("{}", out.display());
    Ok(())
}

fn run_probe(path: &Path, index: usize, point: Point, config: &AnnotatorConfig) -> anyhow::Result<()> {
    let tutorial = load(path, config)?;
    let slide = index
        .checked_sub(1)
        .and_then(|i| tutorial.slide(i))
        .with_context(|| format!("No slide {index}, the tutorial has {}", tutorial.len()))?;

    let hits = slide.hit_test_widgets(point);
    if hits.is_empty() {
        println!("no widget at ({}, {})", point.x, point.y);
        return Ok(());
    }
    for widget in &hits {
        let r = widget.rect();
        println!("{}\t{} {} {} {}", widget.path, r.x, r.y, r.width, r.height);
    }
    if let Some(innermost) = hits.last() {
        match route_arrow(&innermost.rect(), point) {
            Ok(route) => println!(
                "arrow {:?}: head ({}, {}) tail ({}, {})",
                route.sector, route.head.x, route.head.y, route.tail.x, route.tail.y
            ),
            Err(err) => println!("no arrow: {err}"),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => AnnotatorConfig::load_from(path),
        None => AnnotatorConfig::load(),
    };

    match cli.command {
        Command::Export {
            tutorial,
            out,
            annotations,
            covers,
        } => run_export(&tutorial, out, annotations, covers, &config),
        Command::Probe {
            tutorial,
            slide,
            x,
            y,
        } => run_probe(&tutorial, slide, Point::new(x, y), &config),
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                config.save();
            }
            Ok(())
        }
    }
}
