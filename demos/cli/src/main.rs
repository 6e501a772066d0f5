use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use upgrades_core::svg::render_svg;
use upgrades_core::{Scene, TimelineConfig, TimelineModel, Viewport};
use upgrades_data::{export_csv, load_dataset_str};

#[derive(Parser, Debug)]
#[command(
    name = "upgrades-cli",
    about = "Lay out a network upgrades dataset and export it as SVG, CSV or JSON."
)]
struct Args {
    /// Path to the dataset JSON file.
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file with layout overrides; missing fields keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print columns, totals and upgrades.
    Summary,
    /// Dump the positioned scene as JSON.
    Layout {
        #[arg(long)]
        pretty: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a standalone SVG.
    Svg {
        /// Number of zoom-in steps applied before rendering.
        #[arg(long, default_value_t = 0)]
        zoom: u32,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the raw records as CSV.
    Csv {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let data = fs::read_to_string(&args.input)
        .with_context(|| format!("Could not read file {:?}", args.input))?;
    let dataset = load_dataset_str(&data)
        .with_context(|| format!("Could not load dataset from {:?}", args.input))?;
    let config = load_config(args.config.as_deref())?;

    let model = TimelineModel::build(&dataset.upgrades, &dataset.meta);

    match args.command {
        Command::Summary => {
            println!(
                "Upgrades: {}\nItems: {}\nColumns: {}\nMax rows: {}",
                model.upgrades.len(),
                model.items.len(),
                model.layout.column_count(),
                model.layout.max_rows
            );
            for (column, date) in model.layout.dates.iter().enumerate() {
                let names: Vec<&str> = model
                    .upgrades_in_column(column)
                    .map(|upgrade| upgrade.upgrade_name.as_str())
                    .collect();
                println!(
                    "{date}  {:>3}  {}",
                    model.layout.column_totals[column],
                    names.join(", ")
                );
            }
        }
        Command::Layout { pretty, output } => {
            let scene = Scene::build(&model, &config);
            let json = if pretty {
                serde_json::to_string_pretty(&scene)
            } else {
                serde_json::to_string(&scene)
            }
            .context("Could not serialize the layout")?;
            write_output(output.as_deref(), &json)?;
        }
        Command::Svg { zoom, output } => {
            let scene = Scene::build(&model, &config);
            let mut viewport = Viewport::new(&config);
            for _ in 0..zoom {
                if !viewport.zoom_in() {
                    tracing::warn!(zoom = viewport.zoom(), "zoom limit reached");
                    break;
                }
            }
            let svg = render_svg(&scene, viewport.view_box(scene.size()));
            write_output(output.as_deref(), &svg)?;
        }
        Command::Csv { output } => {
            write_output(output.as_deref(), &export_csv(&dataset.upgrades))?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TimelineConfig> {
    let Some(path) = path else {
        return Ok(TimelineConfig::default());
    };
    let raw =
        fs::read_to_string(path).with_context(|| format!("Could not read config {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config {path:?}"))
}

fn write_output(path: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("Could not write {path:?}"))?;
            tracing::info!(?path, bytes = contents.len(), "wrote output");
        }
        None => println!("{contents}"),
    }
    Ok(())
}
