use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slidefig", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render figures for one or more images.
    Export(ExportArgs),
    /// List the built-in color maps.
    Colormaps,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Export configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Override the configured output directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Full-resolution pixel size in micrometres (enables scale bars and DPI targeting).
    #[arg(long)]
    pixel_size_um: Option<f64>,

    /// GeoJSON annotations/detections applied to every image.
    #[arg(long)]
    objects: Option<PathBuf>,

    /// Class-color map image for classifier-overlay mode.
    #[arg(long)]
    classification: Option<PathBuf>,

    /// Grayscale density raster for density-map mode.
    #[arg(long)]
    density: Option<PathBuf>,

    /// Multiplier applied to density luminance (0..1).
    #[arg(long, default_value_t = 1.0)]
    density_scale: f32,

    /// Input images.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Colormaps => {
            for name in slidefig::ColorMapRegistry::builtin().names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut config = slidefig::ExportConfiguration::from_path(&args.config)
        .with_context(|| format!("load configuration '{}'", args.config.display()))?;
    if let Some(dir) = args.out_dir {
        config.output_dir = dir;
        config.validate()?;
    }
    let exporter = slidefig::Exporter::new(config)?;

    let objects = args
        .objects
        .as_deref()
        .map(slidefig::VecObjectSource::from_geojson_path)
        .transpose()?;
    let classification = args
        .classification
        .as_deref()
        .map(|p| slidefig::RasterClassSource::open(classifier_name(exporter.config()), p))
        .transpose()?;
    let density = args
        .density
        .as_deref()
        .map(|p| slidefig::RasterDensitySource::open("density", p, args.density_scale))
        .transpose()?;

    let mut unreadable = 0usize;
    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        match slidefig::RasterImageSource::open(path) {
            Ok(image) => images.push(image),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "image skipped");
                unreadable += 1;
            }
        }
    }

    let items: Vec<slidefig::ImageItem<'_>> = images
        .iter()
        .map(|image| {
            let mut item = slidefig::ImageItem::rgb(image).with_pixel_size(args.pixel_size_um);
            if let Some(o) = &objects {
                item = item.with_objects(o);
            }
            if let Some(c) = &classification {
                item = item.with_classification(c);
            }
            if let Some(d) = &density {
                item = item.with_density(d);
            }
            item
        })
        .collect();

    let mut sink = slidefig::DirectorySink::new(exporter.config().output_dir.clone())?;
    let summary = exporter.run(&items, &mut sink, &slidefig::CancelToken::new());
    println!(
        "succeeded={} skipped={} failed={}",
        summary.succeeded,
        summary.skipped + unreadable,
        summary.failed
    );
    Ok(())
}

fn classifier_name(config: &slidefig::ExportConfiguration) -> String {
    match &config.mode {
        slidefig::RenderMode::ClassifierOverlay { classifier } => classifier.clone(),
        _ => "classifier".to_owned(),
    }
}
