//! Landshift CLI - land-cover change analysis from classification GeoTIFFs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use landshift_algorithms::area::{area_by_class, total_area_km2};
use landshift_algorithms::change::{
    encode_transitions, ChangeMatrix, OutOfRange, TransitionCodebook,
};
use landshift_core::io::{read_labels, write_labels};
use landshift_core::{Crs, Footprint, Raster};

#[derive(Parser)]
#[command(name = "landshift")]
#[command(author, version, about = "Land-cover change analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a label raster
    Info {
        /// Input classification GeoTIFF
        input: PathBuf,
    },
    /// Encode two classifications into a transition raster
    Encode {
        /// Classification at the start year
        #[arg(long)]
        before: PathBuf,
        /// Classification at the end year
        #[arg(long)]
        after: PathBuf,
        /// Ordered class labels, e.g. 0,1,2,3,4
        #[arg(long, value_delimiter = ',')]
        classes: Vec<i32>,
        /// Output transition GeoTIFF
        #[arg(short, long)]
        output: PathBuf,
        /// Fail on labels outside the class set instead of masking them
        #[arg(long)]
        strict: bool,
    },
    /// Per-class areas of a label raster inside a region of interest
    Areas {
        /// Input label GeoTIFF (classification or transition raster)
        input: PathBuf,
        /// ROI rectangle as min_x,min_y,max_x,max_y (default: raster bounds)
        #[arg(long, value_delimiter = ',', num_args = 4)]
        roi: Option<Vec<f64>>,
    },
    /// Full change matrix between two classifications
    Matrix {
        /// Classification at the start year
        #[arg(long)]
        before: PathBuf,
        /// Classification at the end year
        #[arg(long)]
        after: PathBuf,
        /// Ordered class labels, e.g. 0,1,2,3,4
        #[arg(long, value_delimiter = ',')]
        classes: Vec<i32>,
        /// ROI rectangle as min_x,min_y,max_x,max_y (default: raster bounds)
        #[arg(long, value_delimiter = ',', num_args = 4)]
        roi: Option<Vec<f64>>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let start = Instant::now();
    match cli.command {
        Commands::Info { input } => cmd_info(&input)?,
        Commands::Encode {
            before,
            after,
            classes,
            output,
            strict,
        } => cmd_encode(&before, &after, &classes, &output, strict)?,
        Commands::Areas { input, roi } => cmd_areas(&input, roi.as_deref())?,
        Commands::Matrix {
            before,
            after,
            classes,
            roi,
        } => cmd_matrix(&before, &after, &classes, roi.as_deref())?,
    }
    info!("done in {:.2?}", start.elapsed());

    Ok(())
}

fn load(path: &PathBuf) -> Result<Raster<i32>> {
    read_labels(path).with_context(|| format!("reading {}", path.display()))
}

/// ROI from --roi bounds, or the raster's own extent
fn footprint_for(raster: &Raster<i32>, roi: Option<&[f64]>) -> Result<Footprint> {
    let crs = raster
        .crs()
        .cloned()
        .unwrap_or_else(|| Crs::from_wkt("LOCAL_CS[\"unknown\"]"));
    match roi {
        Some([min_x, min_y, max_x, max_y]) => {
            if min_x >= max_x || min_y >= max_y {
                bail!("ROI bounds must satisfy min < max on both axes");
            }
            Ok(Footprint::from_rect(*min_x, *min_y, *max_x, *max_y, crs))
        }
        Some(_) => bail!("--roi takes exactly four values: min_x,min_y,max_x,max_y"),
        None => {
            let (min_x, min_y, max_x, max_y) = raster.bounds();
            Ok(Footprint::from_rect(min_x, min_y, max_x, max_y, crs))
        }
    }
}

fn cmd_info(input: &PathBuf) -> Result<()> {
    let raster = load(input)?;
    let (rows, cols) = raster.shape();
    let (min_x, min_y, max_x, max_y) = raster.bounds();

    println!("file:      {}", input.display());
    println!("size:      {} rows x {} cols", rows, cols);
    println!("pixel:     {} x {}", raster.transform().pixel_width, raster.transform().pixel_height);
    println!("bounds:    ({}, {}) - ({}, {})", min_x, min_y, max_x, max_y);
    match raster.crs() {
        Some(crs) => println!("crs:       {}", crs),
        None => println!("crs:       unknown"),
    }
    match raster.nodata() {
        Some(nd) => println!("nodata:    {}", nd),
        None => println!("nodata:    none"),
    }
    Ok(())
}

fn cmd_encode(
    before: &PathBuf,
    after: &PathBuf,
    classes: &[i32],
    output: &PathBuf,
    strict: bool,
) -> Result<()> {
    let before_raster = load(before)?;
    let after_raster = load(after)?;
    let codebook = TransitionCodebook::new(classes)?;
    let policy = if strict {
        OutOfRange::Fail
    } else {
        OutOfRange::Exclude
    };

    info!(
        classes = classes.len(),
        codes = codebook.num_codes(),
        "encoding transitions"
    );
    let changes = encode_transitions(&before_raster, &after_raster, &codebook, policy)?;

    write_labels(&changes, output).with_context(|| format!("writing {}", output.display()))?;
    info!("wrote {}", output.display());
    Ok(())
}

fn cmd_areas(input: &PathBuf, roi: Option<&[f64]>) -> Result<()> {
    let raster = load(input)?;
    let footprint = footprint_for(&raster, roi)?;

    let table = area_by_class(&raster, &footprint)?;
    println!("ROI area: {:.6} km²", total_area_km2(&footprint));
    println!("Class areas:");
    print!("{}", table);
    println!("sum: {:.6} km²", table.total());
    Ok(())
}

fn cmd_matrix(
    before: &PathBuf,
    after: &PathBuf,
    classes: &[i32],
    roi: Option<&[f64]>,
) -> Result<()> {
    let before_raster = load(before)?;
    let after_raster = load(after)?;
    let codebook = TransitionCodebook::new(classes)?;
    let footprint = footprint_for(&before_raster, roi)?;

    let changes = encode_transitions(&before_raster, &after_raster, &codebook, OutOfRange::Exclude)?;
    let areas = area_by_class(&changes, &footprint)?;
    let matrix = ChangeMatrix::from_areas(&areas, &codebook);

    println!("ROI area: {:.6} km²", total_area_km2(&footprint));
    println!("{}", matrix);

    println!("Class areas in the start year:");
    print!("{}", area_by_class(&before_raster, &footprint)?);
    println!("Class areas in the end year:");
    print!("{}", area_by_class(&after_raster, &footprint)?);
    Ok(())
}
