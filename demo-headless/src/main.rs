use clap::Parser;
use flood_damage_core::{
    exposure::write_results_path, DamageModelConfig, DamageReport, EventDamageModel,
    ExposureTable, WallCategory,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Flood damage estimate for one inundation event
#[derive(Parser, Debug)]
#[command(name = "damage-headless")]
#[command(about = "Structure and contents loss from peak inundation depth", long_about = None)]
struct Args {
    /// Exposure CSV (STR_VALUE, C_VALUE, WALLS, SHORE_DIST, optional MAX_DEPTH)
    #[arg(short, long)]
    exposure: Option<PathBuf>,

    /// Peak depth per exposure row, one value per line (overrides MAX_DEPTH)
    #[arg(short, long)]
    depths: Option<PathBuf>,

    /// Where to write the per-asset result table
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// JSON model configuration (hazard tables, seed, verbose)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for collapse selection (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log every collapse group
    #[arg(short, long)]
    verbose: bool,

    /// Houses in the synthetic street used when no exposure file is given
    #[arg(long, default_value_t = 40)]
    houses: usize,

    /// Peak run-up depth at the shoreline for the synthetic street (m)
    #[arg(long, default_value_t = 5.0)]
    runup: f64,

    /// Inland distance at which the synthetic inundation stops (m)
    #[arg(long, default_value_t = 400.0)]
    inundation_limit: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Flood Damage Estimate ===\n");

    let mut config = match &args.config {
        Some(path) => DamageModelConfig::from_json_file(path)?,
        None => DamageModelConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.verbose {
        config = config.with_verbose(true);
    }

    let mut model = match &args.exposure {
        Some(path) => {
            let table = ExposureTable::from_path(path)?;
            println!("Loaded {} exposure rows from {}", table.len(), path.display());
            let depths = args.depths.as_deref().map(read_depths).transpose()?;
            table.build_model(depths.as_deref(), config)?
        }
        None => {
            println!(
                "No exposure file, using a synthetic street of {} houses ({:.1} m run-up, {:.0} m inundation limit)",
                args.houses, args.runup, args.inundation_limit
            );
            synthetic_street(&args, config)?
        }
    };

    let report = model.calc_damage_and_costs()?;
    print_summary(&report);

    if let Some(out) = &args.out {
        write_results_path(out, &report)?;
        println!("\nResult table written to {}", out.display());
    }

    Ok(())
}

fn read_depths(path: &Path) -> Result<Vec<f64>, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    let mut depths = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let depth = line
            .parse::<f64>()
            .map_err(|e| format!("{}:{}: {e}", path.display(), line_no + 1))?;
        depths.push(depth);
    }
    Ok(depths)
}

/// A row of houses running inland from the beach with a linear depth profile
fn synthetic_street(
    args: &Args,
    config: DamageModelConfig,
) -> Result<EventDamageModel, Box<dyn Error>> {
    let spacing = args.inundation_limit * 1.25 / args.houses.max(1) as f64;

    let mut depths = Vec::with_capacity(args.houses);
    let mut distances = Vec::with_capacity(args.houses);
    let mut walls = Vec::with_capacity(args.houses);
    let mut struct_costs = Vec::with_capacity(args.houses);
    let mut content_costs = Vec::with_capacity(args.houses);

    for i in 0..args.houses {
        let distance = spacing * (i as f64 + 0.5);
        // Floor levels sit 0.3 m above ground
        let depth = args.runup * (1.0 - distance / args.inundation_limit) - 0.3;
        let wall = WallCategory::ALL[i % WallCategory::ALL.len()];

        depths.push(depth);
        distances.push(distance);
        walls.push(wall);
        struct_costs.push(if wall.is_masonry() { 320_000.0 } else { 250_000.0 });
        content_costs.push(80_000.0);
    }

    Ok(EventDamageModel::with_config(
        &depths,
        &distances,
        &walls,
        &struct_costs,
        &content_costs,
        config,
    )?)
}

fn print_summary(report: &DamageReport) {
    println!("\nDepth(m) | Shore(m) | Walls        | Struct % | Contents % | Collapsed");
    println!("---------|----------|--------------|----------|------------|----------");
    for row in &report.rows {
        println!(
            "{:8.2} | {:8.1} | {:12} | {:8.1} | {:10.1} | {}",
            row.depth,
            row.shore_distance,
            row.wall_category.name(),
            row.struct_damage_fraction * 100.0,
            row.contents_damage_fraction * 100.0,
            if row.collapsed { "yes" } else { "" }
        );
    }

    let totals = &report.totals;
    println!("\n=== Event Totals ===");
    println!("Assets: {}", totals.asset_count);
    println!("Inundated: {}", totals.inundated_count);
    println!("Collapsed: {}", totals.collapsed_count);
    println!("Structure loss: ${:.2}", totals.total_struct_loss);
    println!("Contents loss: ${:.2}", totals.total_contents_loss);
    println!("Total loss: ${:.2}", totals.total_loss());

    let quality = &report.quality;
    if quality.bin_boundary_count > 0 {
        println!(
            "\nNote: {} assets sat exactly on a collapse table bin edge",
            quality.bin_boundary_count
        );
    }
}
