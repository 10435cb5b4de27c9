use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;

use region_world::export::{indexed_path, save_summary, OutputFormat};
use region_world::timing::Timed;
use region_world::world::batch::{batch_seed, generate_batch};
use region_world::world::{World, WorldConfig, WorldSummary};

#[derive(Parser, Debug)]
#[command(name = "region_world")]
#[command(about = "Partition a wrapping map into randomly grown biome regions and render it")]
struct Args {
    /// Width of the world in pixels
    #[arg(short = 'W', long, default_value = "2048")]
    width: usize,

    /// Height of the world in pixels
    #[arg(short = 'H', long, default_value = "1024")]
    height: usize,

    /// Number of regions to seed
    #[arg(short, long, default_value = "250")]
    regions: usize,

    /// Random seed (current Unix time if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output image path: .png, .jpg/.jpeg or .gif (default: img/<unix time>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image format overriding the output extension (png, jpg, jpeg, gif)
    #[arg(short, long)]
    format: Option<String>,

    /// Number of worlds to generate in parallel, seeded seed, seed+1, ...
    #[arg(long, default_value = "1")]
    count: usize,

    /// Write a JSON summary of the run to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let _total = Timed::info("Total time elapsed");
    let now = chrono::Utc::now().timestamp();

    let seed = args.seed.unwrap_or(now as u64);
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("img/{}.png", now)));
    let format = match args.format.as_deref() {
        Some(name) => OutputFormat::from_name(name)?,
        None => OutputFormat::from_extension(&output),
    };

    let config = WorldConfig::new(args.width, args.height, args.regions, seed);
    config.validate()?;

    println!("Generating world with seed: {}", seed);
    println!("Map size: {}x{}, {} regions", config.width, config.height, config.regions);

    if args.count > 1 {
        run_batch(&config, args.count, &output, format, args.summary.as_deref())
    } else {
        run_single(&config, &output, format, args.summary.as_deref())
    }
}

fn run_single(
    config: &WorldConfig,
    output: &Path,
    format: OutputFormat,
    summary: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let mut rng = config.rng();

    let mut world = {
        let _t = Timed::info("Initializing");
        World::with_regions(config.width, config.height, config.regions, &mut rng)?
    };

    {
        let _t = Timed::info("Filling gaps");
        world.expand_regions(None, None, &mut rng);
    }

    {
        let _t = Timed::info("Saving");
        world.image().save_as(output, format)?;
    }

    report(&world, output);
    if let Some(path) = summary {
        save_summary(&WorldSummary::new(&world, config), path)?;
        println!("Summary written to: {}", path.display());
    }
    Ok(())
}

fn run_batch(
    config: &WorldConfig,
    count: usize,
    output: &Path,
    format: OutputFormat,
    summary: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let timer = Timed::info("Generating batch");
    let worlds = generate_batch(config, count);
    let elapsed = timer.finish();
    println!("Generated {} worlds in {:.2?}", count, elapsed);

    let _t = Timed::info("Saving");
    for (i, world) in worlds.into_iter().enumerate() {
        let world = world?;
        let path = indexed_path(output, i);
        world.image().save_as(&path, format)?;

        println!("World {} (seed {}):", i, batch_seed(config.seed, i));
        report(&world, &path);

        if let Some(summary_path) = summary {
            let run_config = config.with_seed(batch_seed(config.seed, i));
            save_summary(&WorldSummary::new(&world, &run_config), indexed_path(summary_path, i))?;
        }
    }
    Ok(())
}

fn report(world: &World, path: &Path) {
    println!(
        "  Created {} of {} regions, {} tiles unclaimed",
        world.regions().len(),
        world.requested_regions(),
        world.unclaimed_count()
    );
    println!("  Saved to: {}", path.display());
}
