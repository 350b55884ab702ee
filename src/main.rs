//! Single-dish plating preview
//!
//! Composes one dish with the chosen toppings, runs the animation loop headless
//! until everything settles, and prints the combination id and draw list.
//!
//! Usage:
//!     plating [OPTIONS]
//!
//! Options:
//!     -t, --toppings <IDS>    Comma-separated topping ids (default: mushroom,pepper,olive)
//!     -d, --dish <NAME>       Dish name (default: Margherita)
//!     -m, --model <URL>       Dish model, relative to --assets
//!     --assets <DIR>          Load models from this directory
//!     --catalog <FILE>        Topping catalog JSON (default: built-in)
//!     --config <FILE>         Scene config JSON (default: built-in)
//!     --seed <SEED>           Placement seed (default: random)
//!     --explode               Show the exploded cross-section
//!     --plate                 Run the plating sequence after the drop-in
//!     --step-ms <MS>          Frame step in milliseconds (default: 16)
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use plating::assets::{AssetLoader, FsAssetLoader, MemoryAssetLoader};
use plating::catalog::ToppingCatalog;
use plating::combination;
use plating::core::{logging, time::FrameClock};
use plating::scene::{SceneComposer, SceneConfig};

/// Stop the loop even if something never settles.
const MAX_FRAMES: u64 = 100_000;

fn print_help() {
    eprintln!("plating - Single-dish plating preview");
    eprintln!();
    eprintln!("Usage: plating [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -t, --toppings <IDS>    Comma-separated topping ids (default: mushroom,pepper,olive)");
    eprintln!("    -d, --dish <NAME>       Dish name (default: Margherita)");
    eprintln!("    -m, --model <URL>       Dish model, relative to --assets");
    eprintln!("    --assets <DIR>          Load models from this directory");
    eprintln!("    --catalog <FILE>        Topping catalog JSON (default: built-in)");
    eprintln!("    --config <FILE>         Scene config JSON (default: built-in)");
    eprintln!("    --seed <SEED>           Placement seed (default: random)");
    eprintln!("    --explode               Show the exploded cross-section");
    eprintln!("    --plate                 Run the plating sequence after the drop-in");
    eprintln!("    --step-ms <MS>          Frame step in milliseconds (default: 16)");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    plating -t olive,basil --explode --seed 7");
    eprintln!("    plating --assets ./assets -m models/pizza.json --plate");
}

#[derive(Debug)]
struct Args {
    toppings: Vec<String>,
    dish: String,
    model: Option<String>,
    assets: Option<PathBuf>,
    catalog: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    explode: bool,
    plate: bool,
    step_ms: u64,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut parsed = Args {
        toppings: vec!["mushroom".into(), "pepper".into(), "olive".into()],
        dish: "Margherita".to_string(),
        model: None,
        assets: None,
        catalog: None,
        config: None,
        seed: None,
        explode: false,
        plate: false,
        step_ms: 16,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || -> Result<String, String> {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };
        match flag {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-t" | "--toppings" => {
                parsed.toppings = value()?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "-d" | "--dish" => parsed.dish = value()?,
            "-m" | "--model" => parsed.model = Some(value()?),
            "--assets" => parsed.assets = Some(PathBuf::from(value()?)),
            "--catalog" => parsed.catalog = Some(PathBuf::from(value()?)),
            "--config" => parsed.config = Some(PathBuf::from(value()?)),
            "--seed" => {
                let v = value()?;
                parsed.seed = Some(v.parse().map_err(|_| format!("Invalid seed: {}", v))?);
            }
            "--step-ms" => {
                let v = value()?;
                parsed.step_ms = v.parse().map_err(|_| format!("Invalid step-ms: {}", v))?;
                if parsed.step_ms == 0 {
                    return Err("--step-ms must be positive".to_string());
                }
            }
            "--explode" => parsed.explode = true,
            "--plate" => parsed.plate = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
}

fn run<L: AssetLoader>(
    mut composer: SceneComposer<L>,
    catalog: &ToppingCatalog,
    args: &Args,
) -> plating::core::Result<()> {
    let mut clock = FrameClock::fixed(Duration::from_millis(args.step_ms));

    let selected = catalog.select(&args.toppings);
    match combination::encode(&selected) {
        Some(id) => log::info!(
            "Combination {} (value {})",
            id,
            combination::combination_value(&selected)
        ),
        None => log::info!("No toppings selected"),
    }

    let dish = composer.load_dish(&args.dish, args.model.as_deref());
    let placed = composer.set_toppings(dish, &selected)?;
    log::info!("Placed {} topping instances", placed);

    let mut settle = |composer: &mut SceneComposer<L>| {
        while clock.frame_count() < MAX_FRAMES {
            composer.tick(clock.tick());
            if composer.is_settled() {
                break;
            }
        }
    };

    settle(&mut composer);

    if args.explode {
        composer.set_exploded(dish, true)?;
        settle(&mut composer);
    }

    if args.plate {
        composer.plate(dish)?;
        settle(&mut composer);
        for (_, event) in composer.drain_plating_events() {
            log::info!("Plating: {:?}", event);
        }
    }

    if !composer.is_settled() {
        log::warn!("Scene did not settle within {} frames", MAX_FRAMES);
    }

    let entries = composer.flatten();
    println!("Dish: {} ({} draw entries)", args.dish, entries.len());
    for entry in &entries {
        let pos = entry.world_transform.w_axis;
        println!(
            "  {:<16} pos=({:+.3}, {:+.3}, {:+.3}) opacity={:.2}",
            entry.name, pos.x, pos.y, pos.z, entry.opacity
        );
    }
    println!(
        "Settled after {} frames ({:.0} ms simulated)",
        clock.frame_count(),
        clock.now_ms()
    );
    Ok(())
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    let catalog = match &args.catalog {
        Some(path) => match ToppingCatalog::load_sync(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("Error loading catalog: {}", e);
                std::process::exit(1);
            }
        },
        None => ToppingCatalog::builtin(),
    };

    let config = match &args.config {
        Some(path) => match SceneConfig::load_sync(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };

    let result = match &args.assets {
        Some(dir) => match FsAssetLoader::new(dir.clone(), 4) {
            Ok(loader) => run(compose(loader, config, args.seed), &catalog, &args),
            Err(e) => Err(e),
        },
        None => run(compose(MemoryAssetLoader::new(), config, args.seed), &catalog, &args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn compose<L: AssetLoader>(loader: L, config: SceneConfig, seed: Option<u64>) -> SceneComposer<L> {
    match seed {
        Some(seed) => SceneComposer::with_seed(loader, config, seed),
        None => SceneComposer::new(loader, config),
    }
}
