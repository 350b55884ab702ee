//! Multi-dish table preview
//!
//! Puts several dishes on the table, reveals them, takes one away again, and
//! prints the final layout once everything has settled.
//!
//! Usage:
//!     table_preview [OPTIONS]
//!
//! Options:
//!     -n, --count <N>         Dishes to place (default: 4)
//!     --remove <INDEX>        Dish to remove after the reveal (default: 0)
//!     --latency <POLLS>       Simulated model load latency in frames (default: 5)
//!     --seed <SEED>           Placement seed (default: 12345)
//!     -h, --help              Show this help message

use std::env;
use std::time::Duration;

use glam::Vec3;
use plating::assets::{MemoryAssetLoader, ModelData};
use plating::catalog::{MenuItem, ToppingCatalog};
use plating::core::{logging, time::FrameClock};
use plating::math::Aabb;
use plating::scene::{SceneConfig, TableManager};

const MAX_FRAMES: u64 = 100_000;

const MENU: [(&str, &str, f32, &[&str]); 6] = [
    ("margherita", "Margherita", 14.0, &["basil", "tomato"]),
    ("funghi", "Funghi", 15.5, &["mushroom", "onion"]),
    ("verde", "Verde", 15.0, &["pepper", "olive", "basil"]),
    ("quattro", "Quattro Formaggi", 17.0, &["cheese"]),
    ("ortolana", "Ortolana", 16.0, &["pepper", "onion", "tomato"]),
    ("bianca", "Bianca", 13.0, &[]),
];

fn print_help() {
    eprintln!("table_preview - Multi-dish table preview");
    eprintln!();
    eprintln!("Usage: table_preview [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -n, --count <N>         Dishes to place (default: 4)");
    eprintln!("    --remove <INDEX>        Dish to remove after the reveal (default: 0)");
    eprintln!("    --latency <POLLS>       Simulated model load latency in frames (default: 5)");
    eprintln!("    --seed <SEED>           Placement seed (default: 12345)");
    eprintln!("    -h, --help              Show this help message");
}

#[derive(Debug)]
struct Args {
    count: usize,
    remove: usize,
    latency: u32,
    seed: u64,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut count = 4;
    let mut remove = 0;
    let mut latency = 5;
    let mut seed = 12345;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].clone();
        i += 1;
        if flag == "-h" || flag == "--help" {
            print_help();
            std::process::exit(0);
        }
        let value = args
            .get(i)
            .ok_or_else(|| format!("Missing value for {}", flag))?;
        match flag.as_str() {
            "-n" | "--count" => {
                count = value.parse().map_err(|_| format!("Invalid count: {}", value))?;
            }
            "--remove" => {
                remove = value.parse().map_err(|_| format!("Invalid index: {}", value))?;
            }
            "--latency" => {
                latency = value.parse().map_err(|_| format!("Invalid latency: {}", value))?;
            }
            "--seed" => {
                seed = value.parse().map_err(|_| format!("Invalid seed: {}", value))?;
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(Args { count, remove, latency, seed })
}

/// Stand-in registry: a flat pizza model and the topping models the built-in
/// catalog refers to.
fn demo_loader(latency: u32) -> MemoryAssetLoader {
    let mut loader = MemoryAssetLoader::new().with_latency(latency);
    let flat = |name: &str, x: f32, y: f32| {
        ModelData::single(name, Aabb::from_center_half_extent(Vec3::new(0.0, y, 0.0), Vec3::new(x, y, x)))
    };
    loader.insert("models/pizza.json", flat("pizza", 1.0, 0.08));
    loader.insert("models/mushroom.json", flat("mushroom", 0.6, 0.4));
    loader.insert("models/pepper.json", flat("pepper", 0.5, 0.3));
    loader.insert("models/olive.json", flat("olive", 0.4, 0.4));
    // no tomato model: those fall back to spheres
    loader
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

    let catalog = ToppingCatalog::builtin();
    let mut table = TableManager::with_seed(demo_loader(args.latency), SceneConfig::default(), args.seed);
    let mut clock = FrameClock::fixed(Duration::from_millis(16));

    let mut settle = |table: &mut TableManager<MemoryAssetLoader>| {
        while clock.frame_count() < MAX_FRAMES {
            table.tick(clock.tick());
            if table.is_settled() {
                break;
            }
        }
    };

    for i in 0..args.count {
        let (id, name, price, toppings) = MENU[i % MENU.len()];
        let item = MenuItem::new(format!("{id}-{i}"), name, price).with_model("models/pizza.json");
        if let Err(e) = table.add_dish(item, &catalog.select(toppings)) {
            eprintln!("Error adding dish: {}", e);
            std::process::exit(1);
        }
    }
    settle(&mut table);
    log::info!("Table ready: {}", table.is_ready());

    if let Err(e) = table.reveal_all() {
        eprintln!("Error revealing dishes: {}", e);
        std::process::exit(1);
    }
    settle(&mut table);

    if let Some(dish) = table.dishes().get(args.remove) {
        let handle = dish.handle;
        match table.remove_dish(handle) {
            Ok(_) => settle(&mut table),
            Err(e) => {
                eprintln!("Error removing dish: {}", e);
                std::process::exit(1);
            }
        }
    }

    println!("Table: {} dishes, total {:.2}", table.len(), table.total_price());
    for dish in table.dishes() {
        let (x, z) = table
            .composer()
            .dish_position(dish.handle)
            .unwrap_or((f32::NAN, f32::NAN));
        let id = plating::combination::encode(&dish.toppings).unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<18} slot=({:+.2}, {:+.2}) at=({:+.3}, {:+.3}) toppings={} price={:.2}",
            dish.item.name, dish.slot.0, dish.slot.1, x, z, id, dish.price()
        );
    }
    let entries = table.flatten();
    println!("{} draw entries", entries.len());
}
