use criterion::{criterion_group, criterion_main, Criterion, black_box};

use rand::rngs::StdRng;
use rand::SeedableRng;

use plating::assets::MemoryAssetLoader;
use plating::catalog::ToppingCatalog;
use plating::combination;
use plating::placement::{place_toppings, PlacementParams};
use plating::scene::{SceneComposer, SceneConfig};

fn bench_place_three_toppings(c: &mut Criterion) {
    let catalog = ToppingCatalog::builtin();
    let selected = catalog.select(&["mushroom", "pepper", "olive"]);
    let params = PlacementParams::default();
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("place_3_toppings", |b| {
        b.iter(|| place_toppings(black_box(&selected), &params, &mut rng));
    });
}

fn bench_place_full_catalog(c: &mut Criterion) {
    let catalog = ToppingCatalog::builtin();
    let params = PlacementParams::default();
    let mut rng = StdRng::seed_from_u64(2);

    // seven toppings crowd the surface, so many instances hit the attempt cap
    c.bench_function("place_7_toppings_crowded", |b| {
        b.iter(|| place_toppings(black_box(catalog.toppings()), &params, &mut rng));
    });
}

fn bench_encode_decode(c: &mut Criterion) {
    let catalog = ToppingCatalog::builtin();

    c.bench_function("encode_decode_all_subsets", |b| {
        b.iter(|| {
            for value in 1..128u32 {
                let toppings = combination::decode(black_box(value), catalog.toppings());
                black_box(combination::encode(&toppings));
            }
        });
    });
}

fn bench_compose_dish(c: &mut Criterion) {
    let catalog = ToppingCatalog::builtin();
    let selected = catalog.select(&["basil", "cheese", "onion"]);

    c.bench_function("compose_and_settle_dish", |b| {
        b.iter(|| {
            let mut composer =
                SceneComposer::with_seed(MemoryAssetLoader::new(), SceneConfig::default(), 3);
            let dish = composer.load_dish("Bench", None);
            composer.set_toppings(dish, &selected).ok();
            let mut now = 0.0;
            while !composer.is_settled() {
                now += 16.0;
                composer.tick(now);
            }
            black_box(composer.flatten().len())
        });
    });
}

criterion_group!(
    benches,
    bench_place_three_toppings,
    bench_place_full_catalog,
    bench_encode_decode,
    bench_compose_dish,
);

criterion_main!(benches);
