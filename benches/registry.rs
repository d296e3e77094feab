//! Registry and keyed-cache micro benchmarks.
//!
//! Run with: `cargo bench --bench registry`

use std::hint::black_box;

use cache_registry::registry::CacheRegistry;
#[cfg(feature = "concurrency")]
use cache_registry::registry::ConcurrentCacheRegistry;
use cache_registry::store::keyed::KeyedCache;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ENTRIES: i64 = 4_096;
const NAMES: &[&str] = &["users", "sessions", "passages", "tags", "styles", "stories"];

fn filled_cache() -> KeyedCache<u64> {
    let mut cache = KeyedCache::with_capacity("bench", ENTRIES as usize);
    for i in 0..ENTRIES {
        cache.set(i, i as u64);
    }
    cache
}

fn bench_keyed_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_cache");
    group.throughput(Throughput::Elements(ENTRIES as u64));

    group.bench_function("set_new", |b| {
        b.iter_batched(
            || KeyedCache::<u64>::new("bench"),
            |mut cache| {
                for i in 0..ENTRIES {
                    cache.set(black_box(i), i as u64);
                }
                cache
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("get_hit", |b| {
        let cache = filled_cache();
        b.iter(|| {
            for i in 0..ENTRIES {
                black_box(cache.get(black_box(i)));
            }
        })
    });

    group.bench_function("get_random", |b| {
        let cache = filled_cache();
        let mut rng = StdRng::seed_from_u64(42);
        let keys: Vec<i64> = (0..ENTRIES)
            .map(|_| rng.random_range(0..ENTRIES * 2))
            .collect();
        b.iter(|| {
            for key in &keys {
                black_box(cache.has(black_box(*key)));
            }
        })
    });

    group.finish();
}

fn bench_registry_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_lookup");

    group.bench_function("get_or_create_existing", |b| {
        let mut registry = CacheRegistry::new();
        for name in NAMES {
            registry.get_or_create::<u64>(name).unwrap();
        }
        b.iter(|| {
            for name in NAMES {
                black_box(registry.get_or_create::<u64>(black_box(name)).unwrap().len());
            }
        })
    });

    #[cfg(feature = "concurrency")]
    group.bench_function("concurrent_get_or_create_existing", |b| {
        let registry = ConcurrentCacheRegistry::new();
        for name in NAMES {
            registry.get_or_create::<u64>(name).unwrap();
        }
        b.iter(|| {
            for name in NAMES {
                black_box(registry.get_or_create::<u64>(black_box(name)).unwrap());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_keyed_cache, bench_registry_lookup);
criterion_main!(benches);
