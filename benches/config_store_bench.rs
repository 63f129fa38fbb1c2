use confstore::ConfigStore;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("r{:04x}.http.port", n & 0xffff)
}

fn bench_set(c: &mut Criterion) {
    c.bench_function("config_store_set_10k", |b| {
        b.iter_batched(
            ConfigStore::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.set(&key(x), i.to_string()).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("config_store_get_hit", |b| {
        let mut m = ConfigStore::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.set(k, i.to_string()).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k).unwrap());
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("config_store_get_miss", |b| {
        let mut m = ConfigStore::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.set(&key(x), i.to_string()).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // same shape as stored keys but a different suffix
            let k = format!("r{:04x}.jmx.port", miss.next().unwrap() & 0xffff);
            black_box(m.get(&k));
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let text: String = lcg(3)
        .take(5_000)
        .map(|x| format!("# entry\n{} = value-{x:x}\n\n", key(x)))
        .collect();
    c.bench_function("config_store_load_str_5k", |b| {
        b.iter_batched(
            ConfigStore::new,
            |mut m| {
                m.load_str(black_box(&text)).unwrap();
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_set, bench_get_hit, bench_get_miss, bench_parse
}
criterion_main!(benches);
