//! Cache throughput / 缓存吞吐
//!
//! Insert and hit-lookup rates, plus a mixed multi-thread loop.
//! 插入与命中查找速率，以及多线程混合循环。

use std::hint::black_box;
use std::ptr::null_mut;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use pin_lru::new_cache;

const KEYS: u32 = 100_000;

fn noop(_: &[u8], _: *mut ()) {}

fn bench_set(c: &mut Criterion) {
  let mut g = c.benchmark_group("set");
  g.throughput(Throughput::Elements(KEYS as u64));
  g.bench_function("charge_1", |b| {
    b.iter(|| {
      let cache = new_cache(KEYS as usize / 2);
      for k in 0..KEYS {
        cache.set(&k.to_le_bytes(), null_mut(), 1, noop);
      }
      black_box(cache.total_charge())
    })
  });
  g.finish();
}

fn bench_get(c: &mut Criterion) {
  let cache = new_cache(KEYS as usize * 2);
  for k in 0..KEYS {
    cache.set(&k.to_le_bytes(), null_mut(), 1, noop);
  }
  let mut g = c.benchmark_group("get");
  g.throughput(Throughput::Elements(KEYS as u64));
  g.bench_function("hit", |b| {
    b.iter(|| {
      let mut hits = 0u32;
      for k in 0..KEYS {
        if let Some(h) = cache.get(&k.to_le_bytes()) {
          black_box(h.value());
          hits += 1;
        }
      }
      hits
    })
  });
  g.finish();
}

fn bench_mixed(c: &mut Criterion) {
  let cache = new_cache(4096);
  let mut g = c.benchmark_group("mixed");
  g.throughput(Throughput::Elements(4 * 10_000));
  g.bench_function("get_set_4_threads", |b| {
    b.iter(|| {
      std::thread::scope(|s| {
        for t in 0..4u64 {
          let cache = &cache;
          s.spawn(move || {
            let mut rng = fastrand::Rng::with_seed(t);
            for _ in 0..10_000 {
              let k = rng.u32(0..8192).to_le_bytes();
              if rng.bool() {
                drop(cache.get(&k));
              } else {
                cache.set(&k, null_mut(), 1, noop);
              }
            }
          });
        }
      });
    })
  });
  g.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_mixed);
criterion_main!(benches);
