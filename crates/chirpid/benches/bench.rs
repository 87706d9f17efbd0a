use chirpid::{
    AtomicSnowflakeGenerator, IdGenStatus, LockSnowflakeGenerator, MachineId, MonotonicClock,
    Result, SnowflakeGenerator, SnowflakeGeneratorAsyncTokioExt, SystemClock, TimeSource,
};
use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};
use tokio::runtime::Builder;

#[derive(Clone, Copy)]
struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> Result<u64> {
        Ok(self.millis)
    }
}

// One full millisecond worth of sequence numbers, so a fresh generator on a
// fixed clock never reports `Pending`.
const TOTAL_IDS: usize = 4096;

fn machine() -> MachineId {
    MachineId::new(1).unwrap()
}

/// Benchmarks a hot-path generator where IDs are always `Ready`.
fn bench_generator<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: SnowflakeGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id().unwrap() {
                        IdGenStatus::Ready { id } => {
                            black_box(id);
                        }
                        IdGenStatus::Pending { .. } => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks `generate()` against a real clock, including sequence waits.
fn bench_generator_blocking<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: SnowflakeGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let generator = generator_factory();
            let start = Instant::now();

            for _ in 0..iters {
                for _ in 0..TOTAL_IDS {
                    black_box(generator.generate().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a shared generator across threads on a fixed clock.
fn bench_generator_contended<G>(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> G)
where
    G: SnowflakeGenerator + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8, 16] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(
            format!("elems/{TOTAL_IDS}/threads/{thread_count}"),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let generator = Arc::new(generator_fn());
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let generator = Arc::clone(&generator);
                                let barrier = Arc::clone(&barrier);
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        // Lost CAS races come back as `Pending { yield_for: 0 }`.
                                        let id = generator
                                            .try_next_id(|_| core::hint::spin_loop())
                                            .unwrap();
                                        black_box(id);
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

/// Benchmarks async generation on a multi-threaded Tokio runtime, one task per
/// worker sharing one generator.
fn bench_generator_async_tokio<G>(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> G)
where
    G: SnowflakeGenerator + Send + Sync + 'static,
{
    let mut group = c.benchmark_group(group_name);
    group.sample_size(10);

    for num_tasks in [1, 4, 16] {
        let ids_per_task = TOTAL_IDS / num_tasks;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/tasks/{num_tasks}"), |b| {
            let rt = Builder::new_multi_thread().enable_all().build().unwrap();
            let generator = Arc::new(generator_fn());

            b.to_async(&rt).iter_custom(|iters| {
                let generator = Arc::clone(&generator);
                async move {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let tasks: Vec<_> = (0..num_tasks)
                            .map(|_| {
                                let generator = Arc::clone(&generator);
                                tokio::spawn(async move {
                                    for _ in 0..ids_per_task {
                                        black_box(generator.generate_async().await.unwrap());
                                    }
                                })
                            })
                            .collect();
                        for task in tasks {
                            task.await.unwrap();
                        }
                    }

                    start.elapsed()
                }
            });
        });
    }

    group.finish();
}

fn benchmark_mock_fixed(c: &mut Criterion) {
    bench_generator(c, "mock/fixed/lock", || {
        LockSnowflakeGenerator::new(machine(), FixedMockTime { millis: 1 })
    });
    bench_generator(c, "mock/fixed/atomic", || {
        AtomicSnowflakeGenerator::new(machine(), FixedMockTime { millis: 1 })
    });
}

fn benchmark_mock_contended(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/lock", || {
        LockSnowflakeGenerator::new(machine(), FixedMockTime { millis: 1 })
    });
    bench_generator_contended(c, "mock/contended/atomic", || {
        AtomicSnowflakeGenerator::new(machine(), FixedMockTime { millis: 1 })
    });
}

fn benchmark_clocks(c: &mut Criterion) {
    bench_generator_blocking(c, "system/lock", || {
        LockSnowflakeGenerator::new(machine(), SystemClock::default())
    });
    bench_generator_blocking(c, "system/atomic", || {
        AtomicSnowflakeGenerator::new(machine(), SystemClock::default())
    });
    let clock = MonotonicClock::new().unwrap();
    bench_generator_blocking(c, "mono/lock", || {
        LockSnowflakeGenerator::new(machine(), clock.clone())
    });
}

fn benchmark_async(c: &mut Criterion) {
    bench_generator_async_tokio(c, "async/tokio/lock", || {
        LockSnowflakeGenerator::new(machine(), SystemClock::default())
    });
    bench_generator_async_tokio(c, "async/tokio/atomic", || {
        AtomicSnowflakeGenerator::new(machine(), SystemClock::default())
    });
}

criterion_group!(
    benches,
    benchmark_mock_fixed,
    benchmark_mock_contended,
    benchmark_clocks,
    benchmark_async
);
criterion_main!(benches);
