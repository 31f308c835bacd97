use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SMALL_RUNTIME_SAMPLE_SIZE: usize = 15;
const SMALL_RUNTIME_WARM_UP_MS: u64 = 100;
const SMALL_RUNTIME_MEASURE_MS: u64 = 200;
const MEDIUM_RUNTIME_SAMPLE_SIZE: usize = 15;
const MEDIUM_RUNTIME_WARM_UP_MS: u64 = 500;
const MEDIUM_RUNTIME_MEASURE_MS: u64 = 1000;
const RNG_SEED: u64 = 0x5EED_2026;

pub fn apply_small_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(SMALL_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(SMALL_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(SMALL_RUNTIME_MEASURE_MS));
}

pub fn apply_medium_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(MEDIUM_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(MEDIUM_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(MEDIUM_RUNTIME_MEASURE_MS));
}

pub fn default_rng() -> StdRng {
    StdRng::seed_from_u64(RNG_SEED)
}

/// One step of a double-ended queue workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndOp {
    PushFront(u64),
    PushBack(u64),
    PopFront,
    PopBack,
}

/// Random end operations where a push happens with probability
/// `push_percent / 100`, split evenly between the two ends.
pub fn random_end_ops<R: Rng + ?Sized>(rng: &mut R, count: usize, push_percent: u32) -> Vec<EndOp> {
    debug_assert!(push_percent <= 100);
    (0..count)
        .map(|_| {
            let push = rng.random_range(0..100) < push_percent;
            let front = rng.random_bool(0.5);
            match (push, front) {
                (true, true) => EndOp::PushFront(rng.random()),
                (true, false) => EndOp::PushBack(rng.random()),
                (false, true) => EndOp::PopFront,
                (false, false) => EndOp::PopBack,
            }
        })
        .collect()
}

/// `count` uniformly random logical positions in `0..len`.
pub fn random_positions<R: Rng + ?Sized>(rng: &mut R, len: usize, count: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    (0..count).map(|_| rng.random_range(0..len)).collect()
}
