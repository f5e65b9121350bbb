//! Flatten a time series with inverse-frequency weights, then reconstruct the
//! original per-second counts from the sample.
//!
//! Three Gaussian signals share a 60 second window. Offering each point with
//! weight `1 / p(second)` makes the sample spread evenly across seconds; the
//! ratio `adjusted / original` turns each sampled point back into a count.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing_subscriber::EnvFilter;
use varopt::Varopt;

const TOTAL_COUNT: usize = 1_000_000;
const SAMPLE_RATIO: f64 = 0.01;
const SECONDS: usize = 60;
const SEED: u64 = 104729;

struct Curve {
    color: &'static str,
    mean: f64,
    stddev: f64,
}

const CURVES: [Curve; 3] = [
    Curve { color: "red", mean: 10.0, stddev: 15.0 },
    Curve { color: "green", mean: 30.0, stddev: 10.0 },
    Curve { color: "blue", mean: 50.0, stddev: 20.0 },
];

#[derive(Debug, Clone, Copy)]
struct Point {
    curve: usize,
    x: f64,
}

impl Point {
    fn second(&self) -> usize {
        self.x.floor() as usize
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);

    let mut points = Vec::with_capacity(TOTAL_COUNT);
    let mut orig_counts = vec![[0usize; SECONDS]; CURVES.len()];

    while points.len() < TOTAL_COUNT {
        let curve = rng.random_range(0..CURVES.len());
        let z: f64 = rng.sample(StandardNormal);
        let x = z * CURVES[curve].stddev + CURVES[curve].mean;
        if !(0.0..SECONDS as f64).contains(&x) {
            continue;
        }
        let point = Point { curve, x };
        orig_counts[curve][point.second()] += 1;
        points.push(point);
    }

    let mut per_second = [0usize; SECONDS];
    for p in &points {
        per_second[p.second()] += 1;
    }

    let capacity = (SAMPLE_RATIO * TOTAL_COUNT as f64) as usize;
    let mut sampler = Varopt::new(capacity, ChaCha8Rng::seed_from_u64(SEED + 1))?;
    for p in points {
        let prob = per_second[p.second()] as f64 / TOTAL_COUNT as f64;
        sampler.add(p, 1.0 / prob)?;
    }

    let mut sample_counts = vec![[0.0f64; SECONDS]; CURVES.len()];
    let mut points_per_second = [0usize; SECONDS];
    for i in 0..sampler.size() {
        let (p, weight) = sampler.get(i);
        let original = sampler.get_original_weight(i);
        sample_counts[p.curve][p.second()] += weight / original;
        points_per_second[p.second()] += 1;
    }

    let mean = capacity as f64 / SECONDS as f64;
    let var = points_per_second
        .iter()
        .map(|&n| {
            let e = n as f64 - mean;
            e * e
        })
        .sum::<f64>()
        / (SECONDS - 1) as f64;

    println!("samples per second mean {mean:.2}");
    println!("samples per second standard deviation {:.2}", var.sqrt());

    for (c, curve) in CURVES.iter().enumerate() {
        let mut mape = 0.0;
        let mut populated = 0;
        for s in 0..SECONDS {
            let truth = orig_counts[c][s] as f64;
            if truth == 0.0 {
                continue;
            }
            mape += (sample_counts[c][s] - truth).abs() / truth;
            populated += 1;
        }
        mape /= populated.max(1) as f64;
        println!(
            "mean absolute percentage error ({}) = {:.2}%",
            curve.color,
            mape * 100.0
        );
    }

    Ok(())
}
