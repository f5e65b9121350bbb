//! Estimate traffic volume per colour and protocol from a 1% sample.
//!
//! Each packet is offered with its size as weight, so the adjusted sample
//! weights reconstruct byte totals for any grouping decided after the fact.
//!
//! Run with `RUST_LOG=varopt=debug` to see sampler events.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;
use varopt::Varopt;

const TOTAL_PACKETS: usize = 1_000_000;
const SAMPLE_RATIO: f64 = 0.01;
const SEED: u64 = 32491;

const COLORS: [&str; 3] = ["red", "green", "blue"];
const PROTOCOLS: [&str; 3] = ["http", "tcp", "udp"];

#[derive(Debug, Clone, Copy)]
struct Packet {
    size: u32,
    color: &'static str,
    protocol: &'static str,
}

fn mape(truth: &HashMap<&str, f64>, estimate: &HashMap<&str, f64>, keys: &[&str]) -> f64 {
    keys.iter()
        .map(|k| {
            let t = truth.get(k).copied().unwrap_or(0.0);
            let e = estimate.get(k).copied().unwrap_or(0.0);
            (t - e).abs() / t
        })
        .sum::<f64>()
        / keys.len() as f64
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let capacity = (TOTAL_PACKETS as f64 * SAMPLE_RATIO) as usize;
    let mut sampler = Varopt::new(capacity, ChaCha8Rng::seed_from_u64(SEED + 1))?;

    let mut size_by_color: HashMap<&str, f64> = HashMap::new();
    let mut size_by_protocol: HashMap<&str, f64> = HashMap::new();
    let mut true_total = 0.0;

    for _ in 0..TOTAL_PACKETS {
        let packet = Packet {
            size: 1 + rng.random_range(0..100_000),
            color: COLORS[rng.random_range(0..COLORS.len())],
            protocol: PROTOCOLS[rng.random_range(0..PROTOCOLS.len())],
        };
        let size = f64::from(packet.size);

        *size_by_color.entry(packet.color).or_default() += size;
        *size_by_protocol.entry(packet.protocol).or_default() += size;
        true_total += size;

        sampler.add(packet, size)?;
    }

    let mut est_by_color: HashMap<&str, f64> = HashMap::new();
    let mut est_by_protocol: HashMap<&str, f64> = HashMap::new();
    let mut est_total = 0.0;

    for (packet, weight) in sampler.iter() {
        *est_by_color.entry(packet.color).or_default() += weight;
        *est_by_protocol.entry(packet.protocol).or_default() += weight;
        est_total += weight;
    }

    println!("sample size {} (tau {:.1})", sampler.size(), sampler.tau());
    println!(
        "total sum error {:.2e}%",
        100.0 * (est_total - true_total).abs() / true_total
    );
    println!(
        "colour mean absolute percentage error {:.2}%",
        100.0 * mape(&size_by_color, &est_by_color, &COLORS)
    );
    println!(
        "protocol mean absolute percentage error {:.2}%",
        100.0 * mape(&size_by_protocol, &est_by_protocol, &PROTOCOLS)
    );

    Ok(())
}
