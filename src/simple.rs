//! Unweighted reservoir sampling (**Algorithm R**, Vitter 1985).
//!
//! Every observed item ends up in the sample with probability
//! `capacity / count`, so each retained item stands in for `count / size`
//! stream items. That constant is [`SimpleReservoir::weight`], which is how a
//! uniform sub-sample is re-offered to a [`Varopt`](crate::Varopt) reservoir:
//! shard a stream, sample each shard with Algorithm R, then merge the shards
//! into one weighted sample via [`Varopt::extend_from_reservoir`](crate::Varopt::extend_from_reservoir).

use rand::prelude::*;

/// Fixed-size uniform sample of a stream.
///
/// The random source is owned; pass `&mut rng` to share one generator.
#[derive(Debug, Clone)]
pub struct SimpleReservoir<T, R = StdRng> {
    capacity: usize,
    observed: usize,
    buffer: Vec<T>,
    rng: R,
}

impl<T> SimpleReservoir<T, StdRng> {
    /// Create a reservoir seeded with a `StdRng`.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::new(capacity, StdRng::seed_from_u64(seed))
    }
}

impl<T, R: Rng> SimpleReservoir<T, R> {
    /// Create a reservoir that keeps at most `capacity` items.
    ///
    /// If `capacity == 0`, every item is counted and discarded.
    pub fn new(capacity: usize, rng: R) -> Self {
        Self {
            capacity,
            observed: 0,
            buffer: Vec::with_capacity(capacity),
            rng,
        }
    }

    /// Offer an item from the stream.
    #[inline]
    pub fn add(&mut self, item: T) {
        self.observed += 1;

        if self.buffer.len() < self.capacity {
            self.buffer.push(item);
            return;
        }

        // Replace with probability capacity / observed.
        let j = self.rng.random_range(0..self.observed);
        if j < self.capacity {
            self.buffer[j] = item;
        }
    }

    /// The `i`'th retained item.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    pub fn get(&self, i: usize) -> &T {
        &self.buffer[i]
    }

    /// Current sample (length ≤ capacity).
    pub fn samples(&self) -> &[T] {
        &self.buffer
    }

    /// Number of retained items: `min(count, capacity)`.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items offered so far.
    pub fn count(&self) -> usize {
        self.observed
    }

    /// Inverse inclusion probability shared by every retained item.
    ///
    /// Returns `0.0` when nothing is retained.
    pub fn weight(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.observed as f64 / self.buffer.len() as f64
        }
    }

    /// Drop the sample and the observation count; keeps capacity and RNG.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.observed = 0;
    }

    /// Consume the reservoir and return the sample.
    pub fn into_samples(self) -> Vec<T> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn keeps_capacity_items() {
        let mut s = SimpleReservoir::new(5, ChaCha8Rng::seed_from_u64(1));
        for i in 0..100 {
            s.add(i);
        }
        assert_eq!(s.size(), 5);
        assert_eq!(s.count(), 100);
        assert_eq!(s.weight(), 20.0);
    }

    #[test]
    fn underfilled_keeps_everything_in_order() {
        let mut s = SimpleReservoir::new(10, ChaCha8Rng::seed_from_u64(2));
        for i in 0..4 {
            s.add(i);
        }
        assert_eq!(s.samples(), &[0, 1, 2, 3]);
        assert_eq!(s.weight(), 1.0);
        assert_eq!(*s.get(2), 2);
    }

    #[test]
    fn zero_capacity_discards() {
        let mut s = SimpleReservoir::new(0, ChaCha8Rng::seed_from_u64(3));
        for i in 0..10 {
            s.add(i);
        }
        assert_eq!(s.size(), 0);
        assert_eq!(s.count(), 10);
        assert_eq!(s.weight(), 0.0);
    }

    #[test]
    fn reset_clears_counts() {
        let mut s = SimpleReservoir::with_seed(3, 4);
        for i in 0..10 {
            s.add(i);
        }
        s.reset();
        assert_eq!(s.size(), 0);
        assert_eq!(s.count(), 0);
        assert_eq!(s.capacity(), 3);
    }

    #[test]
    fn sample_mean_matches_population_mean() {
        const POP: usize = 1_000_000;
        const SAMPLE: usize = 100_000;

        let mut s = SimpleReservoir::new(SAMPLE, ChaCha8Rng::seed_from_u64(17167));
        let mut psum = 0.0;
        for i in 0..POP {
            s.add(i);
            psum += i as f64;
        }
        assert_eq!(s.size(), SAMPLE);

        let ssum: f64 = s.samples().iter().map(|&v| v as f64).sum();
        let smean = ssum / SAMPLE as f64;
        let pmean = psum / POP as f64;
        assert!(
            ((smean - pmean) / pmean).abs() < 0.01,
            "sample mean {smean} vs population mean {pmean}"
        );
    }

    #[test]
    fn distribution_uniform() {
        let n = 100;
        let k = 10;
        let trials = 5_000;
        let mut counts = vec![0; n];

        for t in 0..trials {
            let mut s = SimpleReservoir::new(k, ChaCha8Rng::seed_from_u64(t as u64));
            for i in 0..n {
                s.add(i);
            }
            for &item in s.samples() {
                counts[item] += 1;
            }
        }

        let expected = trials as f64 * (k as f64 / n as f64);
        let chi2: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                (diff * diff) / expected
            })
            .sum();

        // df = 99; generous cutoff keeps this deterministic test stable.
        assert!(
            chi2 < 250.0,
            "chi2 too large (chi2={chi2:.2}, expected~{}). counts={counts:?}",
            n - 1
        );
    }

    #[test]
    fn shared_rng_by_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        {
            let mut s = SimpleReservoir::new(2, &mut rng);
            for i in 0..10 {
                s.add(i);
            }
            assert_eq!(s.size(), 2);
        }
        let _ = rng.random::<u64>();
    }
}
