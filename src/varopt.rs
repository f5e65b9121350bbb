//! Variance-optimal weighted reservoir sampling.
//!
//! Implements VarOpt_k from Cohen, Duffield, Kaplan, Lund, Thorup (2008),
//! *Stream sampling for variance-optimal estimation of subset sums*
//! (<https://arxiv.org/abs/0803.0473>).
//!
//! The reservoir keeps exactly `capacity` items once that many have been
//! offered. Each item is retained with probability `min(1, weight / tau)` and
//! reported with weight `max(weight, tau)`, so summing reported weights over any
//! subset of the sample is an unbiased, minimum-variance estimate of the same
//! subset sum over the whole stream.
//!
//! Items live in one of two pools:
//! - `large`: weight above `tau`, kept in a min-heap, reported at their exact weight.
//! - `light`: weight at most `tau`, kept unordered, reported at `tau`.

use rand::prelude::*;
use thiserror::Error;

use crate::heap::{SampleHeap, WeightedSample};
use crate::simple::SimpleReservoir;

/// Errors for weighted reservoir sampling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VaroptError {
    /// Weight is NaN, infinite, or not strictly positive.
    #[error("invalid weight: {0} (must be finite and > 0)")]
    InvalidWeight(f64),
    /// A reservoir must hold at least one item.
    #[error("capacity must be > 0")]
    ZeroCapacity,
    /// State can only be copied between reservoirs of the same capacity.
    #[error("capacity mismatch: expected {expected}, found {found}")]
    CapacityMismatch { expected: usize, found: usize },
}

/// A VarOpt reservoir over opaque samples of type `T`.
///
/// The random source `R` is owned and injected at construction; use
/// [`Varopt::with_seed`] for a seeded `StdRng`, or pass `&mut rng` to share a
/// generator.
///
/// # Example
///
/// ```
/// use varopt::Varopt;
///
/// let mut sampler = Varopt::with_seed(100, 42)?;
/// for i in 0..10_000u32 {
///     // Evicted samples are handed back for reuse.
///     let _evicted = sampler.add(i, 1.0 + f64::from(i % 7))?;
/// }
/// assert_eq!(sampler.size(), 100);
///
/// let estimate: f64 = sampler.iter().map(|(_, w)| w).sum();
/// assert!((estimate - sampler.total_weight()).abs() / sampler.total_weight() < 1e-9);
/// # Ok::<(), varopt::VaroptError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Varopt<T, R = StdRng> {
    rng: R,
    large: SampleHeap<T>,
    light: Vec<WeightedSample<T>>,
    // Scratch space for a single `add`; empty between calls.
    pending: Vec<WeightedSample<T>>,
    tau: f64,
    capacity: usize,
    total_count: usize,
    total_weight: f64,
}

impl<T> Varopt<T, StdRng> {
    /// Create a reservoir seeded with a `StdRng`.
    pub fn with_seed(capacity: usize, seed: u64) -> Result<Self, VaroptError> {
        Self::new(capacity, StdRng::seed_from_u64(seed))
    }
}

impl<T, R: Rng> Varopt<T, R> {
    /// Create a reservoir holding at most `capacity` samples.
    pub fn new(capacity: usize, rng: R) -> Result<Self, VaroptError> {
        if capacity == 0 {
            return Err(VaroptError::ZeroCapacity);
        }
        tracing::debug!(target: "varopt", capacity, "created reservoir");
        Ok(Self {
            rng,
            large: SampleHeap::with_capacity(capacity + 1),
            light: Vec::with_capacity(capacity + 1),
            pending: Vec::with_capacity(capacity + 1),
            tau: 0.0,
            capacity,
            total_count: 0,
            total_weight: 0.0,
        })
    }

    /// Offer a sample with the given weight.
    ///
    /// Once the reservoir is full, every accepted call evicts exactly one
    /// sample (possibly the one just offered) and returns it so its storage
    /// can be reused. While filling, returns `Ok(None)`.
    ///
    /// Rejected weights leave the reservoir untouched.
    pub fn add(&mut self, sample: T, weight: f64) -> Result<Option<T>, VaroptError> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(VaroptError::InvalidWeight(weight));
        }

        self.total_count += 1;
        self.total_weight += weight;

        let individual = WeightedSample::new(sample, weight);

        if self.size() < self.capacity {
            self.large.push(individual);
            return Ok(None);
        }

        let mut w = self.tau * self.light.len() as f64;

        if weight > self.tau {
            self.large.push(individual);
        } else {
            w += weight;
            self.pending.push(individual);
        }

        // Migrate large items that fall under the candidate threshold.
        loop {
            let pooled = (self.light.len() + self.pending.len()) as f64;
            match self.large.peek() {
                Some(min) if w >= (pooled - 1.0) * min.weight => {}
                _ => break,
            }
            let Some(moved) = self.large.pop() else {
                break;
            };
            w += moved.weight;
            self.pending.push(moved);
        }

        // The loop cannot stop while the pool holds fewer than two items,
        // and there are `capacity + 1 >= 2` items in total.
        let pooled = self.light.len() + self.pending.len();
        debug_assert!(pooled >= 2, "threshold pool too small: {pooled}");
        self.tau = w / (pooled - 1) as f64;

        let evicted = match self.pending_victim() {
            Some(d) => self.pending.swap_remove(d),
            None if self.light.is_empty() => {
                // Walk probabilities sum to one here; only roundoff lands us in this arm.
                let last = self.pending.len() - 1;
                self.pending.swap_remove(last)
            }
            None => {
                let ti = self.rng.random_range(0..self.light.len());
                self.light.swap_remove(ti)
            }
        };

        self.light.append(&mut self.pending);

        tracing::trace!(
            target: "varopt",
            tau = self.tau,
            large = self.large.len(),
            light = self.light.len(),
            evicted_weight = evicted.weight,
            "evicted sample"
        );

        Ok(Some(evicted.sample))
    }

    /// Pick the pending item to evict, each with probability `1 - weight / tau`.
    /// `None` means the eviction falls on the light pool.
    fn pending_victim(&mut self) -> Option<usize> {
        let mut r = self.uniform();
        for (d, x) in self.pending.iter().enumerate() {
            r -= 1.0 - x.weight / self.tau;
            if r < 0.0 {
                return Some(d);
            }
        }
        None
    }

    /// Uniform draw in (0, 1).
    fn uniform(&mut self) -> f64 {
        loop {
            let r: f64 = self.rng.random();
            if r != 0.0 {
                return r;
            }
        }
    }

    /// Offer every sample of an unweighted reservoir at its uniform
    /// inverse-inclusion weight, returning the samples evicted along the way.
    ///
    /// An empty reservoir contributes nothing.
    pub fn extend_from_reservoir<R2: Rng>(
        &mut self,
        reservoir: SimpleReservoir<T, R2>,
    ) -> Result<Vec<T>, VaroptError> {
        let weight = reservoir.weight();
        let mut evicted = Vec::new();
        if reservoir.size() == 0 {
            return Ok(evicted);
        }
        for sample in reservoir.into_samples() {
            if let Some(e) = self.add(sample, weight)? {
                evicted.push(e);
            }
        }
        Ok(evicted)
    }

    /// Clear the sample, counters, and threshold. Capacity and RNG are kept.
    pub fn reset(&mut self) {
        self.large.clear();
        self.light.clear();
        self.pending.clear();
        self.tau = 0.0;
        self.total_count = 0;
        self.total_weight = 0.0;
        tracing::debug!(target: "varopt", capacity = self.capacity, "reset reservoir");
    }

    /// Overwrite this reservoir's state with a deep copy of `other`'s.
    ///
    /// The receiver keeps its own RNG, so the two diverge from here on.
    pub fn copy_from<R2>(&mut self, other: &Varopt<T, R2>) -> Result<(), VaroptError>
    where
        T: Clone,
    {
        if self.capacity != other.capacity {
            return Err(VaroptError::CapacityMismatch {
                expected: self.capacity,
                found: other.capacity,
            });
        }
        self.large = other.large.clone();
        self.light.clone_from(&other.light);
        self.pending.clear();
        self.tau = other.tau;
        self.total_count = other.total_count;
        self.total_weight = other.total_weight;
        tracing::debug!(
            target: "varopt",
            size = self.size(),
            total_count = self.total_count,
            "copied reservoir state"
        );
        Ok(())
    }
}

impl<T, R> Varopt<T, R> {
    /// The `i`'th sample and its adjusted weight.
    ///
    /// Indices below the large-pool size address the heap's backing array and
    /// report exact weights; the rest report `tau`. Order is not stable across
    /// calls to [`add`](Self::add).
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    pub fn get(&self, i: usize) -> (&T, f64) {
        let large = self.large.as_slice();
        if i < large.len() {
            let s = &large[i];
            return (&s.sample, s.weight);
        }
        (&self.light[i - large.len()].sample, self.tau)
    }

    /// The weight the `i`'th sample was offered with.
    ///
    /// Useful for turning adjusted weights back into frequencies
    /// (`adjusted / original`).
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    pub fn get_original_weight(&self, i: usize) -> f64 {
        let large = self.large.as_slice();
        if i < large.len() {
            return large[i].weight;
        }
        self.light[i - large.len()].weight
    }

    /// Iterate `(sample, adjusted_weight)` in [`get`](Self::get) index order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> + '_ {
        let tau = self.tau;
        self.large
            .as_slice()
            .iter()
            .map(|s| (&s.sample, s.weight))
            .chain(self.light.iter().map(move |s| (&s.sample, tau)))
    }

    /// Maximum sample size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current sample size; equals `capacity` once the reservoir has filled.
    pub fn size(&self) -> usize {
        self.large.len() + self.light.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of accepted calls to [`add`](Self::add).
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Sum of accepted weights.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Current large-weight threshold. Samples heavier than this carry their
    /// exact weight; the rest are reported at `tau`.
    pub fn tau(&self) -> f64 {
        self.tau
    }
}
