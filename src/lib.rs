//! `varopt`: variance-optimal weighted reservoir sampling.
//!
//! Keeps a fixed-size sample of a weighted stream of unknown length such that
//! the reported per-item weights are unbiased, minimum-variance estimators of
//! the input weight. Sums, frequencies, and other subset aggregates over the
//! full stream can be reconstructed from the sample alone.
//!
//! Exposed modules:
//! - `varopt`: the VarOpt_k weighted reservoir (Cohen et al., 2008).
//! - `simple`: uniform reservoir sampling (Algorithm R), whose output can be
//!   merged into a `Varopt` at its inverse-inclusion weight.
//! - `heap`: the min-weight heap backing the large-item pool.
//!
//! Every sampler owns an injected `rand::Rng`; nothing draws from a
//! thread-local or global generator. Samplers are single-writer; shard a
//! stream across independent instances and merge them instead of locking.

#![forbid(unsafe_code)]

pub mod heap;
pub mod simple;
pub mod varopt;

pub use heap::{SampleHeap, WeightedSample};
pub use simple::SimpleReservoir;
pub use varopt::{Varopt, VaroptError};
