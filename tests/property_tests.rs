use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use varopt::{SampleHeap, SimpleReservoir, Varopt, VaroptError, WeightedSample};

proptest! {
    #[test]
    fn prop_varopt_size_invariant(
        k in 1usize..20,
        weights in prop::collection::vec(1e-3f64..1e3, 0..200),
        seed in any::<u64>(),
    ) {
        let mut s = Varopt::new(k, ChaCha8Rng::seed_from_u64(seed)).expect("k > 0");
        for (i, &w) in weights.iter().enumerate() {
            let evicted = s.add(i, w).expect("weight ok");
            prop_assert!(s.size() <= k);
            prop_assert_eq!(s.size(), (i + 1).min(k));
            prop_assert_eq!(evicted.is_some(), i >= k);
        }

        prop_assert_eq!(s.total_count(), weights.len());
        prop_assert!(s.tau().is_finite());
        prop_assert!(s.tau() >= 0.0);
    }

    #[test]
    fn prop_varopt_preserves_total_weight(
        k in 1usize..20,
        weights in prop::collection::vec(1e-2f64..1e2, 1..200),
        seed in any::<u64>(),
    ) {
        let mut s = Varopt::new(k, ChaCha8Rng::seed_from_u64(seed)).expect("k > 0");
        for (i, &w) in weights.iter().enumerate() {
            s.add(i, w).expect("weight ok");
        }
        let estimate: f64 = s.iter().map(|(_, w)| w).sum();
        let rel = (estimate - s.total_weight()).abs() / s.total_weight();
        prop_assert!(rel < 1e-9, "relative error {}", rel);
    }

    #[test]
    fn prop_varopt_rejection_is_noop(
        k in 1usize..10,
        n in 0usize..30,
        bad in prop_oneof![
            Just(0.0f64),
            Just(f64::NAN),
            Just(f64::INFINITY),
            -1e6f64..0.0,
        ],
    ) {
        let mut s = Varopt::new(k, ChaCha8Rng::seed_from_u64(1)).expect("k > 0");
        for i in 0..n {
            s.add(i, 1.0 + i as f64).expect("weight ok");
        }
        let (size, count, total, tau) = (s.size(), s.total_count(), s.total_weight(), s.tau());

        let err = s.add(usize::MAX, bad).expect_err("bad weight rejected");
        prop_assert!(matches!(err, VaroptError::InvalidWeight(_)));
        prop_assert_eq!(s.size(), size);
        prop_assert_eq!(s.total_count(), count);
        prop_assert_eq!(s.total_weight(), total);
        prop_assert_eq!(s.tau(), tau);
    }

    #[test]
    fn prop_varopt_deterministic_per_seed(
        k in 1usize..16,
        weights in prop::collection::vec(1e-2f64..1e2, 0..150),
        seed in any::<u64>(),
    ) {
        let mut a = Varopt::new(k, ChaCha8Rng::seed_from_u64(seed)).expect("k > 0");
        let mut b = Varopt::new(k, ChaCha8Rng::seed_from_u64(seed)).expect("k > 0");
        for (i, &w) in weights.iter().enumerate() {
            prop_assert_eq!(a.add(i, w).expect("ok"), b.add(i, w).expect("ok"));
        }
        prop_assert_eq!(a.tau(), b.tau());
        prop_assert_eq!(a.total_weight(), b.total_weight());

        let mut sa: Vec<(usize, f64)> = a.iter().map(|(&v, w)| (v, w)).collect();
        let mut sb: Vec<(usize, f64)> = b.iter().map(|(&v, w)| (v, w)).collect();
        sa.sort_by_key(|&(v, _)| v);
        sb.sort_by_key(|&(v, _)| v);
        prop_assert_eq!(sa, sb);
    }

    #[test]
    fn prop_varopt_copy_from_fidelity(
        k in 1usize..16,
        extra in 1usize..100,
        seed in any::<u64>(),
    ) {
        let mut src = Varopt::new(k, ChaCha8Rng::seed_from_u64(seed)).expect("k > 0");
        for i in 0..k + extra {
            src.add(i, 1.0 + (i % 13) as f64).expect("weight ok");
        }
        let mut dst = Varopt::new(k, ChaCha8Rng::seed_from_u64(!seed)).expect("k > 0");
        dst.copy_from(&src).expect("same capacity");

        prop_assert_eq!(dst.size(), src.size());
        for i in 0..src.size() {
            prop_assert_eq!(dst.get(i), src.get(i));
            prop_assert_eq!(dst.get_original_weight(i), src.get_original_weight(i));
        }
    }

    #[test]
    fn prop_simple_size_invariant(
        k in 0usize..20,
        items in prop::collection::vec(0u32..1000, 0..50),
        seed in any::<u64>(),
    ) {
        let mut s = SimpleReservoir::new(k, ChaCha8Rng::seed_from_u64(seed));
        for &item in &items {
            s.add(item);
        }

        let n = items.len();
        prop_assert_eq!(s.size(), n.min(k));
        prop_assert_eq!(s.count(), n);
        if s.size() > 0 {
            prop_assert_eq!(s.weight(), n as f64 / s.size() as f64);
        }
    }

    #[test]
    fn prop_heap_pops_sorted(weights in prop::collection::vec(-1e6f64..1e6, 0..200)) {
        let mut heap = SampleHeap::new();
        for (i, &w) in weights.iter().enumerate() {
            heap.push(WeightedSample::new(i, w));
        }
        let mut sorted = weights.clone();
        sorted.sort_by(f64::total_cmp);

        let popped: Vec<f64> = std::iter::from_fn(|| heap.pop().map(|s| s.weight)).collect();
        prop_assert_eq!(popped, sorted);
    }
}
