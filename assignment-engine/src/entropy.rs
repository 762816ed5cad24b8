use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Source of randomness for shuffling the unassigned-partition pool.
///
/// The shuffle exists only to avoid hotspotting a single task across
/// successive rebalances when partition sets grow in a predictable order;
/// it carries no correctness requirement of its own. Injecting it as a
/// trait, rather than calling `rand::thread_rng()` directly, is what makes
/// the rebalancer's randomization reproducible in tests.
pub trait EntropySource {
    fn shuffle(&self, items: &mut [String]);
}

/// Production entropy source: a fresh thread-local RNG per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngEntropy;

impl EntropySource for ThreadRngEntropy {
    fn shuffle(&self, items: &mut [String]) {
        items.shuffle(&mut rand::thread_rng());
    }
}

/// Deterministic entropy source for tests: a seeded RNG that produces the
/// same shuffle for the same seed, so assertions on which task absorbs
/// which unassigned partition are stable across test runs.
#[derive(Debug, Clone, Copy)]
pub struct SeededEntropy {
    seed: u64,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl EntropySource for SeededEntropy {
    fn shuffle(&self, items: &mut [String]) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        items.shuffle(&mut rng);
    }
}

/// No-op entropy source for tests asserting on exact pre-shuffle ordering.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEntropy;

impl EntropySource for NoopEntropy {
    fn shuffle(&self, _items: &mut [String]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_entropy_is_reproducible() {
        let mut a = vec!["p1".to_string(), "p2".to_string(), "p3".to_string(), "p4".to_string()];
        let mut b = a.clone();
        SeededEntropy::new(7).shuffle(&mut a);
        SeededEntropy::new(7).shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn noop_entropy_preserves_order() {
        let mut items = vec!["p1".to_string(), "p2".to_string(), "p3".to_string()];
        let before = items.clone();
        NoopEntropy.shuffle(&mut items);
        assert_eq!(items, before);
    }
}
