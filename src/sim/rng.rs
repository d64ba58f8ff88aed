//! Seeded random source shared by both engines.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type SimRng = ChaCha8Rng;

pub fn seeded(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn from_entropy() -> SimRng {
    ChaCha8Rng::from_entropy()
}

/// Build from an optional configured seed, falling back to entropy.
pub fn from_config(seed: Option<u64>) -> SimRng {
    match seed {
        Some(seed) => seeded(seed),
        None => from_entropy(),
    }
}

/// Helper functions for common random operations
pub trait RngExt {
    fn roll(&mut self) -> f64;
    fn chance(&mut self, probability: f64) -> bool;
    fn jitter(&mut self, amplitude: f64) -> f64;
}

impl<R: Rng> RngExt for R {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn chance(&mut self, probability: f64) -> bool {
        if !(probability > 0.0) {
            return false;
        }
        self.gen::<f64>() < probability.min(1.0)
    }

    fn jitter(&mut self, amplitude: f64) -> f64 {
        if !(amplitude > 0.0) {
            return 0.0;
        }
        self.gen_range(-amplitude..=amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = seeded(7);
        let mut b = seeded(7);
        for _ in 0..10 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn chance_edges() {
        let mut rng = seeded(1);
        assert!(!rng.chance(0.0));
        assert!(!rng.chance(f64::NAN));
        assert!(rng.chance(1.0));
        assert!(rng.chance(5.0));
    }

    #[test]
    fn jitter_stays_in_band() {
        let mut rng = seeded(3);
        for _ in 0..100 {
            let j = rng.jitter(1.5);
            assert!((-1.5..=1.5).contains(&j));
        }
        assert_eq!(rng.jitter(0.0), 0.0);
    }
}
