use rand::Rng;

use crate::types::Outcome;

/// Draw the outcome of one loan year: `Default` with weight `p`, `Fulfillment`
/// with weight `1 - p`.
///
/// Consumes exactly one uniform `f64` from `rng`, so a seeded generator
/// replays the same sequence of outcomes.
pub fn sample_outcome(probability_of_default: f64, rng: &mut impl Rng) -> Outcome {
    let u: f64 = rng.random();
    if u < probability_of_default {
        Outcome::Default
    } else {
        Outcome::Fulfillment
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn certain_outcomes() {
        let mut rng = rng();
        for _ in 0..1_000 {
            assert_eq!(sample_outcome(0.0, &mut rng), Outcome::Fulfillment);
            assert_eq!(sample_outcome(1.0, &mut rng), Outcome::Default);
        }
    }

    /// 20k draws at p = 0.3 must land within ±2 percentage points.
    #[test]
    fn default_frequency_tracks_probability() {
        let mut rng = rng();
        let n = 20_000;
        let defaults = (0..n).filter(|_| sample_outcome(0.3, &mut rng) == Outcome::Default).count();
        let freq = defaults as f64 / n as f64;
        assert!((0.28..=0.32).contains(&freq), "default frequency {freq:.4} outside [0.28, 0.32]");
    }

    #[test]
    fn same_seed_same_outcomes() {
        let draw = || {
            let mut rng = rng();
            (0..200).map(|_| sample_outcome(0.5, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(), draw());
    }
}
