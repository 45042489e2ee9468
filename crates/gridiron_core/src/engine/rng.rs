//! Seeded randomness shared by every resolver.
//!
//! All draws go through an injected `&mut impl Rng`. Games own a
//! [`PlayRng`] built from a seed, so the same seed and inputs replay the
//! same contest.

use std::hash::{Hash, Hasher};

use fxhash::FxHasher;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Exp, Normal};

/// Concrete generator used by games and batches.
pub type PlayRng = ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> PlayRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Stable child seed for stream `index` under `base`.
///
/// FxHasher is version-stable, unlike `DefaultHasher`.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut hasher = FxHasher::default();
    base.hash(&mut hasher);
    index.hash(&mut hasher);
    hasher.finish()
}

/// Bernoulli draw with `p` clamped to [0, 1].
pub fn chance(rng: &mut impl Rng, p: f32) -> bool {
    let p = p.clamp(0.0, 1.0) as f64;
    if p <= 0.0 {
        return false;
    }
    rng.gen_bool(p)
}

/// Normal sample. A non-positive or non-finite spread returns the mean.
pub fn sample_normal(rng: &mut impl Rng, mean: f32, std_dev: f32) -> f32 {
    match Normal::new(mean, std_dev) {
        Ok(dist) if std_dev > 0.0 => dist.sample(rng),
        _ => mean,
    }
}

/// Exponential sample with the given mean. Non-positive means return 0.
pub fn sample_exp(rng: &mut impl Rng, mean: f32) -> f32 {
    if mean <= 0.0 {
        return 0.0;
    }
    match Exp::new(1.0 / mean) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.0,
    }
}

/// Index picked proportionally to `weights`. `None` when nothing has weight.
pub fn weighted_pick(rng: &mut impl Rng, weights: &[f32]) -> Option<usize> {
    if weights.iter().all(|w| *w <= 0.0 || !w.is_finite()) {
        return None;
    }
    let cleaned: Vec<f32> = weights
        .iter()
        .map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 })
        .collect();
    WeightedIndex::new(&cleaned).ok().map(|dist| dist.sample(rng))
}
