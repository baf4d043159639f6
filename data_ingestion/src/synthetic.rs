use rand::Rng;
use rand_distr::StandardNormal;

pub const SYNTHETIC_BASE_PRICE: f64 = 10_000.0;
pub const TRAINING_FALLBACK_LEN: usize = 1000;
pub const PREDICTION_FALLBACK_LEN: usize = 300;

/// Gaussian random walk: `base + cumsum(N(0, 1))`.
pub fn random_walk<R: Rng + ?Sized>(len: usize, base: f64, rng: &mut R) -> Vec<f64> {
    let mut level = 0.0;
    (0..len)
        .map(|_| {
            let step: f64 = rng.sample(StandardNormal);
            level += step;
            base + level
        })
        .collect()
}
