// ============================================================
// Layer 5 — Learning-Rate Schedule
// ============================================================
//   lr(i) = base / (1 + decay * i)
//
// Recomputed from scratch every iteration and handed straight to
// `Optimizer::step`, so the rate never drifts from repeated
// multiplicative updates.

/// Inverse-time decay. Equals `base` at iteration 0.
pub fn learning_rate(base: f64, decay: f64, iteration: usize) -> f64 {
    base / (1.0 + decay * iteration as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_base() {
        assert_eq!(learning_rate(1e-4, 5e-5, 0), 1e-4);
    }

    #[test]
    fn test_strictly_decreasing_with_decay() {
        let rates: Vec<f64> = (0..1000).map(|i| learning_rate(1e-4, 1e-5, i * 100)).collect();
        assert!(rates.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_constant_without_decay() {
        assert!((0..100).all(|i| learning_rate(3e-4, 0.0, i) == 3e-4));
    }

    #[test]
    fn test_known_value() {
        // default flags at the last of 160k iterations
        let lr = learning_rate(1e-4, 1e-5, 159_999);
        assert!((lr - 1e-4 / 2.59999).abs() < 1e-12);
    }
}
