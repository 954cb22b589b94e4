//! Probability that the outcome path touched the futility line between two
//! observed points.

/// Brownian-bridge crossing probability for a linear barrier.
///
/// `height_before` and `height_after` are the distances of the path above
/// the barrier at the two observed points, `samples` the per-arm samples
/// between them and `variance` the variance rate of the path. The barrier
/// has the same slope as the bridge's drift, so only the heights matter:
///
/// ```text
/// P = exp(-2·h0·h1 / (Δn·v))
/// ```
///
/// A point on or below the barrier has crossed with certainty. With no
/// samples in between the path cannot have dipped.
pub fn bridge_crossing_probability(
    height_before: f64,
    height_after: f64,
    samples: f64,
    variance: f64,
) -> f64 {
    if height_before <= 0.0 || height_after <= 0.0 {
        return 1.0;
    }
    if samples <= 0.0 {
        return 0.0;
    }
    libm::exp(-2.0 * height_before * height_after / (samples * variance)).min(1.0)
}
