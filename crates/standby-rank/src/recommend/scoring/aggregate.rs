/// Probability after clamping into `[0, 1]`, remembering whether the input was off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedProbability {
    pub value: f64,
    pub out_of_range: bool,
}

/// NaN is treated as out of range and becomes 0.
pub fn clamp_probability(raw: f64) -> ClampedProbability {
    if raw.is_nan() {
        return ClampedProbability {
            value: 0.0,
            out_of_range: true,
        };
    }

    let value = raw.clamp(0.0, 1.0);
    ClampedProbability {
        value,
        out_of_range: value != raw,
    }
}

/// Chance that at least one of the given return attempts clears: `1 - Π(1 - p_i)`.
///
/// Attempts are assumed independent. That is a modeling assumption: loads on
/// consecutive flights of the same route are correlated in practice, so the result
/// is optimistic when many near-identical flights are eligible.
///
/// An empty input yields 0. Each input is clamped to `[0, 1]` first. The product is
/// accumulated directly; with the handful of flights in a return window there is no
/// underflow to guard against.
pub fn aggregate_return_success_probability<I>(probabilities: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let miss_all = probabilities
        .into_iter()
        .map(|p| 1.0 - clamp_probability(p).value)
        .product::<f64>();

    1.0 - miss_all
}
