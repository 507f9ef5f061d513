//! Growth step generator - pure math, no side effects.
//!
//! Numeric semantics follow IEEE-754 double precision. For large bases
//! and step indices near 100 the exponential value may overflow to
//! `f64::INFINITY`; that is a valid, non-error result.

use time::OffsetDateTime;

use super::model::GrowthStep;

/// Compute the linear and exponential value for one step index.
///
/// `linear_value = base * step`, `exponential_value = base^step`.
/// Recomputing for the same `(base, step)` yields bit-identical values.
#[must_use]
pub fn step(base: f64, step: i32) -> GrowthStep {
    let linear_value = base * f64::from(step);
    let exponential_value = base.powi(step);

    GrowthStep {
        step,
        linear_op: format!("{base} × {step}"),
        linear_value,
        exponential_op: format!("{base}^{step}"),
        exponential_value,
        at: OffsetDateTime::now_utc(),
    }
}

/// Final totals for a run: `(base * exponent, base^exponent)`.
///
/// Uses the same operations as [`step`], so the totals are bit-identical
/// to the values of step `exponent`.
#[must_use]
pub fn final_totals(base: f64, exponent: i32) -> (f64, f64) {
    (base * f64::from(exponent), base.powi(exponent))
}
