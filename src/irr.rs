//! Internal rate of return for period-uniform cash flows.
//!
//! Newton-Raphson from a 10% guess, falling back to bisection when the
//! derivative vanishes or the iteration budget runs out. `None` means no
//! root was found: callers record it as an undefined result rather than
//! treating it as zero.

const INITIAL_GUESS: f64 = 0.1;
const MAX_ITERATIONS: u32 = 200;
const RATE_TOLERANCE: f64 = 1e-12;
/// Accepted |NPV| relative to the sum of absolute cash flows.
const RESIDUAL_TOLERANCE: f64 = 1e-9;
const MIN_RATE: f64 = -0.999;
const MAX_RATE: f64 = 100.0;

/// Net present value of `cash_flows` at `rate`, with entry `t` discounted by `(1 + rate)^t`.
pub fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    let one_plus_r = 1.0 + rate;
    let mut discount = 1.0;
    let mut total = 0.0;
    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        total += cf / discount;
    }
    total
}

fn npv_and_derivative(rate: f64, cash_flows: &[f64]) -> (f64, f64) {
    let one_plus_r = 1.0 + rate;
    let mut discount = 1.0;
    let mut value = 0.0;
    let mut slope = 0.0;
    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
            slope -= t as f64 * cf / (discount * one_plus_r);
        }
        value += cf / discount;
    }
    (value, slope)
}

/// Rate `r` with `npv(r, cash_flows) == 0`, or `None` if none is found.
///
/// Flows without both a positive and a negative entry have no IRR.
pub fn irr(cash_flows: &[f64]) -> Option<f64> {
    if cash_flows.len() < 2 || cash_flows.iter().any(|cf| !cf.is_finite()) {
        return None;
    }
    let has_inflow = cash_flows.iter().any(|&cf| cf > 0.0);
    let has_outflow = cash_flows.iter().any(|&cf| cf < 0.0);
    if !has_inflow || !has_outflow {
        return None;
    }

    let scale: f64 = cash_flows.iter().map(|cf| cf.abs()).sum();
    newton(cash_flows, scale).or_else(|| bisection(cash_flows, scale))
}

fn newton(cash_flows: &[f64], scale: f64) -> Option<f64> {
    let mut rate = INITIAL_GUESS;
    for _ in 0..MAX_ITERATIONS {
        let (value, slope) = npv_and_derivative(rate, cash_flows);
        if slope == 0.0 || !slope.is_finite() || !value.is_finite() {
            return None;
        }
        let next = (rate - value / slope).clamp(MIN_RATE, MAX_RATE);
        if (next - rate).abs() < RATE_TOLERANCE {
            return (npv(next, cash_flows).abs() <= RESIDUAL_TOLERANCE * scale).then_some(next);
        }
        rate = next;
    }
    None
}

fn bisection(cash_flows: &[f64], scale: f64) -> Option<f64> {
    let mut low = MIN_RATE;
    let mut high = MAX_RATE;
    let mut npv_low = npv(low, cash_flows);
    let npv_high = npv(high, cash_flows);
    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = 0.5 * (low + high);
        let npv_mid = npv(mid, cash_flows);
        if npv_mid.abs() <= RESIDUAL_TOLERANCE * scale && high - low < RATE_TOLERANCE.sqrt() {
            return Some(mid);
        }
        if high - low < RATE_TOLERANCE {
            return (npv_mid.abs() <= RESIDUAL_TOLERANCE * scale).then_some(mid);
        }
        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_period_loan_returns_coupon_rate() {
        let r = irr(&[-1_000_000.0, 1_300_000.0]).expect("root exists");
        assert!((r - 0.3).abs() < 1e-10, "got {r}");
    }

    #[test]
    fn interest_only_bullet_returns_coupon_rate() {
        let flows = [-1_000.0, 50.0, 50.0, 50.0, 1_050.0];
        let r = irr(&flows).expect("root exists");
        assert!((r - 0.05).abs() < 1e-10, "got {r}");
    }

    #[test]
    fn immediate_default_matches_cube_root() {
        let recovery = 0.4;
        let flows = [-1.0, 0.0, 0.0, recovery];
        let r = irr(&flows).expect("root exists");
        let expected = recovery.powf(1.0 / 3.0) - 1.0;
        assert!((r - expected).abs() < 1e-10, "got {r}, expected {expected}");
    }

    #[test]
    fn root_zeroes_npv() {
        let flows = [-1_000_000.0, 300_000.0, 300_000.0, 0.0, 0.0, 400_000.0];
        let r = irr(&flows).expect("root exists");
        assert!(npv(r, &flows).abs() < 1e-3, "npv at root {}", npv(r, &flows));
    }

    #[test]
    fn no_sign_change_is_undefined() {
        assert_eq!(irr(&[-1_000.0, 0.0, 0.0, 0.0]), None);
        assert_eq!(irr(&[1_000.0, 10.0]), None);
        assert_eq!(irr(&[-1_000.0]), None);
        assert_eq!(irr(&[]), None);
    }

    #[test]
    fn non_finite_flow_is_undefined() {
        assert_eq!(irr(&[-1_000.0, f64::NAN]), None);
    }

    #[test]
    fn npv_at_zero_is_plain_sum() {
        assert_eq!(npv(0.0, &[-10.0, 4.0, 7.0]), 1.0);
    }

    #[test]
    fn bisection_agrees_with_newton() {
        let flows = [-1_000.0, 100.0, 100.0, 1_100.0];
        let scale: f64 = flows.iter().map(|cf: &f64| cf.abs()).sum();
        let a = newton(&flows, scale).expect("newton converges");
        let b = bisection(&flows, scale).expect("bisection converges");
        assert!((a - b).abs() < 1e-6, "newton {a} bisection {b}");
    }
}
