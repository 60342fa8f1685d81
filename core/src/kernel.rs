//! Black–Scholes European call pricing.
//!
//! Pure, stateless, thread-safe: every worker thread in the pricing service
//! calls into this module directly with no shared lock.

use statrs::distribution::{ContinuousCDF, Normal};

/// Standard normal CDF, `N(x) = 0.5 * erfc(-x / sqrt(2))`.
pub fn normal_cdf(x: f64) -> f64 {
    // unwrap is safe: mean=0, std_dev=1 are always valid Normal parameters.
    Normal::new(0.0, 1.0).unwrap().cdf(x)
}

/// Black–Scholes price of a European call.
///
/// `S` spot, `K` strike, `r` risk-free rate, `q` continuous dividend yield,
/// `sigma` volatility, `T` maturity in years.
///
/// Returns `0.0` for any non-positive `S`, `K`, `sigma`, or `T` instead of
/// failing — the domain guard is part of the contract, not an error path.
pub fn call(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    if s <= 0.0 || k <= 0.0 || sigma <= 0.0 || t <= 0.0 {
        return 0.0;
    }

    let sqrt_t = t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
    let d2 = d1 - sigma * sqrt_t;

    s * (-q * t).exp() * normal_cdf(d1) - k * (-r * t).exp() * normal_cdf(d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atm_call_matches_benchmark() {
        let price = call(100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        assert!((price - 10.45).abs() < 0.1, "price was {price}");
    }

    #[test]
    fn deep_itm_bounded_above_intrinsic() {
        let price = call(150.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        let intrinsic = 150.0 - 100.0 * (-0.05f64).exp();
        assert!(price > intrinsic);
        assert!(price - intrinsic < 5.0);
    }

    #[test]
    fn short_maturity_small_vol_is_small_but_positive() {
        let price = call(100.0, 100.0, 0.01, 0.0, 0.05, 1.0 / 252.0);
        assert!(price > 0.0);
        assert!(price < 2.0);
    }

    #[test]
    fn domain_guard_returns_zero() {
        assert_eq!(call(0.0, 100.0, 0.05, 0.0, 0.2, 1.0), 0.0);
        assert_eq!(call(100.0, 0.0, 0.05, 0.0, 0.2, 1.0), 0.0);
        assert_eq!(call(100.0, 100.0, 0.05, 0.0, 0.0, 1.0), 0.0);
        assert_eq!(call(100.0, 100.0, 0.05, 0.0, 0.2, 0.0), 0.0);
    }

    #[test]
    fn no_arbitrage_lower_bound_holds() {
        let cases = [
            (100.0, 100.0, 0.05, 0.0, 0.2, 1.0),
            (80.0, 100.0, 0.03, 0.01, 0.3, 0.5),
            (120.0, 90.0, 0.02, 0.0, 0.15, 2.0),
        ];
        for (s, k, r, q, sigma, t) in cases {
            let price = call(s, k, r, q, sigma, t);
            let lower = (s * (-q * t).exp() - k * (-r * t).exp()).max(0.0);
            assert!(price + 1e-9 >= lower, "price {price} below bound {lower}");
        }
    }
}
