//! Numeric sanitization applied at the data-access boundary.
//!
//! Upstream rows routinely carry missing, `NaN` or infinite numbers. Every
//! value that reaches arithmetic or a JSON response passes through one of
//! these helpers first.

/// Replace `None`, `NaN` and infinities with `default`.
pub fn sanitize(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

/// Same as [`sanitize`] with a default of zero.
pub fn or_zero(value: Option<f64>) -> f64 {
    sanitize(value, 0.0)
}

/// Keep a value only when it is finite. Used for nullable fields (greeks).
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Mid price: `(bid + ask) / 2` when both sides are quoted (nonzero),
/// otherwise the last traded price.
pub fn mid_price(bid: f64, ask: f64, last: f64) -> f64 {
    if bid != 0.0 && ask != 0.0 {
        (bid + ask) / 2.0
    } else {
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_defaults() {
        assert_eq!(sanitize(None, 7.0), 7.0);
        assert_eq!(sanitize(Some(f64::NAN), 0.0), 0.0);
        assert_eq!(sanitize(Some(f64::INFINITY), 0.0), 0.0);
        assert_eq!(sanitize(Some(f64::NEG_INFINITY), 1.5), 1.5);
        assert_eq!(sanitize(Some(-2.25), 0.0), -2.25);
        assert_eq!(or_zero(None), 0.0);
    }

    #[test]
    fn test_finite() {
        assert_eq!(finite(Some(0.42)), Some(0.42));
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(None), None);
    }

    #[test]
    fn test_mid_price_fallback() {
        assert_eq!(mid_price(1.0, 1.5, 9.0), 1.25);
        // One-sided market falls back to last
        assert_eq!(mid_price(0.0, 1.5, 1.1), 1.1);
        assert_eq!(mid_price(1.0, 0.0, 1.1), 1.1);
        assert_eq!(mid_price(0.0, 0.0, 0.0), 0.0);
    }
}
