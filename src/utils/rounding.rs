//! Presentation rounding
//!
//! Aggregates are computed on unrounded values and rounded exactly once, when
//! the reported number is produced. Rounding is half-up on the binary value:
//! `value * 10^decimals` is rounded away from zero, so a decimal literal that
//! is stored slightly below its half-way point (`1.005`) rounds down.

/// Round to `decimals` places, half-up on the binary `f64` value.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Two decimals: points, grade averages.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// One decimal: percentages.
pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

pub fn round2_opt(value: Option<f64>) -> Option<f64> {
    value.map(round2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_half_up() {
        assert_relative_eq!(round1(12.25), 12.3, epsilon = 1e-9);
        assert_relative_eq!(round1(0.05), 0.1, epsilon = 1e-9);
        assert_relative_eq!(round2(54.125), 54.13, epsilon = 1e-9);
        assert_relative_eq!(round2(3.14159), 3.14, epsilon = 1e-9);
    }

    #[test]
    fn test_half_up_is_on_the_binary_value() {
        // 1.005 is stored as 1.00499999..., so it is not a half-way case
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(1.015625), 1.02);
    }

    #[test]
    fn test_optional() {
        assert_eq!(round2_opt(None), None);
        assert_eq!(round2_opt(Some(4.566)), Some(4.57));
    }
}
