//! p-value to plot magnitude transform

/// Magnitude used for manually significant records on the Manhattan view.
pub const MANHATTAN_SENTINEL: f64 = 15.0;
/// Magnitude used for manually significant records on the graphical-analysis view.
pub const ANALYSIS_SENTINEL: f64 = 30.0;

/// Converts reported p-values into `-log10(p)` magnitudes.
///
/// Records curated as significant without a computed p-value are pinned to
/// `manual_sentinel` so they sit above every computed result without
/// touching `log10(0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueTransform {
    pub manual_sentinel: f64,
}

impl Default for ValueTransform {
    fn default() -> Self {
        Self::manhattan()
    }
}

impl ValueTransform {
    pub fn new(manual_sentinel: f64) -> Self {
        Self { manual_sentinel }
    }

    pub fn manhattan() -> Self {
        Self::new(MANHATTAN_SENTINEL)
    }

    pub fn analysis() -> Self {
        Self::new(ANALYSIS_SENTINEL)
    }

    /// Always returns a finite value.
    pub fn apply(&self, p_value: Option<f64>, is_manually_significant: bool) -> f64 {
        let p = match p_value {
            Some(p) if p != 0.0 => p,
            _ if is_manually_significant => return self.manual_sentinel,
            _ => return 0.0,
        };
        if p.is_nan() || p < 0.0 {
            return 0.0;
        }
        let value = -p.log10();
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

/// `-log10(p)` with the Manhattan sentinel.
pub fn transform(p_value: Option<f64>, is_manually_significant: bool) -> f64 {
    ValueTransform::manhattan().apply(p_value, is_manually_significant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log_transform() {
        assert_relative_eq!(transform(Some(0.01), false), 2.0, epsilon = 1e-12);
        assert_relative_eq!(transform(Some(1.0), false), 0.0, epsilon = 1e-12);
        assert_relative_eq!(transform(Some(1e-8), true), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_p_value() {
        assert_eq!(transform(Some(0.0), true), MANHATTAN_SENTINEL);
        assert_eq!(transform(Some(0.0), false), 0.0);
        assert_eq!(ValueTransform::analysis().apply(Some(0.0), true), ANALYSIS_SENTINEL);
    }

    #[test]
    fn test_missing_p_value() {
        assert_eq!(transform(None, true), MANHATTAN_SENTINEL);
        assert_eq!(transform(None, false), 0.0);
    }

    #[test]
    fn test_finite_for_valid_range() {
        let mut p = 1.0_f64;
        while p > f64::MIN_POSITIVE {
            let value = transform(Some(p), false);
            assert!(value.is_finite());
            assert_relative_eq!(value, -p.log10(), epsilon = 1e-9);
            p /= 7.0;
        }
        assert!(transform(Some(f64::NAN), false).is_finite());
        assert!(transform(Some(-0.5), false).is_finite());
    }
}
