use crate::labeling::DEFAULT_SAMPLE_FRACTION;

pub(super) const DEFAULT_MIN_PASSES: u32 = 1;
pub(super) const DEFAULT_MAX_PASSES: u32 = 5;

pub(super) fn default_sample_fraction() -> f64 {
    DEFAULT_SAMPLE_FRACTION
}

pub(super) fn default_min_passes() -> u32 {
    DEFAULT_MIN_PASSES
}

pub(super) fn default_max_passes() -> u32 {
    DEFAULT_MAX_PASSES
}

/// Keep the fraction inside `(0, 1]`; unusable values fall back to the default.
pub(super) fn clamp_sample_fraction(fraction: f64) -> f64 {
    if !fraction.is_finite() || fraction <= 0.0 {
        DEFAULT_SAMPLE_FRACTION
    } else {
        fraction.min(1.0)
    }
}
