pub mod advice;
pub mod baseline;
pub mod config;
pub mod estimation;
pub mod normalize;
pub mod timeline;
pub mod vision;

/// All user-facing percentages carry one decimal of precision.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
