use strum::{Display, EnumString};

use crate::profile::Gender;

/// Ordinal classification of a body fat percentage against gender-specific
/// bands. Display strings match what the mobile client expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Evaluation {
    #[strum(serialize = "Very Low")]
    #[cfg_attr(feature = "serde", serde(rename = "Very Low"))]
    VeryLow,
    #[strum(serialize = "Low (Athletic)")]
    #[cfg_attr(feature = "serde", serde(rename = "Low (Athletic)"))]
    Low,
    Normal,
    #[strum(serialize = "Above Average")]
    #[cfg_attr(feature = "serde", serde(rename = "Above Average"))]
    AboveAverage,
    High,
}

impl Evaluation {
    /// Classifies a body fat percentage. Total over all finite inputs.
    pub fn from_percent(percent: f64, gender: Gender) -> Self {
        match gender {
            Gender::Male => {
                if percent < 10.0 {
                    Evaluation::VeryLow
                } else if percent < 15.0 {
                    Evaluation::Low
                } else if percent < 20.0 {
                    Evaluation::Normal
                } else if percent < 25.0 {
                    Evaluation::AboveAverage
                } else {
                    Evaluation::High
                }
            }
            Gender::Female => {
                if percent < 16.0 {
                    Evaluation::VeryLow
                } else if percent < 20.0 {
                    Evaluation::Low
                } else if percent < 25.0 {
                    Evaluation::Normal
                } else if percent < 32.0 {
                    Evaluation::AboveAverage
                } else {
                    Evaluation::High
                }
            }
        }
    }
}

/// Result of one estimation request. The evaluation is kept as a plain
/// string: the image-assisted path passes the model's own label through
/// verbatim, so it may not agree with the numeric percentage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BodyFatEstimate {
    pub body_fat_percent: f64,
    pub comment: String,
    pub evaluation: String,
}
