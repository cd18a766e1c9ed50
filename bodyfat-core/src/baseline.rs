use bodyfat_model::estimate::{BodyFatEstimate, Evaluation};
use bodyfat_model::profile::{AnthropometricProfile, Gender};

use crate::round1;

/// Deurenberg regression without the waist correction. Also quoted verbatim
/// as the reference anchor in image-assisted prompts.
pub fn deurenberg(bmi: f64, age: u32, gender: Gender) -> f64 {
    let intercept = match gender {
        Gender::Male => 16.2,
        Gender::Female => 5.4,
    };
    1.20 * bmi + 0.23 * age as f64 - intercept
}

/// Closed-form fallback estimate: Deurenberg plus a waist-to-height
/// correction when a waist measurement is available, clamped to [5, 50].
/// Waist and height are both in centimeters, so the ratio is unitless.
pub fn estimate(profile: &AnthropometricProfile) -> BodyFatEstimate {
    let mut body_fat = deurenberg(profile.body_mass_index(), profile.age(), profile.gender());

    if let Some(waist) = profile.waist_cm() {
        let factor = if profile.is_female() { 8.0 } else { 10.0 };
        body_fat += waist / profile.height_cm() * factor;
    }

    let body_fat = body_fat.clamp(5.0, 50.0);
    let evaluation = Evaluation::from_percent(body_fat, profile.gender());

    BodyFatEstimate {
        body_fat_percent: round1(body_fat),
        comment: comment_for(body_fat),
        evaluation: evaluation.to_string(),
    }
}

fn comment_for(body_fat: f64) -> String {
    let detail = if body_fat < 10.0 {
        "Very low body fat percentage, typical for athletes."
    } else if body_fat < 20.0 {
        "Low body fat percentage, good physical condition."
    } else if body_fat < 25.0 {
        "Normal body fat percentage for a healthy person."
    } else {
        "Elevated body fat percentage, consultation with a specialist is recommended."
    };
    format!(
        "Estimated body fat percentage calculated based on your parameters. {}",
        detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(gender: Gender, age: u32, height: f64, weight: f64, waist: Option<f64>) -> AnthropometricProfile {
        AnthropometricProfile::new(gender, age, height, weight, waist).unwrap()
    }

    #[test]
    fn male_estimate_without_waist() {
        let estimate = estimate(&profile(Gender::Male, 30, 180.0, 80.0, None));

        // 1.20 * 24.69 + 0.23 * 30 - 16.2
        assert_eq!(estimate.body_fat_percent, 20.3);
        assert_eq!(estimate.evaluation, "Above Average");
        assert!(estimate.comment.contains("Normal body fat percentage"));
    }

    #[test]
    fn waist_correction_raises_male_estimate() {
        let estimate = estimate(&profile(Gender::Male, 30, 180.0, 80.0, Some(90.0)));

        // Base 20.3 plus (90 / 180) * 10
        assert_eq!(estimate.body_fat_percent, 25.3);
        assert_eq!(estimate.evaluation, "High");
    }

    #[test]
    fn female_estimate_without_waist() {
        let estimate = estimate(&profile(Gender::Female, 25, 165.0, 55.0, None));

        assert_eq!(estimate.body_fat_percent, 24.6);
        assert_eq!(estimate.evaluation, "Normal");
    }

    #[test]
    fn extreme_inputs_are_clamped() {
        let low = estimate(&profile(Gender::Male, 1, 250.0, 20.0, None));
        assert_eq!(low.body_fat_percent, 5.0);
        assert_eq!(low.evaluation, "Very Low");

        let high = estimate(&profile(Gender::Female, 120, 140.0, 200.0, Some(200.0)));
        assert_eq!(high.body_fat_percent, 50.0);
        assert_eq!(high.evaluation, "High");
    }
}
