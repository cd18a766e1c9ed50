use crate::estimate::Evaluation;
use crate::profile::{Gender, ValidationError};

/// One milestone of the staged reduction plan. `months` is cumulative from
/// the start of the plan, not per step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimelineStep {
    pub percent: f64,
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Goal {
    Gain,
    Lose,
    Maintain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalorieTarget {
    pub min: u32,
    pub max: u32,
    pub goal: Goal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacroNutrient {
    pub percent: u32,
    pub grams: u32,
}

/// Daily calorie range and macronutrient targets attached to nutrition
/// sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacroBreakdown {
    pub calories: CalorieTarget,
    pub protein: MacroNutrient,
    pub carbs: MacroNutrient,
    pub fats: MacroNutrient,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdviceSection {
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub macros: Option<MacroBreakdown>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AdviceBundle {
    pub title: String,
    pub sections: Vec<AdviceSection>,
    pub time_estimate: Vec<TimelineStep>,
}

/// Input to advice generation: the estimate carried back from a previous
/// body fat calculation. Constructed only through [`AdviceRequest::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRequest {
    body_fat_percent: f64,
    gender: Gender,
    age: u32,
    evaluation: Evaluation,
}

impl AdviceRequest {
    pub fn new(
        body_fat_percent: f64,
        gender: Gender,
        age: u32,
        evaluation: Evaluation,
    ) -> Result<Self, ValidationError> {
        if !body_fat_percent.is_finite() || !(0.0..=100.0).contains(&body_fat_percent) {
            return Err(ValidationError::PercentOutOfRange(body_fat_percent));
        }
        if !(1..=120).contains(&age) {
            return Err(ValidationError::AgeOutOfRange(age));
        }

        Ok(Self {
            body_fat_percent,
            gender,
            age,
            evaluation,
        })
    }

    pub fn body_fat_percent(&self) -> f64 {
        self.body_fat_percent
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn evaluation(&self) -> Evaluation {
        self.evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_requests_are_rejected() {
        assert_eq!(
            AdviceRequest::new(-0.1, Gender::Male, 30, Evaluation::Normal),
            Err(ValidationError::PercentOutOfRange(-0.1))
        );
        assert_eq!(
            AdviceRequest::new(100.1, Gender::Male, 30, Evaluation::High),
            Err(ValidationError::PercentOutOfRange(100.1))
        );
        assert_eq!(
            AdviceRequest::new(28.0, Gender::Male, 0, Evaluation::High),
            Err(ValidationError::AgeOutOfRange(0))
        );
    }

    #[test]
    fn valid_request_is_constructed() {
        let request = AdviceRequest::new(28.0, Gender::Male, 35, Evaluation::High).unwrap();
        assert_eq!(request.body_fat_percent(), 28.0);
        assert_eq!(request.evaluation(), Evaluation::High);
    }
}
