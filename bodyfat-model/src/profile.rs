use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("age must be between 1 and 120, got {0}")]
    AgeOutOfRange(u32),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("body fat percentage must be between 0 and 100, got {0}")]
    PercentOutOfRange(f64),
}

/// Anthropometric input for a single estimation request. Heights and waist
/// circumferences are in centimeters, weight in kilograms. Constructed only
/// through [`AnthropometricProfile::new`], which enforces the value ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct AnthropometricProfile {
    gender: Gender,
    age: u32,
    height: f64,
    weight: f64,
    waist: Option<f64>,
}

impl AnthropometricProfile {
    pub fn new(
        gender: Gender,
        age: u32,
        height: f64,
        weight: f64,
        waist: Option<f64>,
    ) -> Result<Self, ValidationError> {
        if !(1..=120).contains(&age) {
            return Err(ValidationError::AgeOutOfRange(age));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(ValidationError::NotPositive("height"));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ValidationError::NotPositive("weight"));
        }
        if let Some(waist) = waist {
            if !waist.is_finite() || waist <= 0.0 {
                return Err(ValidationError::NotPositive("waist"));
            }
        }

        Ok(Self {
            gender,
            age,
            height,
            weight,
            waist,
        })
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn is_female(&self) -> bool {
        self.gender == Gender::Female
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn height_cm(&self) -> f64 {
        self.height
    }

    pub fn height_m(&self) -> f64 {
        self.height / 100.0
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight
    }

    pub fn waist_cm(&self) -> Option<f64> {
        self.waist
    }

    pub fn body_mass_index(&self) -> f64 {
        self.weight / self.height_m().powf(2.0)
    }
}
