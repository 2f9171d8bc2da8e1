//! Body metrics helpers for the user profile.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ValidationError::InvalidValue {
                field: "gender".into(),
                message: format!("unknown gender '{s}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtremelyActive => 1.9,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "lightlyactive" | "light" => Ok(ActivityLevel::LightlyActive),
            "moderatelyactive" | "moderate" => Ok(ActivityLevel::ModeratelyActive),
            "veryactive" | "very" => Ok(ActivityLevel::VeryActive),
            "extremelyactive" | "extreme" => Ok(ActivityLevel::ExtremelyActive),
            _ => Err(ValidationError::InvalidValue {
                field: "activity".into(),
                message: format!("unknown activity level '{s}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Body measurements used by the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

fn require_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("must be a positive number, got {value}"),
        })
    }
}

/// Body mass index: weight / (height in metres)^2.
///
/// # Errors
/// Rejects non-positive weight or height.
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Result<f64, ValidationError> {
    require_positive("weight", weight_kg)?;
    require_positive("height", height_cm)?;
    let metres = height_cm / 100.0;
    Ok(weight_kg / (metres * metres))
}

/// Daily calorie estimate: Mifflin-St Jeor BMR times the activity multiplier,
/// rounded to whole calories.
///
/// # Errors
/// Rejects non-positive weight or height.
pub fn daily_calorie_needs(profile: &BodyProfile) -> Result<u32, ValidationError> {
    require_positive("weight", profile.weight_kg)?;
    require_positive("height", profile.height_cm)?;

    let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * f64::from(profile.age);
    let bmr = match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Female | Gender::Other => base - 161.0,
    };
    let total = (bmr * profile.activity_level.multiplier()).round();
    Ok(total.max(0.0) as u32)
}
