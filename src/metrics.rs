use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("unknown activity level: {0}")]
    UnknownActivityLevel(String),
}

/// Biological sex used by the Mifflin-St Jeor equation.
/// Only these two variants are supported by the formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    MaintainWeight,
    GainMuscle,
}

impl Goal {
    /// Human wording used inside prompts.
    pub fn as_text(self) -> &'static str {
        match self {
            Goal::LoseWeight => "lose weight",
            Goal::MaintainWeight => "maintain weight",
            Goal::GainMuscle => "gain muscle",
        }
    }
}

/// The five fixed activity tiers and their TDEE multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    SuperActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::SuperActive,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::SuperActive => 1.9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
            ActivityLevel::LightlyActive => {
                "Lightly Active (light exercise/sports 1-3 days/week)"
            }
            ActivityLevel::ModeratelyActive => {
                "Moderately Active (moderate exercise/sports 3-5 days/week)"
            }
            ActivityLevel::VeryActive => "Very Active (hard exercise/sports 6-7 days/week)",
            ActivityLevel::SuperActive => {
                "Super Active (very hard exercise/sports & physical job)"
            }
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = MetricsError;

    /// Accepts either the wire name (`lightly_active`) or the full human label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "lightly_active" => Ok(ActivityLevel::LightlyActive),
            "moderately_active" => Ok(ActivityLevel::ModeratelyActive),
            "very_active" => Ok(ActivityLevel::VeryActive),
            "super_active" => Ok(ActivityLevel::SuperActive),
            other => ActivityLevel::ALL
                .into_iter()
                .find(|l| l.label() == other)
                .ok_or_else(|| MetricsError::UnknownActivityLevel(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ActivityLevel {
    /// Signup payloads may carry either form, so route through [`FromStr`].
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Basal metabolic rate, Mifflin-St Jeor form.
pub fn bmr(gender: Gender, weight_kg: f64, height_cm: f64, age: i32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Total daily energy expenditure.
pub fn tdee(bmr: f64, level: ActivityLevel) -> f64 {
    bmr * level.multiplier()
}

/// Body mass index. Height must be positive; enforced at signup.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}
