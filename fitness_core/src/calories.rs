//! Daily calorie estimation.
//!
//! Basal metabolic rate follows the Mifflin-St Jeor equation:
//! - Male:   10 * weight + 6.25 * height - 5 * age + 5
//! - Female: 10 * weight + 6.25 * height - 5 * age - 161
//!
//! The BMR is then scaled by one of seven fixed activity multipliers.

use crate::{Error, Gender, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named activity levels offered by the calculator
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Bmr,
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    /// All levels in display order
    pub const ALL: [ActivityLevel; 7] = [
        ActivityLevel::Bmr,
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Bmr => 1.0,
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
            ActivityLevel::ExtraActive => 2.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Bmr => "BMR",
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Light",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::Active => "Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtraActive => "Extra Active",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Bmr => "Basal Metabolic Rate",
            ActivityLevel::Sedentary => "little or no exercise",
            ActivityLevel::Light => "exercise 1-3 times/week",
            ActivityLevel::Moderate => "exercise 4-5 times/week",
            ActivityLevel::Active => "daily exercise or intense exercise 3-4 times/week",
            ActivityLevel::VeryActive => "intense exercise 6-7 times/week",
            ActivityLevel::ExtraActive => "very intense exercise daily, or physical job",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    /// Accepts labels ("Very Active") as well as snake/kebab names ("very-active")
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        ActivityLevel::ALL
            .iter()
            .copied()
            .find(|level| {
                let label: String = level
                    .label()
                    .to_lowercase()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect();
                label == normalized
            })
            .ok_or_else(|| Error::InvalidInput(format!("unknown activity level: {}", s)))
    }
}

/// Inputs to the calorie calculation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalorieQuery {
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    pub activity_multiplier: f64,
}

impl CalorieQuery {
    pub fn new(age: u32, height_cm: f64, weight_kg: f64, gender: Gender, level: ActivityLevel) -> Self {
        Self {
            age,
            height_cm,
            weight_kg,
            gender,
            activity_multiplier: level.multiplier(),
        }
    }

    /// Build a query from raw form fields
    ///
    /// Blank or non-numeric fields are rejected instead of being read as zero.
    pub fn from_fields(
        age: &str,
        height_cm: &str,
        weight_kg: &str,
        gender: Gender,
        level: ActivityLevel,
    ) -> Result<Self> {
        let age = parse_field::<u32>("age", age)?;
        let height_cm = parse_field::<f64>("height", height_cm)?;
        let weight_kg = parse_field::<f64>("weight", weight_kg)?;
        Ok(Self::new(age, height_cm, weight_kg, gender, level))
    }

    /// The named level matching this query's multiplier, if any
    pub fn activity_level(&self) -> Option<ActivityLevel> {
        ActivityLevel::ALL
            .iter()
            .copied()
            .find(|level| level.multiplier() == self.activity_multiplier)
    }

    fn validate(&self) -> Result<()> {
        if self.age == 0 {
            return Err(Error::InvalidInput("age must be positive".into()));
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(Error::InvalidInput(format!(
                "height must be positive, got {}",
                self.height_cm
            )));
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(Error::InvalidInput(format!(
                "weight must be positive, got {}",
                self.weight_kg
            )));
        }
        if !(self.activity_multiplier.is_finite() && self.activity_multiplier >= 1.0) {
            return Err(Error::InvalidInput(format!(
                "activity multiplier must be at least 1.0, got {}",
                self.activity_multiplier
            )));
        }
        Ok(())
    }
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", name)));
    }
    trimmed
        .parse::<T>()
        .map_err(|_| Error::InvalidInput(format!("{} must be a number, got '{}'", name, raw)))
}

/// Result of a calorie calculation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalorieEstimate {
    pub bmr: f64,
    pub activity_multiplier: f64,
    pub daily_calories: f64,
}

/// Mifflin-St Jeor basal metabolic rate
pub fn basal_metabolic_rate(query: &CalorieQuery) -> Result<f64> {
    query.validate()?;

    let base = 10.0 * query.weight_kg + 6.25 * query.height_cm - 5.0 * query.age as f64;
    let bmr = match query.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    };

    if bmr <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "inputs produce a non-positive BMR ({:.2})",
            bmr
        )));
    }
    Ok(bmr)
}

/// Estimate daily calorie needs: BMR scaled by the activity multiplier
pub fn estimate_daily_calories(query: &CalorieQuery) -> Result<CalorieEstimate> {
    let bmr = basal_metabolic_rate(query)?;
    let daily_calories = bmr * query.activity_multiplier;

    tracing::debug!(
        "Calorie estimate: bmr={:.2} x {} = {:.2}",
        bmr,
        query.activity_multiplier,
        daily_calories
    );

    Ok(CalorieEstimate {
        bmr,
        activity_multiplier: query.activity_multiplier,
        daily_calories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(gender: Gender) -> CalorieQuery {
        CalorieQuery::new(25, 170.0, 65.0, gender, ActivityLevel::Active)
    }

    #[test]
    fn test_female_active_example() {
        let estimate = estimate_daily_calories(&query(Gender::Female)).unwrap();
        assert_eq!(estimate.bmr, 1426.5);
        assert!((estimate.daily_calories - 2461.7125).abs() < 1e-9);
    }

    #[test]
    fn test_male_active_example() {
        let estimate = estimate_daily_calories(&query(Gender::Male)).unwrap();
        assert_eq!(estimate.bmr, 1592.5);
        assert!((estimate.daily_calories - 2746.06875).abs() < 1e-9);
    }

    #[test]
    fn test_daily_is_bmr_times_multiplier_for_every_level() {
        for gender in [Gender::Male, Gender::Female] {
            for level in ActivityLevel::ALL {
                let q = CalorieQuery::new(40, 182.5, 81.3, gender, level);
                let estimate = estimate_daily_calories(&q).unwrap();
                assert_eq!(estimate.daily_calories, estimate.bmr * level.multiplier());
                assert_eq!(estimate.activity_multiplier, level.multiplier());
            }
        }
    }

    #[test]
    fn test_bmr_level_is_identity() {
        let q = CalorieQuery::new(25, 170.0, 65.0, Gender::Male, ActivityLevel::Bmr);
        let estimate = estimate_daily_calories(&q).unwrap();
        assert_eq!(estimate.daily_calories, estimate.bmr);
    }

    #[test]
    fn test_rejects_zero_fields() {
        let mut q = query(Gender::Female);
        q.age = 0;
        assert!(matches!(estimate_daily_calories(&q), Err(Error::InvalidInput(_))));

        let mut q = query(Gender::Female);
        q.height_cm = 0.0;
        assert!(matches!(estimate_daily_calories(&q), Err(Error::InvalidInput(_))));

        let mut q = query(Gender::Female);
        q.weight_kg = -3.0;
        assert!(matches!(estimate_daily_calories(&q), Err(Error::InvalidInput(_))));

        let mut q = query(Gender::Female);
        q.weight_kg = f64::NAN;
        assert!(matches!(estimate_daily_calories(&q), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_out_of_range_multiplier() {
        let mut q = query(Gender::Male);
        q.activity_multiplier = 0.5;
        assert!(matches!(estimate_daily_calories(&q), Err(Error::InvalidInput(_))));

        q.activity_multiplier = f64::INFINITY;
        assert!(matches!(estimate_daily_calories(&q), Err(Error::InvalidInput(_))));

        // Custom multipliers outside the named table are still scaled
        q.activity_multiplier = 1.3;
        let estimate = estimate_daily_calories(&q).unwrap();
        assert_eq!(estimate.daily_calories, 1592.5 * 1.3);
    }

    #[test]
    fn test_negative_bmr_is_reported_not_clamped() {
        // Tiny body, very old: 10*1 + 6.25*1 - 5*120 - 161 < 0
        let q = CalorieQuery::new(120, 1.0, 1.0, Gender::Female, ActivityLevel::Sedentary);
        assert!(matches!(estimate_daily_calories(&q), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_from_fields() {
        let q = CalorieQuery::from_fields(" 25", "170", "65.0", Gender::Female, ActivityLevel::Active)
            .unwrap();
        assert_eq!(q, query(Gender::Female));

        assert!(CalorieQuery::from_fields("", "170", "65", Gender::Male, ActivityLevel::Light).is_err());
        assert!(CalorieQuery::from_fields("25", "tall", "65", Gender::Male, ActivityLevel::Light).is_err());
        assert!(CalorieQuery::from_fields("25.5", "170", "65", Gender::Male, ActivityLevel::Light).is_err());
    }

    #[test]
    fn test_activity_level_parsing() {
        assert_eq!("very-active".parse::<ActivityLevel>().unwrap(), ActivityLevel::VeryActive);
        assert_eq!("Extra Active".parse::<ActivityLevel>().unwrap(), ActivityLevel::ExtraActive);
        assert_eq!("bmr".parse::<ActivityLevel>().unwrap(), ActivityLevel::Bmr);
        assert!("couch".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_activity_level_lookup_from_query() {
        assert_eq!(query(Gender::Male).activity_level(), Some(ActivityLevel::Active));
    }
}
