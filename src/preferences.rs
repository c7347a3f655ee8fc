//! User planning parameters and their validation rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PlannerError, ValidationErrors};

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 7;
pub const MIN_BUDGET_PER_DAY: f64 = 1.0;
pub const MIN_INGREDIENTS_LEN: usize = 3;

pub const DIETARY_OPTIONS: &[&str] = &["Veg", "Non-Veg", "Eggetarian", "Vegan"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum CityTier {
    Metro,
    #[serde(rename = "Tier-2")]
    #[value(name = "Tier-2")]
    Tier2,
    #[serde(rename = "Tier-3")]
    #[value(name = "Tier-3")]
    Tier3,
}

impl fmt::Display for CityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CityTier::Metro => "Metro",
            CityTier::Tier2 => "Tier-2",
            CityTier::Tier3 => "Tier-3",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum MealConstraint {
    Standard,
    Portable,
    #[serde(rename = "Low-Effort")]
    #[value(name = "Low-Effort")]
    LowEffort,
    #[serde(rename = "One-Pot")]
    #[value(name = "One-Pot")]
    OnePot,
}

impl fmt::Display for MealConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MealConstraint::Standard => "Standard",
            MealConstraint::Portable => "Portable",
            MealConstraint::LowEffort => "Low-Effort",
            MealConstraint::OnePot => "One-Pot",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationGoal {
    Cheapest,
    Fastest,
    Protein,
    Balanced,
}

impl fmt::Display for OptimizationGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OptimizationGoal::Cheapest => "cheapest",
            OptimizationGoal::Fastest => "fastest",
            OptimizationGoal::Protein => "protein",
            OptimizationGoal::Balanced => "balanced",
        };
        f.write_str(label)
    }
}

/// Stored as a single camelCase JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub schedule_summary: String,
    /// Minutes available per meal.
    pub time_per_meal: u32,
    pub budget_per_day: f64,
    #[serde(rename = "cityType")]
    pub city_tier: CityTier,
    pub kitchen_setup: String,
    pub currency: String,
    pub days: u32,
    pub dietary_restrictions: String,
    pub dietary_type: String,
    /// Comma-separated free text.
    pub available_ingredients: String,
    pub meal_constraint: MealConstraint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_goal: Option<OptimizationGoal>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            schedule_summary: String::new(),
            time_per_meal: 25,
            budget_per_day: 150.0,
            city_tier: CityTier::Tier2,
            kitchen_setup: "Medium".to_string(),
            currency: "INR".to_string(),
            days: 2,
            dietary_restrictions: String::new(),
            dietary_type: "Veg".to_string(),
            available_ingredients: "rice, dal, onions, tomatoes, potatoes, turmeric".to_string(),
            meal_constraint: MealConstraint::Standard,
            optimization_goal: None,
        }
    }
}

impl Preferences {
    /// Number of non-blank entries in the pantry list.
    pub fn ingredient_count(&self) -> usize {
        self.available_ingredients
            .split(',')
            .filter(|i| !i.trim().is_empty())
            .count()
    }

    /// Appends scanner output to the pantry list, or takes it as-is when the list is empty.
    pub fn append_detected_ingredients(&mut self, detected: &str) {
        let detected = detected.trim();
        if detected.is_empty() {
            return;
        }
        if self.available_ingredients.is_empty() {
            self.available_ingredients = detected.to_string();
        } else {
            self.available_ingredients = format!("{}, {}", self.available_ingredients, detected);
        }
    }

    pub fn goal_or_default(&self) -> OptimizationGoal {
        self.optimization_goal.unwrap_or(OptimizationGoal::Balanced)
    }
}

/// Checks every rule and reports all violations at once.
pub fn validate_preferences(prefs: &Preferences) -> Result<(), PlannerError> {
    let mut violations = Vec::new();

    if prefs.budget_per_day < MIN_BUDGET_PER_DAY || prefs.budget_per_day.is_nan() {
        violations.push("Budget must be a positive asset.".to_string());
    }
    if prefs.available_ingredients.chars().count() < MIN_INGREDIENTS_LEN {
        violations.push("Pantry intel is insufficient for strategy.".to_string());
    }
    if !(MIN_DAYS..=MAX_DAYS).contains(&prefs.days) {
        violations.push(format!(
            "Mission duration must be between {}-{} days.",
            MIN_DAYS, MAX_DAYS
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PlannerError::Validation(ValidationErrors(violations)))
    }
}
