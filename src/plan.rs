//! The generated cooking plan, as returned by the planning model.
//!
//! Field names follow the camelCase schema the model is instructed to emit.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub days: Vec<DayPlan>,
    pub grocery_list: Vec<GroceryItem>,
    pub budget_analysis: String,
    pub total_estimated_cost: String,
    pub is_fallback: bool,
    pub personalisation_proof: String,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    Secure,
    Alert,
}

impl Plan {
    /// A fallback plan could not fully respect the stated budget.
    pub fn budget_status(&self) -> BudgetStatus {
        if self.is_fallback {
            BudgetStatus::Alert
        } else {
            BudgetStatus::Secure
        }
    }

    pub fn day(&self, day_number: u32) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.day_number == day_number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub day_number: u32,
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub cooking_sequence: Vec<String>,
    #[serde(default)]
    pub daily_tip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    #[serde(alias = "breakfast")]
    Breakfast,
    #[serde(alias = "lunch")]
    Lunch,
    #[serde(alias = "dinner")]
    Dinner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub name: String,
    #[serde(default)]
    pub time_estimate: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub substitutions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_badge: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngredientSource {
    #[serde(alias = "pantry")]
    Pantry,
    #[serde(alias = "buy")]
    Buy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub source: IngredientSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroceryCategory {
    Produce,
    Protein,
    Dairy,
    Pantry,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub item: String,
    pub category: GroceryCategory,
    pub estimated_cost: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Web,
    Maps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}
