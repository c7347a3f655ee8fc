//! Plain-text rendering of a plan for the terminal.

use std::fmt::Write as _;

use crate::plan::{BudgetStatus, DayPlan, GroceryCategory, IngredientSource, MealType, Plan, SourceKind};

pub fn budget_badge(status: BudgetStatus) -> &'static str {
    match status {
        BudgetStatus::Secure => "[SECURE] Budget locked in",
        BudgetStatus::Alert => "[BUDGET ALERT] Fallback plan: budget could not be fully met",
    }
}

pub fn source_icon(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Web => "[search]",
        SourceKind::Maps => "[map]",
    }
}

fn meal_label(meal_type: MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "Breakfast",
        MealType::Lunch => "Lunch",
        MealType::Dinner => "Dinner",
    }
}

fn category_label(category: GroceryCategory) -> &'static str {
    match category {
        GroceryCategory::Produce => "Produce",
        GroceryCategory::Protein => "Protein",
        GroceryCategory::Dairy => "Dairy",
        GroceryCategory::Pantry => "Pantry",
        GroceryCategory::Other => "Other",
    }
}

/// One day's meals, or `None` when the plan has no such day.
pub fn render_day(plan: &Plan, day_number: u32) -> Option<String> {
    let day = plan.day(day_number)?;
    let mut out = String::new();
    let _ = writeln!(out, "{}", budget_badge(plan.budget_status()));
    write_day(&mut out, day);
    Some(out)
}

fn write_day(out: &mut String, day: &DayPlan) {
    let _ = writeln!(out, "\n=== Day {} ===", day.day_number);
    for meal in &day.meals {
        let badge = meal
            .constraint_badge
            .as_deref()
            .map(|b| format!(" <{}>", b))
            .unwrap_or_default();
        let _ = writeln!(out, "{}: {} ({}){}", meal_label(meal.meal_type), meal.name, meal.time_estimate, badge);
        for ingredient in &meal.ingredients {
            let tag = match ingredient.source {
                IngredientSource::Pantry => "PANTRY",
                IngredientSource::Buy => "BUY",
            };
            match &ingredient.amount {
                Some(amount) => {
                    let _ = writeln!(out, "  - [{}] {} {}", tag, ingredient.name, amount);
                }
                None => {
                    let _ = writeln!(out, "  - [{}] {}", tag, ingredient.name);
                }
            }
        }
        for (i, step) in meal.steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, step);
        }
        if !meal.substitutions.is_empty() {
            let _ = writeln!(out, "  swaps: {}", meal.substitutions.join("; "));
        }
    }
    if !day.cooking_sequence.is_empty() {
        let _ = writeln!(out, "Sequence: {}", day.cooking_sequence.join(" -> "));
    }
    if !day.daily_tip.is_empty() {
        let _ = writeln!(out, "Tip: {}", day.daily_tip);
    }
}

pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", budget_badge(plan.budget_status()));
    let _ = writeln!(out, "Total: {}", plan.total_estimated_cost);
    let _ = writeln!(out, "{}", plan.budget_analysis);
    if !plan.personalisation_proof.is_empty() {
        let _ = writeln!(out, "Why this plan: {}", plan.personalisation_proof);
    }

    for day in &plan.days {
        write_day(&mut out, day);
    }

    if !plan.grocery_list.is_empty() {
        let _ = writeln!(out, "\n=== Grocery list ===");
        for item in &plan.grocery_list {
            let _ = writeln!(out, "  {:<8} {} ({})", category_label(item.category), item.item, item.estimated_cost);
        }
    }

    if !plan.sources.is_empty() {
        let _ = writeln!(out, "\n=== Sources ===");
        for source in &plan.sources {
            let _ = writeln!(out, "  {} {} <{}>", source_icon(source.kind), source.title, source.uri);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::fixtures::sample_plan;
    use crate::plan::GroundingSource;

    #[test]
    fn test_fallback_renders_budget_alert() {
        let text = render_plan(&sample_plan(3, true));
        assert!(text.starts_with("[BUDGET ALERT]"));
        assert!(!text.contains("[SECURE]"));
        assert!(text.contains("=== Day 3 ==="));
    }

    #[test]
    fn test_secure_plan_lists_sources_and_tags() {
        let mut plan = sample_plan(1, false);
        plan.sources.push(GroundingSource {
            title: "Supply Node".to_string(),
            uri: "#".to_string(),
            kind: SourceKind::Maps,
        });
        let text = render_plan(&plan);
        assert!(text.starts_with("[SECURE]"));
        assert!(text.contains("[PANTRY] dal 1 cup"));
        assert!(text.contains("[BUY] ghee"));
        assert!(text.contains("[map] Supply Node <#>"));
    }

    #[test]
    fn test_single_day_view() {
        let plan = sample_plan(3, true);
        let text = render_day(&plan, 2).unwrap();
        assert!(text.starts_with("[BUDGET ALERT]"));
        assert!(text.contains("=== Day 2 ==="));
        assert!(!text.contains("=== Day 1 ==="));
        assert!(render_day(&plan, 4).is_none());
    }
}
