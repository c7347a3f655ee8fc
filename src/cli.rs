use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::preferences::{CityTier, MealConstraint, OptimizationGoal, Preferences, DIETARY_OPTIONS};

#[derive(Parser, Debug)]
#[command(author, version, about = "Budget-aware meal planning backed by Gemini", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or edit stored preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Generate a cooking plan from stored preferences
    Plan {
        /// Latitude hint for map grounding
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude hint for map grounding
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Skip the IP-based location lookup
        #[arg(long)]
        no_locate: bool,
        /// Print the plan as JSON
        #[arg(long, conflicts_with = "day")]
        json: bool,
        /// Show only this day (1-based)
        #[arg(long)]
        day: Option<u32>,
    },
    /// Identify pantry ingredients in a photo and add them to preferences
    Scan {
        image: PathBuf,
        #[arg(long, default_value = "image/jpeg")]
        mime: String,
    },
    /// Render a photo of a dish
    Visualize {
        dish: String,
        /// Write decoded image bytes here instead of printing a data URI
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Synthesize a spoken briefing as raw f32 PCM (24 kHz mono)
    Brief {
        text: String,
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    Show,
    Set(PrefsEdit),
    Reset,
}

#[derive(Args, Debug, Default)]
pub struct PrefsEdit {
    #[arg(long)]
    pub budget: Option<f64>,
    #[arg(long)]
    pub days: Option<u32>,
    #[arg(long, value_enum)]
    pub city: Option<CityTier>,
    /// One of Veg, Non-Veg, Eggetarian, Vegan
    #[arg(long, value_parser = parse_dietary_type)]
    pub diet: Option<String>,
    #[arg(long, value_enum)]
    pub constraint: Option<MealConstraint>,
    #[arg(long, value_enum)]
    pub goal: Option<OptimizationGoal>,
    #[arg(long)]
    pub ingredients: Option<String>,
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub kitchen: Option<String>,
    #[arg(long)]
    pub time_per_meal: Option<u32>,
    #[arg(long)]
    pub schedule: Option<String>,
    #[arg(long)]
    pub restrictions: Option<String>,
}

impl PrefsEdit {
    pub fn apply(&self, prefs: &mut Preferences) {
        if let Some(budget) = self.budget {
            prefs.budget_per_day = budget;
        }
        if let Some(days) = self.days {
            prefs.days = days;
        }
        if let Some(city) = self.city {
            prefs.city_tier = city;
        }
        if let Some(diet) = &self.diet {
            prefs.dietary_type = diet.clone();
        }
        if let Some(constraint) = self.constraint {
            prefs.meal_constraint = constraint;
        }
        if let Some(goal) = self.goal {
            prefs.optimization_goal = Some(goal);
        }
        if let Some(ingredients) = &self.ingredients {
            prefs.available_ingredients = ingredients.clone();
        }
        if let Some(currency) = &self.currency {
            prefs.currency = currency.clone();
        }
        if let Some(kitchen) = &self.kitchen {
            prefs.kitchen_setup = kitchen.clone();
        }
        if let Some(minutes) = self.time_per_meal {
            prefs.time_per_meal = minutes;
        }
        if let Some(schedule) = &self.schedule {
            prefs.schedule_summary = schedule.clone();
        }
        if let Some(restrictions) = &self.restrictions {
            prefs.dietary_restrictions = restrictions.clone();
        }
    }
}

/// Accepts a dietary option in any case and returns its canonical spelling.
fn parse_dietary_type(raw: &str) -> Result<String, String> {
    DIETARY_OPTIONS
        .iter()
        .find(|option| option.eq_ignore_ascii_case(raw.trim()))
        .map(|option| option.to_string())
        .ok_or_else(|| format!("expected one of: {}", DIETARY_OPTIONS.join(", ")))
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefs_set() {
        let cli = Cli::try_parse_from([
            "meal-strategist", "prefs", "set", "--budget", "200", "--city", "Tier-3", "--constraint", "One-Pot", "--goal", "protein",
        ])
        .unwrap();
        let Command::Prefs { action: PrefsAction::Set(edit) } = cli.command else {
            panic!("expected prefs set");
        };
        let mut prefs = Preferences::default();
        edit.apply(&mut prefs);
        assert_eq!(prefs.budget_per_day, 200.0);
        assert_eq!(prefs.city_tier, CityTier::Tier3);
        assert_eq!(prefs.meal_constraint, MealConstraint::OnePot);
        assert_eq!(prefs.optimization_goal, Some(OptimizationGoal::Protein));
        assert_eq!(prefs.days, 2);
    }

    #[test]
    fn test_diet_must_be_a_known_option() {
        let cli = Cli::try_parse_from(["meal-strategist", "prefs", "set", "--diet", "non-veg"]).unwrap();
        let Command::Prefs { action: PrefsAction::Set(edit) } = cli.command else {
            panic!("expected prefs set");
        };
        assert_eq!(edit.diet.as_deref(), Some("Non-Veg"));

        assert!(Cli::try_parse_from(["meal-strategist", "prefs", "set", "--diet", "Pescatarian"]).is_err());
    }

    #[test]
    fn test_plan_coordinates_must_be_paired() {
        assert!(Cli::try_parse_from(["meal-strategist", "plan", "--lat", "12.9"]).is_err());
        let cli = Cli::try_parse_from(["meal-strategist", "plan", "--lat", "-33.8", "--lng", "151.2"]).unwrap();
        let Command::Plan { lat, lng, .. } = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(lat, Some(-33.8));
        assert_eq!(lng, Some(151.2));
    }
}
