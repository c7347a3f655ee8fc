//! Meal Strategist: budget-aware meal planning on top of the Gemini API.
//!
//! - [`plan_generator`] builds the grounded planning request and parses the reply
//! - [`pantry_scanner`], [`meal_visualizer`], [`briefing`] are the optional enrichment calls
//! - [`session`] runs every call through the [`app_state`] reducer
//! - [`preference_store`] keeps user preferences between runs

pub mod api_connection;
pub mod app_state;
pub mod briefing;
pub mod cli;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod json_extract;
pub mod meal_visualizer;
pub mod pantry_scanner;
pub mod plan;
pub mod plan_generator;
pub mod preference_store;
pub mod preferences;
pub mod render;
pub mod session;

pub use api_connection::{ApiConnectionError, GenerationService, Provider};
pub use error::{PlannerError, ValidationErrors};
pub use plan::Plan;
pub use preferences::{validate_preferences, Preferences};
pub use session::Session;
