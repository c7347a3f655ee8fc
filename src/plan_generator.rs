use tracing::{debug, info, warn};

use crate::api_connection::endpoints::{
    model_for, Content, GenerateContentRequest, GroundingChunk, LatLng, ModelCapability, Part,
    RetrievalConfig, Tool, ToolConfig,
};
use crate::api_connection::GenerationService;
use crate::error::PlannerError;
use crate::geolocation::GeoPoint;
use crate::json_extract::extract_json_object;
use crate::plan::{GroundingSource, Plan, SourceKind};
use crate::preferences::{validate_preferences, Preferences};

pub const WEB_SOURCE_DEFAULT_TITLE: &str = "Market Intel";
pub const MAPS_SOURCE_DEFAULT_TITLE: &str = "Supply Node";
pub const SOURCE_DEFAULT_URI: &str = "#";

const PLAN_JSON_SCHEMA: &str = r#"{
    "days": [{"dayNumber": number, "dailyTip": string, "cookingSequence": [string], "meals": [{"type": "Breakfast"|"Lunch"|"Dinner", "name": string, "timeEstimate": string, "constraintBadge": string, "steps": [string], "substitutions": [string], "ingredients": [{"name": string, "source": "Pantry"|"Buy", "amount": string}]}]}],
    "groceryList": [{"item": string, "category": "Produce"|"Protein"|"Dairy"|"Pantry"|"Other", "estimatedCost": string}],
    "budgetAnalysis": string,
    "totalEstimatedCost": string,
    "isFallback": boolean,
    "personalisationProof": string
  }"#;

pub fn build_system_instruction(prefs: &Preferences) -> String {
    format!(
        "You are 'The Mafia Food Strategist'.
  Architect a {days}-day tactical meal plan for {city}, India.

  MANDATORY FORMAT: Your response MUST be a single, valid JSON object.
  DO NOT include any conversational text, markdown code blocks, or citations in the text.

  JSON SCHEMA:
  {schema}

  STRICT PROTOCOLS:
  1. Use 'googleSearch' to verify current retail prices for ingredients in {city}.
  2. Use 'googleMaps' to locate actual supply nodes (shops/markets) if location provided.
  3. Maximize 'Pantry' utilization: {pantry}.
  4. Set \"isFallback\" to true if the plan cannot fully respect the budget.",
        days = prefs.days,
        city = prefs.city_tier,
        schema = PLAN_JSON_SCHEMA,
        pantry = prefs.available_ingredients,
    )
}

pub fn build_plan_prompt(prefs: &Preferences) -> String {
    let mut prompt = format!(
        "Construct the blueprint:
  - Budget: {} {}/day.
  - Diet: {}.
  - Mode: {}.
  - Goal: {}.",
        prefs.budget_per_day,
        prefs.currency,
        prefs.dietary_type,
        prefs.meal_constraint,
        prefs.goal_or_default(),
    );
    if !prefs.dietary_restrictions.trim().is_empty() {
        prompt.push_str(&format!("\n  - Restrictions: {}.", prefs.dietary_restrictions.trim()));
    }
    if !prefs.schedule_summary.trim().is_empty() {
        prompt.push_str(&format!("\n  - Schedule: {}.", prefs.schedule_summary.trim()));
    }
    prompt.push_str(&format!(
        "\n  - Time per meal: {} min. Kitchen: {}.",
        prefs.time_per_meal, prefs.kitchen_setup
    ));
    prompt
}

pub fn build_plan_request(prefs: &Preferences, location: Option<GeoPoint>) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Some(Content {
            role: None,
            parts: vec![Part::text(build_system_instruction(prefs))],
        }),
        contents: vec![Content::user(vec![Part::text(build_plan_prompt(prefs))])],
        tools: vec![Tool::GoogleSearch {}, Tool::GoogleMaps {}],
        tool_config: location.map(|point| ToolConfig {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLng {
                    latitude: point.latitude,
                    longitude: point.longitude,
                },
            },
        }),
        // responseMimeType/responseSchema are rejected when grounding tools are on.
        generation_config: None,
    }
}

/// Maps grounding chunks to sources, filling blank titles and URIs.
/// Chunks that are neither web nor maps are dropped.
pub fn normalize_grounding_sources(chunks: &[GroundingChunk]) -> Vec<GroundingSource> {
    fn non_blank(value: &Option<String>) -> Option<String> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
    }

    chunks
        .iter()
        .filter_map(|chunk| {
            let (reference, kind, default_title) = if let Some(web) = &chunk.web {
                (web, SourceKind::Web, WEB_SOURCE_DEFAULT_TITLE)
            } else if let Some(maps) = &chunk.maps {
                (maps, SourceKind::Maps, MAPS_SOURCE_DEFAULT_TITLE)
            } else {
                return None;
            };
            Some(GroundingSource {
                title: non_blank(&reference.title).unwrap_or_else(|| default_title.to_string()),
                uri: non_blank(&reference.uri).unwrap_or_else(|| SOURCE_DEFAULT_URI.to_string()),
                kind,
            })
        })
        .collect()
}

/// Parses the planning model's free text into a plan.
pub fn parse_plan_text(raw_text: &str) -> Result<Plan, PlannerError> {
    let object = extract_json_object(raw_text).map_err(|e| {
        warn!(error = %e, raw_len = raw_text.len(), "parse_plan_text: no usable JSON object");
        debug!(raw = raw_text, "parse_plan_text: raw response");
        PlannerError::Format(e.to_string())
    })?;
    serde_json::from_str::<Plan>(object).map_err(|e| {
        warn!(error = %e, "parse_plan_text: JSON object does not match plan schema");
        PlannerError::Format(e.to_string())
    })
}

/// Validates preferences, then issues exactly one grounded planning request.
pub async fn generate_cooking_plan<S>(
    service: &S,
    prefs: &Preferences,
    location: Option<GeoPoint>,
) -> Result<Plan, PlannerError>
where
    S: GenerationService + ?Sized,
{
    validate_preferences(prefs)?;

    let request = build_plan_request(prefs, location);
    let model = model_for(ModelCapability::Planning);
    info!(
        model,
        days = prefs.days,
        city = %prefs.city_tier,
        located = location.is_some(),
        "generate_cooking_plan: requesting plan"
    );

    let response = service
        .generate_content(model, &request)
        .await
        .map_err(PlannerError::Service)?;

    if response.hit_token_limit() {
        warn!("generate_cooking_plan: reply stopped at the output token limit");
    }
    let mut plan = parse_plan_text(&response.text())?;
    plan.sources = normalize_grounding_sources(response.grounding_chunks());

    if plan.days.len() != prefs.days as usize {
        warn!(
            requested = prefs.days,
            returned = plan.days.len(),
            "generate_cooking_plan: day count differs from request"
        );
    }
    info!(
        days = plan.days.len(),
        groceries = plan.grocery_list.len(),
        sources = plan.sources.len(),
        fallback = plan.is_fallback,
        "generate_cooking_plan: plan ready"
    );
    Ok(plan)
}
