use tracing::{error, info};

use crate::api_connection::endpoints::{model_for, Content, GenerateContentRequest, GenerationConfig, ModelCapability, Part};
use crate::api_connection::GenerationService;
use crate::error::PlannerError;

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
pub const SCAN_TEMPERATURE: f32 = 0.1;

const SCAN_INSTRUCTION: &str = "Analyze the cargo. Identify all food ingredients in this pantry image. Output only a comma-separated list of strings.";

pub fn build_scan_request(image_base64: &str, mime_type: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![
            Part::text(SCAN_INSTRUCTION),
            Part::inline(mime_type, image_base64),
        ])],
        generation_config: Some(GenerationConfig {
            temperature: Some(SCAN_TEMPERATURE),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Returns the ingredients seen in a base64-encoded pantry photo as a
/// comma-separated list. No retry on failure.
pub async fn identify_ingredients_from_image<S>(
    service: &S,
    image_base64: &str,
    mime_type: &str,
) -> Result<String, PlannerError>
where
    S: GenerationService + ?Sized,
{
    let request = build_scan_request(image_base64, mime_type);
    let model = model_for(ModelCapability::Vision);

    let response = service.generate_content(model, &request).await.map_err(|e| {
        error!(error = %e, "identify_ingredients_from_image: vision call failed");
        PlannerError::Vision(e)
    })?;

    let detected = response.text().trim().to_string();
    info!(count = detected.split(',').filter(|s| !s.trim().is_empty()).count(), "pantry scan complete");
    Ok(detected)
}
