use tracing::{debug, warn};

use crate::api_connection::endpoints::{
    model_for, ImageInstance, ImageParameters, ImagePredictRequest, ModelCapability,
};
use crate::api_connection::GenerationService;

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

pub fn build_visualization_request(dish_name: &str) -> ImagePredictRequest {
    ImagePredictRequest {
        instances: vec![ImageInstance {
            prompt: format!(
                "A high-quality, professional food photography shot of {}. Cinematic lighting, top-down view, rustic setting, 4k resolution.",
                dish_name
            ),
        }],
        parameters: ImageParameters {
            sample_count: 1,
            aspect_ratio: "1:1".to_string(),
        },
    }
}

/// Renders a dish photo as a `data:` URI. Cosmetic: every failure is logged and
/// reported as `None`. Callers dedupe and cache per dish name.
pub async fn generate_meal_visualization<S>(service: &S, dish_name: &str) -> Option<String>
where
    S: GenerationService + ?Sized,
{
    let request = build_visualization_request(dish_name);
    let model = model_for(ModelCapability::ImageGeneration);

    let response = match service.generate_images(model, &request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(dish = dish_name, error = %e, "Image generation failed");
            return None;
        }
    };

    let Some(prediction) = response.predictions.into_iter().next() else {
        warn!(dish = dish_name, "Image generation returned no predictions");
        return None;
    };
    let Some(bytes) = prediction.bytes_base64_encoded.filter(|b| !b.is_empty()) else {
        warn!(dish = dish_name, "Image generation returned no image bytes");
        return None;
    };

    let mime = prediction.mime_type.unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
    debug!(dish = dish_name, %mime, len = bytes.len(), "visualization ready");
    Some(format!("data:{};base64,{}", mime, bytes))
}

/// Splits a `data:<mime>;base64,<payload>` URI.
pub fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    Some((mime, payload))
}
