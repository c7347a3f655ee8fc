use dotenv::dotenv;
use meal_strategist::api_connection::{
    endpoints::{model_for, Content, GenerateContentRequest, ModelCapability, Part, GEMINI_MODELS},
    ApiConnectionError, GenerationService, Provider,
};
use meal_strategist::plan_generator::generate_cooking_plan;
use meal_strategist::preferences::Preferences;
use std::env;

const TEST_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

fn setup_test_environment() {
    dotenv().ok();
}

fn hello_request() -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text("Hello")])],
        ..Default::default()
    }
}

#[test]
fn test_catalog_lists_all_models() {
    let provider = Provider::gemini(TEST_API_KEY_ENV_VAR);
    assert_eq!(provider.get_available_models().len(), GEMINI_MODELS.len());
}

#[tokio::test]
async fn test_missing_api_key_error() {
    setup_test_environment();
    let provider = Provider::gemini("THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    let result = provider
        .generate_content(model_for(ModelCapability::Planning), &hello_request())
        .await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
    if let Err(ApiConnectionError::MissingApiKey(key_name)) = result {
        assert_eq!(key_name, "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    }
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    const KEY_ENV: &str = "MEAL_STRATEGIST_TEST_DUMMY_KEY";
    unsafe {
        std::env::set_var(KEY_ENV, "dummy");
    }
    // Port 9 (discard) on loopback refuses connections.
    let provider = Provider::gemini_with_base_url(KEY_ENV, "http://127.0.0.1:9/v1beta/models");
    let result = provider
        .generate_content(model_for(ModelCapability::Planning), &hello_request())
        .await;
    assert!(matches!(result, Err(ApiConnectionError::NetworkError(_))), "got {:?}", result);
    unsafe {
        std::env::remove_var(KEY_ENV);
    }
}

#[tokio::test]
#[ignore]
async fn test_successful_plan_generation() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!("Skipping test_successful_plan_generation: {} not set.", TEST_API_KEY_ENV_VAR);
        return;
    }

    let provider = Provider::gemini(TEST_API_KEY_ENV_VAR);
    let prefs = Preferences {
        days: 1,
        ..Default::default()
    };
    let result = generate_cooking_plan(&provider, &prefs, None).await;
    assert!(result.is_ok(), "plan generation failed: {:?}", result.err());
    let plan = result.unwrap();
    assert!(!plan.days.is_empty());
    assert!(!plan.days[0].meals.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_api_error_with_invalid_key() {
    setup_test_environment();

    const INVALID_KEY_ENV_NAME_FOR_THIS_TEST: &str = "ENV_VAR_WITH_BAD_GEMINI_KEY";
    unsafe {
        std::env::set_var(INVALID_KEY_ENV_NAME_FOR_THIS_TEST, "this_is_a_deliberately_bad_api_key_string_for_testing");
    }

    let provider = Provider::gemini(INVALID_KEY_ENV_NAME_FOR_THIS_TEST);
    let result = provider
        .generate_content(model_for(ModelCapability::Planning), &hello_request())
        .await;
    assert!(matches!(result, Err(ApiConnectionError::ApiError { .. })), "Expected ApiError, got {:?}", result);
    if let Err(ApiConnectionError::ApiError { status, .. }) = result {
        assert!(status.is_client_error(), "Expected 4xx, got {}", status);
    }

    unsafe {
        std::env::remove_var(INVALID_KEY_ENV_NAME_FOR_THIS_TEST);
    }
}
