//! Drives the AI calls through the state store.
//!
//! Each user action checks and updates client state under a short lock, issues
//! at most one service request with the lock released, then dispatches the
//! outcome. The guards here (plan in flight, per-dish visualization, single
//! briefing playback) are the only coordination between calls.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{info, warn};

use crate::api_connection::GenerationService;
use crate::app_state::{Action, AppState, StateStore};
use crate::briefing::{
    decode_base64_audio, decode_pcm16, generate_briefing_audio, AudioSink, BRIEFING_CHANNELS,
    BRIEFING_SAMPLE_RATE,
};
use crate::error::PlannerError;
use crate::geolocation::GeoPoint;
use crate::meal_visualizer::generate_meal_visualization;
use crate::pantry_scanner::identify_ingredients_from_image;
use crate::plan::Plan;
use crate::plan_generator::generate_cooking_plan;
use crate::preference_store::PreferenceStore;
use crate::preferences::{validate_preferences, Preferences};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualizationOutcome {
    /// Rendered by this call.
    Rendered(String),
    /// Already rendered earlier in the session.
    Cached(String),
    /// Another request for the same dish is outstanding.
    Pending,
    /// The service produced nothing; the feature is unavailable for this dish.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BriefingOutcome {
    Played { frames: usize, duration: Duration },
    /// A briefing is already playing; this request was ignored.
    Busy,
    Unavailable,
}

pub struct Session<S: GenerationService + ?Sized> {
    service: Arc<S>,
    preference_store: PreferenceStore,
    store: Mutex<StateStore>,
}

impl<S: GenerationService + ?Sized> Session<S> {
    pub fn new(service: Arc<S>, preference_store: PreferenceStore) -> Self {
        let preferences = preference_store.load();
        Self {
            service,
            preference_store,
            store: Mutex::new(StateStore::new(AppState::new(preferences))),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.lock().state()
    }

    pub fn preferences(&self) -> Preferences {
        self.state().preferences.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StateStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dispatch(&self, action: Action) -> Arc<AppState> {
        self.lock().dispatch(action)
    }

    /// Dispatches `action` only if `allowed` holds for the current state,
    /// checked and applied under one lock.
    fn dispatch_if(&self, allowed: impl FnOnce(&AppState) -> bool, action: Action) -> bool {
        let mut store = self.lock();
        if allowed(&store.state()) {
            store.dispatch(action);
            true
        } else {
            false
        }
    }

    /// Applies an edit and persists the result immediately. The edit runs
    /// under the state lock and must not call back into the session.
    pub fn update_preferences(&self, edit: impl FnOnce(&mut Preferences)) -> anyhow::Result<Preferences> {
        let mut store = self.lock();
        let mut prefs = store.state().preferences.clone();
        edit(&mut prefs);
        self.preference_store.save(&prefs)?;
        store.dispatch(Action::PreferencesEdited(prefs.clone()));
        Ok(prefs)
    }

    /// Appends scanned ingredients and persists them under one lock. A failed
    /// save keeps the in-memory edit and is reported through `AppState::error`.
    fn record_detected_ingredients(&self, detected: String) {
        let mut store = self.lock();
        let state = store.dispatch(Action::IngredientsDetected(detected));
        if let Err(e) = self.preference_store.save(&state.preferences) {
            warn!(error = %e, "failed to persist scanned ingredients");
            store.dispatch(Action::PreferencesNotSaved(format!("Preferences not saved: {:#}", e)));
        }
    }

    pub async fn scan_pantry(&self, image_base64: &str, mime_type: &str) -> Result<String, PlannerError> {
        self.dispatch(Action::ScanStarted);
        match identify_ingredients_from_image(self.service.as_ref(), image_base64, mime_type).await {
            Ok(detected) => {
                self.record_detected_ingredients(detected.clone());
                Ok(detected)
            }
            Err(e) => {
                self.dispatch(Action::ScanFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Generates a new plan from the current preferences. A second call while
    /// one is running fails with `PlannerError::InFlight` without a request.
    /// Invalid preferences are reported without touching a running generation.
    pub async fn generate_plan(&self, location: Option<GeoPoint>) -> Result<Arc<Plan>, PlannerError> {
        let prefs = self.preferences();
        if let Err(e) = validate_preferences(&prefs) {
            self.dispatch(Action::PreferencesRejected(e.to_string()));
            return Err(e);
        }

        if !self.dispatch_if(|s| !s.plan_loading, Action::PlanRequested) {
            warn!("plan generation already in flight, ignoring request");
            return Err(PlannerError::InFlight);
        }

        match generate_cooking_plan(self.service.as_ref(), &prefs, location).await {
            Ok(plan) => {
                let state = self.dispatch(Action::PlanGenerated(plan));
                state
                    .plan
                    .clone()
                    .ok_or_else(|| PlannerError::Format("plan missing after generation".to_string()))
            }
            Err(e) => {
                self.dispatch(Action::PlanFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Renders a dish at most once per session; concurrent requests for the
    /// same dish collapse into one service call.
    pub async fn visualize_meal(&self, dish: &str) -> VisualizationOutcome {
        let dish = dish.trim().to_string();
        {
            let mut store = self.lock();
            let state = store.state();
            if let Some(uri) = state.meal_image(&dish) {
                return VisualizationOutcome::Cached(uri.to_string());
            }
            if !state.should_visualize(&dish) {
                return VisualizationOutcome::Pending;
            }
            store.dispatch(Action::VisualizationRequested(dish.clone()));
        }

        let uri = generate_meal_visualization(self.service.as_ref(), &dish).await;
        self.dispatch(Action::VisualizationFinished {
            dish: dish.clone(),
            uri: uri.clone(),
        });
        match uri {
            Some(uri) => VisualizationOutcome::Rendered(uri),
            None => VisualizationOutcome::Unavailable,
        }
    }

    /// Synthesizes and plays one briefing. Requests made while a briefing is
    /// active are rejected.
    pub async fn play_briefing(&self, text: &str, sink: &mut dyn AudioSink) -> BriefingOutcome {
        if !self.dispatch_if(|s| !s.briefing_playing, Action::BriefingStarted) {
            return BriefingOutcome::Busy;
        }
        let _playing = PlaybackGuard { session: self };

        let Some(payload) = generate_briefing_audio(self.service.as_ref(), text).await else {
            return BriefingOutcome::Unavailable;
        };
        let bytes = match decode_base64_audio(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Briefing audio failed: payload is not base64");
                return BriefingOutcome::Unavailable;
            }
        };

        let buffer = decode_pcm16(&bytes, BRIEFING_SAMPLE_RATE, BRIEFING_CHANNELS);
        if let Err(e) = sink.play(&buffer).await {
            warn!(error = %e, "Briefing audio failed: sink rejected buffer");
            return BriefingOutcome::Unavailable;
        }
        info!(frames = buffer.frame_count(), "briefing played");
        BriefingOutcome::Played {
            frames: buffer.frame_count(),
            duration: buffer.duration(),
        }
    }
}

/// Clears the playback flag however `play_briefing` exits.
struct PlaybackGuard<'a, S: GenerationService + ?Sized> {
    session: &'a Session<S>,
}

impl<S: GenerationService + ?Sized> Drop for PlaybackGuard<'_, S> {
    fn drop(&mut self) {
        self.session.dispatch(Action::BriefingFinished);
    }
}
