//! Client-side state as immutable records replaced through `reduce`.
//!
//! Nothing outside this module mutates an `AppState`; callers dispatch an
//! `Action` and receive the next state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::plan::Plan;
use crate::preferences::Preferences;

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub preferences: Preferences,
    pub plan: Option<Arc<Plan>>,
    pub error: Option<String>,
    pub plan_loading: bool,
    pub scanning: bool,
    /// Dish name to `data:` URI.
    pub meal_images: BTreeMap<String, String>,
    pub image_loading: BTreeSet<String>,
    /// Dishes whose visualization came back empty this session.
    pub image_unavailable: BTreeSet<String>,
    pub briefing_playing: bool,
}

impl AppState {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            plan: None,
            error: None,
            plan_loading: false,
            scanning: false,
            meal_images: BTreeMap::new(),
            image_loading: BTreeSet::new(),
            image_unavailable: BTreeSet::new(),
            briefing_playing: false,
        }
    }

    /// A dish needs a request only if nothing is cached or in flight for it.
    pub fn should_visualize(&self, dish: &str) -> bool {
        !self.image_loading.contains(dish) && !self.meal_images.contains_key(dish)
    }

    pub fn meal_image(&self, dish: &str) -> Option<&str> {
        self.meal_images.get(dish).map(String::as_str)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    PreferencesEdited(Preferences),
    ScanStarted,
    IngredientsDetected(String),
    ScanFailed(String),
    PreferencesRejected(String),
    PreferencesNotSaved(String),
    PlanRequested,
    PlanGenerated(Plan),
    PlanFailed(String),
    VisualizationRequested(String),
    VisualizationFinished { dish: String, uri: Option<String> },
    BriefingStarted,
    BriefingFinished,
}

pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::PreferencesEdited(preferences) => {
            next.preferences = preferences;
        }
        Action::ScanStarted => {
            next.scanning = true;
            next.error = None;
        }
        Action::IngredientsDetected(detected) => {
            next.preferences.append_detected_ingredients(&detected);
            next.scanning = false;
        }
        Action::ScanFailed(message) => {
            next.scanning = false;
            next.error = Some(message);
        }
        Action::PreferencesRejected(message) | Action::PreferencesNotSaved(message) => {
            next.error = Some(message);
        }
        Action::PlanRequested => {
            next.plan_loading = true;
            next.error = None;
        }
        Action::PlanGenerated(plan) => {
            // Images belong to the plan they were rendered for.
            next.plan = Some(Arc::new(plan));
            next.plan_loading = false;
            next.meal_images.clear();
            next.image_loading.clear();
            next.image_unavailable.clear();
        }
        Action::PlanFailed(message) => {
            // Prior plan stays visible.
            next.plan_loading = false;
            next.error = Some(message);
        }
        Action::VisualizationRequested(dish) => {
            next.image_unavailable.remove(&dish);
            next.image_loading.insert(dish);
        }
        Action::VisualizationFinished { dish, uri } => {
            // Not in flight means the request predates the current plan.
            if !next.image_loading.remove(&dish) {
                return next;
            }
            match uri {
                Some(uri) => {
                    next.meal_images.insert(dish, uri);
                }
                None => {
                    next.image_unavailable.insert(dish);
                }
            }
        }
        Action::BriefingStarted => {
            next.briefing_playing = true;
        }
        Action::BriefingFinished => {
            next.briefing_playing = false;
        }
    }
    next
}

/// Holds the current state and applies actions one at a time.
#[derive(Debug, Default)]
pub struct StateStore {
    state: Arc<AppState>,
}

impl StateStore {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: Arc::new(initial),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    pub fn dispatch(&mut self, action: Action) -> Arc<AppState> {
        self.state = Arc::new(reduce(&self.state, action));
        Arc::clone(&self.state)
    }
}
