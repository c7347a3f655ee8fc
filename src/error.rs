use std::fmt;
use thiserror::Error;

use crate::api_connection::ApiConnectionError;

/// Every rule a set of preferences broke, in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn violations(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" | "))
    }
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("[SECURITY BREACH]: {0}")]
    Validation(ValidationErrors),

    #[error("[SYSTEM COLLAPSE]: {0}")]
    Service(#[source] ApiConnectionError),

    #[error("Tactical blueprint decryption failed. The response format was invalid. ({0})")]
    Format(String),

    #[error("Vision Node Offline: Optical sensors failed to decrypt pantry layout. ({0})")]
    Vision(#[source] ApiConnectionError),

    #[error("A plan generation is already in progress.")]
    InFlight,
}

impl PlannerError {
    /// True for errors the user can fix by editing preferences.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, PlannerError::Validation(_))
    }
}
