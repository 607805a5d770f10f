//! Error kinds shared across the planner.
//!
//! Scarcity (not enough candidates to fill a slot) is deliberately *not* an
//! error: it is represented as an absent slot in the generated plan. The
//! variants here cover the cases that cannot be degraded locally.

use thiserror::Error;

/// Errors surfaced by planner operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The operation requires a prior successful portal login.
    #[error("not logged in to the recipe portal")]
    NotAuthenticated,

    /// No localization matches the requested country/language pair.
    #[error("no localization available for {country}/{language}")]
    LocalizationUnavailable { country: String, language: String },

    /// A search/recipe/shopping service request failed or returned a
    /// non-success status. Recovered locally (empty result) wherever the
    /// caller can degrade.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// Malformed caller input, surfaced immediately.
    #[error("invalid input: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            PlannerError::NotAuthenticated.to_string(),
            "not logged in to the recipe portal"
        );
        let err = PlannerError::LocalizationUnavailable {
            country: "xx".to_string(),
            language: "yy-YY".to_string(),
        };
        assert_eq!(err.to_string(), "no localization available for xx/yy-YY");
    }
}
