//! Single-submission session state
//!
//! One `PlanSession` tracks the lifecycle of one generate attempt: results,
//! warning, error, and the in-flight flag. State transitions are explicit
//! methods; every settle path clears the in-flight flag.

use tracing::debug;

use super::splitter::{SplitWarning, split_response};

/// Transient result state for the current submission
///
/// Created fresh on every submission; `begin` discards the previous
/// attempt's results before the new call starts.
#[derive(Debug, Clone, Default)]
pub struct PlanSession {
    /// Learning plan HTML fragment (or the full raw text on a malformed response)
    pub learning_plan_html: String,
    /// Session plans HTML fragment (empty on a malformed response)
    pub session_plans_html: String,
    /// Non-fatal malformed-response condition
    pub warning: Option<SplitWarning>,
    /// Terminal error for this submission
    pub error: Option<String>,
    /// True while exactly one streaming call is outstanding
    pub in_flight: bool,
}

impl PlanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt: discard previous results, raise the in-flight flag
    pub fn begin(&mut self) {
        debug!("PlanSession::begin: called");
        self.learning_plan_html.clear();
        self.session_plans_html.clear();
        self.warning = None;
        self.error = None;
        self.in_flight = true;
    }

    /// Apply the fully accumulated response, clearing the in-flight flag
    pub fn apply_response(&mut self, raw: &str) {
        debug!(raw_len = raw.len(), "PlanSession::apply_response: called");
        let parsed = split_response(raw);
        self.learning_plan_html = parsed.learning_plan_html;
        self.session_plans_html = parsed.session_plans_html;
        self.warning = parsed.warning;
        self.error = None;
        self.in_flight = false;
    }

    /// Record a terminal error, clearing all result state and the in-flight flag
    pub fn apply_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "PlanSession::apply_error: called");
        self.learning_plan_html.clear();
        self.session_plans_html.clear();
        self.warning = None;
        self.error = Some(message);
        self.in_flight = false;
    }

    /// True when the last attempt produced something to display
    pub fn has_results(&self) -> bool {
        !self.learning_plan_html.is_empty()
    }

    /// True when the session plans tab has content
    pub fn has_session_plans(&self) -> bool {
        !self.session_plans_html.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_clears_previous_attempt() {
        let mut session = PlanSession::new();
        session.apply_response("<table/>\n---SESSION-PLANS---\n<div/>");
        assert!(session.has_results());

        session.begin();
        assert!(!session.has_results());
        assert!(session.warning.is_none());
        assert!(session.error.is_none());
        assert!(session.in_flight);
    }

    #[test]
    fn test_in_flight_false_after_success() {
        let mut session = PlanSession::new();
        session.begin();
        session.apply_response("<table/>\n---SESSION-PLANS---\n<div/>");

        assert!(!session.in_flight);
        assert_eq!(session.learning_plan_html, "<table/>");
        assert_eq!(session.session_plans_html, "<div/>");
        assert!(session.warning.is_none());
    }

    #[test]
    fn test_in_flight_false_after_malformed_response() {
        let mut session = PlanSession::new();
        session.begin();
        session.apply_response("<table/>");

        assert!(!session.in_flight);
        assert!(session.warning.is_some());
        assert_eq!(session.learning_plan_html, "<table/>");
        assert!(!session.has_session_plans());
    }

    #[test]
    fn test_in_flight_false_after_error() {
        let mut session = PlanSession::new();
        session.begin();
        session.apply_error("connection reset");

        assert!(!session.in_flight);
        assert_eq!(session.error.as_deref(), Some("connection reset"));
        assert!(!session.has_results());
    }

    #[test]
    fn test_error_clears_results() {
        let mut session = PlanSession::new();
        session.apply_response("<table/>\n---SESSION-PLANS---\n<div/>");

        session.begin();
        session.apply_error("boom");

        assert!(session.learning_plan_html.is_empty());
        assert!(session.session_plans_html.is_empty());
        assert!(session.warning.is_none());
    }
}
