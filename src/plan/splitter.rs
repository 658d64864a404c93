//! Response splitter
//!
//! Converts the accumulated model response into the two plan fragments.
//! This is the one piece of defensive logic between the model's soft output
//! contract and the rest of the application.

use tracing::debug;

/// Literal separator the model is instructed to emit between the learning
/// plan table and the session plan blocks
pub const SESSION_PLANS_MARKER: &str = "---SESSION-PLANS---";

/// The two plan fragments derived from one raw response
///
/// Either both fragments hold meaningful HTML, or `session_plans_html` is
/// empty and `warning` is set. Never partially populated in any other way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlans {
    pub learning_plan_html: String,
    pub session_plans_html: String,
    pub warning: Option<SplitWarning>,
}

impl ParsedPlans {
    /// True when the separator contract was not met
    pub fn is_malformed(&self) -> bool {
        self.warning.is_some()
    }
}

/// Non-fatal condition raised when the separator contract was not met
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitWarning {
    /// The marker did not occur exactly once; `occurrences` is the count seen
    SeparatorNotFound { occurrences: usize },
}

impl std::fmt::Display for SplitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitWarning::SeparatorNotFound { .. } => write!(
                f,
                "The response may be incomplete or improperly formatted. The '{}' separator was not found. \
                 The full response is shown under the Learning Plan tab.",
                SESSION_PLANS_MARKER
            ),
        }
    }
}

/// Split a raw model response into the two plan fragments
///
/// The only success path is the marker occurring exactly once: the response
/// splits into exactly two parts, each trimmed. Zero occurrences and two or
/// more occurrences are treated identically - the whole trimmed response
/// becomes the learning plan and a warning is raised. Taking the first two
/// of three or more segments would silently drop generated content.
pub fn split_response(raw: &str) -> ParsedPlans {
    let parts: Vec<&str> = raw.split(SESSION_PLANS_MARKER).collect();
    debug!(part_count = parts.len(), "split_response: called");

    if parts.len() == 2 {
        ParsedPlans {
            learning_plan_html: parts[0].trim().to_string(),
            session_plans_html: parts[1].trim().to_string(),
            warning: None,
        }
    } else {
        let occurrences = parts.len() - 1;
        debug!(occurrences, "split_response: separator contract not met");
        ParsedPlans {
            learning_plan_html: raw.trim().to_string(),
            session_plans_html: String::new(),
            warning: Some(SplitWarning::SeparatorNotFound { occurrences }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_single_marker() {
        let raw = "<table>...</table>\n---SESSION-PLANS---\n<div>...</div>";
        let parsed = split_response(raw);

        assert_eq!(parsed.learning_plan_html, "<table>...</table>");
        assert_eq!(parsed.session_plans_html, "<div>...</div>");
        assert!(parsed.warning.is_none());
        assert!(!parsed.is_malformed());
    }

    #[test]
    fn test_split_no_marker() {
        let raw = "<table>...</table>";
        let parsed = split_response(raw);

        assert_eq!(parsed.learning_plan_html, "<table>...</table>");
        assert_eq!(parsed.session_plans_html, "");
        assert_eq!(
            parsed.warning,
            Some(SplitWarning::SeparatorNotFound { occurrences: 0 })
        );
    }

    #[test]
    fn test_split_trims_surrounding_whitespace() {
        let raw = "  <table/>  \n---SESSION-PLANS---\n\n  <div/>\n";
        let parsed = split_response(raw);

        assert_eq!(parsed.learning_plan_html, "<table/>");
        assert_eq!(parsed.session_plans_html, "<div/>");
    }

    #[test]
    fn test_split_multiple_markers_treated_as_malformed() {
        let raw = "a---SESSION-PLANS---b---SESSION-PLANS---c";
        let parsed = split_response(raw);

        // Same outcome class as zero occurrences: full raw text, warning raised
        assert_eq!(parsed.learning_plan_html, raw);
        assert_eq!(parsed.session_plans_html, "");
        assert_eq!(
            parsed.warning,
            Some(SplitWarning::SeparatorNotFound { occurrences: 2 })
        );
    }

    #[test]
    fn test_split_empty_input() {
        let parsed = split_response("");

        assert_eq!(parsed.learning_plan_html, "");
        assert_eq!(parsed.session_plans_html, "");
        assert!(parsed.is_malformed());
    }

    #[test]
    fn test_split_marker_only() {
        // One occurrence, both sides empty after trimming: still the success
        // path, the fragments are just empty strings
        let parsed = split_response("---SESSION-PLANS---");

        assert_eq!(parsed.learning_plan_html, "");
        assert_eq!(parsed.session_plans_html, "");
        assert!(parsed.warning.is_none());
    }

    #[test]
    fn test_warning_message_names_marker() {
        let warning = SplitWarning::SeparatorNotFound { occurrences: 0 };
        assert!(warning.to_string().contains(SESSION_PLANS_MARKER));
    }
}
