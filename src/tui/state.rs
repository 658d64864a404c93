//! TUI application state
//!
//! Pure data structures for the TUI. No rendering logic here.

use std::time::Instant;

use rand::seq::IndexedRandom;
use tracing::debug;

use crate::plan::{PlanRequest, PlanSession};

/// Words for the streaming status indicator
pub const STREAMING_WORDS: &[&str] = &[
    "Drafting",
    "Outlining",
    "Scheduling",
    "Composing",
    "Structuring",
    "Planning",
    "Assembling",
    "Arranging",
];

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Form collecting the plan request fields
    #[default]
    Form,
    /// Tabbed view of the generated plans
    Plans,
}

/// Result tab in the plans view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanTab {
    #[default]
    LearningPlan,
    SessionPlans,
}

impl PlanTab {
    pub fn title(&self) -> &'static str {
        match self {
            PlanTab::LearningPlan => "Learning Plan",
            PlanTab::SessionPlans => "Session Plans",
        }
    }
}

/// Form fields in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    UnitTitle,
    Level,
    TrainerName,
    NumWeeks,
    LessonsPerWeek,
    Curriculum,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::UnitTitle,
        FormField::Level,
        FormField::TrainerName,
        FormField::NumWeeks,
        FormField::LessonsPerWeek,
        FormField::Curriculum,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::UnitTitle => "Unit Title",
            FormField::Level => "Level",
            FormField::TrainerName => "Name of Trainer",
            FormField::NumWeeks => "No. of Weeks",
            FormField::LessonsPerWeek => "Lessons/Week",
            FormField::Curriculum => "Unit Curriculum",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// The curriculum paste area accepts newlines
    pub fn is_multiline(self) -> bool {
        matches!(self, FormField::Curriculum)
    }

    /// Week and lesson counts only accept digits
    pub fn is_numeric(self) -> bool {
        matches!(self, FormField::NumWeeks | FormField::LessonsPerWeek)
    }
}

/// Form state: one text buffer per field plus the focused field
// TODO: cursor movement within fields (editing currently appends/deletes at the end)
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub unit_title: String,
    pub level: String,
    pub trainer_name: String,
    pub num_weeks: String,
    pub lessons_per_week: String,
    pub curriculum: String,
    pub focus: FormField,
}

impl FormState {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::UnitTitle => &self.unit_title,
            FormField::Level => &self.level,
            FormField::TrainerName => &self.trainer_name,
            FormField::NumWeeks => &self.num_weeks,
            FormField::LessonsPerWeek => &self.lessons_per_week,
            FormField::Curriculum => &self.curriculum,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::UnitTitle => &mut self.unit_title,
            FormField::Level => &mut self.level,
            FormField::TrainerName => &mut self.trainer_name,
            FormField::NumWeeks => &mut self.num_weeks,
            FormField::LessonsPerWeek => &mut self.lessons_per_week,
            FormField::Curriculum => &mut self.curriculum,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Type a character into the focused field
    pub fn insert_char(&mut self, c: char) {
        if self.focus.is_numeric() && !c.is_ascii_digit() {
            return;
        }
        self.field_mut(self.focus).push(c);
    }

    /// Delete the last character of the focused field
    pub fn backspace(&mut self) {
        self.field_mut(self.focus).pop();
    }

    /// Insert a newline (curriculum field only)
    pub fn insert_newline(&mut self) {
        if self.focus.is_multiline() {
            self.field_mut(self.focus).push('\n');
        }
    }

    /// Snapshot the form into a plan request
    pub fn to_request(&self) -> PlanRequest {
        PlanRequest {
            unit_title: self.unit_title.clone(),
            level: self.level.clone(),
            trainer_name: self.trainer_name.clone(),
            num_weeks: self.num_weeks.clone(),
            lessons_per_week: self.lessons_per_week.clone(),
            curriculum: self.curriculum.clone(),
        }
    }
}

/// Export request queued by the controller, executed by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingExport {
    ActiveTab,
    Both,
}

/// Main TUI application state
#[derive(Debug)]
pub struct AppState {
    /// Current view
    pub current_view: View,
    /// Active result tab
    pub active_tab: PlanTab,
    /// Form fields and focus
    pub form: FormState,
    /// Result state for the current submission
    pub session: PlanSession,
    /// Markdown rendering of the learning plan HTML (cached for display)
    pub learning_plan_md: String,
    /// Markdown rendering of the session plans HTML (cached for display)
    pub session_plans_md: String,
    /// Scroll offset in the plans view
    pub plans_scroll: u16,
    /// Max scroll offset (updated during render)
    pub plans_max_scroll: u16,
    /// Should the app quit
    pub should_quit: bool,
    /// Transient status line (export confirmations, validation errors)
    pub status_message: Option<String>,
    /// Whether the API key was available at startup
    pub api_configured: bool,
    /// Name of the env var the key is read from (for the config-error banner)
    pub api_key_env: String,
    /// Submit queued for the runner to pick up
    pub pending_submit: Option<PlanRequest>,
    /// Export queued for the runner to pick up
    pub pending_export: Option<PendingExport>,

    // === Streaming status ===
    /// Word for the streaming indicator (e.g. "Drafting")
    pub streaming_word: String,
    /// When streaming began (for elapsed time display)
    pub streaming_start: Option<Instant>,
    /// Bytes received so far
    pub streaming_received: usize,
    /// Input tokens for the current request (from the first chunk)
    pub streaming_input_tokens: Option<u64>,
}

impl AppState {
    pub fn new(api_configured: bool, api_key_env: impl Into<String>) -> Self {
        debug!(api_configured, "AppState::new: called");
        Self {
            current_view: View::default(),
            active_tab: PlanTab::default(),
            form: FormState::default(),
            session: PlanSession::new(),
            learning_plan_md: String::new(),
            session_plans_md: String::new(),
            plans_scroll: 0,
            plans_max_scroll: 0,
            should_quit: false,
            status_message: None,
            api_configured,
            api_key_env: api_key_env.into(),
            pending_submit: None,
            pending_export: None,
            streaming_word: String::new(),
            streaming_start: None,
            streaming_received: 0,
            streaming_input_tokens: None,
        }
    }

    /// Queue a submit if the form is valid and nothing is in flight
    pub fn submit_form(&mut self) {
        debug!("AppState::submit_form: called");
        if !self.api_configured {
            self.set_status(format!(
                "Configuration error: set the {} environment variable first",
                self.api_key_env
            ));
            return;
        }
        if self.session.in_flight {
            debug!("AppState::submit_form: request already in flight");
            self.set_status("Please wait for the current generation to complete");
            return;
        }

        let request = self.form.to_request();
        if let Err(e) = request.validate() {
            debug!(error = %e, "AppState::submit_form: validation failed");
            self.set_status(e.to_string());
            return;
        }

        self.clear_status();
        self.pending_submit = Some(request);
    }

    /// Start streaming - pick a status word, reset counters
    pub fn start_streaming(&mut self) {
        debug!("AppState::start_streaming: called");
        let mut rng = rand::rng();
        self.streaming_word = STREAMING_WORDS.choose(&mut rng).unwrap_or(&"Working").to_string();
        self.streaming_start = Some(Instant::now());
        self.streaming_received = 0;
        self.streaming_input_tokens = None;
    }

    /// Clear the streaming indicator state
    pub fn finish_streaming(&mut self) {
        debug!("AppState::finish_streaming: called");
        self.streaming_start = None;
        self.streaming_received = 0;
        self.streaming_input_tokens = None;
    }

    /// Switch to the other result tab; the sessions tab is disabled while empty
    pub fn toggle_tab(&mut self) {
        debug!(?self.active_tab, "AppState::toggle_tab: called");
        match self.active_tab {
            PlanTab::LearningPlan if self.session.has_session_plans() => {
                self.active_tab = PlanTab::SessionPlans;
                self.plans_scroll = 0;
            }
            PlanTab::SessionPlans => {
                self.active_tab = PlanTab::LearningPlan;
                self.plans_scroll = 0;
            }
            _ => {
                debug!("AppState::toggle_tab: sessions tab disabled");
            }
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.plans_scroll = self.plans_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.plans_scroll = self.plans_scroll.saturating_add(lines).min(self.plans_max_scroll);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(%msg, "AppState::set_status: called");
        self.status_message = Some(msg);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_state() -> AppState {
        let mut state = AppState::new(true, "GEMINI_API_KEY");
        state.form.unit_title = "Electrical Safety".to_string();
        state.form.level = "Level 6".to_string();
        state.form.trainer_name = "Alex Bett".to_string();
        state.form.num_weeks = "12".to_string();
        state.form.lessons_per_week = "3".to_string();
        state.form.curriculum = "Safety basics".to_string();
        state
    }

    #[test]
    fn test_form_focus_cycle() {
        let mut form = FormState::default();
        assert_eq!(form.focus, FormField::UnitTitle);

        for _ in 0..FormField::ALL.len() {
            form.focus_next();
        }
        assert_eq!(form.focus, FormField::UnitTitle);

        form.focus_prev();
        assert_eq!(form.focus, FormField::Curriculum);
    }

    #[test]
    fn test_numeric_fields_reject_letters() {
        let mut form = FormState::default();
        form.focus = FormField::NumWeeks;
        form.insert_char('1');
        form.insert_char('a');
        form.insert_char('2');
        assert_eq!(form.num_weeks, "12");
    }

    #[test]
    fn test_newline_only_in_curriculum() {
        let mut form = FormState::default();
        form.focus = FormField::UnitTitle;
        form.insert_newline();
        assert_eq!(form.unit_title, "");

        form.focus = FormField::Curriculum;
        form.insert_newline();
        assert_eq!(form.curriculum, "\n");
    }

    #[test]
    fn test_submit_queues_valid_request() {
        let mut state = filled_state();
        state.submit_form();

        assert!(state.pending_submit.is_some());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_submit_rejects_incomplete_form() {
        let mut state = filled_state();
        state.form.curriculum.clear();
        state.submit_form();

        assert!(state.pending_submit.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn test_submit_blocked_while_in_flight() {
        let mut state = filled_state();
        state.session.in_flight = true;
        state.submit_form();

        assert!(state.pending_submit.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn test_submit_blocked_without_api_key() {
        let mut state = filled_state();
        state.api_configured = false;
        state.submit_form();

        assert!(state.pending_submit.is_none());
        assert!(
            state
                .status_message
                .as_deref()
                .unwrap()
                .contains("GEMINI_API_KEY")
        );
    }

    #[test]
    fn test_sessions_tab_disabled_when_empty() {
        let mut state = filled_state();
        state.session.apply_response("<table/>");
        assert!(!state.session.has_session_plans());

        state.toggle_tab();
        assert_eq!(state.active_tab, PlanTab::LearningPlan);
    }

    #[test]
    fn test_tab_toggle_with_sessions() {
        let mut state = filled_state();
        state.session.apply_response("<table/>\n---SESSION-PLANS---\n<div/>");

        state.toggle_tab();
        assert_eq!(state.active_tab, PlanTab::SessionPlans);
        state.toggle_tab();
        assert_eq!(state.active_tab, PlanTab::LearningPlan);
    }

    #[test]
    fn test_scroll_clamped_to_max() {
        let mut state = filled_state();
        state.plans_max_scroll = 5;
        state.scroll_down(10);
        assert_eq!(state.plans_scroll, 5);
        state.scroll_up(2);
        assert_eq!(state.plans_scroll, 3);
    }
}
