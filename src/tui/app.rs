//! TUI application controller
//!
//! Owns the AppState and translates key events into state mutations.
//! No rendering and no IO here - file writes and network calls live in the
//! runner, driven by the pending_* fields this controller sets.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use super::state::{AppState, PendingExport, View};

/// TUI application controller
pub struct App {
    state: AppState,
}

impl App {
    pub fn new(api_configured: bool, api_key_env: impl Into<String>) -> Self {
        debug!("App::new: called");
        Self {
            state: AppState::new(api_configured, api_key_env),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Handle a key event. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        // Global shortcuts
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            debug!("App::handle_key: quit shortcut");
            self.state.should_quit = true;
            return true;
        }

        match self.state.current_view {
            View::Form => self.handle_form_key(key),
            View::Plans => self.handle_plans_key(key),
        }

        self.state.should_quit
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('g') = key.code {
                debug!("App::handle_form_key: generate shortcut");
                self.state.submit_form();
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.state.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.state.form.focus_prev(),
            KeyCode::Enter => {
                if self.state.form.focus.is_multiline() {
                    self.state.form.insert_newline();
                } else {
                    self.state.form.focus_next();
                }
            }
            KeyCode::Backspace => self.state.form.backspace(),
            KeyCode::Esc => {
                // Back to the results if there are any
                if self.state.session.has_results() {
                    debug!("App::handle_form_key: returning to plans view");
                    self.state.current_view = View::Plans;
                }
            }
            KeyCode::Char(c) => self.state.form.insert_char(c),
            _ => {}
        }
    }

    fn handle_plans_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                debug!("App::handle_plans_key: quit");
                self.state.should_quit = true;
            }
            KeyCode::Esc => {
                debug!("App::handle_plans_key: back to form");
                self.state.current_view = View::Form;
            }
            KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.state.toggle_tab();
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(1),
            KeyCode::PageDown => self.state.scroll_down(10),
            KeyCode::PageUp => self.state.scroll_up(10),
            KeyCode::Char('g') => self.state.plans_scroll = 0,
            KeyCode::Char('e') => {
                debug!("App::handle_plans_key: export active tab");
                self.state.pending_export = Some(PendingExport::ActiveTab);
            }
            KeyCode::Char('a') => {
                debug!("App::handle_plans_key: export both documents");
                self.state.pending_export = Some(PendingExport::Both);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::state::{FormField, PlanTab};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_with_results() -> App {
        let mut app = App::new(true, "GEMINI_API_KEY");
        app.state_mut()
            .session
            .apply_response("<table/>\n---SESSION-PLANS---\n<div/>");
        app.state_mut().current_view = View::Plans;
        app
    }

    #[test]
    fn test_typing_fills_focused_field() {
        let mut app = App::new(true, "GEMINI_API_KEY");
        app.handle_key(key(KeyCode::Char('H')));
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.state().form.unit_title, "Hi");
    }

    #[test]
    fn test_tab_moves_focus() {
        let mut app = App::new(true, "GEMINI_API_KEY");
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state().form.focus, FormField::Level);
    }

    #[test]
    fn test_ctrl_q_quits() {
        let mut app = App::new(true, "GEMINI_API_KEY");
        assert!(app.handle_key(ctrl('q')));
        assert!(app.state().should_quit);
    }

    #[test]
    fn test_ctrl_g_submits() {
        let mut app = App::new(true, "GEMINI_API_KEY");
        app.handle_key(ctrl('g'));
        // Empty form: validation error recorded, nothing queued
        assert!(app.state().pending_submit.is_none());
        assert!(app.state().status_message.is_some());
    }

    #[test]
    fn test_plans_view_export_key() {
        let mut app = app_with_results();
        app.handle_key(key(KeyCode::Char('e')));
        assert_eq!(app.state().pending_export, Some(PendingExport::ActiveTab));
    }

    #[test]
    fn test_plans_view_tab_switches() {
        let mut app = app_with_results();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state().active_tab, PlanTab::SessionPlans);
    }

    #[test]
    fn test_esc_returns_to_form() {
        let mut app = app_with_results();
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state().current_view, View::Form);
    }

    #[test]
    fn test_release_events_ignored() {
        let mut app = App::new(true, "GEMINI_API_KEY");
        let mut release = key(KeyCode::Char('x'));
        release.kind = KeyEventKind::Release;
        app.handle_key(release);
        assert_eq!(app.state().form.unit_title, "");
    }
}
