//! TUI views and rendering
//!
//! All rendering logic is contained here. The views module draws the UI
//! from AppState but only writes back the render-derived scroll bound.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use tracing::trace;

use super::state::{AppState, FormField, PlanTab, View};

/// Status colors
mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const FOCUS: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const WARNING: Color = Color::Rgb(255, 215, 0); // Gold
    pub const STREAMING: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const DIM: Color = Color::DarkGray;
}

/// Spinner frames for the streaming indicator
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function
pub fn render(state: &mut AppState, frame: &mut Frame) {
    trace!(?state.current_view, "render: called");
    // Main layout: header, banner, content, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Banner (error/warning/status)
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);
    render_banner(state, frame, chunks[1]);

    match state.current_view {
        View::Form => render_form_view(state, frame, chunks[2]),
        View::Plans => render_plans_view(state, frame, chunks[2]),
    }

    render_footer(state, frame, chunks[3]);
}

/// Render header with the app name, view name, and streaming indicator
fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    let view_name = match state.current_view {
        View::Form => "Form",
        View::Plans => "Plans",
    };

    let mut spans = vec![
        Span::styled(
            "planforge",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" · {}", view_name), Style::default().fg(colors::DIM)),
    ];

    if let Some(start) = state.streaming_start {
        let elapsed = start.elapsed();
        let frame_idx = (elapsed.as_millis() / 100) as usize % SPINNER.len();
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!(
                "{} {}… {}s · {}",
                SPINNER[frame_idx],
                state.streaming_word,
                elapsed.as_secs(),
                format_bytes(state.streaming_received),
            ),
            Style::default().fg(colors::STREAMING),
        ));
        if let Some(tokens) = state.streaming_input_tokens {
            spans.push(Span::styled(
                format!(" · {} input tokens", tokens),
                Style::default().fg(colors::DIM),
            ));
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

/// Render the single banner line: error > warning > status
fn render_banner(state: &AppState, frame: &mut Frame, area: Rect) {
    let line = if let Some(error) = &state.session.error {
        Line::from(Span::styled(
            format!(" Error: {}", error),
            Style::default().fg(colors::ERROR),
        ))
    } else if let Some(warning) = &state.session.warning {
        Line::from(Span::styled(
            format!(" Warning: {}", warning),
            Style::default().fg(colors::WARNING),
        ))
    } else if let Some(status) = &state.status_message {
        Line::from(Span::styled(format!(" {}", status), Style::default().fg(colors::DIM)))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the form view
fn render_form_view(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_form_view: called");
    let mut constraints = vec![
        Constraint::Length(3), // Unit title
        Constraint::Length(3), // Level
        Constraint::Length(3), // Trainer
        Constraint::Length(3), // Weeks + lessons row
        Constraint::Min(5),    // Curriculum
    ];
    if !state.api_configured {
        constraints.insert(0, Constraint::Length(4));
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut idx = 0;
    if !state.api_configured {
        render_config_error(state, frame, rows[idx]);
        idx += 1;
    }

    render_form_field(state, FormField::UnitTitle, frame, rows[idx]);
    render_form_field(state, FormField::Level, frame, rows[idx + 1]);
    render_form_field(state, FormField::TrainerName, frame, rows[idx + 2]);

    let counts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[idx + 3]);
    render_form_field(state, FormField::NumWeeks, frame, counts[0]);
    render_form_field(state, FormField::LessonsPerWeek, frame, counts[1]);

    render_form_field(state, FormField::Curriculum, frame, rows[idx + 4]);
}

/// Render the static configuration-error banner shown when the key is absent
fn render_config_error(state: &AppState, frame: &mut Frame, area: Rect) {
    let text = format!(
        "Configuration Error: the {} environment variable is not available. \
         Generation is disabled until it is set.",
        state.api_key_env
    );
    let banner = Paragraph::new(text)
        .style(Style::default().fg(colors::ERROR))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(colors::ERROR)));
    frame.render_widget(banner, area);
}

/// Render one labeled form field
fn render_form_field(state: &AppState, field: FormField, frame: &mut Frame, area: Rect) {
    let focused = state.form.focus == field;
    let border_style = if focused {
        Style::default().fg(colors::FOCUS)
    } else {
        Style::default().fg(colors::DIM)
    };
    let title_style = if focused {
        Style::default().fg(colors::FOCUS).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut value = state.form.field(field).to_string();
    if focused {
        value.push('▏');
    }

    let widget = Paragraph::new(value).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(field.label(), title_style)),
    );
    frame.render_widget(widget, area);
}

/// Render the tabbed plans view
fn render_plans_view(state: &mut AppState, frame: &mut Frame, area: Rect) {
    trace!("render_plans_view: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_tabs_bar(state, frame, chunks[0]);

    if state.session.in_flight {
        render_loading(state, frame, chunks[1]);
        return;
    }
    if !state.session.has_results() {
        render_placeholder(frame, chunks[1]);
        return;
    }

    render_plans_content(state, frame, chunks[1]);
}

fn render_tabs_bar(state: &AppState, frame: &mut Frame, area: Rect) {
    let sessions_style = if state.session.has_session_plans() {
        Style::default()
    } else {
        Style::default().fg(colors::DIM)
    };

    let titles = vec![
        Line::from(PlanTab::LearningPlan.title()),
        Line::from(Span::styled(PlanTab::SessionPlans.title(), sessions_style)),
    ];

    let selected = match state.active_tab {
        PlanTab::LearningPlan => 0,
        PlanTab::SessionPlans => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(tabs, area);
}

/// Render the whole-duration loading indicator (no partial results)
fn render_loading(state: &AppState, frame: &mut Frame, area: Rect) {
    let elapsed = state.streaming_start.map(|s| s.elapsed().as_secs()).unwrap_or(0);
    let text = format!(
        "{}… the plans are being generated. Please wait. ({}s, {} received)",
        state.streaming_word,
        elapsed,
        format_bytes(state.streaming_received),
    );
    let widget = Paragraph::new(text)
        .style(Style::default().fg(colors::STREAMING))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_placeholder(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "Your plans await.\n\nFill out the form and press Ctrl+G to generate \
         your customized learning materials.",
    )
    .style(Style::default().fg(colors::DIM))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

/// Render the active tab's generated content as markdown
fn render_plans_content(state: &mut AppState, frame: &mut Frame, area: Rect) {
    let content = match state.active_tab {
        PlanTab::LearningPlan => &state.learning_plan_md,
        PlanTab::SessionPlans => &state.session_plans_md,
    };

    let inner_width = area.width.saturating_sub(2).max(1);
    let inner_height = area.height.saturating_sub(2);
    let total_lines = wrapped_line_count(content, inner_width);
    let max_scroll = total_lines.saturating_sub(inner_height);
    let scroll = state.plans_scroll.min(max_scroll);

    let text = tui_markdown::from_str(content);
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);

    state.plans_max_scroll = max_scroll;
    state.plans_scroll = scroll;
}

/// Render footer with context-sensitive keybinds
fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let binds: &[(&str, &str)] = match state.current_view {
        View::Form => &[
            ("Tab", "next field"),
            ("Enter", "newline in curriculum"),
            ("Ctrl+G", "generate"),
            ("Esc", "results"),
            ("Ctrl+Q", "quit"),
        ],
        View::Plans => &[
            ("Tab", "switch tab"),
            ("j/k", "scroll"),
            ("e", "export tab"),
            ("a", "export both"),
            ("Esc", "form"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in binds.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(colors::DIM)));
        }
        spans.push(Span::styled(*key, Style::default().fg(colors::KEYBIND)));
        spans.push(Span::styled(format!(" {}", action), Style::default().fg(colors::DIM)));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Count display lines after wrapping to the given width
fn wrapped_line_count(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let mut count: usize = 0;
    for line in text.lines() {
        let chars = line.chars().count();
        count += chars.div_ceil(width).max(1);
    }
    count.min(u16::MAX as usize) as u16
}

/// Human-readable byte count for the streaming indicator
fn format_bytes(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_wrapped_line_count() {
        // Three short lines, width 80
        assert_eq!(wrapped_line_count("a\nb\nc", 80), 3);
        // One 100-char line at width 40 wraps to 3 display lines
        let long = "x".repeat(100);
        assert_eq!(wrapped_line_count(&long, 40), 3);
        // Empty lines still take a row
        assert_eq!(wrapped_line_count("a\n\nb", 80), 3);
    }
}
