// pacer-tui/src/ui/status_bar.rs
use crate::app::{ActiveModal, ActiveTab, App};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.active_modal {
        ActiveModal::None => match app.active_tab {
            ActiveTab::Plan => " [↑↓/jk] Day | [s]tart | [p/Space] Pause | [r]eset | [x] Cancel | [v]ariant | [?] Help | [q]uit ",
            ActiveTab::Calendar => " [←→/hl] Month | [t]oday | [?] Help | [q]uit ",
        },
        ActiveModal::Help => " [Esc/Enter/?] Close Help ",
        ActiveModal::ConfirmCancel => " [y/Enter] Cancel session | [n/Esc] Keep going ",
    };

    let error_text = app.last_error.as_deref().unwrap_or("");

    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(area);

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_paragraph, status_chunks[0]);

    let error_paragraph = Paragraph::new(error_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::Red))
        .alignment(Alignment::Right);
    f.render_widget(error_paragraph, status_chunks[1]);
}
