// pacer-tui/src/ui/modals.rs
use crate::{
    app::{ActiveModal, App},
    ui::layout::centered_rect,
};
use ratatui::{
    layout::{Alignment, Margin},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_modal(f: &mut Frame, app: &App) {
    match &app.active_modal {
        ActiveModal::Help => render_help_modal(f),
        ActiveModal::ConfirmCancel => render_confirm_cancel_modal(f, app),
        ActiveModal::None => {}
    }
}

fn render_help_modal(f: &mut Frame) {
    let block = Block::default()
        .title("Help (?)")
        .borders(Borders::ALL)
        .title_style(Style::new().bold())
        .border_style(Style::new().yellow());
    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let help_text = vec![
        Line::from("--- Global ---").style(Style::new().bold().underlined()),
        Line::from(" q: Quit"),
        Line::from(" ?: Show/Hide This Help"),
        Line::from(" F1-F2: Switch Tabs"),
        Line::from(""),
        Line::from("--- Plan Tab (F1) ---").style(Style::new().bold().underlined()),
        Line::from(" k / ↑, j / ↓: Select Day (resets the timer)"),
        Line::from(" s: Start the timer"),
        Line::from(" p / Space: Pause or Resume"),
        Line::from(" r: Reset to the first rep"),
        Line::from(" x: Cancel the running session"),
        Line::from(" v: Next Variant (days marked +)"),
        Line::from(""),
        Line::from("--- Calendar Tab (F2) ---").style(Style::new().bold().underlined()),
        Line::from(" h / ←, l / →: Previous / Next Month"),
        Line::from(" t: Jump to This Month"),
        Line::from(" Green days have a completed session"),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc, ?, or Enter to close ",
            Style::new().italic().yellow(),
        )),
    ];

    let paragraph = Paragraph::new(help_text).wrap(Wrap { trim: false });
    f.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn render_confirm_cancel_modal(f: &mut Frame, app: &App) {
    let workout = app.session.workout();
    let block = Block::default()
        .title("Cancel Session")
        .borders(Borders::ALL)
        .border_style(Style::new().red());
    let area = centered_rect(40, 20, f.size());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(format!("Stop {} - {}?", workout.day, workout.title)),
        Line::from(""),
        Line::from("The session will not be recorded.").style(Style::new().italic()),
        Line::from(""),
        Line::from("[y] Yes    [n] No").style(Style::new().bold()),
    ];
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
