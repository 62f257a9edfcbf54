// pacer-tui/src/ui/calendar_tab.rs
use crate::app::App;
use pacer_lib::{format_hms, WEEKDAY_HEADERS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render_calendar_tab(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(0)])
        .split(area);

    render_month(f, app, chunks[0]);
    render_recent(f, app, chunks[1]);
}

fn render_month(f: &mut Frame, app: &App, area: Rect) {
    let Some(grid) = &app.calendar else {
        let placeholder = Paragraph::new("No calendar data")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(placeholder, area);
        return;
    };

    let header = Row::new(WEEKDAY_HEADERS)
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = grid.weeks.iter().map(|week| {
        Row::new(week.iter().map(|slot| match slot {
            None => Cell::from(""),
            Some(day) => {
                let mut style = Style::default();
                if day.completed {
                    style = style.fg(Color::Black).bg(Color::Green);
                }
                if day.today {
                    style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                }
                Cell::from(format!("{:>3}", day.day)).style(style)
            }
        }))
    });

    let title = format!("{} ({} done)", grid.title(), grid.completed_days());
    let table = Table::new(rows, [Constraint::Length(4); 7])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, area);
}

fn render_recent(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Recent Sessions");
    let history = match app.service.list_history(20) {
        Ok(h) => h,
        Err(e) => {
            f.render_widget(Paragraph::new(format!("Error: {e}")).block(block), area);
            return;
        }
    };

    let header = Row::new(["Date", "Day", "Variant", "Time"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows = history.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.date.format("%Y-%m-%d").to_string()),
            Cell::from(r.day_name.clone()),
            Cell::from(r.variant.clone().unwrap_or_else(|| "-".to_string())),
            Cell::from(format_hms(r.elapsed_sec)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}
