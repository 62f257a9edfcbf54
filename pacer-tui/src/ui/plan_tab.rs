// pacer-tui/src/ui/plan_tab.rs
use crate::app::App;
use pacer_lib::{format_hms, format_mmss, format_speed, SchedulerState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

pub fn render_plan_tab(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(0)])
        .split(area);

    render_day_list(f, app, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Details
            Constraint::Min(5),    // Checklist
            Constraint::Length(3), // Gauge
        ])
        .split(chunks[1]);

    render_details(f, app, right[0]);
    render_checklist(f, app, right[1]);
    render_unit_gauge(f, app, right[2]);
}

fn render_day_list(f: &mut Frame, app: &mut App, area: Rect) {
    let default_day = app.service.config.default_day.as_str();
    let items: Vec<ListItem> = app
        .service
        .catalog()
        .workouts()
        .iter()
        .map(|w| {
            let marker = if w.has_variants() { " +" } else { "" };
            let item = ListItem::new(format!("{}{marker}", w.day));
            if w.day == default_day {
                item.style(Style::default().add_modifier(Modifier::ITALIC))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Days")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.day_list_state);
}

fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let workout = app.session.workout();
    let units = app.service.config.units;

    let mut title = vec![Span::styled(
        workout.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(variant) = &workout.active_variant {
        title.push(Span::raw(format!("  [{variant}]")).fg(Color::Cyan));
    }

    let goal_line = match app.service.goal_pace() {
        Ok(goal) => format!(
            "Goal: {} m in {} ({})",
            goal.distance_m(),
            format_mmss(goal.goal_time_sec()),
            format_speed(goal.speed_mps(), units)
        ),
        Err(e) => format!("Goal: {e}"),
    };

    let lines = vec![
        Line::from(title),
        Line::styled(goal_line, Style::default().fg(Color::DarkGray)),
        Line::from(workout.explanation.clone()),
        Line::from(vec![
            Span::styled("Warm-up: ", Style::default().bold()),
            Span::raw(workout.warmup.join(", ")),
        ]),
        Line::from(vec![
            Span::styled("Mobility: ", Style::default().bold()),
            Span::raw(workout.mobility.join(", ")),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(workout.day.clone()),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_checklist(f: &mut Frame, app: &App, area: Rect) {
    let scheduler = app.session.scheduler();
    let checklist = app.session.checklist();
    let units = app.service.config.units;

    let header = Row::new(["", "#", "Unit", "Speed", "Time"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows = app
        .session
        .units()
        .iter()
        .zip(checklist.rows())
        .enumerate()
        .map(|(i, (unit, row))| {
            let checkbox = if row.checked { "[x]" } else { "[ ]" };
            let time = if row.active {
                scheduler
                    .remaining_sec()
                    .map_or_else(|| format_mmss(unit.duration_sec), format_mmss)
            } else {
                format_mmss(unit.duration_sec)
            };
            let speed = unit
                .target_speed_mps
                .map_or_else(|| "-".to_string(), |s| format_speed(s, units));

            let style = if row.active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if row.checked {
                Style::default().fg(Color::Green)
            } else if unit.is_rest() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(checkbox),
                Cell::from((i + 1).to_string()),
                Cell::from(unit.label.clone()),
                Cell::from(speed),
                Cell::from(time),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(6),
    ];

    let title = format!(
        "Reps ({}/{} done)",
        checklist.completed_count(),
        checklist.rows().len()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">");

    // Keep the running row in view
    let mut state = TableState::default();
    state.select(checklist.active_index());
    f.render_stateful_widget(table, area, &mut state);
}

fn render_unit_gauge(f: &mut Frame, app: &App, area: Rect) {
    let scheduler = app.session.scheduler();
    let state = scheduler.state();

    let (ratio, label) = match state {
        SchedulerState::Idle => (0.0, "Press [s] to start".to_string()),
        SchedulerState::Completed => (1.0, "Done".to_string()),
        SchedulerState::Cancelled => (
            scheduler.progress_fraction().unwrap_or(0.0),
            "Cancelled".to_string(),
        ),
        SchedulerState::Running | SchedulerState::Paused => {
            let unit_label = scheduler
                .current_unit()
                .map(|u| u.label.as_str())
                .unwrap_or_default();
            let remaining = scheduler.remaining_sec().unwrap_or(0);
            (
                scheduler.progress_fraction().unwrap_or(0.0),
                format!("{unit_label}  {}", format_mmss(remaining)),
            )
        }
    };

    let state_text = match state {
        SchedulerState::Idle => "Ready",
        SchedulerState::Running => "Running",
        SchedulerState::Paused => "Paused",
        SchedulerState::Completed => "Completed",
        SchedulerState::Cancelled => "Cancelled",
    };
    let title = format!(
        "{state_text} | Elapsed {}",
        format_hms(scheduler.elapsed_sec())
    );

    let color = if state == SchedulerState::Paused {
        Color::Yellow
    } else {
        Color::Green
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}
