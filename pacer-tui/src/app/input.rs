// pacer-tui/src/app/input.rs
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use super::{ActiveModal, ActiveTab, App};

impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Handle based on active modal first
        if self.active_modal != ActiveModal::None {
            self.handle_modal_input(key);
            return Ok(());
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.active_modal = ActiveModal::Help,
            KeyCode::F(1) => self.active_tab = ActiveTab::Plan,
            KeyCode::F(2) => {
                self.active_tab = ActiveTab::Calendar;
                self.refresh_calendar();
            }
            _ => match self.active_tab {
                ActiveTab::Plan => self.handle_plan_input(key),
                ActiveTab::Calendar => self.handle_calendar_input(key),
            },
        }
        Ok(())
    }

    fn handle_modal_input(&mut self, key: KeyEvent) {
        match self.active_modal {
            ActiveModal::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                    self.active_modal = ActiveModal::None;
                }
            }
            ActiveModal::ConfirmCancel => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.cancel_session();
                    self.active_modal = ActiveModal::None;
                }
                KeyCode::Char('n') | KeyCode::Esc => self.active_modal = ActiveModal::None,
                _ => {}
            },
            ActiveModal::None => {}
        }
    }

    fn handle_plan_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('s') => self.start_session(),
            KeyCode::Char('p' | ' ') => self.toggle_pause(),
            KeyCode::Char('r') => self.reset_session(),
            KeyCode::Char('x') => {
                if self.session_is_active() {
                    self.active_modal = ActiveModal::ConfirmCancel;
                }
            }
            KeyCode::Char('v') => self.cycle_variant(),
            KeyCode::Char('k') | KeyCode::Up => self.day_list_previous(),
            KeyCode::Char('j') | KeyCode::Down => self.day_list_next(),
            _ => {}
        }
    }

    fn handle_calendar_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.change_month(-1),
            KeyCode::Char('l') | KeyCode::Right => self.change_month(1),
            KeyCode::Char('t') => self.calendar_to_today(),
            _ => {}
        }
    }
}
