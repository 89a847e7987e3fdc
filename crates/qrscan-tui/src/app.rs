//! Front-end state that lives outside the scan session.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use qrscan_core::SessionState;

use crate::action::Action;
use crate::log_buffer::LogBuffer;
use crate::theme::{Palette, Theme};

/// Lines kept visible in the log panel.
pub const LOG_PANEL_LINES: usize = 6;

const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct App {
    pub palette: Palette,
    pub log_buffer: LogBuffer,
    /// Lines scrolled up from the newest log line.
    pub log_scroll: usize,
    /// Transient feedback such as "Copied to clipboard".
    pub notice: Option<String>,
    pub should_quit: bool,
    spinner_tick: usize,
}

impl App {
    pub fn new(theme: Theme, log_buffer: LogBuffer) -> Self {
        Self {
            palette: theme.palette(),
            log_buffer,
            log_scroll: 0,
            notice: None,
            should_quit: false,
            spinner_tick: 0,
        }
    }

    /// Advance the spinner while scanning.
    pub fn tick(&mut self, state: SessionState) {
        if state == SessionState::Scanning {
            self.spinner_tick = self.spinner_tick.wrapping_add(1);
        }
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_CHARS[self.spinner_tick % SPINNER_CHARS.len()]
    }

    pub fn scroll_logs_up(&mut self) {
        let max = self.log_buffer.len().saturating_sub(LOG_PANEL_LINES);
        self.log_scroll = (self.log_scroll + 1).min(max);
    }

    pub fn scroll_logs_down(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    /// Map a key to an action for the current session state.
    pub fn handle_key(&mut self, key: KeyEvent, state: SessionState) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match key.code {
            KeyCode::PageUp => {
                self.scroll_logs_up();
                return None;
            }
            KeyCode::PageDown => {
                self.scroll_logs_down();
                return None;
            }
            KeyCode::End => {
                self.log_scroll = 0;
                return None;
            }
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('c') | KeyCode::Tab => return Some(Action::SwitchCamera),
            _ => {}
        }

        match (state, key.code) {
            (SessionState::Idle, KeyCode::Enter | KeyCode::Char('s')) => Some(Action::StartScan),
            (SessionState::Idle, KeyCode::Esc) => Some(Action::DismissError),
            (SessionState::Scanning, KeyCode::Esc | KeyCode::Char('x')) => Some(Action::StopScan),
            (SessionState::Result, KeyCode::Char('y')) => Some(Action::CopyResult),
            (SessionState::Result, KeyCode::Enter | KeyCode::Char('r')) => {
                Some(Action::ScanAnother)
            }
            _ => None,
        }
    }
}
