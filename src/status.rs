use chrono::{DateTime, Local};

use crate::prompt::Action;

pub const SPINNER_GLYPHS: [&str; 4] = ["|", "/", "—", "\\"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Busy(Action),
    Done { action: Action, at: DateTime<Local> },
}

impl Status {
    /// Status line text, without the spinner suffix
    pub fn text(&self) -> String {
        match self {
            Status::Ready => "Status: Ready".to_string(),
            Status::Busy(action) => format!("Status: {}", action.busy_label()),
            Status::Done { action, at } => {
                format!("Status: {} - {}", action.done_label(), at.format("%H:%M:%S"))
            }
        }
    }
}

/// Cycles the spinner glyphs while a request is outstanding.
#[derive(Debug, Default)]
pub struct StatusAnimator {
    frame: usize,
    running: bool,
}

impl StatusAnimator {
    pub fn start(&mut self) {
        self.frame = 0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.frame = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance one frame; no-op when stopped
    pub fn tick(&mut self) {
        if self.running {
            self.frame = (self.frame + 1) % SPINNER_GLYPHS.len();
        }
    }

    pub fn glyph(&self) -> Option<&'static str> {
        self.running.then(|| SPINNER_GLYPHS[self.frame])
    }

    /// Full status line: the status text plus ` [glyph]` while running
    pub fn decorate(&self, status: &Status) -> String {
        match self.glyph() {
            Some(glyph) => format!("{} [{}]", status.text(), glyph),
            None => status.text(),
        }
    }
}
