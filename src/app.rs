use chrono::Local;
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::editor::CodeBuffer;
use crate::highlight::{highlight, HighlightSpan};
use crate::ollama::{InferenceError, OllamaClient};
use crate::prompt::{build_prompt, Action, PromptError};
use crate::status::{Status, StatusAnimator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Warning { title: String, message: String },
    ConfirmQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    FindErrors,
    FixCode,
    Clear,
}

impl Button {
    pub fn all() -> [Button; 3] {
        [Button::FindErrors, Button::FixCode, Button::Clear]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Button::FindErrors => "Find Errors",
            Button::FixCode => "Fix Code",
            Button::Clear => "Clear",
        }
    }

    pub fn shortcut(&self) -> &'static str {
        match self {
            Button::FindErrors => "^E",
            Button::FixCode => "^F",
            Button::Clear => "^L",
        }
    }
}

type RequestTask = JoinHandle<Result<String, InferenceError>>;

struct InFlight {
    action: Action,
    generation: u64,
}

pub struct App {
    pub should_quit: bool,
    pub focus: FocusPane,
    pub dialog: Option<Dialog>,

    // Input state
    pub input: CodeBuffer,
    pub highlights: Vec<HighlightSpan>,
    pub input_scroll: u16,
    pub input_hscroll: u16,
    pub input_height: u16,
    pub input_width: u16,

    // Output state
    pub output: String,
    pub output_scroll: u16,
    pub output_height: u16,
    pub total_output_lines: u16,

    // Status line
    pub status: Status,
    pub animator: StatusAnimator,

    // Request state
    pub request_task: Option<RequestTask>,
    in_flight: Option<InFlight>,
    generation: u64, // bumped by Clear so stale replies are dropped

    // Areas for mouse hit-testing (updated during render)
    pub input_area: Option<Rect>,
    pub output_area: Option<Rect>,
    pub button_areas: Vec<(Button, Rect)>,

    // Data
    pub client: OllamaClient,
    pub language: String,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::Input,
            dialog: None,

            input: CodeBuffer::new(),
            highlights: Vec::new(),
            input_scroll: 0,
            input_hscroll: 0,
            input_height: 0,
            input_width: 0,

            output: String::new(),
            output_scroll: 0,
            output_height: 0,
            total_output_lines: 0,

            status: Status::Ready,
            animator: StatusAnimator::default(),

            request_task: None,
            in_flight: None,
            generation: 0,

            input_area: None,
            output_area: None,
            button_areas: Vec::new(),

            client: OllamaClient::new(&config.base_url, &config.model, config.max_tokens),
            language: config.language.clone(),
        }
    }

    pub fn header_title(&self) -> String {
        format!("CodeFixer - Powered by {}", self.client.model())
    }

    pub fn status_line(&self) -> String {
        self.animator.decorate(&self.status)
    }

    pub fn is_busy(&self) -> bool {
        self.request_task.is_some()
    }

    /// Start a request for `action` unless one is already running. Empty input
    /// opens a warning instead and touches nothing else.
    pub fn submit(&mut self, action: Action) {
        if self.request_task.is_some() {
            tracing::debug!(action = action.as_str(), "request already in flight, ignoring");
            return;
        }

        let prompt = match build_prompt(self.input.text(), action, &self.language) {
            Ok(prompt) => prompt,
            Err(PromptError::EmptyInput) => {
                self.dialog = Some(Dialog::Warning {
                    title: "Warning".to_string(),
                    message: action.empty_warning().to_string(),
                });
                return;
            }
        };

        tracing::info!(
            action = action.as_str(),
            model = self.client.model(),
            prompt_len = prompt.len(),
            "starting request"
        );

        self.status = Status::Busy(action);
        self.animator.start();
        self.output.clear();
        self.output_scroll = 0;

        let client = self.client.clone();
        self.in_flight = Some(InFlight { action, generation: self.generation });
        self.request_task = Some(tokio::spawn(async move { client.generate(&prompt).await }));
    }

    /// Apply the result once the background task has finished.
    pub async fn poll_request(&mut self) {
        if self.request_task.as_ref().is_some_and(|task| task.is_finished()) {
            self.finish_request().await;
        }
    }

    /// Wait for the outstanding request, if any, and apply its result.
    pub async fn finish_request(&mut self) {
        let Some(task) = self.request_task.take() else {
            return;
        };
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };

        let result = match task.await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("request task failed: {}", e)),
        };

        if in_flight.generation != self.generation {
            tracing::debug!(action = in_flight.action.as_str(), "dropping reply superseded by clear");
            return;
        }

        match result {
            Ok(text) => {
                tracing::info!(action = in_flight.action.as_str(), response_len = text.len(), "request complete");
                self.output = text;
            }
            Err(e) => {
                tracing::warn!(action = in_flight.action.as_str(), error = %e, "request failed");
                self.output = format!("Error: Could not connect to {} - {}", self.client.model(), e);
            }
        }

        self.animator.stop();
        self.output_scroll = 0;
        self.status = Status::Done {
            action: in_flight.action,
            at: Local::now(),
        };
    }

    /// Reset both text areas and the status line
    pub fn clear(&mut self) {
        self.input.clear();
        self.on_input_changed();
        self.input_scroll = 0;
        self.input_hscroll = 0;

        self.output.clear();
        self.output_scroll = 0;

        self.animator.stop();
        self.status = Status::Ready;
        self.generation += 1;
    }

    pub fn press(&mut self, button: Button) {
        match button {
            Button::FindErrors => self.submit(Action::FindErrors),
            Button::FixCode => self.submit(Action::FixCode),
            Button::Clear => self.clear(),
        }
    }

    /// Rerun highlighting and keep the cursor on screen
    pub fn on_input_changed(&mut self) {
        self.highlights = highlight(self.input.text());
        self.scroll_input_to_cursor();
    }

    /// Move the input viewport so the cursor cell is visible in both directions
    pub fn scroll_input_to_cursor(&mut self) {
        let (row, col) = self.input.cursor_position();
        self.input_scroll = follow(row, self.input_scroll, self.input_height);
        self.input_hscroll = follow(col, self.input_hscroll, self.input_width);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Input => FocusPane::Output,
            FocusPane::Output => FocusPane::Input,
        };
    }

    // Dialogs
    pub fn request_quit(&mut self) {
        self.dialog = Some(Dialog::ConfirmQuit);
    }

    pub fn confirm_quit(&mut self) {
        self.dialog = None;
        self.should_quit = true;
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick(&mut self) {
        self.animator.tick();
    }

    // Output scrolling
    pub fn scroll_output_down(&mut self) {
        if self.output_scroll < self.total_output_lines.saturating_sub(self.output_height) {
            self.output_scroll = self.output_scroll.saturating_add(1);
        }
    }

    pub fn scroll_output_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_output_page_down(&mut self) {
        let max_scroll = self.total_output_lines.saturating_sub(self.output_height);
        self.output_scroll = (self.output_scroll + self.output_height.max(1)).min(max_scroll);
    }

    pub fn scroll_output_page_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(self.output_height.max(1));
    }

    pub fn scroll_output_to_end(&mut self) {
        self.output_scroll = self.total_output_lines.saturating_sub(self.output_height);
    }
}

/// New offset of a viewport of `extent` cells so that `pos` stays inside it.
/// A zero extent (not yet rendered) leaves the offset alone unless `pos` is
/// before it.
fn follow(pos: usize, offset: u16, extent: u16) -> u16 {
    let offset = usize::from(offset);
    let extent = usize::from(extent);
    let next = if pos < offset {
        pos
    } else if extent > 0 && pos >= offset + extent {
        pos + 1 - extent
    } else {
        offset
    };
    u16::try_from(next).unwrap_or(u16::MAX)
}
