use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use crate::app::{App, Button, Dialog, FocusPane};
use crate::highlight::style_line;

const BUTTON_BG: Color = Color::Rgb(0x2d, 0x52, 0x78);

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, input_area, buttons_area, output_area, status_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Percentage(40),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area);
    render_input(app, frame, input_area);
    render_buttons(app, frame, buttons_area);
    render_output(app, frame, output_area);
    render_status(app, frame, status_area);
    render_footer(app, frame, footer_area);

    match &app.dialog {
        Some(Dialog::Warning { title, message }) => {
            render_dialog(frame, area, title, message, "[Enter] OK", Color::Yellow)
        }
        Some(Dialog::ConfirmQuit) => render_dialog(
            frame,
            area,
            "Quit",
            "Do you want to quit?",
            "[y] OK   [n] Cancel",
            Color::Cyan,
        ),
        None => {}
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", app.header_title()), Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn border_color(focused: bool) -> Color {
    if focused { Color::Cyan } else { Color::DarkGray }
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Input;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(" Enter Your Code: ");

    let inner = block.inner(area);
    app.input_area = Some(area);
    app.input_height = inner.height;
    app.input_width = inner.width;
    app.scroll_input_to_cursor();

    let lines: Vec<Line> = app
        .input
        .lines_with_offsets()
        .into_iter()
        .map(|(offset, line)| style_line(line, offset, &app.highlights))
        .collect();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.input_scroll, app.input_hscroll));
    frame.render_widget(paragraph, area);

    // Show cursor when typing
    if focused && app.dialog.is_none() {
        let (row, col) = app.input.cursor_position();
        let cursor_x = viewport_offset(col, app.input_hscroll, inner.width);
        let cursor_y = viewport_offset(row, app.input_scroll, inner.height);
        if let (Some(x), Some(y)) = (cursor_x, cursor_y) {
            frame.set_cursor_position((inner.x + x, inner.y + y));
        }
    }
}

/// Position of `pos` inside a viewport starting at `scroll`, if it is visible
fn viewport_offset(pos: usize, scroll: u16, extent: u16) -> Option<u16> {
    pos.checked_sub(usize::from(scroll))
        .and_then(|offset| u16::try_from(offset).ok())
        .filter(|offset| *offset < extent)
}

fn render_buttons(app: &mut App, frame: &mut Frame, area: Rect) {
    app.button_areas.clear();

    let busy = app.is_busy();
    let mut x = area.x + 1;
    for button in Button::all() {
        let label = format!(" {} {} ", button.label(), button.shortcut());
        let width = (label.chars().count() as u16).min(area.right().saturating_sub(x));
        if width == 0 {
            break;
        }
        let rect = Rect::new(x, area.y, width, 1);

        // Request buttons look inert while a reply is pending
        let style = if busy && button != Button::Clear {
            Style::default().bg(Color::DarkGray).fg(Color::Gray)
        } else {
            Style::default().bg(BUTTON_BG).fg(Color::White).add_modifier(Modifier::BOLD)
        };
        frame.render_widget(Paragraph::new(label).style(style), rect);

        app.button_areas.push((button, rect));
        x = x.saturating_add(width + 2);
    }
}

fn render_output(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Output;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(" Analysis & Suggestions: ");

    let inner = block.inner(area);
    app.output_area = Some(area);
    app.output_height = inner.height;

    if app.output.is_empty() {
        let hint = if app.is_busy() {
            format!("Waiting for {}...", app.client.model())
        } else {
            String::new()
        };
        let placeholder = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .block(block);
        app.total_output_lines = 0;
        frame.render_widget(placeholder, area);
        return;
    }

    // Count rows before the block is attached so borders are not included
    let paragraph = Paragraph::new(app.output.as_str()).wrap(Wrap { trim: false });
    let rows = paragraph.line_count(inner.width);
    app.total_output_lines = u16::try_from(rows).unwrap_or(u16::MAX);

    let paragraph = paragraph.block(block).scroll((app.output_scroll, 0));
    frame.render_widget(paragraph, area);

    if app.total_output_lines > app.output_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(app.total_output_lines as usize)
            .position(app.output_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let color = if app.animator.is_running() { Color::Yellow } else { Color::Gray };
    let status = Paragraph::new(format!(" {}", app.status_line())).style(Style::default().fg(color));
    frame.render_widget(status, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" ^E ", key_style),
        Span::styled(" find errors ", label_style),
        Span::styled(" ^F ", key_style),
        Span::styled(" fix code ", label_style),
        Span::styled(" ^L ", key_style),
        Span::styled(" clear ", label_style),
    ];

    match app.focus {
        FocusPane::Input => hints.extend(vec![
            Span::styled(" S-Tab ", key_style),
            Span::styled(" output ", label_style),
        ]),
        FocusPane::Output => hints.extend(vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" input ", label_style),
        ]),
    }

    hints.extend(vec![
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer = Paragraph::new(Line::from(hints)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_dialog(frame: &mut Frame, area: Rect, title: &str, message: &str, keys: &str, color: Color) {
    // Calculate popup size and position (centered)
    let content_width = message.chars().count().max(keys.chars().count()) as u16 + 4;
    let popup_width = content_width.max(30).min(area.width.saturating_sub(4));
    let popup_height = 6.min(area.height);

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", title));

    let text = Text::from(vec![
        Line::default(),
        Line::from(message.to_string()).centered(),
        Line::default(),
        Line::from(Span::styled(keys.to_string(), Style::default().fg(Color::DarkGray))).centered(),
    ]);

    frame.render_widget(Paragraph::new(text).block(block), popup_area);
}
