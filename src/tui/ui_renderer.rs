use super::app_logic::TuiApp;
use crate::selection::{Mode, Phase};
use ratatui::{
    layout::Margin,
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

fn draw_help_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let help_text_lines_content = match app.model.mode() {
        Mode::Browse => vec![
            Line::from("j/k/arrows: Nav | space/m: Select | c: Clear | .: Hidden | /: Filter"),
            Line::from("y/enter: Copy & quit | q/ctrl+c: Quit"),
        ],
        Mode::Filter { .. } => vec![
            Line::from("type: Query | backspace: Delete | ctrl+j/k: Nav | enter: Select"),
            Line::from("esc: Clear filter | ctrl+y: Copy & quit | ctrl+c: Quit"),
        ],
    };
    let hidden_state = if app.model.show_hidden() {
        "shown"
    } else {
        "hidden"
    };
    let help_paragraph = Paragraph::new(help_text_lines_content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("yank (hidden paths {})", hidden_state)),
    );
    f.render_widget(help_paragraph, area);
}

fn draw_main_list_block(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    app.list_viewport_height = area.height.saturating_sub(2) as usize;
    app.ensure_focus_visible_in_viewport();

    let list_items: Vec<ListItem> = app
        .model
        .items()
        .skip(app.scroll_offset)
        .take(app.list_viewport_height)
        .map(|item| {
            let checkbox = if item.selected {
                Span::styled("[x] ", Style::default().fg(Color::Green))
            } else {
                Span::raw("[ ] ")
            };
            ListItem::new(Line::from(vec![checkbox, Span::raw(item.path)]))
        })
        .collect();

    let list_widget = List::new(list_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.model.title()),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::LightBlue),
        )
        .highlight_symbol("❯ ");

    let mut list_state_for_view = ListState::default();
    if let Some(pos) = app.model.cursor()
        && pos >= app.scroll_offset
        && pos < app.scroll_offset + app.list_viewport_height
    {
        list_state_for_view.select(Some(pos - app.scroll_offset));
    }
    f.render_stateful_widget(list_widget, area, &mut list_state_for_view);
}

fn draw_status_line(f: &mut Frame, app: &TuiApp, area: Rect) {
    let style = match app.model.mode() {
        Mode::Filter { .. } => Style::default().fg(Color::Magenta),
        Mode::Browse => Style::default().fg(Color::DarkGray),
    };
    f.render_widget(Paragraph::new(app.model.status_line()).style(style), area);
}

fn draw_error(f: &mut Frame, message: &str, area: Rect) {
    let text = vec![
        Line::styled(format!("Error: {}", message), Style::default().fg(Color::Red)),
        Line::from(""),
        Line::styled("Press q to exit.", Style::default().fg(Color::DarkGray)),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), area);
}

pub(super) fn ui_frame(frame: &mut Frame, app: &mut TuiApp) {
    let help_lines = 2;

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(help_lines + 2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    if let Phase::Failed(message) = app.model.phase() {
        let area = frame.area().inner(Margin::new(2, 1));
        draw_error(frame, message, area);
        return;
    }

    draw_help_block(frame, app, main_chunks[0]);
    draw_main_list_block(frame, app, main_chunks[1]);
    draw_status_line(frame, app, main_chunks[2]);
}
