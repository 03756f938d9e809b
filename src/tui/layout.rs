use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::config::{ColorConfig, KeybindingConfig};
use crate::reader::ReaderState;
use crate::tui::app::TuiApp;

pub fn render(
    frame: &mut Frame,
    app: &mut TuiApp,
    state: &ReaderState,
    colors: &ColorConfig,
    keys: &KeybindingConfig,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Chapter text
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_body(frame, app, state, chunks[0], colors, keys);
    render_status_bar(frame, app, state, chunks[1], colors, keys);
}

fn render_body(
    frame: &mut Frame,
    app: &mut TuiApp,
    state: &ReaderState,
    area: Rect,
    colors: &ColorConfig,
    keys: &KeybindingConfig,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    match state {
        ReaderState::Displaying(chapter) => {
            let title = match app.position(chapter) {
                Some(pos) => format!(" {} ({}) ", chapter.display_title(), pos),
                None => format!(" {} ", chapter.display_title()),
            };
            let block = block.title(Line::styled(
                title,
                Style::default().fg(colors.title).add_modifier(Modifier::BOLD),
            ));
            let inner = block.inner(area);
            // one column of padding on each side
            app.viewport.resize(inner.width.saturating_sub(2), inner.height);

            // only the viewport's slots are turned into widgets
            let lines: Vec<Line> = app
                .viewport
                .visible_lines()
                .into_iter()
                .map(|line| Line::styled(format!(" {}", line), Style::default().fg(colors.text)))
                .collect();
            frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
        }
        ReaderState::Loading(id) => {
            let text = format!("Loading {}…", id.slug());
            let paragraph = Paragraph::new(text)
                .style(Style::default().fg(colors.loading))
                .alignment(Alignment::Center)
                .block(block.title(" chireader "));
            frame.render_widget(paragraph, centered(area));
        }
        ReaderState::Error { target, error } => {
            let hints = [
                KeybindingConfig::hint(&keys.retry, "Retry"),
                KeybindingConfig::hint(&keys.quit, "Quit"),
            ];
            let hints: Vec<String> = hints.into_iter().flatten().collect();
            let lines = vec![
                Line::styled(
                    format!("Could not load {}", target.slug()),
                    Style::default().fg(colors.error).add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::from(error.to_string()),
                Line::from(""),
                Line::from(hints.join("  ")),
            ];
            let paragraph = Paragraph::new(Text::from(lines))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block.title(" Error "));
            frame.render_widget(paragraph, area);
        }
        ReaderState::Idle => {
            frame.render_widget(Paragraph::new("").block(block), area);
        }
    }
}

fn render_status_bar(
    frame: &mut Frame,
    app: &TuiApp,
    state: &ReaderState,
    area: Rect,
    colors: &ColorConfig,
    keys: &KeybindingConfig,
) {
    let status = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if let Some(chapter) = state.chapter() {
        let percent = (app.viewport.progress() * 100.0).round() as u32;
        let hints = [
            KeybindingConfig::hint(&keys.scroll_down, "Scroll"),
            KeybindingConfig::hint(&keys.page_down, "Page"),
            chapter
                .has_prev()
                .then(|| KeybindingConfig::hint(&keys.prev_chapter, "Prev"))
                .flatten(),
            chapter
                .has_next()
                .then(|| KeybindingConfig::hint(&keys.next_chapter, "Next"))
                .flatten(),
            KeybindingConfig::hint(&keys.open_in_browser, "Open"),
            KeybindingConfig::hint(&keys.quit, "Quit"),
        ];
        let hints: Vec<String> = hints.into_iter().flatten().collect();
        format!("{:>3}%  {}", percent, hints.join("  "))
    } else {
        KeybindingConfig::hint(&keys.quit, "Quit").unwrap_or_default()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

fn centered(area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(3), Constraint::Fill(1)])
        .split(area);
    vertical[1]
}
