//! Terminal rendering

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::menu::{BootMenu, DialogKind};
use crate::navigate::Navigator;

const BOOT_LOG_HEIGHT: u16 = 8;

pub fn draw<N: Navigator>(frame: &mut Frame, menu: &BootMenu<N>) {
    let area = frame.area();

    if menu.is_blackout() {
        frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // Header
            Constraint::Min(3),                  // Entries
            Constraint::Length(3),               // Status
            Constraint::Length(BOOT_LOG_HEIGHT), // Boot log
            Constraint::Length(3),               // Footer
        ])
        .split(area);

    let header = Paragraph::new(format!("  {}", menu.title()))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    frame.render_widget(render_entries(menu), chunks[1]);

    let status_color = if menu.status_board().is_idle() {
        Color::Green
    } else {
        Color::Yellow
    };
    let status = Paragraph::new(format!(" {}", menu.status()))
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(status, chunks[2]);

    frame.render_widget(render_boot_log(menu, chunks[3].height.saturating_sub(2)), chunks[3]);

    let hints = if menu.dialog().is_some() {
        "  [Enter/Esc/Space] Acknowledge  [Ctrl+C] Quit"
    } else {
        "  [↑/↓] Select  [Enter] Boot  [Esc] Exit  [Ctrl+C] Quit"
    };
    let footer = Paragraph::new(hints)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[4]);

    if let Some(dialog) = menu.dialog() {
        let title = match dialog.kind {
            DialogKind::BootComplete => " Boot ",
            DialogKind::ExitMenu => " Exit ",
        };
        let popup = centered_rect(50, 40, area);
        let text = format!("{}\n\n[ OK ]", dialog.text);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(Color::White))
                .block(Block::default().borders(Borders::ALL).title(title)),
            popup,
        );
    }
}

fn render_entries<N: Navigator>(menu: &BootMenu<N>) -> Paragraph<'static> {
    let lines: Vec<Line> = menu
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if menu.is_selected(i) { "> " } else { "  " };
            let mut spans = vec![Span::raw(format!(" {marker}{}", entry.name))];
            if let Some(description) = &entry.description {
                spans.push(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let line = Line::from(spans);
            if menu.is_selected(i) {
                line.style(Style::default().fg(Color::Black).bg(Color::Gray))
            } else {
                line
            }
        })
        .collect();

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Select boot target "))
}

fn render_boot_log<N: Navigator>(menu: &BootMenu<N>, rows: u16) -> Paragraph<'static> {
    let history = menu.status_board().history();
    let skip = history.len().saturating_sub(rows as usize);
    let lines: Vec<Line> = history.skip(skip).map(|line| Line::from(line.to_string())).collect();

    Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(" Boot log "))
}

/// Rect centered in `area`, sized as a percentage of it
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
