//! UI components for the TUI

use super::app::{App, Display, Phase};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;

/// Draw the whole form
pub fn render(frame: &mut Frame, app: &App) {
    let [header, input, action, output] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(frame.area());

    render_header(frame, header);
    render_input(frame, input, app);
    render_action(frame, action, app);
    render_output(frame, output, app);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "URL SUMMARISER",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Summarise any YouTube or website URL",
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(Paragraph::new(text), area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let inner_width = area.width.saturating_sub(2) as usize;
    // Scroll horizontally so the cursor stays visible
    let offset = (app.cursor + 1).saturating_sub(inner_width);
    let visible: String = app.input.chars().skip(offset).collect();

    let style = match app.phase {
        Phase::Idle => Style::default(),
        Phase::Processing => Style::default().fg(Color::DarkGray),
    };
    let field = Paragraph::new(visible)
        .style(style)
        .block(Block::bordered().title(" Paste the URL here "));
    frame.render_widget(field, area);

    if app.phase == Phase::Idle && inner_width > 0 {
        let column = (app.cursor - offset) as u16;
        frame.set_cursor_position(Position::new(area.x + 1 + column, area.y + 1));
    }
}

fn render_action(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.phase {
        Phase::Idle => Line::from(vec![
            Span::styled(" [Enter] ", Style::default().fg(Color::Cyan)),
            Span::raw("Summarise   "),
            Span::styled("[Esc] ", Style::default().fg(Color::Cyan)),
            Span::raw("Quit   "),
            Span::styled("[↑/↓] ", Style::default().fg(Color::Cyan)),
            Span::raw("Scroll"),
        ]),
        Phase::Processing => Line::from(vec![
            Span::styled(format!(" {} ", app.spinner()), Style::default().fg(Color::Yellow)),
            Span::raw("Fetching and summarising content..."),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_output(frame: &mut Frame, area: Rect, app: &App) {
    let error = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    let success = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);

    let lines: Vec<Line> = match &app.display {
        Display::Nothing => vec![Line::from(Span::styled(
            "The summary will appear here.",
            Style::default().fg(Color::DarkGray),
        ))],
        Display::EmptyInput => vec![Line::from(Span::styled("No URL entered.", error))],
        Display::InvalidUrl => vec![Line::from(Span::styled("Invalid URL format.", error))],
        Display::Summary {
            title,
            details,
            text,
        } => {
            let mut lines = vec![
                Line::from(Span::styled("Summary:", success)),
                Line::default(),
                Line::from(Span::styled(
                    title.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            ];
            if let Some(details) = details {
                lines.push(Line::from(Span::styled(
                    details.as_str(),
                    Style::default().fg(Color::Gray),
                )));
            }
            lines.push(Line::default());
            lines.extend(text.lines().map(Line::from));
            lines
        }
        Display::Error { chain } => {
            let mut lines = vec![Line::from(Span::styled("An error occurred:", error))];
            for (depth, message) in chain.iter().enumerate() {
                let prefix = if depth == 0 { "  " } else { "  caused by: " };
                lines.push(Line::from(format!("{prefix}{message}")));
            }
            lines
        }
    };

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0))
        .block(Block::bordered().title(" Output "));
    frame.render_widget(panel, area);
}
