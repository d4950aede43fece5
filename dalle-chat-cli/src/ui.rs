use crate::app::{App, Phase};
use dalle_chat_shared::MessageRole;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_chat(f, app, chunks[0]);
    render_input(f, app, chunks[1]);
}

fn render_chat(f: &mut Frame, app: &App, area: Rect) {
    let mut all_lines: Vec<Line> = Vec::new();

    let (status_text, status_color) = match app.phase() {
        Phase::Idle => ("● Ready", Color::Green),
        Phase::Submitting => ("● Sending...", Color::Yellow),
        Phase::StreamingChat => ("● Streaming...", Color::Yellow),
        Phase::AwaitingImage => ("● Generating image...", Color::Magenta),
    };
    all_lines.push(Line::from(Span::styled(
        status_text,
        Style::default().fg(status_color),
    )));
    all_lines.push(Line::from(""));

    if app.transcript.is_empty() {
        all_lines.push(Line::from(Span::styled(
            "Ask anything, or ask me to draw a picture.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for msg in app.transcript.iter() {
        let (prefix, style) = match msg.role {
            MessageRole::User => ("You", Style::default().fg(Color::Cyan)),
            MessageRole::Assistant => ("AI", Style::default().fg(Color::Green)),
        };

        all_lines.push(Line::from(Span::styled(
            format!("{}:", prefix),
            style.add_modifier(Modifier::BOLD),
        )));

        if msg.content.is_empty() && msg.image_url.is_none() {
            // placeholder waiting for its first chunk
            all_lines.push(Line::from(Span::styled("●●●", style)));
        }
        for line in msg.content.lines() {
            all_lines.push(Line::from(Span::styled(line, style)));
        }
        if let Some(url) = &msg.image_url {
            all_lines.push(Line::from(Span::styled(
                format!("🖼  {}", url),
                style.add_modifier(Modifier::UNDERLINED),
            )));
        }

        all_lines.push(Line::from(""));
    }

    // scroll_offset counts lines up from the bottom
    let total_lines = all_lines.len();
    let visible_height = area.height as usize;
    let start_line = if total_lines > visible_height {
        let max_scroll = total_lines - visible_height;
        max_scroll - app.scroll_offset.min(max_scroll)
    } else {
        0
    };
    let end_line = (start_line + visible_height).min(total_lines);
    let visible_lines: Vec<Line> = all_lines[start_line..end_line].to_vec();

    let chat = Paragraph::new(visible_lines)
        .block(Block::default().borders(Borders::NONE))
        .wrap(Wrap { trim: false });

    f.render_widget(chat, area);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let (input_text, style) = if app.input.is_empty() {
        ("Type your message...", Style::default().fg(Color::DarkGray))
    } else {
        (app.input.as_str(), Style::default())
    };

    let (title, border) = if app.is_busy() {
        ("Sending...", Color::DarkGray)
    } else {
        ("Input (Ctrl-Q to quit, ↑↓ to scroll)", Color::White)
    };

    let input = Paragraph::new(input_text)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(input, area);

    if !app.is_busy() {
        let column = u16::try_from(app.cursor_position).unwrap_or(u16::MAX);
        let cursor_x = area.x.saturating_add(column).saturating_add(1);
        let cursor_y = area.y + 1;
        f.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), cursor_y));
    }
}
