//! Transcript pane for the active thread

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::session::Message;

/// Role-tagged message feed for the active thread.
pub struct Transcript<'a> {
    title: Option<&'a str>,
    messages: Vec<&'a Message>,
    awaiting: bool,
}

impl<'a> Transcript<'a> {
    pub fn new(title: Option<&'a str>, messages: Vec<&'a Message>, awaiting: bool) -> Self {
        Self {
            title,
            messages,
            awaiting,
        }
    }
}

impl Widget for Transcript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.map(first_line).unwrap_or("palaver"));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.messages.is_empty() && !self.awaiting {
            let welcome_lines = vec![
                Line::from(vec![Span::styled(
                    "Welcome to palaver",
                    Style::default().fg(Color::Green),
                )]),
                Line::from(vec![Span::raw("")]),
                Line::from(vec![Span::styled(
                    "Type a message below to start a new chat.",
                    Style::default().fg(Color::Gray),
                )]),
                Line::from(vec![Span::raw("")]),
                Line::from(vec![Span::styled(
                    "Press Enter to send, Shift+Enter for a new line.",
                    Style::default().fg(Color::DarkGray),
                )]),
            ];

            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();
        for message in &self.messages {
            let mut lines = render_message(message, inner_area.width);
            all_lines.append(&mut lines);
            // spacing between messages
            all_lines.push(Line::from(vec![Span::raw("")]));
        }

        if self.awaiting {
            all_lines.push(waiting_line());
        }

        // Keep the newest lines visible from the bottom.
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let start = total.saturating_sub(height);
        let visible = &all_lines[start..];

        for (i, line) in visible.iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Render a single message into lines
fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let speaker = if message.is_user() {
        "you".to_string()
    } else {
        message.role.clone()
    };
    let timestamp = message.at.format("%H:%M:%S").to_string();
    let header = format!("{} {} {}", speaker, timestamp, "─".repeat(20));

    lines.push(Line::from(vec![Span::styled(
        header,
        Style::default().fg(Color::DarkGray),
    )]));

    let content_style = if message.is_user() {
        Style::default().fg(Color::Blue)
    } else {
        Style::default().fg(Color::Green)
    };

    let content_lines = wrap_text(&message.content, width.saturating_sub(2) as usize);
    for content_line in content_lines {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(content_line, content_style),
        ]));
    }

    lines
}

fn waiting_line() -> Line<'static> {
    let dots = match (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 300)
        % 4
    {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "   ",
    };

    Line::from(vec![
        Span::styled("waiting for reply", Style::default().fg(Color::DarkGray)),
        Span::styled(dots, Style::default().fg(Color::Yellow)),
    ])
}

/// Wrap text to fit within the given width.
///
/// Explicit line breaks in the message are kept; only lines longer than the
/// width are wrapped on word boundaries.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        if raw_line.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in raw_line.split_whitespace() {
            if current_line.len() + word.len() + 1 <= width {
                if !current_line.is_empty() {
                    current_line.push(' ');
                }
                current_line.push_str(word);
            } else {
                if !current_line.is_empty() {
                    lines.push(current_line);
                    current_line = String::new();
                }
                current_line.push_str(word);
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

fn first_line(title: &str) -> &str {
    title.lines().next().unwrap_or(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_line_breaks_are_preserved() {
        let lines = wrap_text("first\nsecond\n\nfourth", 40);
        assert_eq!(lines, vec!["first", "second", "", "fourth"]);
    }

    #[test]
    fn long_lines_wrap_on_word_boundaries() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn zero_width_passes_text_through() {
        assert_eq!(wrap_text("anything", 0), vec!["anything"]);
    }

    #[test]
    fn empty_text_renders_one_blank_line() {
        assert_eq!(wrap_text("", 10), vec![""]);
    }
}
