use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::session::{ThreadId, ThreadSummary};

/// Sidebar listing every thread by its display label, first-seen order.
pub struct ThreadList<'a> {
    threads: &'a [ThreadSummary],
    active: Option<ThreadId>,
    highlight: usize,
    focused: bool,
}

impl<'a> ThreadList<'a> {
    pub fn new(
        threads: &'a [ThreadSummary],
        active: Option<ThreadId>,
        highlight: usize,
        focused: bool,
    ) -> Self {
        Self {
            threads,
            active,
            highlight,
            focused,
        }
    }
}

impl Widget for ThreadList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Chats")
            .style(if self.focused {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        let hint = Line::from(vec![Span::styled(
            "+ New chat  (ctrl-n)",
            Style::default().fg(Color::DarkGray),
        )]);
        buf.set_line(inner_area.x, inner_area.y, &hint, inner_area.width);

        // Labels can collide; the highlight and active marker follow thread
        // identity, not the label text.
        for (index, thread) in self.threads.iter().enumerate() {
            let y = inner_area.y + 1 + index as u16;
            if y >= inner_area.y + inner_area.height {
                break;
            }

            let is_active = self.active == Some(thread.id);
            let is_highlighted = self.focused && index == self.highlight;

            let mut style = if is_active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            if is_highlighted {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let marker = if is_active { "> " } else { "  " };
            let label = first_line(&thread.title);
            let line = Line::from(vec![
                Span::styled(marker, style),
                Span::styled(label, style),
            ]);
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}

/// Sidebar rows are single-line; a multi-line title shows its first line.
fn first_line(title: &str) -> &str {
    title.lines().next().unwrap_or(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_titles_show_their_first_line() {
        assert_eq!(first_line("plan a trip\nwith details"), "plan a trip");
        assert_eq!(first_line("one line"), "one line");
        assert_eq!(first_line(""), "");
    }
}
