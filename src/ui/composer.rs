use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::ui::commands::{CommandEntry, command_entries};

/// Filtered command list shown while the input spells a slash command.
///
/// The palette holds presentation state only; the input text itself lives in
/// the session. `refresh` is called after every edit.
pub struct CommandPalette {
    entries: Vec<CommandEntry>,
    filtered: Vec<CommandEntry>,
    selected: Option<usize>,
}

impl CommandPalette {
    pub fn new() -> Self {
        Self {
            entries: command_entries(),
            filtered: Vec::new(),
            selected: None,
        }
    }

    /// Recompute the visible rows from the current input.
    ///
    /// The palette is open while the input starts with '/' and has no
    /// whitespace yet; a space means the user is past the command word.
    pub fn refresh(&mut self, input: &str) {
        if !input.starts_with('/') || input.contains(char::is_whitespace) {
            self.close();
            return;
        }

        let query = input.trim_start_matches('/').to_lowercase();
        self.filtered = self
            .entries
            .iter()
            .filter(|entry| entry.keyword.starts_with(&query))
            .copied()
            .collect();

        if self.filtered.is_empty() {
            self.selected = None;
        } else {
            let index = self.selected.unwrap_or(0);
            self.selected = Some(index.min(self.filtered.len() - 1));
        }
    }

    pub fn is_open(&self) -> bool {
        !self.filtered.is_empty()
    }

    pub fn close(&mut self) {
        self.filtered.clear();
        self.selected = None;
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            self.selected = None;
            return;
        }

        let current = self.selected.unwrap_or(0) as isize;
        let len = self.filtered.len() as isize;
        let mut next = current + delta;

        if next < 0 {
            next = len - 1;
        } else if next >= len {
            next = 0;
        }

        self.selected = Some(next as usize);
    }

    pub fn selected_entry(&self) -> Option<CommandEntry> {
        self.selected.and_then(|index| self.filtered.get(index).copied())
    }
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new()
    }
}

/// Input box for composing the next message.
pub struct Composer<'a> {
    input: &'a str,
    cursor: usize,
    placeholder: &'a str,
    focused: bool,
    awaiting: bool,
    palette: &'a CommandPalette,
}

impl<'a> Composer<'a> {
    pub fn new(
        input: &'a str,
        cursor: usize,
        placeholder: &'a str,
        focused: bool,
        awaiting: bool,
        palette: &'a CommandPalette,
    ) -> Self {
        Self {
            input,
            cursor,
            placeholder,
            focused,
            awaiting,
            palette,
        }
    }
}

impl Widget for Composer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.awaiting {
            "Message (waiting for reply)"
        } else {
            "Message"
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(if self.focused {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.input.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder,
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(
                inner_area.x,
                inner_area.y,
                &placeholder_line,
                inner_area.width,
            );
        } else {
            let mut content = self.input.to_string();
            if self.focused {
                content.insert(self.cursor.min(content.len()), '▌');
            }

            for (i, line_text) in content.split('\n').enumerate() {
                if i < inner_area.height as usize {
                    let line = Line::from(vec![Span::raw(line_text)]);
                    buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
                }
            }
        }

        if self.palette.is_open() {
            render_palette(self.palette, inner_area, buf);
        }
    }
}

fn render_palette(palette: &CommandPalette, anchor: Rect, buf: &mut Buffer) {
    let rows = &palette.filtered;
    let palette_height = (rows.len().min(5) + 2) as u16;
    let palette_area = Rect {
        x: anchor.x,
        y: anchor.y.saturating_sub(palette_height),
        width: anchor.width,
        height: palette_height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Commands")
        .style(Style::default().fg(Color::Blue));
    let inner = block.inner(palette_area);
    block.render(palette_area, buf);

    for (index, entry) in rows.iter().enumerate() {
        if index >= inner.height as usize {
            break;
        }

        let is_selected = palette.selected == Some(index);
        let style = if is_selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let line = Line::from(vec![
            Span::styled(format!("/{}", entry.keyword), style),
            Span::styled(" - ", Style::default().fg(Color::DarkGray)),
            Span::styled(entry.description, Style::default().fg(Color::Gray)),
        ]);

        buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::commands::SlashCommand;

    #[test]
    fn opens_on_a_leading_slash() {
        let mut palette = CommandPalette::new();
        palette.refresh("/");
        assert!(palette.is_open());
        assert_eq!(palette.filtered.len(), command_entries().len());
    }

    #[test]
    fn filters_by_prefix() {
        let mut palette = CommandPalette::new();
        palette.refresh("/h");
        assert_eq!(palette.filtered.len(), 1);
        assert_eq!(
            palette.selected_entry().map(|e| e.command),
            Some(SlashCommand::Help)
        );
    }

    #[test]
    fn closes_once_the_command_word_ends() {
        let mut palette = CommandPalette::new();
        palette.refresh("/new");
        assert!(palette.is_open());
        palette.refresh("/new ");
        assert!(!palette.is_open());
    }

    #[test]
    fn stays_closed_for_ordinary_text() {
        let mut palette = CommandPalette::new();
        palette.refresh("hello");
        assert!(!palette.is_open());
        palette.refresh("");
        assert!(!palette.is_open());
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut palette = CommandPalette::new();
        palette.refresh("/");
        let len = palette.filtered.len();

        palette.move_selection(-1);
        assert_eq!(palette.selected, Some(len - 1));
        palette.move_selection(1);
        assert_eq!(palette.selected, Some(0));
    }
}
