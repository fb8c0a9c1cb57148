use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;

use crate::completion::{CompletionClient, CompletionEvent};
use crate::config::Config;
use crate::session::ChatSession;
use crate::ui::{
    CommandPalette, Composer, SlashCommand, ThreadList, Transcript, get_help_text,
    parse_slash_command,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Threads,
    Composer,
}

/// Event loop that wires key input and completion events into the session.
pub struct App {
    session: ChatSession,
    client: CompletionClient,
    palette: CommandPalette,
    focus: Focus,
    thread_cursor: usize,
    pending: Option<mpsc::Receiver<CompletionEvent>>,
    help_visible: bool,
    should_exit: bool,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            session: ChatSession::new(),
            client: CompletionClient::new(config)?,
            palette: CommandPalette::new(),
            focus: Focus::Composer,
            thread_cursor: 0,
            pending: None,
            help_visible: false,
            should_exit: false,
        })
    }

    /// Run the TUI until the user exits.
    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to restore cursor")?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        while !self.should_exit {
            self.drain_completion_events();
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(100)).context("Failed to poll for input")? {
                if let Event::Key(key) = event::read().context("Failed to read input")? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Drain the in-flight completion channel without blocking the loop.
    fn drain_completion_events(&mut self) {
        let Some(rx) = &mut self.pending else {
            return;
        };

        match rx.try_recv() {
            Ok(CompletionEvent::Reply {
                thread,
                role,
                content,
            }) => {
                self.session.complete(thread, role, content);
                self.pending = None;
            }
            Ok(CompletionEvent::Failed { thread, error }) => {
                tracing::warn!(%error, "leaving the thread without a reply");
                self.session.abandon(thread);
                self.pending = None;
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {
                // The task died without reporting; release the guard so the
                // user can resend.
                if let Some(thread) = self.session.awaiting_on() {
                    self.session.abandon(thread);
                }
                self.pending = None;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.should_exit = true;
                    return;
                }
                KeyCode::Char('n') => {
                    self.start_new_thread();
                    return;
                }
                _ => {}
            }
        }

        if key.code == KeyCode::Tab {
            self.palette.close();
            self.focus = match self.focus {
                Focus::Threads => Focus::Composer,
                Focus::Composer => Focus::Threads,
            };
            return;
        }

        match self.focus {
            Focus::Threads => self.handle_thread_list_key(key),
            Focus::Composer => self.handle_composer_key(key),
        }
    }

    fn handle_thread_list_key(&mut self, key: KeyEvent) {
        let count = self.session.threads().len();
        match key.code {
            KeyCode::Up => {
                self.thread_cursor = self.thread_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if count > 0 {
                    self.thread_cursor = (self.thread_cursor + 1).min(count - 1);
                }
            }
            KeyCode::Enter => {
                if let Some(thread) = self.session.threads().get(self.thread_cursor) {
                    self.session.select_thread(thread.id);
                    self.focus = Focus::Composer;
                }
            }
            KeyCode::Esc => {
                self.focus = Focus::Composer;
            }
            _ => {}
        }
    }

    fn handle_composer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.session.insert_char('\n');
                    self.palette.close();
                } else if self.palette.is_open() {
                    self.apply_palette_selection();
                } else {
                    self.submit();
                }
            }
            KeyCode::Up => {
                if self.palette.is_open() {
                    self.palette.move_selection(-1);
                }
            }
            KeyCode::Down => {
                if self.palette.is_open() {
                    self.palette.move_selection(1);
                }
            }
            KeyCode::Esc => {
                if self.help_visible {
                    self.help_visible = false;
                } else {
                    self.palette.close();
                }
            }
            KeyCode::Char(c) => {
                self.session.insert_char(c);
                self.palette.refresh(self.session.input());
            }
            KeyCode::Backspace => {
                self.session.backspace();
                self.palette.refresh(self.session.input());
            }
            KeyCode::Delete => {
                self.session.delete_forward();
                self.palette.refresh(self.session.input());
            }
            KeyCode::Left => self.session.cursor_left(),
            KeyCode::Right => self.session.cursor_right(),
            KeyCode::Home => self.session.cursor_home(),
            KeyCode::End => self.session.cursor_end(),
            _ => {}
        }
    }

    fn apply_palette_selection(&mut self) {
        if let Some(entry) = self.palette.selected_entry() {
            self.session.set_input(format!("/{}", entry.keyword));
            self.palette.close();
        }
    }

    /// Submit the composed input: run it as a command, or send it.
    fn submit(&mut self) {
        if let Some(command) = parse_slash_command(self.session.input()) {
            self.session.set_input("");
            self.palette.close();
            self.run_command(command);
            return;
        }

        if let Some(outbound) = self.session.submit() {
            self.pending = Some(self.client.request(outbound.thread, outbound.text));
        }
    }

    fn run_command(&mut self, command: SlashCommand) {
        match command {
            SlashCommand::New => self.start_new_thread(),
            SlashCommand::Help => self.help_visible = true,
            SlashCommand::Quit => self.should_exit = true,
        }
    }

    fn start_new_thread(&mut self) {
        self.session.start_new_thread();
        self.palette.close();
        self.help_visible = false;
        self.focus = Focus::Composer;
    }

    fn draw(&self, frame: &mut Frame) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(30)])
            .split(frame.size());

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(columns[1]);

        let highlight = self
            .thread_cursor
            .min(self.session.threads().len().saturating_sub(1));
        frame.render_widget(
            ThreadList::new(
                self.session.threads(),
                self.session.active_thread(),
                highlight,
                self.focus == Focus::Threads,
            ),
            columns[0],
        );

        let title = self
            .session
            .active_thread()
            .and_then(|id| self.session.title_of(id));
        let awaiting_visible = self.session.awaiting_on().is_some()
            && self.session.awaiting_on() == self.session.active_thread();
        frame.render_widget(
            Transcript::new(title, self.session.active_transcript().collect(), awaiting_visible),
            main[0],
        );

        let placeholder = if self.session.active_thread().is_some() {
            "Reply to this chat..."
        } else {
            "Type a message to start a new chat..."
        };
        frame.render_widget(
            Composer::new(
                self.session.input(),
                self.session.cursor(),
                placeholder,
                self.focus == Focus::Composer,
                self.session.awaiting_on().is_some(),
                &self.palette,
            ),
            main[1],
        );

        let hints = Line::from(vec![Span::styled(
            "enter send · shift+enter newline · tab chats · ctrl-n new chat · /help",
            Style::default().fg(Color::DarkGray),
        )]);
        frame.render_widget(Paragraph::new(hints), main[2]);

        if self.help_visible {
            self.draw_help(frame, main[0]);
        }
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let lines = get_help_text();
        let height = (lines.len() as u16 + 2).min(area.height);
        let width = 50.min(area.width);
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, popup);
        let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
        frame.render_widget(
            Paragraph::new(text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help (esc to close)"),
            ),
            popup,
        );
    }
}
