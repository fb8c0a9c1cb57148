use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Role string attached to locally composed messages.
pub const USER_ROLE: &str = "user";

/// Opaque identifier for a conversation thread.
///
/// Thread identity is generated, never derived from message text, so two
/// threads that happen to start with the same first line stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(Uuid);

impl ThreadId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A single message in the session. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub thread: ThreadId,
    pub role: String,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl Message {
    /// Whether this message was composed locally by the user.
    pub fn is_user(&self) -> bool {
        self.role == USER_ROLE
    }
}

/// Sidebar entry for one thread: generated identity plus display label.
///
/// The label is the literal text of the thread's first user message.
#[derive(Debug, Clone)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub title: String,
}

/// Submitted text captured by value, ready to dispatch to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub thread: ThreadId,
    pub text: String,
}

/// Session-level state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No thread selected; the next submit starts a fresh thread.
    Idle,
    /// A thread is selected and no request is outstanding.
    ThreadSelected,
    /// A submit has been dispatched and its reply has not landed yet.
    AwaitingReply,
}

/// Owns all conversation state for the lifetime of the process.
///
/// Every mutation — composing, submitting, selecting threads, landing
/// replies — goes through a method here; the widgets only borrow. Nothing
/// is persisted: the session starts empty and is discarded on exit.
pub struct ChatSession {
    messages: Vec<Message>,
    threads: Vec<ThreadSummary>,
    active: Option<ThreadId>,
    input: String,
    cursor: usize,
    in_flight: Option<ThreadId>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            threads: Vec::new(),
            active: None,
            input: String::new(),
            cursor: 0,
            in_flight: None,
        }
    }

    /// Clear the composition state so the next submit begins a fresh thread.
    pub fn start_new_thread(&mut self) {
        self.active = None;
        self.input.clear();
        self.cursor = 0;
    }

    /// Make `id` the visible thread and drop any draft input.
    ///
    /// Unknown ids are a no-op.
    pub fn select_thread(&mut self, id: ThreadId) {
        if self.threads.iter().any(|t| t.id == id) {
            self.active = Some(id);
            self.input.clear();
            self.cursor = 0;
        }
    }

    /// Submit the pending input.
    ///
    /// Returns the captured text for the caller to dispatch, or `None` when
    /// the input is blank or a request is already outstanding. The user
    /// message is appended and the input cleared before this returns, so the
    /// transcript shows the message ahead of any network activity.
    pub fn submit(&mut self) -> Option<Outbound> {
        if self.in_flight.is_some() || self.input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        self.cursor = 0;

        let thread = match self.active {
            Some(id) => id,
            None => {
                let id = ThreadId::new();
                self.threads.push(ThreadSummary {
                    id,
                    title: text.clone(),
                });
                self.active = Some(id);
                id
            }
        };

        self.push_message(thread, USER_ROLE.to_string(), text.clone());
        self.in_flight = Some(thread);

        Some(Outbound { thread, text })
    }

    /// Land a reply on the thread captured at dispatch time.
    ///
    /// The reply is routed by `thread`, not by whichever thread is active
    /// when it arrives, so switching threads while waiting cannot misfile it.
    pub fn complete(&mut self, thread: ThreadId, role: String, content: String) {
        self.push_message(thread, role, content);
        if self.in_flight == Some(thread) {
            self.in_flight = None;
        }
    }

    /// Give up on an outstanding request without appending a reply.
    ///
    /// The dangling user message stays visible and may be resent.
    pub fn abandon(&mut self, thread: ThreadId) {
        if self.in_flight == Some(thread) {
            self.in_flight = None;
        }
    }

    /// Thread summaries in first-seen order, one entry per thread.
    pub fn threads(&self) -> &[ThreadSummary] {
        &self.threads
    }

    /// Display label for a thread.
    pub fn title_of(&self, id: ThreadId) -> Option<&str> {
        self.threads
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.title.as_str())
    }

    pub fn active_thread(&self) -> Option<ThreadId> {
        self.active
    }

    /// Ordered messages belonging to `id`.
    pub fn transcript(&self, id: ThreadId) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.thread == id)
    }

    /// Ordered messages for the active thread; empty when none is selected.
    pub fn active_transcript(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |m| Some(m.thread) == self.active)
    }

    /// Thread with a request outstanding, if any.
    pub fn awaiting_on(&self) -> Option<ThreadId> {
        self.in_flight
    }

    pub fn phase(&self) -> SessionPhase {
        if self.in_flight.is_some() {
            SessionPhase::AwaitingReply
        } else if self.active.is_some() {
            SessionPhase::ThreadSelected
        } else {
            SessionPhase::Idle
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn push_message(&mut self, thread: ThreadId, role: String, content: String) {
        self.messages.push(Message {
            thread,
            role,
            content,
            at: Utc::now(),
        });
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

// Composition: the pending input lives here with the rest of the session
// state. Cursor positions are byte offsets kept on char boundaries.
impl ChatSession {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the pending input wholesale.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.cursor = self.input.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.input[..self.cursor].char_indices().next_back() {
            self.input.remove(idx);
            self.cursor = idx;
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    pub fn cursor_left(&mut self) {
        if let Some((idx, _)) = self.input[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(c) = self.input[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.len();
    }
}
