//! Widgets for the chat interface

pub mod commands;
pub mod composer;
pub mod thread_list;
pub mod transcript;

pub use commands::{SlashCommand, get_help_text, parse_slash_command};
pub use composer::{CommandPalette, Composer};
pub use thread_list::ThreadList;
pub use transcript::Transcript;
