mod backend;
mod document;
mod error;
mod event;
mod language;
mod message;
mod role;
mod slash_commands;
mod translator;

pub use backend::*;
pub use document::*;
pub use error::*;
pub use event::*;
pub use language::*;
pub use message::*;
pub use role::*;
pub use slash_commands::*;
pub use translator::*;
