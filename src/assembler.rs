#[path = "assembler/config.rs"]
mod config;

#[path = "assembler/conversation.rs"]
mod conversation;

#[path = "assembler/walk.rs"]
mod walk;

#[path = "assembler/xml.rs"]
mod xml;

#[path = "assembler/json.rs"]
mod json;

#[path = "assembler/assemble.rs"]
mod assemble;

pub use assemble::{Assembler, SerializedConversation};
pub use config::{AssemblerConfig, ViewFormat};
pub use conversation::Conversation;
