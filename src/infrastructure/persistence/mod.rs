//! Persistence adapters
//!
//! In-memory stores for actors and chat cards, and a SQLite chat log for
//! cards that must outlive the process.

mod in_memory_actor_repository;
mod in_memory_chat_log;
mod sqlite_chat_log;

pub use in_memory_actor_repository::InMemoryActorRepository;
pub use in_memory_chat_log::InMemoryChatLog;
pub use sqlite_chat_log::SqliteChatLog;
