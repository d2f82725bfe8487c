//! Domain layer - Core combat rules with no I/O
//!
//! This layer contains:
//! - Entities: Actor, Item, ChatMessage
//! - Value Objects: identifiers, damage, tags, targets
//! - Dice: expression parsing, roll evaluation and the crit transform
//! - Effects: JSON effect changes applied to actor documents

pub mod dice;
pub mod effects;
pub mod entities;
pub mod value_objects;
