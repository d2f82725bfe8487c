//! Weapon tags relevant to damage rolling

use serde::{Deserialize, Serialize};

pub const TAG_AP: &str = "tg_ap";
pub const TAG_OVERKILL: &str = "tg_overkill";
pub const TAG_RELIABLE: &str = "tg_reliable";

/// A tag attached to a weapon, optionally carrying a value (e.g. `Reliable 2`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    #[serde(default)]
    pub val: Option<String>,
}

impl Tag {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            val: None,
        }
    }

    pub fn with_val(mut self, val: impl Into<String>) -> Self {
        self.val = Some(val.into());
        self
    }

    pub fn is_ap(&self) -> bool {
        self.id == TAG_AP
    }

    pub fn is_overkill(&self) -> bool {
        self.id == TAG_OVERKILL
    }

    pub fn is_reliable(&self) -> bool {
        self.id == TAG_RELIABLE
    }

    /// Numeric value of the tag, if it has one that parses
    pub fn numeric_value(&self) -> Option<i32> {
        self.val.as_deref().and_then(|v| v.trim().parse().ok())
    }
}
