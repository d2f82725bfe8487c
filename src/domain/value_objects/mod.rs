//! Value objects - Immutable objects defined by their attributes

mod damage;
mod ids;
mod tag;
mod target;

pub use damage::{AppliedDamage, Damage, DamageOptions, DamageResult, DamageType};
pub use ids::*;
pub use tag::{Tag, TAG_AP, TAG_OVERKILL, TAG_RELIABLE};
pub use target::{HitResult, Target};
