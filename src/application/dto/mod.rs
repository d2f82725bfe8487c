//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so the HTTP layer can
//! serialize/deserialize without reaching into flow internals.

pub mod actor;
pub mod damage;

pub use actor::*;
pub use damage::*;
