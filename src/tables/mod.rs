//! Static configuration tables: pool metadata, rarity availability and rule tags.

pub mod loader;
pub mod rules;
pub mod types;

pub use loader::*;
pub use rules::*;
pub use types::*;
