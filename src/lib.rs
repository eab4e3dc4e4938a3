//! Gacha - server-side draw resolution.
//!
//! Resolves single and ten draws against static pool tables, applying
//! rarity pity, guarantee floors and per-rule post-processing to a
//! player's durable progress.

pub mod build_info;
pub mod config;
pub mod constants;
pub mod error;
pub mod gacha;
pub mod registry;
pub mod report;
pub mod state;
pub mod tables;

pub use config::EngineConfig;
pub use error::{GachaError, GachaResult};
pub use gacha::{DrawContext, DrawnItem, GachaEngine, TicketKind};
pub use registry::SessionRegistry;
pub use report::DrawReport;
pub use state::PlayerSession;
pub use tables::{GachaTables, RuleType};
