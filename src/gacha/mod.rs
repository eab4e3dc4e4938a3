//! Draw resolution: pool weighting, rarity selection, guarantees and rule dispatch.

pub mod engine;
pub mod guarantee;
pub mod item;
pub mod pool;
pub mod rarity;
pub mod trigger;

pub use engine::{DrawContext, GachaEngine, TicketKind};
pub use item::DrawnItem;
pub use pool::{build_fes_classic_pool, build_table_pool, TierPools, WeightedGroup};
pub use rarity::{rarity_weights, roll_rarity};
