//! Engine configuration.

use crate::constants::{DEFAULT_NEWBEE_DRAW_ALLOWANCE, DEFAULT_NEWBEE_POOL_ID};
use crate::error::GachaResult;
use crate::tables::RuleType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Administrative switches applied before any draw is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pools that reject every request
    pub forbidden_pools: BTreeSet<String>,

    /// Rule variants recognised but not provided; pools using them reject requests
    pub unsupported_rules: BTreeSet<RuleType>,

    /// Emit a debug event for every resolved draw
    pub log_draws: bool,

    /// Newbie pool a fresh session is bound to
    pub newbee_pool_id: String,

    /// Newbie draws a fresh session may spend
    pub newbee_draw_allowance: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            forbidden_pools: BTreeSet::new(),
            unsupported_rules: BTreeSet::from([RuleType::ClassicAttain]),
            log_draws: true,
            newbee_pool_id: DEFAULT_NEWBEE_POOL_ID.to_string(),
            newbee_draw_allowance: DEFAULT_NEWBEE_DRAW_ALLOWANCE,
        }
    }
}

impl EngineConfig {
    /// Every rule variant enabled and no pool forbidden. Used by simulations.
    pub fn permissive() -> Self {
        Self {
            unsupported_rules: BTreeSet::new(),
            ..Default::default()
        }
    }

    /// Default switches without per-draw logging, for bulk runs.
    pub fn quiet() -> Self {
        Self {
            log_draws: false,
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> GachaResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn is_forbidden(&self, pool_id: &str) -> bool {
        self.forbidden_pools.contains(pool_id)
    }

    pub fn is_unsupported(&self, rule: RuleType) -> bool {
        self.unsupported_rules.contains(&rule)
    }

    pub fn forbid(mut self, pool_id: &str) -> Self {
        self.forbidden_pools.insert(pool_id.to_string());
        self
    }
}
