//! Loading and validation of the client and detail tables.
//!
//! Tables are read once at startup and never mutated afterwards. Anything
//! malformed is reported as [`GachaError::Configuration`] here rather than
//! surfacing mid-draw.

use super::rules::{LinkageRule, RuleType};
use super::types::{ClientTable, DetailTable, NewbeePoolMeta, PoolClientMeta, PoolDetail};
use crate::constants::TIER_COUNT;
use crate::error::{GachaError, GachaResult};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Both static tables, validated against each other.
#[derive(Debug, Clone, Default)]
pub struct GachaTables {
    pub client: ClientTable,
    pub detail: DetailTable,
}

/// A requested pool, resolved to the table family it belongs to.
#[derive(Debug, Clone, Copy)]
pub enum PoolRef<'a> {
    Standard(&'a PoolClientMeta),
    Newbee(&'a NewbeePoolMeta),
}

impl<'a> PoolRef<'a> {
    pub fn pool_id(&self) -> &'a str {
        match self {
            PoolRef::Standard(meta) => &meta.gacha_pool_id,
            PoolRef::Newbee(meta) => &meta.gacha_pool_id,
        }
    }

    pub fn rule_type(&self) -> RuleType {
        match self {
            PoolRef::Standard(meta) => meta.gacha_rule_type,
            PoolRef::Newbee(_) => RuleType::Newbee,
        }
    }
}

impl GachaTables {
    /// Builds and validates tables from already-parsed documents.
    pub fn new(client: ClientTable, detail: DetailTable) -> GachaResult<Self> {
        let tables = Self { client, detail };
        tables.validate()?;
        Ok(tables)
    }

    pub fn from_json_str(client_json: &str, detail_json: &str) -> GachaResult<Self> {
        let client: ClientTable = serde_json::from_str(client_json)
            .map_err(|e| GachaError::Configuration(format!("client table: {e}")))?;
        let detail: DetailTable = serde_json::from_str(detail_json)
            .map_err(|e| GachaError::Configuration(format!("detail table: {e}")))?;
        Self::new(client, detail)
    }

    /// Reads `gacha_table.json`-style and `gacha_detail_table.json`-style documents.
    pub fn load(client_path: &Path, detail_path: &Path) -> GachaResult<Self> {
        let client_json = fs::read_to_string(client_path).map_err(|e| {
            GachaError::Configuration(format!("reading {}: {e}", client_path.display()))
        })?;
        let detail_json = fs::read_to_string(detail_path).map_err(|e| {
            GachaError::Configuration(format!("reading {}: {e}", detail_path.display()))
        })?;
        let tables = Self::from_json_str(&client_json, &detail_json)?;
        tracing::info!(
            standard_pools = tables.client.gacha_pool_client.len(),
            newbee_pools = tables.client.newbee_gacha_pool_client.len(),
            details = tables.detail.details.len(),
            "Loaded gacha tables"
        );
        Ok(tables)
    }

    pub fn pool_client(&self, pool_id: &str) -> Option<&PoolClientMeta> {
        self.client
            .gacha_pool_client
            .iter()
            .find(|p| p.gacha_pool_id == pool_id)
    }

    pub fn newbee_pool(&self, pool_id: &str) -> Option<&NewbeePoolMeta> {
        self.client
            .newbee_gacha_pool_client
            .iter()
            .find(|p| p.gacha_pool_id == pool_id)
    }

    /// Newbie roster takes precedence over the standard table.
    pub fn resolve(&self, pool_id: &str) -> Option<PoolRef<'_>> {
        if let Some(meta) = self.newbee_pool(pool_id) {
            return Some(PoolRef::Newbee(meta));
        }
        self.pool_client(pool_id).map(PoolRef::Standard)
    }

    pub fn detail(&self, pool_id: &str) -> GachaResult<&PoolDetail> {
        self.detail.details.get(pool_id).ok_or_else(|| {
            GachaError::Configuration(format!("pool {pool_id} has no detail record"))
        })
    }

    /// Free draws configured for a limited pool, 0 when it has no window.
    pub fn free_count(&self, pool_id: &str) -> u32 {
        self.client
            .free_gacha
            .iter()
            .find(|w| w.pool_id == pool_id)
            .map(|w| w.free_count)
            .unwrap_or(0)
    }

    fn validate(&self) -> GachaResult<()> {
        let mut seen = BTreeSet::new();
        let standard_ids = self.client.gacha_pool_client.iter().map(|p| &p.gacha_pool_id);
        let newbee_ids = self
            .client
            .newbee_gacha_pool_client
            .iter()
            .map(|p| &p.gacha_pool_id);
        for id in standard_ids.chain(newbee_ids) {
            if !seen.insert(id.as_str()) {
                return Err(GachaError::Configuration(format!(
                    "duplicate gacha pool id {id}"
                )));
            }
            validate_detail(id, self.detail(id)?)?;
        }

        for meta in &self.client.gacha_pool_client {
            if meta.gacha_rule_type == RuleType::Newbee {
                return Err(GachaError::Configuration(format!(
                    "standard pool {} declares the newbee rule",
                    meta.gacha_pool_id
                )));
            }
            if meta.gacha_rule_type == RuleType::Linkage {
                validate_linkage(meta)?;
            }
        }
        Ok(())
    }
}

fn validate_detail(pool_id: &str, detail: &PoolDetail) -> GachaResult<()> {
    let bad = |what: String| GachaError::Configuration(format!("pool {pool_id}: {what}"));

    for group in &detail.avail_char_info.per_avail_list {
        check_tier(group.rarity_rank).map_err(bad)?;
        check_share(group.total_percent).map_err(bad)?;
    }
    for group in detail.up_groups() {
        check_tier(group.rarity_rank).map_err(bad)?;
        check_share(group.percent).map_err(bad)?;
    }
    for entry in detail.weight_up_char_info_list.iter().flatten() {
        check_tier(entry.rarity_rank).map_err(bad)?;
    }
    Ok(())
}

fn validate_linkage(meta: &PoolClientMeta) -> GachaResult<()> {
    let id = &meta.gacha_pool_id;
    let raw = meta.linkage_rule_id.as_deref().ok_or_else(|| {
        GachaError::Configuration(format!("linkage pool {id} has no linkageRuleId"))
    })?;
    raw.parse::<LinkageRule>()
        .map_err(|e| GachaError::Configuration(format!("pool {id}: {e}")))?;
    if meta.linkage_param.is_some() && meta.linkage_target_count().is_none() {
        return Err(GachaError::Configuration(format!(
            "linkage pool {id} is missing {}",
            crate::constants::LINKAGE_TARGET_COUNT_PARAM
        )));
    }
    Ok(())
}

fn check_tier(tier: u8) -> Result<(), String> {
    if (tier as usize) < TIER_COUNT {
        Ok(())
    } else {
        Err(format!("rarity rank {tier} out of range"))
    }
}

fn check_share(share: f64) -> Result<(), String> {
    if share.is_finite() && (0.0..=1.0).contains(&share) {
        Ok(())
    } else {
        Err(format!("probability {share} outside [0, 1]"))
    }
}
