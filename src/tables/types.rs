//! Static table records, named after the fields of the JSON documents they load from.

use super::rules::{LinkageRule, RuleType};
use crate::error::{GachaError, GachaResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Candidates available at one rarity tier and the tier's total probability mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerAvail {
    pub rarity_rank: u8,
    pub char_id_list: Vec<String>,
    pub total_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailCharInfo {
    pub per_avail_list: Vec<PerAvail>,
}

/// Up-characters at one tier, each holding a fixed share of that tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerUpChar {
    pub rarity_rank: u8,
    pub char_id_list: Vec<String>,
    pub percent: f64,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpCharInfo {
    pub per_char_list: Vec<PerUpChar>,
}

/// Weight override in integer units, 100 units being one plain share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightUpChar {
    pub rarity_rank: u8,
    pub char_id: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDetail {
    pub avail_char_info: AvailCharInfo,
    #[serde(default)]
    pub up_char_info: Option<UpCharInfo>,
    #[serde(default)]
    pub weight_up_char_info_list: Option<Vec<WeightUpChar>>,
}

impl PoolDetail {
    /// Base probability mass of a tier, 0 when the pool has no candidates there.
    pub fn tier_total(&self, tier: u8) -> f64 {
        self.avail_char_info
            .per_avail_list
            .iter()
            .find(|g| g.rarity_rank == tier)
            .map(|g| g.total_percent)
            .unwrap_or(0.0)
    }

    /// Up-character groups in table order (first is the top-tier group).
    pub fn up_groups(&self) -> &[PerUpChar] {
        self.up_char_info
            .as_ref()
            .map(|info| info.per_char_list.as_slice())
            .unwrap_or(&[])
    }

    pub fn up_group_for_tier(&self, tier: u8) -> Option<&PerUpChar> {
        self.up_groups().iter().find(|g| g.rarity_rank == tier)
    }

    /// The first candidate of the first up group: the target of linkage and single guarantees.
    pub fn first_up_target(&self) -> Option<&str> {
        self.up_groups()
            .first()
            .and_then(|g| g.char_id_list.first())
            .map(String::as_str)
    }

    pub fn weight_overrides_for_tier(&self, tier: u8) -> Vec<&WeightUpChar> {
        self.weight_up_char_info_list
            .iter()
            .flatten()
            .filter(|w| w.rarity_rank == tier)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetailTable {
    pub details: BTreeMap<String, PoolDetail>,
}

/// Client-facing metadata of a standard pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolClientMeta {
    pub gacha_pool_id: String,
    #[serde(default)]
    pub gacha_pool_name: String,
    pub gacha_rule_type: RuleType,
    #[serde(default)]
    pub guarantee5_avail: i32,
    #[serde(default)]
    pub guarantee5_count: u32,
    #[serde(default)]
    pub open_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub dyn_meta: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub linkage_param: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub linkage_rule_id: Option<String>,
}

impl PoolClientMeta {
    pub fn soft_pity_eligible(&self) -> bool {
        self.guarantee5_avail != 0
    }

    /// Linkage sub-variant; missing or unrecognised ids cannot be dispatched.
    pub fn linkage_rule(&self) -> GachaResult<LinkageRule> {
        let id = self.linkage_rule_id.as_deref().ok_or_else(|| {
            GachaError::InvalidRuleDispatch(format!(
                "linkage pool {} has no linkage rule id",
                self.gacha_pool_id
            ))
        })?;
        id.parse().map_err(GachaError::InvalidRuleDispatch)
    }

    /// Countdown of the linkage must-top guarantee, if configured.
    pub fn linkage_target_count(&self) -> Option<i64> {
        self.linkage_param
            .as_ref()?
            .get(crate::constants::LINKAGE_TARGET_COUNT_PARAM)?
            .as_i64()
    }

    /// Remaining guaranteed top-tier allowance of an attain pool.
    pub fn attain_allowance(&self) -> u32 {
        self.dyn_meta
            .as_ref()
            .and_then(|m| m.get(crate::constants::ATTAIN_ALLOWANCE_META))
            .and_then(Value::as_u64)
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewbeePoolMeta {
    pub gacha_pool_id: String,
    #[serde(default)]
    pub gacha_pool_name: String,
    #[serde(default)]
    pub gacha_price: u32,
    #[serde(default)]
    pub gacha_times: u32,
}

/// Free draws granted on a limited pool during its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeGachaWindow {
    pub pool_id: String,
    #[serde(default)]
    pub open_time: i64,
    #[serde(default)]
    pub end_time: i64,
    pub free_count: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTable {
    pub gacha_pool_client: Vec<PoolClientMeta>,
    #[serde(default)]
    pub newbee_gacha_pool_client: Vec<NewbeePoolMeta>,
    #[serde(default)]
    pub free_gacha: Vec<FreeGachaWindow>,
}
