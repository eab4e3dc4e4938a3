use crate::constants::CHARACTER_ITEM_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One drawn result. The trigger may rewrite it before it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawnItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
    pub rarity: u8,
    #[serde(default)]
    pub is_classic: bool,
    /// Top-tier streak before this draw was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_non_hit_cnt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_ensure_cnt: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_single_ensure: Option<bool>,
}

impl DrawnItem {
    pub fn character(id: &str, rarity: u8) -> Self {
        Self {
            id: id.to_string(),
            kind: CHARACTER_ITEM_TYPE.to_string(),
            count: 1,
            rarity,
            is_classic: false,
            before_non_hit_cnt: None,
            single_ensure_cnt: None,
            is_single_ensure: None,
        }
    }

    /// Pity annotations that were actually stamped on this draw.
    pub fn log_fields(&self) -> Map<String, Value> {
        let mut log = Map::new();
        if let Some(cnt) = self.before_non_hit_cnt {
            log.insert("beforeNonHitCnt".into(), cnt.into());
        }
        if let Some(cnt) = self.single_ensure_cnt {
            log.insert("singleEnsureCnt".into(), cnt.into());
        }
        if let Some(flag) = self.is_single_ensure {
            log.insert("isSingleEnsure".into(), flag.into());
        }
        log
    }
}
