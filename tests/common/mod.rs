//! Shared fixture tables for integration tests.
#![allow(dead_code)]

use gacha::{DrawnItem, EngineConfig, GachaEngine, GachaTables};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

pub const CLIENT_TABLE: &str = r#"{
    "gachaPoolClient": [
        {"gachaPoolId": "NORM_1", "gachaPoolName": "Standard", "gachaRuleType": "NORMAL",
         "guarantee5Avail": 1, "guarantee5Count": 10, "openTime": 0, "endTime": 0},
        {"gachaPoolId": "GOLDEN_1", "gachaRuleType": "NORMAL",
         "guarantee5Avail": 1, "guarantee5Count": 10},
        {"gachaPoolId": "BROKEN_1", "gachaRuleType": "NORMAL",
         "guarantee5Avail": 1, "guarantee5Count": 10},
        {"gachaPoolId": "SINGLE_1", "gachaRuleType": "SINGLE",
         "guarantee5Avail": 0, "guarantee5Count": 0},
        {"gachaPoolId": "LINKAGE_1", "gachaRuleType": "LINKAGE",
         "guarantee5Avail": 0, "guarantee5Count": 0,
         "linkageRuleId": "LINKAGE_MH_01", "linkageParam": {"guaranteeTarget6Count": 5}},
        {"gachaPoolId": "ATTAIN_1", "gachaRuleType": "ATTAIN",
         "guarantee5Avail": 0, "guarantee5Count": 0, "dynMeta": {"attainRare6Num": 1}},
        {"gachaPoolId": "CLASSIC_ATTAIN_1", "gachaRuleType": "CLASSIC_ATTAIN",
         "guarantee5Avail": 0, "guarantee5Count": 0, "dynMeta": {"attainRare6Num": 1}},
        {"gachaPoolId": "FES_1", "gachaRuleType": "FESCLASSIC",
         "guarantee5Avail": 0, "guarantee5Count": 0},
        {"gachaPoolId": "CLASSIC_1", "gachaRuleType": "CLASSIC",
         "guarantee5Avail": 1, "guarantee5Count": 10},
        {"gachaPoolId": "LIMITED_1", "gachaRuleType": "LIMITED",
         "guarantee5Avail": 1, "guarantee5Count": 10}
    ],
    "newbeeGachaPoolClient": [
        {"gachaPoolId": "BOOT_0_1_2", "gachaPoolName": "Beginner", "gachaPrice": 380, "gachaTimes": 21}
    ],
    "freeGacha": [
        {"poolId": "LIMITED_1", "openTime": 0, "endTime": 0, "freeCount": 1}
    ]
}"#;

pub const DETAIL_TABLE: &str = r#"{
    "details": {
        "NORM_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["n_six_a", "n_six_b", "n_six_c"], "totalPercent": 0.02},
                {"rarityRank": 4, "charIdList": ["n_five_a", "n_five_b", "n_five_c", "n_five_d"], "totalPercent": 0.08},
                {"rarityRank": 3, "charIdList": ["n_four_a", "n_four_b"], "totalPercent": 0.5},
                {"rarityRank": 2, "charIdList": ["n_three_a", "n_three_b"], "totalPercent": 0.4}
            ]},
            "upCharInfo": {"perCharList": [
                {"rarityRank": 5, "charIdList": ["n_six_a"], "percent": 0.5, "count": 1},
                {"rarityRank": 4, "charIdList": ["n_five_a", "n_five_b"], "percent": 0.25, "count": 2}
            ]},
            "weightUpCharInfoList": [
                {"rarityRank": 3, "charId": "n_four_b", "weight": 500}
            ]
        },
        "GOLDEN_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["g_six"], "totalPercent": 0.0},
                {"rarityRank": 4, "charIdList": ["g_five"], "totalPercent": 0.0},
                {"rarityRank": 3, "charIdList": ["g_four"], "totalPercent": 0.0},
                {"rarityRank": 2, "charIdList": ["g_three"], "totalPercent": 1.0}
            ]}
        },
        "BROKEN_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 2, "charIdList": ["b_three"], "totalPercent": 1.0}
            ]}
        },
        "SINGLE_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["s_target", "s_other"], "totalPercent": 1.0}
            ]},
            "upCharInfo": {"perCharList": [
                {"rarityRank": 5, "charIdList": ["s_target"], "percent": 0.0, "count": 1}
            ]}
        },
        "LINKAGE_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["l_six_up", "l_six"], "totalPercent": 0.0},
                {"rarityRank": 2, "charIdList": ["l_three"], "totalPercent": 1.0}
            ]},
            "upCharInfo": {"perCharList": [
                {"rarityRank": 5, "charIdList": ["l_six_up"], "percent": 0.5, "count": 1}
            ]}
        },
        "ATTAIN_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["a_one", "a_two"], "totalPercent": 1.0}
            ]}
        },
        "CLASSIC_ATTAIN_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["ca_one"], "totalPercent": 1.0}
            ]}
        },
        "FES_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["f_a", "f_b", "f_c", "f_d", "f_e"], "totalPercent": 1.0}
            ]}
        },
        "CLASSIC_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["c_six"], "totalPercent": 0.02},
                {"rarityRank": 4, "charIdList": ["c_five"], "totalPercent": 0.08},
                {"rarityRank": 3, "charIdList": ["c_four"], "totalPercent": 0.5},
                {"rarityRank": 2, "charIdList": ["c_three"], "totalPercent": 0.4}
            ]}
        },
        "LIMITED_1": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["lm_six"], "totalPercent": 0.02},
                {"rarityRank": 4, "charIdList": ["lm_five"], "totalPercent": 0.08},
                {"rarityRank": 3, "charIdList": ["lm_four"], "totalPercent": 0.5},
                {"rarityRank": 2, "charIdList": ["lm_three"], "totalPercent": 0.4}
            ]}
        },
        "BOOT_0_1_2": {
            "availCharInfo": {"perAvailList": [
                {"rarityRank": 5, "charIdList": ["nb_six"], "totalPercent": 0.0},
                {"rarityRank": 4, "charIdList": ["nb_five"], "totalPercent": 0.0},
                {"rarityRank": 3, "charIdList": ["nb_four"], "totalPercent": 0.5},
                {"rarityRank": 2, "charIdList": ["nb_three"], "totalPercent": 0.5}
            ]}
        }
    }
}"#;

pub fn tables() -> GachaTables {
    GachaTables::from_json_str(CLIENT_TABLE, DETAIL_TABLE).expect("fixture tables are valid")
}

pub fn engine() -> GachaEngine {
    engine_with(EngineConfig::quiet())
}

pub fn engine_with(config: EngineConfig) -> GachaEngine {
    GachaEngine::new(tables(), config)
}

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn pairs(items: &[DrawnItem]) -> Vec<(String, u8)> {
    items.iter().map(|i| (i.id.clone(), i.rarity)).collect()
}

/// Replays fixed raw outputs so a draw sequence can be pinned exactly.
///
/// `WeightedIndex<f64>` reads one `u64` per sample and keeps its top 52 bits
/// as the fraction of the total weight, so [`at`] builds the output that
/// lands at a given fraction.
pub struct ScriptedRng {
    outputs: VecDeque<u64>,
}

impl ScriptedRng {
    pub fn new(fractions: &[f64]) -> Self {
        Self {
            outputs: fractions.iter().map(|f| at(*f)).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.outputs.len()
    }
}

pub fn at(fraction: f64) -> u64 {
    ((fraction * (1u64 << 52) as f64) as u64) << 12
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.outputs.pop_front().expect("script exhausted")
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
