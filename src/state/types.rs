use crate::constants::{
    DEFAULT_NEWBEE_DRAW_ALLOWANCE, DEFAULT_NEWBEE_POOL_ID, SECOND_TIER, SINGLE_ENSURE_ARMED,
    SOFT_PITY_FLOOR_TIER, TOP_TIER,
};
use crate::tables::{LinkageRule, PoolClientMeta, RuleType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub rarity: u8,
}

/// Per-pool draw counters. Created on first reference, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolProgress {
    pub initialized: bool,
    pub total_draws: u32,
    /// Draws since the last top-tier (5) result.
    pub streak_since_top: u32,
    /// Draws since the last tier-4-or-higher result.
    pub streak_since_second: u32,
    pub obtained_second: BTreeSet<String>,
    pub obtained_top: BTreeSet<String>,
    pub history: Vec<HistoryEntry>,
}

impl PoolProgress {
    /// Applies the final result of a draw to the streaks and obtained sets.
    pub fn record_result(&mut self, id: &str, rarity: u8) {
        match rarity {
            TOP_TIER => {
                self.streak_since_top = 0;
                self.streak_since_second = 0;
                self.obtained_top.insert(id.to_string());
            }
            SECOND_TIER => {
                self.streak_since_second = 0;
                self.streak_since_top += 1;
                self.obtained_second.insert(id.to_string());
            }
            _ => {
                self.streak_since_top += 1;
                self.streak_since_second += 1;
            }
        }
        self.total_draws += 1;
    }

    pub fn record_history(&mut self, id: &str, rarity: u8) {
        self.history.push(HistoryEntry {
            id: id.to_string(),
            rarity,
        });
    }
}

/// Soft-pity floor of a standard pool.
///
/// `eligible` is cleared the first time a draw reaches `floor_rarity` and is
/// never re-armed within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftPityCounter {
    pub draws_since_reset: u32,
    pub max_draws: u32,
    pub floor_rarity: u8,
    pub eligible: bool,
}

impl SoftPityCounter {
    pub fn for_pool(meta: &PoolClientMeta) -> Self {
        Self {
            draws_since_reset: 0,
            max_draws: meta.guarantee5_count,
            floor_rarity: SOFT_PITY_FLOOR_TIER,
            eligible: meta.soft_pity_eligible(),
        }
    }

    /// True when the next draw is the one that must reach the floor.
    pub fn floor_due(&self) -> bool {
        self.eligible && self.draws_since_reset + 1 == self.max_draws
    }

    pub fn record(&mut self, rarity: u8) {
        self.draws_since_reset += 1;
        if self.eligible && rarity >= self.floor_rarity {
            self.eligible = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageState {
    pub next_second: bool,
    pub next_second_char: String,
    pub must_top: bool,
    pub must_top_char: String,
    pub must_top_count: i64,
    pub must_top_level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttainState {
    pub remaining: u32,
}

/// Ensure counter of a single-up pool. A negative count means the guarantee is armed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleState {
    pub ensure_count: i32,
    pub ensure_used: bool,
    pub ensure_char: String,
}

impl SingleState {
    pub fn new(ensure_char: &str) -> Self {
        Self {
            ensure_count: 0,
            ensure_used: false,
            ensure_char: ensure_char.to_string(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.ensure_count <= SINGLE_ENSURE_ARMED
    }
}

/// Player-selected boosted roster of a fes-classic pool, keyed by rarity tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FesClassicState {
    pub up_chars: BTreeMap<u8, Vec<String>>,
}

impl FesClassicState {
    pub fn set_up_characters(&mut self, tier: u8, ids: Vec<String>) {
        if ids.is_empty() {
            self.up_chars.remove(&tier);
        } else {
            self.up_chars.insert(tier, ids);
        }
    }

    pub fn up_characters(&self, tier: u8) -> &[String] {
        self.up_chars.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeLimitState {
    pub remaining_free: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewbeeState {
    /// Cleared once the allowance is spent.
    pub open: bool,
    pub remaining: u32,
    pub pool_id: String,
}

impl Default for NewbeeState {
    fn default() -> Self {
        Self {
            open: true,
            remaining: DEFAULT_NEWBEE_DRAW_ALLOWANCE,
            pool_id: DEFAULT_NEWBEE_POOL_ID.to_string(),
        }
    }
}

/// Rule-specific player records, all keyed by pool id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGacha {
    pub newbee: NewbeeState,
    pub normal: BTreeMap<String, SoftPityCounter>,
    pub attain: BTreeMap<String, AttainState>,
    pub single: BTreeMap<String, SingleState>,
    pub fes_classic: BTreeMap<String, FesClassicState>,
    pub limit: BTreeMap<String, FreeLimitState>,
    /// Keyed by linkage rule id, then pool id.
    pub linkage: BTreeMap<String, BTreeMap<String, LinkageState>>,
}

impl PlayerGacha {
    /// Soft-pity counter of a standard pool, created from its metadata on first use.
    pub fn soft_pity(&mut self, meta: &PoolClientMeta) -> &mut SoftPityCounter {
        self.normal
            .entry(meta.gacha_pool_id.clone())
            .or_insert_with(|| SoftPityCounter::for_pool(meta))
    }

    pub fn linkage_state(&self, rule: LinkageRule, pool_id: &str) -> Option<&LinkageState> {
        self.linkage.get(rule.as_str())?.get(pool_id)
    }

    pub fn linkage_state_mut(
        &mut self,
        rule: LinkageRule,
        pool_id: &str,
    ) -> Option<&mut LinkageState> {
        self.linkage.get_mut(rule.as_str())?.get_mut(pool_id)
    }

    pub fn fes_classic_mut(&mut self, pool_id: &str) -> &mut FesClassicState {
        self.fes_classic.entry(pool_id.to_string()).or_default()
    }
}

/// Per-pool progress plus the session-wide streak counters.
///
/// `non_normal_top_streak` and `non_classic_top_streak` start at 0 with the
/// session, are written only by NORMAL and classic-family dispatch, and seed
/// the top-tier streak of pools of the same family on first reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GachaTrack {
    pub pools: BTreeMap<String, PoolProgress>,
    pub non_normal_top_streak: u32,
    pub non_classic_top_streak: u32,
}

/// Everything one player's draws read and mutate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    pub gacha: PlayerGacha,
    pub track: GachaTrack,
}

impl PlayerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_newbee(pool_id: &str, allowance: u32) -> Self {
        let mut session = Self::default();
        session.gacha.newbee = NewbeeState {
            open: true,
            remaining: allowance,
            pool_id: pool_id.to_string(),
        };
        session
    }

    pub fn progress(&self, pool_id: &str) -> Option<&PoolProgress> {
        self.track.pools.get(pool_id)
    }

    /// The single entry point for touching a pool's progress; creates it on first reference.
    pub fn pool_progress(&mut self, pool_id: &str) -> &mut PoolProgress {
        self.track.pools.entry(pool_id.to_string()).or_default()
    }

    /// Marks the pool initialised, seeding its top streak from the family counter the first time.
    pub fn ensure_initialized(&mut self, pool_id: &str, rule: RuleType) -> &mut PoolProgress {
        let seed = match rule {
            RuleType::Normal => Some(self.track.non_normal_top_streak),
            r if r.is_classic_family() => Some(self.track.non_classic_top_streak),
            _ => None,
        };
        let progress = self.track.pools.entry(pool_id.to_string()).or_default();
        if !progress.initialized {
            if let Some(streak) = seed {
                progress.streak_since_top = streak;
            }
            progress.initialized = true;
        }
        progress
    }
}
