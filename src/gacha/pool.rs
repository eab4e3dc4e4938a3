//! Per-tier weighted candidate pools.
//!
//! Within a tier every candidate starts with an equal share of the tier's
//! mass. Up-characters take a fixed share each, weight overrides take a
//! multiple of the plain share, and the plain candidates split what is left.

use crate::constants::{
    FES_CLASSIC_OTHER_TIER_SHARE, FES_CLASSIC_TOP_TIER_SHARE, TIER_COUNT, TOP_TIER,
    WEIGHT_UNITS_PER_RATE,
};
use crate::error::{GachaError, GachaResult};
use crate::state::FesClassicState;
use crate::tables::{PerAvail, PoolDetail, WeightUpChar};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Parallel weights and candidates for one availability group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedGroup {
    pub rarity: u8,
    pub weights: Vec<f64>,
    pub candidates: Vec<String>,
}

impl WeightedGroup {
    /// Picks a candidate with probability proportional to its weight.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> GachaResult<&str> {
        let dist = WeightedIndex::new(&self.weights).map_err(|e| {
            GachaError::Configuration(format!("tier {} cannot be sampled: {e}", self.rarity))
        })?;
        Ok(&self.candidates[dist.sample(rng)])
    }

    pub fn weight_of(&self, candidate: &str) -> Option<f64> {
        self.candidates
            .iter()
            .position(|c| c == candidate)
            .map(|i| self.weights[i])
    }
}

/// Weighted groups indexed by rarity tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierPools {
    tiers: [Vec<WeightedGroup>; TIER_COUNT],
}

impl TierPools {
    /// The group sampled for a tier: the first one the tables list.
    pub fn group(&self, tier: u8) -> Option<&WeightedGroup> {
        self.groups(tier).first()
    }

    pub fn groups(&self, tier: u8) -> &[WeightedGroup] {
        self.tiers
            .get(tier as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn push(&mut self, group: WeightedGroup) {
        if let Some(slot) = self.tiers.get_mut(group.rarity as usize) {
            slot.push(group);
        }
    }
}

/// Builds pools from the detail table's up-character and weight-override lists.
pub fn build_table_pool(detail: &PoolDetail) -> TierPools {
    let mut pools = TierPools::default();
    for group in &detail.avail_char_info.per_avail_list {
        let (boosted, share) = match detail.up_group_for_tier(group.rarity_rank) {
            Some(up) => (up.char_id_list.as_slice(), up.percent),
            None => (&[][..], 0.0),
        };
        let overrides = detail.weight_overrides_for_tier(group.rarity_rank);
        pools.push(weigh_group(group, boosted, share, &overrides));
    }
    pools
}

/// Builds pools where the player's fes-classic roster replaces the table's up-characters.
pub fn build_fes_classic_pool(detail: &PoolDetail, roster: Option<&FesClassicState>) -> TierPools {
    let mut pools = TierPools::default();
    for group in &detail.avail_char_info.per_avail_list {
        let boosted = roster
            .map(|r| r.up_characters(group.rarity_rank))
            .unwrap_or(&[]);
        let share = if group.rarity_rank == TOP_TIER {
            FES_CLASSIC_TOP_TIER_SHARE
        } else {
            FES_CLASSIC_OTHER_TIER_SHARE
        };
        pools.push(weigh_group(group, boosted, share, &[]));
    }
    pools
}

fn weigh_group(
    group: &PerAvail,
    boosted: &[String],
    boosted_share: f64,
    overrides: &[&WeightUpChar],
) -> WeightedGroup {
    let mut plain_count = group.char_id_list.len() as f64;
    let mut remaining: f64 = 1.0;

    if !boosted.is_empty() {
        plain_count -= boosted.len() as f64;
        remaining -= boosted_share * boosted.len() as f64;
    }

    let mut override_share = 0.0;
    if let Some(first) = overrides.first() {
        plain_count -= overrides.len() as f64;
        // whole multiples of the plain share only
        let rate = (first.weight / WEIGHT_UNITS_PER_RATE) as f64;
        let denominator = plain_count + overrides.len() as f64 * rate;
        if denominator > 0.0 {
            override_share = remaining / denominator * rate;
        }
        remaining -= override_share * overrides.len() as f64;
    }

    let plain_share = if plain_count > 0.0 {
        remaining.max(0.0) / plain_count
    } else {
        0.0
    };

    let weights = group
        .char_id_list
        .iter()
        .map(|id| {
            if boosted.contains(id) {
                boosted_share
            } else if overrides.iter().any(|w| &w.char_id == id) {
                override_share
            } else {
                plain_share
            }
        })
        .collect();

    WeightedGroup {
        rarity: group.rarity_rank,
        weights,
        candidates: group.char_id_list.clone(),
    }
}
