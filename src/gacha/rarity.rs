//! Rarity tier selection with pity escalation.

use crate::constants::{
    LOWEST_DRAWABLE_TIER, SECOND_TIER, SECOND_TIER_PITY_START, SECOND_TIER_PITY_STEP_CAP,
    SECOND_TIER_PITY_STEP_RATE, SECOND_TIER_PITY_SURGE_RATE, SECOND_TIER_PITY_SURGE_START,
    TIER_COUNT, TOP_TIER, TOP_TIER_PITY_START,
};
use crate::error::{GachaError, GachaResult};
use crate::state::PoolProgress;
use crate::tables::PoolDetail;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Probability of each tier for the next draw on a pool. Always sums to 1.
pub fn rarity_weights(detail: &PoolDetail, progress: &PoolProgress) -> [f64; TIER_COUNT] {
    let mut weights = [0.0; TIER_COUNT];
    for tier in LOWEST_DRAWABLE_TIER..=TOP_TIER {
        weights[tier as usize] = detail.tier_total(tier);
    }

    let top = TOP_TIER as usize;
    if progress.streak_since_top >= TOP_TIER_PITY_START {
        let steps = (1 + progress.streak_since_top - TOP_TIER_PITY_START) as f64;
        let bonus = (weights[top] * steps).min(1.0 - weights[top]);
        weights[top] += bonus;
    }

    let second = SECOND_TIER as usize;
    let base_second = weights[second];
    let streak = progress.streak_since_second;
    if streak >= SECOND_TIER_PITY_START {
        let steps = (1 + streak - SECOND_TIER_PITY_START).min(SECOND_TIER_PITY_STEP_CAP);
        weights[second] += base_second * steps as f64 * SECOND_TIER_PITY_STEP_RATE;
    }
    if streak >= SECOND_TIER_PITY_SURGE_START {
        let steps = 1 + streak - SECOND_TIER_PITY_SURGE_START;
        weights[second] += base_second * steps as f64 * SECOND_TIER_PITY_SURGE_RATE;
    }

    // Higher tiers claim their mass first; the lowest drawable tier takes the rest.
    let mut assigned: f64 = 0.0;
    for tier in (0..TIER_COUNT).rev() {
        weights[tier] = weights[tier].min((1.0 - assigned).max(0.0));
        assigned += weights[tier];
    }
    let upper: f64 = weights[LOWEST_DRAWABLE_TIER as usize + 1..].iter().sum();
    weights[LOWEST_DRAWABLE_TIER as usize] = (1.0 - upper).max(0.0);

    weights
}

/// Draws a tier for the pool, never below `floor`.
pub fn roll_rarity<R: Rng>(
    detail: &PoolDetail,
    progress: &PoolProgress,
    floor: u8,
    rng: &mut R,
) -> GachaResult<u8> {
    let weights = rarity_weights(detail, progress);
    let dist = WeightedIndex::new(weights)
        .map_err(|e| GachaError::Configuration(format!("rarity weights unusable: {e}")))?;
    let sampled = dist.sample(rng) as u8;
    Ok(sampled.max(floor))
}
