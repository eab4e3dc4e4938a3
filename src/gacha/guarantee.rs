//! Guarantee floors and lazy rule-state initialisation.

use crate::constants::{
    LINKAGE_GUARANTEE_TIER, NEWBEE_SECOND_MILESTONE_DRAW, NEWBEE_TOP_MILESTONE_DRAW, NO_FLOOR,
    SECOND_TIER, TOP_TIER,
};
use crate::error::{GachaError, GachaResult};
use crate::state::{AttainState, FreeLimitState, LinkageState, PlayerSession, SingleState};
use crate::tables::{GachaTables, PoolClientMeta, PoolRef, RuleType};

/// Rarity the next draw on `pool` must not fall below.
///
/// For standard pools this also creates the soft-pity counter and the
/// rule-specific records the first time the pool is seen.
pub fn guaranteed_floor(
    tables: &GachaTables,
    session: &mut PlayerSession,
    pool: PoolRef<'_>,
) -> GachaResult<u8> {
    match pool {
        PoolRef::Standard(meta) => {
            let due = session.gacha.soft_pity(meta).floor_due();
            let floor = if due {
                session.gacha.soft_pity(meta).floor_rarity
            } else {
                NO_FLOOR
            };
            ensure_rule_state(tables, session, meta)?;
            Ok(floor)
        }
        PoolRef::Newbee(meta) => {
            let progress = session.pool_progress(&meta.gacha_pool_id);
            let next_draw = progress.total_draws + 1;
            if progress.obtained_top.is_empty() && next_draw == NEWBEE_TOP_MILESTONE_DRAW {
                Ok(TOP_TIER)
            } else if progress.obtained_second.is_empty()
                && next_draw == NEWBEE_SECOND_MILESTONE_DRAW
            {
                Ok(SECOND_TIER)
            } else {
                Ok(NO_FLOOR)
            }
        }
    }
}

/// Creates the pool's rule-specific record if it does not exist yet. Idempotent.
pub fn ensure_rule_state(
    tables: &GachaTables,
    session: &mut PlayerSession,
    meta: &PoolClientMeta,
) -> GachaResult<()> {
    let pool_id = meta.gacha_pool_id.as_str();
    let gacha = &mut session.gacha;
    match meta.gacha_rule_type {
        RuleType::Attain | RuleType::ClassicAttain => {
            gacha
                .attain
                .entry(pool_id.to_string())
                .or_insert_with(|| AttainState {
                    remaining: meta.attain_allowance(),
                });
        }
        RuleType::Linkage => {
            let rule = meta.linkage_rule()?;
            let detail = tables.detail(pool_id)?;
            let (Some(target), Some(count)) =
                (detail.first_up_target(), meta.linkage_target_count())
            else {
                return Ok(());
            };
            gacha
                .linkage
                .entry(rule.as_str().to_string())
                .or_default()
                .entry(pool_id.to_string())
                .or_insert_with(|| LinkageState {
                    next_second: rule.queues_second_tier(),
                    next_second_char: String::new(),
                    must_top: true,
                    must_top_char: target.to_string(),
                    must_top_count: count,
                    must_top_level: LINKAGE_GUARANTEE_TIER,
                });
        }
        RuleType::Single => {
            if let Some(target) = tables.detail(pool_id)?.first_up_target() {
                gacha
                    .single
                    .entry(pool_id.to_string())
                    .or_insert_with(|| SingleState::new(target));
            }
        }
        RuleType::FesClassic => {
            gacha.fes_classic_mut(pool_id);
        }
        RuleType::Limited => {
            gacha
                .limit
                .entry(pool_id.to_string())
                .or_insert_with(|| FreeLimitState {
                    remaining_free: tables.free_count(pool_id),
                });
        }
        RuleType::Normal | RuleType::Classic => {}
        RuleType::Newbee => {
            return Err(GachaError::InvalidRuleDispatch(format!(
                "standard pool {pool_id} carries the newbee rule"
            )));
        }
    }
    Ok(())
}
