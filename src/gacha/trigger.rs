//! Post-draw rule dispatch.
//!
//! Runs after the candidate is sampled and before the pool's streaks are
//! updated. Each rule may rewrite the drawn item and advances its own
//! auxiliary record. Every standard pool then advances its soft-pity counter.

use crate::constants::{SECOND_TIER, SINGLE_ENSURE_ARMED, SINGLE_ENSURE_CAP, TOP_TIER};
use crate::error::{GachaError, GachaResult};
use crate::gacha::item::DrawnItem;
use crate::gacha::pool::build_table_pool;
use crate::state::PlayerSession;
use crate::tables::{GachaTables, LinkageRule, PoolClientMeta, RuleType};
use rand::seq::SliceRandom;
use rand::Rng;

/// Applies the pool's rule to `item` and updates the player's rule state.
pub fn post_draw<R: Rng>(
    tables: &GachaTables,
    session: &mut PlayerSession,
    meta: &PoolClientMeta,
    item: &mut DrawnItem,
    rng: &mut R,
) -> GachaResult<()> {
    let pool_id = meta.gacha_pool_id.as_str();
    match meta.gacha_rule_type {
        RuleType::Normal => {
            session.track.non_normal_top_streak = top_streak(session, pool_id);
        }
        RuleType::Classic | RuleType::FesClassic => {
            session.track.non_classic_top_streak = top_streak(session, pool_id);
            item.is_classic = true;
        }
        RuleType::Linkage => apply_linkage(tables, session, meta, item)?,
        RuleType::Attain => apply_attain(tables, session, pool_id, item, rng)?,
        RuleType::ClassicAttain => {
            item.is_classic = true;
            apply_attain(tables, session, pool_id, item, rng)?;
        }
        RuleType::Single => apply_single(tables, session, pool_id, item)?,
        RuleType::Limited => {}
        RuleType::Newbee => {
            return Err(GachaError::InvalidRuleDispatch(format!(
                "newbee rule reached the dispatcher for pool {pool_id}"
            )));
        }
    }

    session.gacha.soft_pity(meta).record(item.rarity);
    Ok(())
}

fn top_streak(session: &PlayerSession, pool_id: &str) -> u32 {
    session
        .progress(pool_id)
        .map(|p| p.streak_since_top)
        .unwrap_or(0)
}

fn apply_linkage(
    tables: &GachaTables,
    session: &mut PlayerSession,
    meta: &PoolClientMeta,
    item: &mut DrawnItem,
) -> GachaResult<()> {
    let pool_id = meta.gacha_pool_id.as_str();
    let rule = meta.linkage_rule()?;
    let detail = tables.detail(pool_id)?;
    if detail.up_char_info.is_none() {
        return Ok(());
    }
    let obtained_second = session
        .progress(pool_id)
        .map(|p| p.obtained_second.clone())
        .unwrap_or_default();
    let Some(linkage) = session.gacha.linkage_state_mut(rule, pool_id) else {
        return Ok(());
    };

    if linkage.must_top {
        linkage.must_top_count -= 1;
        if linkage.must_top_count <= 0 {
            item.id = linkage.must_top_char.clone();
            item.rarity = linkage.must_top_level;
        }
    }
    if item.rarity == TOP_TIER && item.id == linkage.must_top_char {
        linkage.must_top = false;
        linkage.must_top_char.clear();
        linkage.must_top_count = 0;
    }

    if rule != LinkageRule::R6_01 || item.rarity != SECOND_TIER {
        return Ok(());
    }
    let reserved = detail
        .up_groups()
        .last()
        .map(|g| g.char_id_list.as_slice())
        .unwrap_or(&[]);
    if !reserved.contains(&item.id) {
        return Ok(());
    }
    if linkage.next_second && !linkage.next_second_char.is_empty() {
        item.id = linkage.next_second_char.clone();
    }
    if reserved.contains(&item.id) {
        match reserved.iter().find(|c| !obtained_second.contains(*c)) {
            Some(next) => linkage.next_second_char = next.clone(),
            None => {
                linkage.next_second = false;
                linkage.next_second_char.clear();
            }
        }
    }
    Ok(())
}

fn apply_attain<R: Rng>(
    tables: &GachaTables,
    session: &mut PlayerSession,
    pool_id: &str,
    item: &mut DrawnItem,
    rng: &mut R,
) -> GachaResult<()> {
    let Some(attain) = session.gacha.attain.get_mut(pool_id) else {
        return Ok(());
    };
    if attain.remaining == 0 || item.rarity != TOP_TIER {
        return Ok(());
    }
    // owned-character exclusion is not applied
    let pools = build_table_pool(tables.detail(pool_id)?);
    if let Some(pick) = pools
        .group(TOP_TIER)
        .and_then(|g| g.candidates.choose(rng))
    {
        item.id = pick.clone();
    }
    attain.remaining -= 1;
    Ok(())
}

fn apply_single(
    tables: &GachaTables,
    session: &mut PlayerSession,
    pool_id: &str,
    item: &mut DrawnItem,
) -> GachaResult<()> {
    let Some(single) = session.gacha.single.get_mut(pool_id) else {
        return Ok(());
    };
    item.single_ensure_cnt = Some(if single.is_armed() {
        SINGLE_ENSURE_CAP
    } else {
        single.ensure_count
    });
    item.is_single_ensure = Some(false);

    if single.ensure_used {
        return Ok(());
    }
    let Some(target) = tables.detail(pool_id)?.first_up_target() else {
        return Ok(());
    };

    if single.is_armed() {
        if item.rarity == TOP_TIER {
            item.id = single.ensure_char.clone();
            single.ensure_used = true;
            item.is_single_ensure = Some(true);
        }
    } else if item.id == target {
        single.ensure_count = 0;
    } else if single.ensure_count + 1 < SINGLE_ENSURE_CAP {
        single.ensure_count += 1;
    } else {
        single.ensure_count = SINGLE_ENSURE_ARMED;
    }
    Ok(())
}
