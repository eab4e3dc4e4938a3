//! Draw orchestration and the request surface.
//!
//! A request is validated first, then resolved against a scratch copy of the
//! player's session. The copy replaces the session only when every draw of
//! the request succeeded, so a rejected or failed request leaves no trace.

use super::guarantee::{ensure_rule_state, guaranteed_floor};
use super::item::DrawnItem;
use super::pool::{build_fes_classic_pool, build_table_pool};
use super::rarity::roll_rarity;
use super::trigger::post_draw;
use crate::config::EngineConfig;
use crate::constants::{
    SECOND_TIER, SECOND_TIER_UP_OVERRIDE_DRAWS, TEN_DRAW_COUNT, TOP_TIER,
    TOP_TIER_UP_OVERRIDE_DRAWS, TUTORIAL_FIRST_DRAW_TIER, TUTORIAL_POOL_MARKER,
};
use crate::error::{GachaError, GachaResult};
use crate::state::{PlayerSession, PoolProgress};
use crate::tables::{GachaTables, PerUpChar, PoolDetail, PoolRef, RuleType};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Payment method the caller already validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketKind {
    #[default]
    Diamond,
    Ticket,
    TenTicket,
    ClassicTicket,
    /// Free draw granted by a limited pool's window
    FreeLimited,
}

/// Per-request context. Only the ticket choice affects resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawContext {
    pub ticket: TicketKind,
}

impl DrawContext {
    pub fn with_ticket(ticket: TicketKind) -> Self {
        Self { ticket }
    }
}

pub struct GachaEngine {
    tables: GachaTables,
    config: EngineConfig,
}

impl GachaEngine {
    pub fn new(tables: GachaTables, config: EngineConfig) -> Self {
        Self { tables, config }
    }

    pub fn tables(&self) -> &GachaTables {
        &self.tables
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A fresh session bound to the configured newbie pool.
    pub fn new_session(&self) -> PlayerSession {
        PlayerSession::with_newbee(&self.config.newbee_pool_id, self.config.newbee_draw_allowance)
    }

    pub fn resolve_single_draw<R: Rng>(
        &self,
        session: &mut PlayerSession,
        pool_id: &str,
        ctx: &DrawContext,
        rng: &mut R,
    ) -> GachaResult<DrawnItem> {
        let mut items = self.resolve_request(session, pool_id, ctx, 1, rng)?;
        items.pop().ok_or_else(|| {
            GachaError::InvalidRuleDispatch(format!("single draw on {pool_id} produced no item"))
        })
    }

    /// Ten sequential draws, returned in draw order. All or nothing.
    pub fn resolve_ten_draws<R: Rng>(
        &self,
        session: &mut PlayerSession,
        pool_id: &str,
        ctx: &DrawContext,
        rng: &mut R,
    ) -> GachaResult<Vec<DrawnItem>> {
        self.resolve_request(session, pool_id, ctx, TEN_DRAW_COUNT, rng)
    }

    /// Checks that the pool exists, is open and its rule is provided.
    pub fn admit(&self, pool_id: &str) -> GachaResult<PoolRef<'_>> {
        let pool = self
            .tables
            .resolve(pool_id)
            .ok_or_else(|| GachaError::InvalidPoolId(pool_id.to_string()))?;
        if self.config.is_forbidden(pool_id) {
            return Err(GachaError::ForbiddenPool(pool_id.to_string()));
        }
        let rule = pool.rule_type();
        if self.config.is_unsupported(rule) {
            return Err(GachaError::UnsupportedRuleVariant {
                pool_id: pool_id.to_string(),
                rule,
            });
        }
        Ok(pool)
    }

    fn resolve_request<R: Rng>(
        &self,
        session: &mut PlayerSession,
        pool_id: &str,
        ctx: &DrawContext,
        count: usize,
        rng: &mut R,
    ) -> GachaResult<Vec<DrawnItem>> {
        let pool = match self.admit(pool_id) {
            Ok(pool) => pool,
            Err(e) => {
                warn!(pool = pool_id, error = %e, "Gacha request rejected");
                return Err(e);
            }
        };

        let mut scratch = session.clone();
        let items = self.run_request(&mut scratch, pool, ctx, count, rng)?;
        *session = scratch;
        Ok(items)
    }

    fn run_request<R: Rng>(
        &self,
        session: &mut PlayerSession,
        pool: PoolRef<'_>,
        ctx: &DrawContext,
        count: usize,
        rng: &mut R,
    ) -> GachaResult<Vec<DrawnItem>> {
        let pool_id = pool.pool_id();
        session.ensure_initialized(pool_id, pool.rule_type());

        match pool {
            PoolRef::Newbee(_) => {
                let newbee = &mut session.gacha.newbee;
                newbee.remaining = newbee.remaining.saturating_sub(count as u32);
                newbee.open = newbee.remaining > 0;
            }
            PoolRef::Standard(meta) => {
                ensure_rule_state(&self.tables, session, meta)?;
                let free_ticket = count == 1 && ctx.ticket == TicketKind::FreeLimited;
                if free_ticket && meta.gacha_rule_type == RuleType::Limited {
                    if let Some(limit) = session.gacha.limit.get_mut(pool_id) {
                        limit.remaining_free = limit.remaining_free.saturating_sub(1);
                    }
                }
            }
        }

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let item = self.draw(session, pool, rng)?;
            session
                .pool_progress(pool_id)
                .record_history(&item.id, item.rarity);
            items.push(item);
        }
        Ok(items)
    }

    /// Resolves one draw on an admitted pool and applies it to the session.
    pub fn draw<R: Rng>(
        &self,
        session: &mut PlayerSession,
        pool: PoolRef<'_>,
        rng: &mut R,
    ) -> GachaResult<DrawnItem> {
        let pool_id = pool.pool_id();
        let rule = pool.rule_type();
        let detail = self.tables.detail(pool_id)?;

        let floor = guaranteed_floor(&self.tables, session, pool)?;
        let progress = session.pool_progress(pool_id);
        let mut rarity = roll_rarity(detail, progress, floor, rng)?;
        if pool_id.contains(TUTORIAL_POOL_MARKER) && progress.total_draws == 0 {
            rarity = TUTORIAL_FIRST_DRAW_TIER.max(floor);
        }

        let pools = if rule.uses_player_roster() {
            build_fes_classic_pool(detail, session.gacha.fes_classic.get(pool_id))
        } else {
            build_table_pool(detail)
        };
        let group = pools.group(rarity).ok_or_else(|| {
            GachaError::Configuration(format!("pool {pool_id} has no candidates at tier {rarity}"))
        })?;
        let mut item = DrawnItem::character(group.sample(rng)?, rarity);

        let progress = session.pool_progress(pool_id);
        item.before_non_hit_cnt = Some(progress.streak_since_top);
        if !rule.uses_player_roster() {
            apply_up_override(detail, progress, &mut item, rng);
        }

        if let PoolRef::Standard(meta) = pool {
            post_draw(&self.tables, session, meta, &mut item, rng)?;
        }

        session
            .pool_progress(pool_id)
            .record_result(&item.id, item.rarity);

        if self.config.log_draws {
            debug!(
                rule = %rule,
                pool = pool_id,
                id = %item.id,
                rarity = item.rarity,
                log = %serde_json::Value::Object(item.log_fields()),
                "Draw resolved"
            );
        }
        Ok(item)
    }
}

/// Late in a pool's life, replaces up-tier hits with up-characters the player lacks.
fn apply_up_override<R: Rng>(
    detail: &PoolDetail,
    progress: &PoolProgress,
    item: &mut DrawnItem,
    rng: &mut R,
) {
    let groups = detail.up_groups();
    let this_draw = progress.total_draws + 1;

    if this_draw >= SECOND_TIER_UP_OVERRIDE_DRAWS && item.rarity == SECOND_TIER {
        if let Some(group) = groups.last().filter(|g| g.rarity_rank == SECOND_TIER) {
            substitute_unclaimed(group, &progress.obtained_second, item, rng);
        }
    }
    if this_draw >= TOP_TIER_UP_OVERRIDE_DRAWS && item.rarity == TOP_TIER {
        if let Some(group) = groups.first().filter(|g| g.rarity_rank == TOP_TIER) {
            substitute_unclaimed(group, &progress.obtained_top, item, rng);
        }
    }
}

fn substitute_unclaimed<R: Rng>(
    group: &PerUpChar,
    claimed: &BTreeSet<String>,
    item: &mut DrawnItem,
    rng: &mut R,
) {
    let unclaimed: Vec<&String> = group
        .char_id_list
        .iter()
        .filter(|id| !claimed.contains(*id))
        .collect();
    if let Some(pick) = unclaimed.choose(rng) {
        item.id = (*pick).clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{
        AvailCharInfo, ClientTable, DetailTable, NewbeePoolMeta, PerAvail, UpCharInfo,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Every draw lands on tier 2 unless a floor lifts it.
    fn flat_detail() -> PoolDetail {
        let group = |rank: u8, pct: f64, names: &[&str]| PerAvail {
            rarity_rank: rank,
            char_id_list: ids(names),
            total_percent: pct,
        };
        PoolDetail {
            avail_char_info: AvailCharInfo {
                per_avail_list: vec![
                    group(5, 0.0, &["six"]),
                    group(4, 0.0, &["five_a", "five_b"]),
                    group(3, 0.0, &["four"]),
                    group(2, 1.0, &["three"]),
                ],
            },
            up_char_info: Some(UpCharInfo {
                per_char_list: vec![
                    PerUpChar {
                        rarity_rank: 5,
                        char_id_list: ids(&["six"]),
                        percent: 0.5,
                        count: 1,
                    },
                    PerUpChar {
                        rarity_rank: 4,
                        char_id_list: ids(&["five_a", "five_b"]),
                        percent: 0.25,
                        count: 2,
                    },
                ],
            }),
            weight_up_char_info_list: None,
        }
    }

    fn engine(config: EngineConfig) -> GachaEngine {
        let normal = serde_json::from_value(json!({
            "gachaPoolId": "NORM_1",
            "gachaRuleType": "NORMAL",
            "guarantee5Avail": 1,
            "guarantee5Count": 10
        }))
        .unwrap();
        let limited = serde_json::from_value(json!({
            "gachaPoolId": "LIMITED_1",
            "gachaRuleType": "LIMITED",
            "guarantee5Avail": 0,
            "guarantee5Count": 0
        }))
        .unwrap();
        let mut details = BTreeMap::new();
        for id in ["NORM_1", "LIMITED_1", "BOOT_0_1_2"] {
            details.insert(id.to_string(), flat_detail());
        }
        let client: ClientTable = ClientTable {
            gacha_pool_client: vec![normal, limited],
            newbee_gacha_pool_client: vec![NewbeePoolMeta {
                gacha_pool_id: "BOOT_0_1_2".into(),
                gacha_pool_name: String::new(),
                gacha_price: 0,
                gacha_times: 0,
            }],
            free_gacha: serde_json::from_value(json!([
                {"poolId": "LIMITED_1", "openTime": 0, "endTime": 0, "freeCount": 1}
            ]))
            .unwrap(),
        };
        let tables = GachaTables::new(client, DetailTable { details }).unwrap();
        GachaEngine::new(tables, config)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(2024)
    }

    #[test]
    fn test_soft_pity_lifts_tenth_draw() {
        let engine = engine(EngineConfig::default());
        let mut session = engine.new_session();
        let items = engine
            .resolve_ten_draws(&mut session, "NORM_1", &DrawContext::default(), &mut rng())
            .unwrap();
        let pairs: Vec<(&str, u8)> = items.iter().map(|i| (i.id.as_str(), i.rarity)).collect();
        assert!(pairs[..9].iter().all(|p| *p == ("three", 2)));
        assert_eq!(pairs[9].1, 4);

        let progress = session.progress("NORM_1").unwrap();
        assert_eq!(progress.total_draws, 10);
        assert_eq!(progress.history.len(), 10);
        assert_eq!(progress.streak_since_second, 0);
        assert_eq!(progress.streak_since_top, 10);
        assert!(!session.gacha.normal["NORM_1"].eligible);
    }

    #[test]
    fn test_before_non_hit_cnt_is_pre_draw_streak() {
        let engine = engine(EngineConfig::default());
        let mut session = engine.new_session();
        let ctx = DrawContext::default();
        for expected in 0..3 {
            let item = engine
                .resolve_single_draw(&mut session, "NORM_1", &ctx, &mut rng())
                .unwrap();
            assert_eq!(item.before_non_hit_cnt, Some(expected));
        }
        assert_eq!(session.track.non_normal_top_streak, 2);
    }

    #[test]
    fn test_normal_pool_seeds_from_shared_counter() {
        let engine = engine(EngineConfig::default());
        let mut session = engine.new_session();
        session.track.non_normal_top_streak = 40;
        let item = engine
            .resolve_single_draw(&mut session, "NORM_1", &DrawContext::default(), &mut rng())
            .unwrap();
        assert_eq!(item.before_non_hit_cnt, Some(40));
    }

    #[test]
    fn test_tutorial_first_draw_is_scripted() {
        let engine = engine(EngineConfig::default());
        let mut session = engine.new_session();
        let ctx = DrawContext::default();
        let first = engine
            .resolve_single_draw(&mut session, "BOOT_0_1_2", &ctx, &mut rng())
            .unwrap();
        assert_eq!((first.id.as_str(), first.rarity), ("four", 3));
        let second = engine
            .resolve_single_draw(&mut session, "BOOT_0_1_2", &ctx, &mut rng())
            .unwrap();
        assert_eq!(second.rarity, 2);
        assert_eq!(session.gacha.newbee.remaining, 19);
        assert!(session.gacha.newbee.open);
        assert!(session.gacha.normal.is_empty());
    }

    #[test]
    fn test_newbee_allowance_saturates() {
        let engine = engine(EngineConfig::default());
        let mut session = engine.new_session();
        session.gacha.newbee.remaining = 4;
        engine
            .resolve_ten_draws(&mut session, "BOOT_0_1_2", &DrawContext::default(), &mut rng())
            .unwrap();
        assert_eq!(session.gacha.newbee.remaining, 0);
        assert!(!session.gacha.newbee.open);
    }

    #[test]
    fn test_free_limited_ticket_consumed_once() {
        let engine = engine(EngineConfig::default());
        let mut session = engine.new_session();
        let free = DrawContext::with_ticket(TicketKind::FreeLimited);
        engine
            .resolve_single_draw(&mut session, "LIMITED_1", &free, &mut rng())
            .unwrap();
        assert_eq!(session.gacha.limit["LIMITED_1"].remaining_free, 0);
        engine
            .resolve_single_draw(&mut session, "LIMITED_1", &free, &mut rng())
            .unwrap();
        assert_eq!(session.gacha.limit["LIMITED_1"].remaining_free, 0);
    }

    #[test]
    fn test_paid_ticket_keeps_free_draw() {
        let engine = engine(EngineConfig::default());
        let mut session = engine.new_session();
        engine
            .resolve_ten_draws(
                &mut session,
                "LIMITED_1",
                &DrawContext::with_ticket(TicketKind::FreeLimited),
                &mut rng(),
            )
            .unwrap();
        assert_eq!(session.gacha.limit["LIMITED_1"].remaining_free, 1);
    }

    #[test]
    fn test_rejections_leave_session_untouched() {
        let engine = engine(EngineConfig::default().forbid("LIMITED_1"));
        let mut session = engine.new_session();
        engine
            .resolve_single_draw(&mut session, "NORM_1", &DrawContext::default(), &mut rng())
            .unwrap();
        let snapshot = session.clone();

        let err = engine
            .resolve_single_draw(&mut session, "NOPE", &DrawContext::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, GachaError::InvalidPoolId(_)));
        let err = engine
            .resolve_ten_draws(&mut session, "LIMITED_1", &DrawContext::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, GachaError::ForbiddenPool(_)));
        assert_eq!(session, snapshot);
    }

    #[test]
    fn test_up_override_after_sixty_draws() {
        let detail = flat_detail();
        let mut progress = PoolProgress {
            total_draws: 58,
            ..Default::default()
        };
        progress.obtained_second.insert("five_a".into());
        let mut r = rng();

        let mut early = DrawnItem::character("elsewhere", 4);
        apply_up_override(&detail, &progress, &mut early, &mut r);
        assert_eq!(early.id, "elsewhere");

        progress.total_draws = 59;
        let mut late = DrawnItem::character("elsewhere", 4);
        apply_up_override(&detail, &progress, &mut late, &mut r);
        assert_eq!(late.id, "five_b");

        progress.obtained_second.insert("five_b".into());
        let mut exhausted = DrawnItem::character("elsewhere", 4);
        apply_up_override(&detail, &progress, &mut exhausted, &mut r);
        assert_eq!(exhausted.id, "elsewhere");
    }

    #[test]
    fn test_top_up_override_after_two_hundred_draws() {
        let detail = flat_detail();
        let mut progress = PoolProgress {
            total_draws: 198,
            ..Default::default()
        };
        let mut r = rng();

        let mut early = DrawnItem::character("other_six", 5);
        apply_up_override(&detail, &progress, &mut early, &mut r);
        assert_eq!(early.id, "other_six");

        progress.total_draws = 199;
        let mut late = DrawnItem::character("other_six", 5);
        apply_up_override(&detail, &progress, &mut late, &mut r);
        assert_eq!(late.id, "six");
    }
}
