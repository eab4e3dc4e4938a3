//! Per-player sessions behind one lock each.
//!
//! Draws for the same player run strictly one after another; different
//! players never contend beyond the brief map lookup.

use crate::error::GachaResult;
use crate::gacha::{DrawContext, DrawnItem, GachaEngine};
use crate::state::PlayerSession;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

type SharedSession = Arc<Mutex<PlayerSession>>;

pub struct SessionRegistry {
    engine: Arc<GachaEngine>,
    sessions: Mutex<BTreeMap<String, SharedSession>>,
}

// Sessions are only replaced wholesale after a successful request, so the
// data behind a poisoned lock is still consistent.
fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionRegistry {
    pub fn new(engine: Arc<GachaEngine>) -> Self {
        Self {
            engine,
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn engine(&self) -> &GachaEngine {
        &self.engine
    }

    /// The player's session, created fresh on first reference.
    pub fn session(&self, player_id: &str) -> SharedSession {
        let mut sessions = relock(&self.sessions);
        Arc::clone(
            sessions
                .entry(player_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(self.engine.new_session()))),
        )
    }

    /// Installs a previously saved session, replacing any live one.
    pub fn insert(&self, player_id: &str, session: PlayerSession) {
        relock(&self.sessions).insert(player_id.to_string(), Arc::new(Mutex::new(session)));
    }

    pub fn snapshot(&self, player_id: &str) -> Option<PlayerSession> {
        let shared = relock(&self.sessions).get(player_id).cloned()?;
        let session = relock(&shared).clone();
        Some(session)
    }

    pub fn player_ids(&self) -> Vec<String> {
        relock(&self.sessions).keys().cloned().collect()
    }

    pub fn single_draw<R: Rng>(
        &self,
        player_id: &str,
        pool_id: &str,
        ctx: &DrawContext,
        rng: &mut R,
    ) -> GachaResult<DrawnItem> {
        let shared = self.session(player_id);
        let mut session = relock(&shared);
        self.engine
            .resolve_single_draw(&mut session, pool_id, ctx, rng)
    }

    pub fn ten_draws<R: Rng>(
        &self,
        player_id: &str,
        pool_id: &str,
        ctx: &DrawContext,
        rng: &mut R,
    ) -> GachaResult<Vec<DrawnItem>> {
        let shared = self.session(player_id);
        let mut session = relock(&shared);
        self.engine.resolve_ten_draws(&mut session, pool_id, ctx, rng)
    }
}
