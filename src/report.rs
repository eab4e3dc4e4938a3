//! Aggregated statistics over a run of draws.

use crate::constants::{SECOND_TIER, TIER_COUNT, TOP_TIER};
use crate::gacha::DrawnItem;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DrawReport {
    pub pool_id: String,
    pub draws: u32,
    pub per_tier: [u32; TIER_COUNT],
    pub per_character: BTreeMap<String, u32>,

    /// 1-based draw number of the first top-tier result
    pub first_top_at: Option<u32>,
    /// Longest run of draws without a top-tier result
    pub longest_top_drought: u32,
    pub single_ensure_hits: u32,

    #[serde(skip)]
    current_drought: u32,
}

impl DrawReport {
    pub fn new(pool_id: &str) -> Self {
        Self {
            pool_id: pool_id.to_string(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, item: &DrawnItem) {
        self.draws += 1;
        if let Some(slot) = self.per_tier.get_mut(item.rarity as usize) {
            *slot += 1;
        }
        *self.per_character.entry(item.id.clone()).or_insert(0) += 1;

        if item.rarity == TOP_TIER {
            self.first_top_at.get_or_insert(self.draws);
            self.current_drought = 0;
        } else {
            self.current_drought += 1;
            self.longest_top_drought = self.longest_top_drought.max(self.current_drought);
        }
        if item.is_single_ensure == Some(true) {
            self.single_ensure_hits += 1;
        }
    }

    pub fn record_all<'a>(&mut self, items: impl IntoIterator<Item = &'a DrawnItem>) {
        for item in items {
            self.record(item);
        }
    }

    pub fn tier_rate(&self, tier: u8) -> f64 {
        if self.draws == 0 {
            return 0.0;
        }
        let hits = self.per_tier.get(tier as usize).copied().unwrap_or(0);
        hits as f64 / self.draws as f64
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Pool: {}\n", self.pool_id));
        out.push_str(&format!("Draws: {}\n\n", self.draws));
        out.push_str("Rarity distribution:\n");
        for tier in (0..TIER_COUNT as u8).rev() {
            let hits = self.per_tier[tier as usize];
            if hits == 0 && tier < SECOND_TIER {
                continue;
            }
            out.push_str(&format!(
                "  {}★  {:>6}  ({:>6.2}%)\n",
                tier + 1,
                hits,
                self.tier_rate(tier) * 100.0
            ));
        }
        out.push('\n');
        match self.first_top_at {
            Some(n) => out.push_str(&format!("First {}★ at draw {}\n", TOP_TIER + 1, n)),
            None => out.push_str(&format!("No {}★ drawn\n", TOP_TIER + 1)),
        }
        out.push_str(&format!(
            "Longest {}★ drought: {}\n",
            TOP_TIER + 1,
            self.longest_top_drought
        ));
        if self.single_ensure_hits > 0 {
            out.push_str(&format!("Single ensure fired: {}\n", self.single_ensure_hits));
        }
        out
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
