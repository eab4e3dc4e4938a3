// Rarity tiers (0-5 internally, displayed as 1-6 stars)
pub const TIER_COUNT: usize = 6;
pub const LOWEST_DRAWABLE_TIER: u8 = 2;
pub const SECOND_TIER: u8 = 4;
pub const TOP_TIER: u8 = 5;

// Guarantee ladder
pub const NO_FLOOR: u8 = LOWEST_DRAWABLE_TIER;
pub const SOFT_PITY_FLOOR_TIER: u8 = SECOND_TIER;
pub const NEWBEE_TOP_MILESTONE_DRAW: u32 = 10;
pub const NEWBEE_SECOND_MILESTONE_DRAW: u32 = 21;

// Rarity escalation
pub const TOP_TIER_PITY_START: u32 = 50;
pub const SECOND_TIER_PITY_START: u32 = 15;
pub const SECOND_TIER_PITY_SURGE_START: u32 = 20;
pub const SECOND_TIER_PITY_STEP_CAP: u32 = 5;
pub const SECOND_TIER_PITY_STEP_RATE: f64 = 0.25;
pub const SECOND_TIER_PITY_SURGE_RATE: f64 = 0.5;

// Tutorial pool scripted first draw
pub const TUTORIAL_POOL_MARKER: &str = "BOOT";
pub const TUTORIAL_FIRST_DRAW_TIER: u8 = 3;

// Up-character override thresholds (cumulative draws including the current one)
pub const SECOND_TIER_UP_OVERRIDE_DRAWS: u32 = 60;
pub const TOP_TIER_UP_OVERRIDE_DRAWS: u32 = 200;

// Fes-classic player-selected roster shares
pub const FES_CLASSIC_TOP_TIER_SHARE: f64 = 0.25;
pub const FES_CLASSIC_OTHER_TIER_SHARE: f64 = 0.166667;

// Weight-override units per 1x share
pub const WEIGHT_UNITS_PER_RATE: u32 = 100;

// Single-pool ensure counter
pub const SINGLE_ENSURE_CAP: i32 = 150;
pub const SINGLE_ENSURE_ARMED: i32 = -1;

// Linkage guarantee
pub const LINKAGE_TARGET_COUNT_PARAM: &str = "guaranteeTarget6Count";
pub const LINKAGE_GUARANTEE_TIER: u8 = TOP_TIER;

// Attain pools
pub const ATTAIN_ALLOWANCE_META: &str = "attainRare6Num";

// Newbie pool defaults
pub const DEFAULT_NEWBEE_POOL_ID: &str = "BOOT_0_1_2";
pub const DEFAULT_NEWBEE_DRAW_ALLOWANCE: u32 = 21;

// Requests
pub const TEN_DRAW_COUNT: usize = 10;
pub const CHARACTER_ITEM_TYPE: &str = "CHAR";
