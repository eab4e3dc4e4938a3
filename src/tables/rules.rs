use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pool-family tag selecting the post-draw state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleType {
    #[serde(rename = "NEWBEE")]
    Newbee,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "ATTAIN")]
    Attain,
    #[serde(rename = "CLASSIC_ATTAIN")]
    ClassicAttain,
    #[serde(rename = "LINKAGE")]
    Linkage,
    #[serde(rename = "SINGLE")]
    Single,
    #[serde(rename = "LIMITED")]
    Limited,
    #[serde(rename = "CLASSIC")]
    Classic,
    #[serde(rename = "FESCLASSIC")]
    FesClassic,
}

impl RuleType {
    pub const ALL: [RuleType; 9] = [
        RuleType::Newbee,
        RuleType::Normal,
        RuleType::Attain,
        RuleType::ClassicAttain,
        RuleType::Linkage,
        RuleType::Single,
        RuleType::Limited,
        RuleType::Classic,
        RuleType::FesClassic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Newbee => "NEWBEE",
            RuleType::Normal => "NORMAL",
            RuleType::Attain => "ATTAIN",
            RuleType::ClassicAttain => "CLASSIC_ATTAIN",
            RuleType::Linkage => "LINKAGE",
            RuleType::Single => "SINGLE",
            RuleType::Limited => "LIMITED",
            RuleType::Classic => "CLASSIC",
            RuleType::FesClassic => "FESCLASSIC",
        }
    }

    /// Rules whose pools share the classic streak counter and flag results as classic.
    pub fn is_classic_family(&self) -> bool {
        matches!(self, RuleType::Classic | RuleType::FesClassic)
    }

    /// Fes-classic pools weight candidates from the player's roster instead of the tables.
    pub fn uses_player_roster(&self) -> bool {
        matches!(self, RuleType::FesClassic)
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleType::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown gacha rule type: {s}"))
    }
}

/// Sub-variant of a LINKAGE pool.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LinkageRule {
    /// Must-top guarantee plus a queue of tier-4 substitutes from the up roster.
    #[serde(rename = "LINKAGE_R6_01")]
    R6_01,
    /// Must-top guarantee only.
    #[serde(rename = "LINKAGE_MH_01")]
    MH_01,
}

impl LinkageRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkageRule::R6_01 => "LINKAGE_R6_01",
            LinkageRule::MH_01 => "LINKAGE_MH_01",
        }
    }

    /// Whether the tier-4 substitute queue starts enabled.
    pub fn queues_second_tier(&self) -> bool {
        matches!(self, LinkageRule::R6_01)
    }
}

impl fmt::Display for LinkageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkageRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LINKAGE_R6_01" => Ok(LinkageRule::R6_01),
            "LINKAGE_MH_01" => Ok(LinkageRule::MH_01),
            _ => Err(format!("unknown linkage rule id: {s}")),
        }
    }
}
