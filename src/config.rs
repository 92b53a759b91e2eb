use serde::{Deserialize, Serialize};

use crate::runtime::address::DEFAULT_BASE;
use crate::runtime::rewrite::Rule;

/// 16 MiB of machine memory.
pub const DEFAULT_CAPACITY: u64 = 1 << 24;

/// What each rule charges against the budget. The defaults are the metered
/// gas of the two rule bodies, without memory expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Costs {
    pub annihilate: u64,
    pub commute: u64,
}

impl Default for Costs {
    fn default() -> Self {
        Self {
            annihilate: 125,
            commute: 683,
        }
    }
}

impl Costs {
    /// One unit per rewrite, so that a budget counts rewrites.
    pub fn unit() -> Self {
        Self {
            annihilate: 1,
            commute: 1,
        }
    }

    pub fn of(&self, rule: Rule) -> u64 {
        match rule {
            Rule::Annihilate => self.annihilate,
            Rule::Commute => self.commute,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Machine address of the count header.
    pub base: u64,
    /// Highest machine address (exclusive) the buffer may grow to.
    pub capacity: u64,
    pub costs: Costs,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            capacity: DEFAULT_CAPACITY,
            costs: Costs::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
