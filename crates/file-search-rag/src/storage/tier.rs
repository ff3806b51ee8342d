//! Storage tiers for the managed File Search Store
//!
//! Each tier is a fixed capacity plan. Capacities use binary units
//! (1 GiB = 1024³ bytes).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

const GIB: u64 = 1024 * 1024 * 1024;

/// Storage capacity plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    /// 1 GiB, development and small projects
    #[default]
    Free,
    /// 10 GiB
    Tier1,
    /// 100 GiB
    Tier2,
    /// 1 TiB
    Tier3,
}

impl StorageTier {
    /// All tiers, smallest capacity first
    pub const ALL: [StorageTier; 4] = [
        StorageTier::Free,
        StorageTier::Tier1,
        StorageTier::Tier2,
        StorageTier::Tier3,
    ];

    /// Capacity in bytes
    pub const fn max_bytes(&self) -> u64 {
        match self {
            StorageTier::Free => GIB,
            StorageTier::Tier1 => 10 * GIB,
            StorageTier::Tier2 => 100 * GIB,
            StorageTier::Tier3 => 1024 * GIB,
        }
    }

    /// Capacity in whole GiB
    pub const fn max_gib(&self) -> u64 {
        self.max_bytes() / GIB
    }

    /// Config identifier (`free`, `tier1`, ...)
    pub fn identifier(&self) -> &'static str {
        match self {
            StorageTier::Free => "free",
            StorageTier::Tier1 => "tier1",
            StorageTier::Tier2 => "tier2",
            StorageTier::Tier3 => "tier3",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            StorageTier::Free => "Free (1 GB)",
            StorageTier::Tier1 => "Tier 1 (10 GB)",
            StorageTier::Tier2 => "Tier 2 (100 GB)",
            StorageTier::Tier3 => "Tier 3 (1 TB)",
        }
    }

    /// Smallest tier whose capacity covers `total_bytes`
    ///
    /// Falls back to the largest tier when nothing fits.
    pub fn recommended(total_bytes: u64) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| tier.max_bytes() >= total_bytes)
            .unwrap_or(StorageTier::Tier3)
    }
}

impl std::fmt::Display for StorageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StorageTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tier| tier.identifier() == lower)
            .ok_or_else(|| Error::config(format!("Unknown storage tier: {}", s)))
    }
}
