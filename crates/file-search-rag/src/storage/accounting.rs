//! Local storage usage accounting
//!
//! A purely local estimate of bytes stored in the remote store. It is
//! updated additively on upload and delete and never reconciled with the
//! server, so it may drift from true usage.

use serde::Serialize;

use super::tier::StorageTier;
use crate::config::StorageConfig;

/// Byte-level usage estimate against a tier capacity
#[derive(Debug, Clone, Serialize)]
pub struct StorageAccounting {
    tier: StorageTier,
    usage_bytes: u64,
    alert_threshold_percent: u8,
    auto_upgrade: bool,
}

impl StorageAccounting {
    /// Create an empty accounting model
    pub fn new(tier: StorageTier, alert_threshold_percent: u8, auto_upgrade: bool) -> Self {
        Self {
            tier,
            usage_bytes: 0,
            alert_threshold_percent,
            auto_upgrade,
        }
    }

    /// Create from storage configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        tracing::info!(
            "Storage accounting initialized with tier: {} ({} GB)",
            config.tier.display_name(),
            config.tier.max_gib()
        );
        Self::new(config.tier, config.alert_threshold_percent, config.auto_upgrade)
    }

    /// Record `bytes` of new usage
    ///
    /// Exceeding the tier capacity is advisory only: a warning is logged and
    /// the bytes are still counted.
    pub fn add(&mut self, bytes: u64) {
        if self.would_exceed(bytes) {
            tracing::warn!(
                "Adding {} would exceed the {} storage limit (current: {} / {})",
                format_bytes(bytes),
                self.tier.display_name(),
                format_bytes(self.usage_bytes),
                format_bytes(self.capacity_bytes())
            );
        }
        self.usage_bytes = self.usage_bytes.saturating_add(bytes);
        self.check_threshold();
    }

    /// Release `bytes` of usage, never going below zero
    pub fn remove(&mut self, bytes: u64) {
        self.usage_bytes = self.usage_bytes.saturating_sub(bytes);
    }

    /// Whether adding `extra_bytes` would go past the tier capacity
    pub fn would_exceed(&self, extra_bytes: u64) -> bool {
        self.usage_bytes.saturating_add(extra_bytes) > self.capacity_bytes()
    }

    /// Usage as a percentage of capacity (may exceed 100)
    pub fn usage_percent(&self) -> f64 {
        let capacity = self.capacity_bytes();
        if capacity == 0 {
            return 0.0;
        }
        self.usage_bytes as f64 * 100.0 / capacity as f64
    }

    /// Bytes left before the tier capacity is reached
    pub fn remaining_bytes(&self) -> u64 {
        self.capacity_bytes().saturating_sub(self.usage_bytes)
    }

    pub fn usage_bytes(&self) -> u64 {
        self.usage_bytes
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.tier.max_bytes()
    }

    pub fn tier(&self) -> StorageTier {
        self.tier
    }

    pub fn alert_threshold_percent(&self) -> u8 {
        self.alert_threshold_percent
    }

    pub fn auto_upgrade(&self) -> bool {
        self.auto_upgrade
    }

    /// Switch to another tier (simulated upgrade/downgrade)
    pub fn set_tier(&mut self, tier: StorageTier) {
        if tier != self.tier {
            tracing::info!("Storage tier changed to: {}", tier.display_name());
            self.tier = tier;
        }
    }

    /// One-line summary, e.g. `Free (1 GB): 10.0 MB / 1.0 GB (1.0% full)`
    pub fn status_line(&self) -> String {
        format!(
            "{}: {} / {} ({:.1}% full)",
            self.tier.display_name(),
            format_bytes(self.usage_bytes),
            format_bytes(self.capacity_bytes()),
            self.usage_percent()
        )
    }

    fn check_threshold(&self) {
        let percent = self.usage_percent();
        tracing::debug!("Storage usage: {:.1}% of {}", percent, self.tier.display_name());

        if percent < f64::from(self.alert_threshold_percent) {
            return;
        }

        tracing::warn!(
            "Storage usage alert: {:.1}% of {} capacity",
            percent,
            self.tier.display_name()
        );

        if self.auto_upgrade {
            let recommended = StorageTier::recommended(self.usage_bytes);
            if recommended.max_bytes() > self.tier.max_bytes() {
                tracing::info!(
                    "Recommending tier upgrade from {} to {}",
                    self.tier.display_name(),
                    recommended.display_name()
                );
            }
        }
    }
}

impl Default for StorageAccounting {
    fn default() -> Self {
        Self::new(StorageTier::Free, 80, true)
    }
}

/// Format a byte count with 1024-based units and one decimal
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_add_and_remove() {
        let mut acc = StorageAccounting::default();
        acc.add(10 * MIB);
        let expected = 10.0 / 1024.0 * 100.0;
        assert!((acc.usage_percent() - expected).abs() < 1e-9);
        assert!((acc.usage_percent() - 0.98).abs() < 0.01);

        acc.remove(10 * MIB);
        assert_eq!(acc.usage_bytes(), 0);
        assert_eq!(acc.usage_percent(), 0.0);
    }

    #[test]
    fn test_remove_clamps_at_zero() {
        let mut acc = StorageAccounting::default();
        acc.add(100);
        acc.remove(1_000);
        assert_eq!(acc.usage_bytes(), 0);
        assert_eq!(acc.remaining_bytes(), StorageTier::Free.max_bytes());
    }

    #[test]
    fn test_would_exceed() {
        let mut acc = StorageAccounting::default();
        let cap = StorageTier::Free.max_bytes();
        assert!(!acc.would_exceed(cap));
        assert!(acc.would_exceed(cap + 1));

        acc.add(cap - 10);
        assert!(!acc.would_exceed(10));
        assert!(acc.would_exceed(11));
    }

    #[test]
    fn test_over_capacity_is_advisory() {
        let mut acc = StorageAccounting::new(StorageTier::Free, 80, true);
        acc.add(2 * StorageTier::Free.max_bytes());
        assert!((acc.usage_percent() - 200.0).abs() < 1e-9);
        assert_eq!(acc.remaining_bytes(), 0);
    }

    #[test]
    fn test_set_tier_changes_capacity() {
        let mut acc = StorageAccounting::default();
        acc.add(StorageTier::Free.max_bytes());
        acc.set_tier(StorageTier::Tier1);
        assert!((acc.usage_percent() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_line() {
        let mut acc = StorageAccounting::default();
        acc.add(10 * MIB);
        assert_eq!(acc.status_line(), "Free (1 GB): 10.0 MB / 1.0 GB (1.0% full)");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512.0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(StorageTier::Tier3.max_bytes()), "1.0 TB");
    }

    proptest! {
        #[test]
        fn usage_never_negative(ops in proptest::collection::vec((any::<bool>(), 0u64..(4 * 1024 * MIB)), 0..64)) {
            let mut acc = StorageAccounting::default();
            let mut model: i128 = 0;
            for (is_add, bytes) in ops {
                if is_add {
                    acc.add(bytes);
                    model += i128::from(bytes);
                } else {
                    acc.remove(bytes);
                    model = (model - i128::from(bytes)).max(0);
                }
                prop_assert!(acc.usage_percent() >= 0.0);
                prop_assert_eq!(i128::from(acc.usage_bytes()), model);
            }
        }
    }
}
