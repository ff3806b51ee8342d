//! Storage tier plans and local usage accounting

mod accounting;
mod tier;

pub use accounting::{format_bytes, StorageAccounting};
pub use tier::StorageTier;
