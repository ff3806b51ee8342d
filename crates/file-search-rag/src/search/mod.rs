//! Search service and per-session query history

pub mod history;
pub mod service;

pub use history::QueryHistory;
pub use service::SearchService;
