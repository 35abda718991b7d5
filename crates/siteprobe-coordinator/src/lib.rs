//! # SiteProbe Coordinator
//!
//! The privileged background half of SiteProbe. A [`Coordinator`] resolves
//! the active tab, checks whether a page analyzer is loaded there, injects
//! one when it is not, and delegates the analysis to it. Whenever delegation
//! fails the coordinator degrades instead of failing:
//!
//! 1. delegated analysis in the page context (`content_script`)
//! 2. coarse analysis from tab metadata (`basic`)
//! 3. a fixed-shape record (`minimal`)
//!
//! Successful records are cached per domain for a freshness window and
//! persisted best-effort to an [`AnalysisStore`].

mod cache;
mod coordinator;
pub mod error;
pub mod fallback;
mod handler;
mod injection;
mod lifecycle;
mod orchestrator;
mod readiness;
pub mod store;

pub use cache::AnalysisCache;
pub use coordinator::Coordinator;
pub use error::StoreError;
pub use injection::InjectionController;
pub use readiness::ReadinessChannel;
pub use store::{AnalysisStore, FileAnalysisStore, MemoryAnalysisStore};

#[cfg(test)]
mod testing;
