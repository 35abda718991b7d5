//! # SiteProbe Host
//!
//! An in-process browser for running SiteProbe outside a real one. Tabs load
//! documents through a [`DocumentLoader`], report lifecycle events, and
//! accept script injection: loading the analyzer module into a tab starts a
//! [`PageAnalyzer`](siteprobe_analyzer::PageAnalyzer) on that tab's page
//! context. [`Browser`] implements
//! [`TabHost`](siteprobe_protocols::TabHost) for the coordinator.

mod browser;
pub mod error;
mod host;
mod loader;
mod page;

pub use browser::Browser;
pub use error::HostError;
pub use loader::{DocumentLoader, HttpLoader, LoadedPage, StaticPages};
