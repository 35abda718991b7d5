//! # SiteProbe Analyzer
//!
//! The page-context half of SiteProbe. A [`PageAnalyzer`] is loaded into an
//! inspected page after its two helper modules, [`SecurityHeuristics`] and
//! [`TechnologyDetector`], and answers `ping` / `performAnalysis` requests on
//! the page's message port.
//!
//! Concrete collaborators for running outside a real browser:
//!
//! - [`HtmlDocument`] - a [`PageDocument`](siteprobe_protocols::PageDocument)
//!   backed by parsed HTML
//! - [`HttpReachability`] - HEAD probes for well-known paths
//! - [`RequestLog`] - a recording network observer

mod analyzer;
mod document;
pub mod domains;
pub mod forms;
pub mod headers;
mod identity;
mod observer;
pub mod reachability;
mod security;
mod technology;

pub use analyzer::PageAnalyzer;
pub use document::HtmlDocument;
pub use identity::PageIdentity;
pub use observer::RequestLog;
pub use reachability::HttpReachability;
pub use security::SecurityHeuristics;
pub use technology::{Signal, TechnologyDetector, TechnologyRule};
