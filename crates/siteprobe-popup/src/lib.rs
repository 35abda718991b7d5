//! # SiteProbe Popup
//!
//! The UI half of SiteProbe. A [`PresentationController`] asks the
//! background coordinator for an analysis of the active tab and keeps the
//! user-facing latency bounded: after its own timeout it renders a `quick`
//! analysis computed from tab metadata and ignores whatever the coordinator
//! answers later.
//!
//! Rendering goes through the [`View`] trait; the coordinator is reached
//! through a [`CoordinatorClient`].

mod classify;
mod client;
mod controller;
pub mod error;
pub mod export;
pub mod quick;
mod score;
mod view;

pub use classify::{FailureResponse, UserMessage, classify_failure};
pub use client::{CoordinatorClient, RuntimeClient};
pub use controller::{CyclePhase, OpenOutcome, PresentationController};
pub use error::PopupError;
pub use export::{ExportedReport, export_report};
pub use score::security_score;
pub use view::View;
