//! # SiteProbe Protocols
//!
//! Shared definitions for the three SiteProbe execution contexts (background
//! coordinator, page analyzer, popup UI). Contains only data types, the
//! message contract and collaborator traits - no implementations.
//!
//! ## Core Traits
//!
//! - [`TabHost`] - Tab resolution, tab messaging and script injection
//! - [`PageDocument`] - Read access to an inspected page's DOM
//! - [`NetworkObserver`] - Requests observed from the page context
//! - [`ReachabilityProber`] - Same-origin reachability probes

pub mod domain;
pub mod error;
pub mod host;
pub mod message;
pub mod page;
pub mod script;
pub mod types;

pub use error::{AnalysisError, ChannelError, DetectError, ErrorKind, InjectionError};
pub use host::TabHost;
pub use message::{PageRequest, PageResponse, RuntimeRequest, RuntimeResponse};
pub use page::{
    FieldElement, FormElement, GlobalValue, NetworkObserver, PageDocument, ReachabilityProber,
    ResourceKind, ResourceRef,
};
pub use script::{INJECTION_ORDER, ScriptModule};
pub use types::*;
