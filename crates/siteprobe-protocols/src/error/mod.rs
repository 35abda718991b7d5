//! Error types for the SiteProbe protocol layer.

mod analysis;
mod channel;
mod detect;
mod injection;

pub use analysis::*;
pub use channel::*;
pub use detect::*;
pub use injection::*;
