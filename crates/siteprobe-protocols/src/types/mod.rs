//! Data model shared by every analysis tier.

mod record;
mod tab;

pub use record::*;
pub use tab::*;
