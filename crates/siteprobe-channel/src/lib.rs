//! # SiteProbe Channel
//!
//! Request/response message ports connecting the SiteProbe execution
//! contexts. A port is a pair of an [`Endpoint`] (the calling side, cheap to
//! clone) and an [`Inbox`] (the serving side). Every call carries a
//! monotonically increasing id and waits on its own pending slot, so a reply
//! that arrives after its caller gave up is dropped instead of being
//! delivered to a later call.

mod port;

pub use port::{Endpoint, Inbox, Incoming, Responder, channel};
