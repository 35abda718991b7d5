//! Endpoint / inbox pair backed by a pending-request map.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use siteprobe_protocols::{ChannelError, TabId};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

type PendingMap<Resp> = Mutex<HashMap<u64, oneshot::Sender<Resp>>>;

struct Shared<Req, Resp> {
    next_id: AtomicU64,
    pending: Arc<PendingMap<Resp>>,
    inbox: mpsc::UnboundedSender<Incoming<Req, Resp>>,
}

/// Create a connected endpoint and inbox.
pub fn channel<Req, Resp>() -> (Endpoint<Req, Resp>, Inbox<Req, Resp>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let endpoint = Endpoint {
        shared: Arc::new(Shared {
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
            inbox: tx,
        }),
        origin: None,
    };
    (endpoint, Inbox { rx })
}

/// Calling side of a message port.
pub struct Endpoint<Req, Resp> {
    shared: Arc<Shared<Req, Resp>>,
    origin: Option<TabId>,
}

impl<Req, Resp> Clone for Endpoint<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            origin: self.origin,
        }
    }
}

impl<Req, Resp> fmt::Debug for Endpoint<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("origin", &self.origin)
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl<Req, Resp> Endpoint<Req, Resp> {
    /// A clone whose messages are stamped with the sending tab.
    pub fn with_origin(&self, tab: TabId) -> Self {
        Self {
            shared: self.shared.clone(),
            origin: Some(tab),
        }
    }

    pub fn origin(&self) -> Option<TabId> {
        self.origin
    }

    /// Number of calls still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().len()
    }

    /// Whether the serving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.shared.inbox.is_closed()
    }
}

impl<Req, Resp> Endpoint<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{

    /// Send a request and wait at most `timeout` for its response.
    pub async fn request(&self, request: Req, timeout: Duration) -> Result<Resp, ChannelError> {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.shared.pending.lock().insert(id, tx);

        let incoming = Incoming {
            id,
            origin: self.origin,
            request,
            responder: Responder {
                slot: Some((id, self.shared.pending.clone())),
            },
        };
        if self.shared.inbox.send(incoming).is_err() {
            // The rejected message and its responder are dropped with the error.
            self.shared.pending.lock().remove(&id);
            return Err(ChannelError::NoReceiver);
        }
        debug!("Message {} sent (origin {:?})", id, self.origin);

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(ChannelError::Closed),
            Err(_) => {
                self.shared.pending.lock().remove(&id);
                debug!("Message {} timed out after {:?}", id, timeout);
                Err(ChannelError::Timeout(timeout))
            }
        }
    }

    /// Deliver a request without waiting for a response.
    pub fn notify(&self, request: Req) -> Result<(), ChannelError> {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        let incoming = Incoming {
            id,
            origin: self.origin,
            request,
            responder: Responder { slot: None },
        };
        self.shared
            .inbox
            .send(incoming)
            .map_err(|_| ChannelError::NoReceiver)
    }
}

/// Serving side of a message port.
pub struct Inbox<Req, Resp> {
    rx: mpsc::UnboundedReceiver<Incoming<Req, Resp>>,
}

impl<Req, Resp> Inbox<Req, Resp> {
    /// Next incoming message; `None` once every endpoint is dropped.
    pub async fn recv(&mut self) -> Option<Incoming<Req, Resp>> {
        self.rx.recv().await
    }

    /// Stop accepting new messages. Queued messages can still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// A request received on an [`Inbox`].
pub struct Incoming<Req, Resp> {
    pub id: u64,
    /// Tab the sender runs in, when it runs in one.
    pub origin: Option<TabId>,
    pub request: Req,
    pub responder: Responder<Resp>,
}

impl<Req: fmt::Debug, Resp> fmt::Debug for Incoming<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Incoming")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .field("request", &self.request)
            .finish()
    }
}

/// Answers exactly one request.
///
/// Dropping a responder without answering resolves the caller with
/// [`ChannelError::Closed`].
pub struct Responder<Resp> {
    slot: Option<(u64, Arc<PendingMap<Resp>>)>,
}

impl<Resp> Responder<Resp> {
    /// Whether the sender is waiting for an answer.
    pub fn expects_response(&self) -> bool {
        self.slot.is_some()
    }

    /// Send the response. Returns `false` when nobody was waiting for it.
    pub fn respond(mut self, response: Resp) -> bool {
        let Some((id, pending)) = self.slot.take() else {
            return false;
        };
        let sender = pending.lock().remove(&id);
        match sender {
            Some(sender) => sender.send(response).is_ok(),
            None => {
                debug!("Discarding late response for message {}", id);
                false
            }
        }
    }
}

impl<Resp> Drop for Responder<Resp> {
    fn drop(&mut self) {
        if let Some((id, pending)) = self.slot.take() {
            pending.lock().remove(&id);
        }
    }
}

#[cfg(test)]
#[path = "port_tests.rs"]
mod tests;
