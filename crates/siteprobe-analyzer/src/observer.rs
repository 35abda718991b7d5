//! Recording network observer.

use parking_lot::Mutex;
use siteprobe_protocols::NetworkObserver;

/// Keeps every request URL the page reports, in order.
#[derive(Debug, Default)]
pub struct RequestLog {
    requests: Mutex<Vec<String>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, url: impl Into<String>) {
        self.requests.lock().push(url.into());
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }
}

impl NetworkObserver for RequestLog {
    fn observed_requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}
