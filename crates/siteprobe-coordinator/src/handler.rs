//! Runtime message handling.

use std::sync::Arc;

use siteprobe_channel::{Inbox, Incoming};
use siteprobe_protocols::{RuntimeRequest, RuntimeResponse, TabId};
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;

impl Coordinator {
    /// Answer one runtime request. `origin` is the sending tab, if any.
    pub async fn handle(&self, request: RuntimeRequest, origin: Option<TabId>) -> RuntimeResponse {
        debug!("Background received message: {}", request.action());

        match request {
            RuntimeRequest::GetTabInfo => match self.host.active_tab().await {
                Ok(tab) => RuntimeResponse::TabInfo(tab),
                Err(e) => {
                    warn!("Failed to get active tab info: {}", e);
                    RuntimeResponse::analysis_error(&e)
                }
            },
            RuntimeRequest::GetAnalysisData { domain } => {
                RuntimeResponse::analysis(self.cache.get(&domain))
            }
            RuntimeRequest::AnalyzeCurrentTab => match self.analyze_current_tab().await {
                Ok(entry) => RuntimeResponse::analysis(Some(entry)),
                Err(e) => RuntimeResponse::analysis_error(&e),
            },
            RuntimeRequest::AnalysisComplete { data } => {
                self.store_record((*data).finalize());
                RuntimeResponse::ack()
            }
            RuntimeRequest::ContentScriptReady { domain, .. } => {
                if let Some(tab) = origin {
                    self.readiness.mark(tab);
                    info!(
                        "Content script ready for tab {} ({})",
                        tab,
                        domain.as_deref().unwrap_or("unknown domain")
                    );
                }
                RuntimeResponse::ack()
            }
        }
    }

    /// Answer runtime requests until every sender is gone.
    ///
    /// Each request runs on its own task, so `getTabInfo` is answered while
    /// an analysis is still in flight.
    pub async fn serve(self: Arc<Self>, mut inbox: Inbox<RuntimeRequest, RuntimeResponse>) {
        while let Some(incoming) = inbox.recv().await {
            let coordinator = self.clone();
            tokio::spawn(async move {
                let Incoming {
                    id,
                    origin,
                    request,
                    responder,
                } = incoming;
                let response = coordinator.handle(request, origin).await;
                if responder.expects_response() && !responder.respond(response) {
                    debug!("Response to message {} was not delivered", id);
                }
            });
        }
        debug!("Coordinator inbox closed");
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
