//! The page-context analyzer.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use siteprobe_channel::{Endpoint, Inbox};
use siteprobe_config::AnalyzerConfig;
use siteprobe_protocols::error::DetectError;
use siteprobe_protocols::{
    AnalysisRecord, AnalysisType, Certificates, FormFinding, NetworkObserver, PageDocument,
    PageRequest, PageResponse, ReachabilityProber, RuntimeRequest, RuntimeResponse,
    TechnologyFinding, VulnerabilityFinding,
};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::identity::PageIdentity;
use crate::security::SecurityHeuristics;
use crate::technology::TechnologyDetector;
use crate::{domains, forms, headers, reachability};

/// Produces analysis records from inside an inspected page.
pub struct PageAnalyzer {
    document: Arc<dyn PageDocument>,
    technology: TechnologyDetector,
    security: SecurityHeuristics,
    network: Arc<dyn NetworkObserver>,
    prober: Arc<dyn ReachabilityProber>,
    location: watch::Receiver<Url>,
    config: AnalyzerConfig,
}

/// Keep the value of a finished sub-task, or log and use the default.
fn settle<T: Default>(task: &str, result: Result<T, DetectError>) -> T {
    result.unwrap_or_else(|e| {
        warn!("{} detection failed: {}", task, e);
        T::default()
    })
}

impl PageAnalyzer {
    pub fn new(
        document: Arc<dyn PageDocument>,
        technology: TechnologyDetector,
        security: SecurityHeuristics,
        network: Arc<dyn NetworkObserver>,
        prober: Arc<dyn ReachabilityProber>,
        location: watch::Receiver<Url>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            document,
            technology,
            security,
            network,
            prober,
            location,
            config,
        }
    }

    /// Identity of the page at its current location.
    pub fn identity(&self) -> PageIdentity {
        PageIdentity::from_url(&self.location.borrow())
    }

    /// Tell the coordinator this page has an analyzer. Never fails.
    pub fn announce(&self, runtime: &Endpoint<RuntimeRequest, RuntimeResponse>) {
        let identity = self.identity();
        let request = RuntimeRequest::ContentScriptReady {
            domain: Some(identity.domain),
            url: Some(identity.url.to_string()),
        };
        if let Err(e) = runtime.notify(request) {
            debug!("Failed to notify coordinator: {}", e);
        }
    }

    /// Answer page requests until every sender is gone.
    ///
    /// Each request runs on its own task, so a `ping` is answered while an
    /// analysis is still in flight. Request tasks are owned by the serving
    /// future: dropping or aborting it abandons them unanswered. Every
    /// analysis resolves the page identity from the latest reported location.
    pub async fn serve(self: Arc<Self>, mut inbox: Inbox<PageRequest, PageResponse>) {
        let mut handlers = JoinSet::new();
        loop {
            tokio::select! {
                incoming = inbox.recv() => {
                    let Some(incoming) = incoming else { break };
                    debug!("Page received {:?}", incoming.request);
                    let analyzer = self.clone();
                    handlers.spawn(async move {
                        let response = analyzer.handle(incoming.request).await;
                        incoming.responder.respond(response);
                    });
                }
                Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
            }
        }
        debug!("Page analyzer inbox closed");
    }

    pub async fn handle(&self, request: PageRequest) -> PageResponse {
        match request {
            PageRequest::Ping => PageResponse::ready(),
            PageRequest::PerformAnalysis => match self.perform_analysis().await {
                Ok(record) => PageResponse::success(record),
                Err(e) => {
                    warn!("Analysis failed: {}", e);
                    PageResponse::failure(e.to_string())
                }
            },
        }
    }

    /// Run every detection sub-task concurrently and assemble the record.
    ///
    /// The page identity is read once at the start; a location change while
    /// the sub-tasks run does not affect this record.
    pub async fn perform_analysis(&self) -> Result<AnalysisRecord, DetectError> {
        let identity = self.identity();
        if identity.domain.is_empty() {
            return Err(DetectError::DocumentUnavailable(format!(
                "{} has no host",
                identity.url
            )));
        }
        info!("Starting page analysis of {}", identity.url);

        let document = self.document.as_ref();
        let origin = identity.origin();
        let probe_timeout = self.config.probe_timeout();

        let (
            technologies,
            subdomains,
            external_domains,
            vulnerabilities,
            sitemap_exists,
            robots_exists,
            security_headers,
            form_findings,
        ) = futures::join!(
            async { self.technology.detect(document, &identity) },
            async {
                domains::harvest_subdomains(
                    &document.resources(),
                    &self.network.observed_requests(),
                    &identity.domain,
                )
            },
            async { domains::harvest_external_domains(&document.resources(), &identity.domain) },
            async { self.security.assess(document, &identity) },
            reachability::check_sitemap(self.prober.as_ref(), &origin, probe_timeout),
            reachability::check_robots(self.prober.as_ref(), &origin, probe_timeout),
            async { headers::extract_header_hints(document) },
            async { forms::introspect_forms(document, &identity) },
        );

        let technologies: Vec<TechnologyFinding> = settle("Technology", technologies);
        let subdomains: BTreeSet<String> = settle("Subdomain", subdomains);
        let external_domains: BTreeSet<String> = settle("External domain", external_domains);
        let vulnerabilities: Vec<VulnerabilityFinding> = settle("Vulnerability", vulnerabilities);
        let security_headers: BTreeMap<String, String> = settle("Security header", security_headers);
        let forms: Vec<FormFinding> = settle("Form", form_findings);

        let record = AnalysisRecord {
            url: identity.url.to_string(),
            domain: identity.domain.clone(),
            title: document.title(),
            timestamp: Utc::now(),
            is_secure: identity.is_secure,
            protocol: identity.protocol.clone(),
            technologies,
            subdomains,
            external_domains,
            vulnerabilities,
            security_headers,
            forms,
            certificates: Certificates {
                protocol: identity.protocol.clone(),
                secure_context: identity.is_secure,
            },
            sitemap_exists: settle("Sitemap", sitemap_exists),
            robots_exists: settle("Robots", robots_exists),
            success: true,
            analysis_type: AnalysisType::ContentScript,
        }
        .finalize();

        info!(
            "Page analysis of {} finished: {} technologies, {} vulnerabilities",
            record.domain,
            record.technologies.len(),
            record.vulnerabilities.len()
        );
        Ok(record)
    }
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
