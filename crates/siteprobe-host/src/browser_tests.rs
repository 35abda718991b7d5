use super::*;
use std::time::Duration;

use async_trait::async_trait;
use siteprobe_channel::{Inbox, channel};
use siteprobe_protocols::error::DetectError;
use siteprobe_protocols::{
    AnalysisError, AnalysisType, ChannelError, InjectionError, PageRequest, PageResponse,
};

use crate::loader::StaticPages;

const BLOG: &str = r#"<html><head>
<title>Example Blog</title>
<meta name="generator" content="WordPress 6.4">
</head><body><p>Hello</p></body></html>"#;

struct NothingReachable;

#[async_trait]
impl ReachabilityProber for NothingReachable {
    async fn probe(&self, _origin: &Url, _path: &str) -> Result<bool, DetectError> {
        Ok(false)
    }
}

struct SlowProber;

#[async_trait]
impl ReachabilityProber for SlowProber {
    async fn probe(&self, _origin: &Url, _path: &str) -> Result<bool, DetectError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(true)
    }
}

fn pages() -> StaticPages {
    StaticPages::new()
        .with_page("https://example.com/", BLOG)
        .with_page("https://example.com/about", "<title>About</title>")
        .with_page("https://untitled.example.org/", "<p>no title</p>")
}

fn browser_with(
    config: HostConfig,
    prober: Arc<dyn ReachabilityProber>,
) -> (Browser, Inbox<RuntimeRequest, RuntimeResponse>) {
    let (runtime, inbox) = channel();
    let browser = Browser::new(
        config,
        AnalyzerConfig::default(),
        Arc::new(pages()),
        prober,
        runtime,
    );
    (browser, inbox)
}

fn browser() -> (Browser, Inbox<RuntimeRequest, RuntimeResponse>) {
    browser_with(HostConfig::default(), Arc::new(NothingReachable))
}

async fn inject_all(browser: &Browser, tab: TabId) {
    for module in INJECTION_ORDER {
        browser.inject_script(tab, module).await.unwrap();
    }
}

async fn ping(browser: &Browser, tab: TabId) -> Result<PageResponse, ChannelError> {
    browser
        .send_to_tab(tab, PageRequest::Ping, Duration::from_secs(1))
        .await
}

#[tokio::test]
async fn test_open_tab_becomes_active() {
    let (browser, _runtime) = browser();
    let tab = browser.open_tab("https://example.com/").await.unwrap();
    assert_eq!(browser.active_tab_id().await, Some(tab));

    let info = browser.active_tab().await.unwrap();
    assert_eq!(info.id, tab);
    assert_eq!(info.domain, "example.com");
    assert_eq!(info.title, "Example Blog");
    assert!(info.is_secure);
    assert!(browser.load_error(tab).await.is_none());
}

#[tokio::test]
async fn test_untitled_page_uses_url_as_title() {
    let (browser, _runtime) = browser();
    browser.open_tab("https://untitled.example.org/").await.unwrap();
    let info = browser.active_tab().await.unwrap();
    assert_eq!(info.title, "https://untitled.example.org/");
}

#[tokio::test]
async fn test_open_invalid_url() {
    let (browser, _runtime) = browser();
    let err = browser.open_tab("not a url").await.unwrap_err();
    assert!(matches!(err, HostError::InvalidUrl { .. }));
    assert!(browser.tab_ids().await.is_empty());
}

#[tokio::test]
async fn test_no_active_tab_is_resolution_error() {
    let (browser, _runtime) = browser();
    let err = browser.active_tab().await.unwrap_err();
    assert!(matches!(err, AnalysisError::Resolution(_)));
}

#[tokio::test]
async fn test_privileged_page_rejects_injection() {
    let (browser, _runtime) = browser();
    let tab = browser.open_tab("chrome://settings/").await.unwrap();

    let err = browser
        .inject_script(tab, ScriptModule::SecurityHeuristics)
        .await
        .unwrap_err();
    assert_eq!(err, InjectionError::Restricted("chrome://settings/".to_string()));
    assert_eq!(ping(&browser, tab).await.unwrap_err(), ChannelError::NoReceiver);
    assert!(browser.loaded_modules(tab).await.is_empty());
}

#[tokio::test]
async fn test_unknown_tab_injection() {
    let (browser, _runtime) = browser();
    let err = browser
        .inject_script(99, ScriptModule::Analyzer)
        .await
        .unwrap_err();
    assert_eq!(err, InjectionError::TabNotFound(99));
}

#[tokio::test]
async fn test_analyzer_requires_helpers() {
    let (browser, _runtime) = browser();
    let tab = browser.open_tab("https://example.com/").await.unwrap();

    let err = browser
        .inject_script(tab, ScriptModule::Analyzer)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        InjectionError::MissingDependency {
            module: ScriptModule::Analyzer,
            missing: ScriptModule::SecurityHeuristics,
        }
    );

    browser
        .inject_script(tab, ScriptModule::SecurityHeuristics)
        .await
        .unwrap();
    let err = browser
        .inject_script(tab, ScriptModule::Analyzer)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InjectionError::MissingDependency {
            missing: ScriptModule::TechnologyRules,
            ..
        }
    ));
    assert_eq!(ping(&browser, tab).await.unwrap_err(), ChannelError::NoReceiver);
}

#[tokio::test]
async fn test_injected_analyzer_announces_and_answers() {
    let (browser, mut runtime) = browser();
    let tab = browser.open_tab("https://example.com/").await.unwrap();
    assert_eq!(ping(&browser, tab).await.unwrap_err(), ChannelError::NoReceiver);

    inject_all(&browser, tab).await;
    assert_eq!(browser.loaded_modules(tab).await, INJECTION_ORDER.to_vec());

    let announcement = runtime.recv().await.unwrap();
    assert_eq!(announcement.origin, Some(tab));
    assert!(!announcement.responder.expects_response());
    assert_eq!(
        announcement.request,
        RuntimeRequest::ContentScriptReady {
            domain: Some("example.com".to_string()),
            url: Some("https://example.com/".to_string()),
        }
    );

    assert!(ping(&browser, tab).await.unwrap().is_ready());
}

#[tokio::test]
async fn test_analysis_sees_document_and_requests() {
    let (browser, _runtime) = browser();
    let tab = browser.open_tab("https://example.com/").await.unwrap();
    browser
        .record_request(tab, "https://api.example.com/v1/posts")
        .await
        .unwrap();
    inject_all(&browser, tab).await;

    let response = browser
        .send_to_tab(tab, PageRequest::PerformAnalysis, Duration::from_secs(5))
        .await
        .unwrap();
    let PageResponse::Analysis {
        success: true,
        data: Some(record),
        ..
    } = response
    else {
        panic!("expected a successful analysis, got {:?}", response);
    };
    assert_eq!(record.analysis_type, AnalysisType::ContentScript);
    assert_eq!(record.title, "Example Blog");
    assert!(record.has_technology("WordPress"));
    assert!(record.subdomains.contains("api.example.com"));
}

#[tokio::test]
async fn test_reinjection_replaces_analyzer() {
    let (browser, mut runtime) = browser();
    let tab = browser.open_tab("https://example.com/").await.unwrap();
    inject_all(&browser, tab).await;
    browser
        .inject_script(tab, ScriptModule::Analyzer)
        .await
        .unwrap();

    assert!(runtime.recv().await.is_some());
    assert!(runtime.recv().await.is_some());
    assert!(ping(&browser, tab).await.unwrap().is_ready());
}

#[tokio::test]
async fn test_navigation_emits_events_and_unloads_modules() {
    let (browser, _runtime) = browser();
    let tab = browser.open_tab("https://example.com/").await.unwrap();
    inject_all(&browser, tab).await;
    let mut events = browser.subscribe();

    browser.navigate(tab, "https://example.com/about").await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        TabEvent::Updated {
            tab_id: tab,
            status: TabStatus::Loading,
            url: Some("https://example.com/about".to_string()),
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        TabEvent::Updated {
            tab_id: tab,
            status: TabStatus::Complete,
            url: Some("https://example.com/about".to_string()),
        }
    );
    assert!(browser.loaded_modules(tab).await.is_empty());
    assert_eq!(ping(&browser, tab).await.unwrap_err(), ChannelError::NoReceiver);
    assert_eq!(browser.active_tab().await.unwrap().title, "About");
}

#[tokio::test(start_paused = true)]
async fn test_navigation_abandons_in_flight_analysis() {
    let (browser, _runtime) = browser_with(HostConfig::default(), Arc::new(SlowProber));
    let browser = Arc::new(browser);
    let tab = browser.open_tab("https://example.com/").await.unwrap();
    inject_all(&browser, tab).await;

    let pending = {
        let browser = browser.clone();
        tokio::spawn(async move {
            browser
                .send_to_tab(tab, PageRequest::PerformAnalysis, Duration::from_secs(30))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    browser.navigate(tab, "https://example.com/about").await.unwrap();

    assert_eq!(pending.await.unwrap().unwrap_err(), ChannelError::Closed);
}

#[tokio::test]
async fn test_load_failure_leaves_tab_without_page() {
    let (browser, _runtime) = browser();
    let tab = browser.open_tab("https://down.example.net/").await.unwrap();

    let error = browser.load_error(tab).await.unwrap();
    assert!(error.contains("down.example.net"));
    assert_eq!(browser.active_tab().await.unwrap().domain, "down.example.net");

    let err = browser
        .inject_script(tab, ScriptModule::SecurityHeuristics)
        .await
        .unwrap_err();
    assert!(matches!(err, InjectionError::Failed(_)));
}

#[tokio::test]
async fn test_auto_inject_loads_declared_modules() {
    let config = HostConfig {
        auto_inject: true,
        ..HostConfig::default()
    };
    let (browser, mut runtime) = browser_with(config, Arc::new(NothingReachable));
    let tab = browser.open_tab("https://example.com/").await.unwrap();

    assert_eq!(browser.loaded_modules(tab).await, INJECTION_ORDER.to_vec());
    assert!(runtime.recv().await.is_some());
    assert!(ping(&browser, tab).await.unwrap().is_ready());
}

#[tokio::test]
async fn test_auto_inject_skips_privileged_pages() {
    let config = HostConfig {
        auto_inject: true,
        ..HostConfig::default()
    };
    let (browser, _runtime) = browser_with(config, Arc::new(NothingReachable));
    let tab = browser.open_tab("about:blank").await.unwrap();
    assert!(browser.loaded_modules(tab).await.is_empty());
}

#[tokio::test]
async fn test_push_state_updates_identity() {
    let (browser, _runtime) = browser();
    let tab = browser.open_tab("https://example.com/").await.unwrap();
    inject_all(&browser, tab).await;

    browser
        .push_state(tab, "https://example.com/pricing")
        .await
        .unwrap();
    assert_eq!(
        browser.active_tab().await.unwrap().url,
        "https://example.com/pricing"
    );
    assert!(ping(&browser, tab).await.unwrap().is_ready());

    let response = browser
        .send_to_tab(tab, PageRequest::PerformAnalysis, Duration::from_secs(5))
        .await
        .unwrap();
    let PageResponse::Analysis {
        data: Some(record), ..
    } = response
    else {
        panic!("expected an analysis, got {:?}", response);
    };
    assert_eq!(record.url, "https://example.com/pricing");
}

#[tokio::test]
async fn test_close_tab_falls_back_to_remaining_tab() {
    let (browser, _runtime) = browser();
    let first = browser.open_tab("https://example.com/").await.unwrap();
    let second = browser.open_tab("https://example.com/about").await.unwrap();
    assert_eq!(browser.active_tab_id().await, Some(second));
    let mut events = browser.subscribe();

    browser.close_tab(second).await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        TabEvent::Removed { tab_id: second }
    );
    assert_eq!(browser.active_tab_id().await, Some(first));
    assert_eq!(browser.tab_ids().await, vec![first]);

    browser.close_tab(first).await.unwrap();
    assert!(browser.active_tab().await.is_err());
    assert!(matches!(
        browser.close_tab(first).await,
        Err(HostError::TabNotFound(_))
    ));
}

#[tokio::test]
async fn test_activate_and_navigate_unknown_tab() {
    let (browser, _runtime) = browser();
    assert!(matches!(
        browser.activate(5).await,
        Err(HostError::TabNotFound(5))
    ));
    assert!(matches!(
        browser.navigate(5, "https://example.com/").await,
        Err(HostError::TabNotFound(5))
    ));
}
