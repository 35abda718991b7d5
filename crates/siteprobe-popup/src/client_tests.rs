use super::*;
use siteprobe_channel::{Inbox, channel};
use siteprobe_protocols::{AnalysisError, AnalysisRecord, AnalysisType, ChannelError, ErrorKind};

/// Answers every request with the response built by `answer`.
fn serve<F>(mut inbox: Inbox<RuntimeRequest, RuntimeResponse>, answer: F)
where
    F: Fn(RuntimeRequest) -> Option<RuntimeResponse> + Send + 'static,
{
    tokio::spawn(async move {
        // `None` leaves the request unanswered until the inbox closes.
        let mut parked = Vec::new();
        while let Some(incoming) = inbox.recv().await {
            match answer(incoming.request) {
                Some(response) => {
                    incoming.responder.respond(response);
                }
                None => parked.push(incoming.responder),
            }
        }
    });
}

fn tab() -> TabInfo {
    TabInfo::from_url(1, "https://example.com/", "Example").unwrap()
}

fn entry() -> CacheEntry {
    CacheEntry::new(
        AnalysisRecord::for_tab(&tab(), AnalysisType::ContentScript),
        chrono::Utc::now(),
    )
}

#[tokio::test]
async fn test_tab_info() {
    let (endpoint, inbox) = channel();
    serve(inbox, |_| Some(RuntimeResponse::TabInfo(tab())));
    let client = RuntimeClient::new(endpoint);

    let tab = client.tab_info().await.unwrap();
    assert_eq!(tab.domain, "example.com");
}

#[tokio::test]
async fn test_error_response_is_rejected() {
    let (endpoint, inbox) = channel();
    serve(inbox, |_| Some(RuntimeResponse::error("no active tab")));
    let client = RuntimeClient::new(endpoint);

    let err = client.tab_info().await.unwrap_err();
    assert!(matches!(
        err,
        PopupError::Rejected { kind: ErrorKind::Other, ref message } if message == "no active tab"
    ));
}

#[tokio::test]
async fn test_rejection_keeps_error_kind() {
    let (endpoint, inbox) = channel();
    serve(inbox, |_| {
        let err = AnalysisError::NotAnalyzable("about:blank".to_string());
        Some(RuntimeResponse::analysis_error(&err))
    });
    let client = RuntimeClient::new(endpoint);

    let err = client.analyze_current_tab().await.unwrap_err();
    assert!(matches!(
        err,
        PopupError::Rejected {
            kind: ErrorKind::NotAnalyzable,
            ..
        }
    ));
}

#[tokio::test]
async fn test_cached_analysis_absent_and_present() {
    let (endpoint, inbox) = channel();
    serve(inbox, |request| match request {
        RuntimeRequest::GetAnalysisData { domain } if domain == "example.com" => {
            Some(RuntimeResponse::analysis(Some(entry())))
        }
        _ => Some(RuntimeResponse::analysis(None)),
    });
    let client = RuntimeClient::new(endpoint);

    assert!(client.cached_analysis("other.com").await.unwrap().is_none());
    let cached = client.cached_analysis("example.com").await.unwrap().unwrap();
    assert_eq!(cached.record.domain, "example.com");
}

#[tokio::test]
async fn test_analyze_current_tab() {
    let (endpoint, inbox) = channel();
    serve(inbox, |_| Some(RuntimeResponse::analysis(Some(entry()))));
    let client = RuntimeClient::new(endpoint);

    let entry = client.analyze_current_tab().await.unwrap();
    assert_eq!(entry.record.analysis_type, AnalysisType::ContentScript);
}

#[tokio::test]
async fn test_analyze_with_ack_is_unexpected() {
    let (endpoint, inbox) = channel();
    serve(inbox, |_| Some(RuntimeResponse::ack()));
    let client = RuntimeClient::new(endpoint);

    let err = client.analyze_current_tab().await.unwrap_err();
    assert!(matches!(
        err,
        PopupError::UnexpectedResponse {
            action: "analyzeCurrentTab"
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout() {
    let (endpoint, inbox) = channel();
    serve(inbox, |_| None);
    let client = RuntimeClient::new(endpoint).with_timeout(Duration::from_secs(2));

    let err = client.analyze_current_tab().await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_no_coordinator() {
    let (endpoint, inbox) = channel::<RuntimeRequest, RuntimeResponse>();
    drop(inbox);
    let client = RuntimeClient::new(endpoint);

    let err = client.tab_info().await.unwrap_err();
    assert!(matches!(err, PopupError::Transport(ChannelError::NoReceiver)));
}
