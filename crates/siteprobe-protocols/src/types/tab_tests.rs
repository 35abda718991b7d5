use super::*;

#[test]
fn test_from_https_url() {
    let tab = TabInfo::from_url(7, "https://www.example.com/path?q=1", "Example").unwrap();
    assert_eq!(tab.id, 7);
    assert_eq!(tab.domain, "www.example.com");
    assert_eq!(tab.protocol, "https:");
    assert!(tab.is_secure);
    assert_eq!(tab.title, "Example");
}

#[test]
fn test_from_http_url() {
    let tab = TabInfo::from_url(1, "http://example.com/", "").unwrap();
    assert_eq!(tab.domain, "example.com");
    assert_eq!(tab.protocol, "http:");
    assert!(!tab.is_secure);
}

#[test]
fn test_from_url_without_host() {
    let tab = TabInfo::from_url(1, "about:blank", "").unwrap();
    assert_eq!(tab.domain, "");
    assert_eq!(tab.protocol, "about:");
}

#[test]
fn test_from_invalid_url() {
    assert!(TabInfo::from_url(1, "not a url", "").is_err());
}

#[test]
fn test_tab_info_serialization() {
    let tab = TabInfo::from_url(3, "https://example.com", "Title").unwrap();
    let json = serde_json::to_value(&tab).unwrap();
    assert_eq!(json["isSecure"], true);
    assert_eq!(json["protocol"], "https:");
    assert_eq!(json["id"], 3);
}

#[test]
fn test_tab_event_serialization() {
    let event = TabEvent::Updated {
        tab_id: 4,
        status: TabStatus::Complete,
        url: Some("https://example.com".to_string()),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "updated");
    assert_eq!(json["status"], "complete");

    let parsed: TabEvent = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, event);
}
