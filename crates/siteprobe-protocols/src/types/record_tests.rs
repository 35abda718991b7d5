use super::*;
use std::time::Duration;

fn tab(url: &str) -> TabInfo {
    TabInfo::from_url(1, url, "Example").unwrap()
}

#[test]
fn test_dedup_keeps_first_occurrence() {
    let techs = vec![
        TechnologyFinding::new("Cloudflare", "CDN", Confidence::High, "first"),
        TechnologyFinding::new("React", "JavaScript Framework", Confidence::High, "window.React"),
        TechnologyFinding::new("Cloudflare", "CDN", Confidence::Low, "second"),
    ];

    let deduped = dedup_technologies(techs);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].name, "Cloudflare");
    assert_eq!(deduped[0].evidence, "first");
    assert_eq!(deduped[1].name, "React");
}

#[test]
fn test_dedup_distinguishes_category() {
    let techs = vec![
        TechnologyFinding::new("Shopify", "E-commerce", Confidence::High, "a"),
        TechnologyFinding::new("Shopify", "Hosting", Confidence::High, "b"),
    ];
    assert_eq!(dedup_technologies(techs).len(), 2);
}

#[test]
fn test_with_version_defaults_to_unknown() {
    let tech = TechnologyFinding::new("React", "JavaScript Framework", Confidence::High, "x")
        .with_version(None);
    assert_eq!(tech.version.as_deref(), Some(UNKNOWN_VERSION));
    assert!(!tech.has_known_version());

    let tech = tech.with_version(Some("18.2.0".to_string()));
    assert!(tech.has_known_version());
}

#[test]
fn test_for_tab_copies_identity() {
    let record = AnalysisRecord::for_tab(&tab("http://example.com/"), AnalysisType::Basic);
    assert_eq!(record.domain, "example.com");
    assert!(!record.is_secure);
    assert_eq!(record.certificates.protocol, "http:");
    assert!(!record.certificates.secure_context);
    assert!(record.success);
    assert_eq!(record.analysis_type, AnalysisType::Basic);
}

#[test]
fn test_finalize_dedups() {
    let mut record = AnalysisRecord::for_tab(&tab("https://example.com/"), AnalysisType::Quick);
    record.technologies = vec![
        TechnologyFinding::new("HTTPS", "Security", Confidence::High, "a"),
        TechnologyFinding::new("HTTPS", "Security", Confidence::High, "b"),
    ];
    let record = record.finalize();
    assert_eq!(record.technologies.len(), 1);
}

#[test]
fn test_record_serialization_shape() {
    let mut record =
        AnalysisRecord::for_tab(&tab("https://example.com/"), AnalysisType::ContentScript);
    record.vulnerabilities.push(VulnerabilityFinding::insecure_connection());
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["analysisType"], "content_script");
    assert_eq!(json["isSecure"], true);
    assert_eq!(json["certificates"]["secureContext"], true);
    assert_eq!(json["vulnerabilities"][0]["type"], "Insecure Connection");
    assert_eq!(json["vulnerabilities"][0]["severity"], "High");
    assert!(json["vulnerabilities"][0].get("details").is_none());
    assert!(json["externalDomains"].is_array());
}

#[test]
fn test_cache_entry_flattens_record() {
    let record = AnalysisRecord::for_tab(&tab("https://example.com/"), AnalysisType::Minimal);
    let entry = CacheEntry::new(record, Utc::now());
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["domain"], "example.com");
    assert!(json.get("cachedAt").is_some());

    let parsed: CacheEntry = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, entry);
}

#[test]
fn test_cache_entry_freshness() {
    let record = AnalysisRecord::for_tab(&tab("https://example.com/"), AnalysisType::Basic);
    let now = Utc::now();
    let ttl = Duration::from_secs(300);

    let fresh = CacheEntry::new(record.clone(), now - chrono::Duration::seconds(299));
    assert!(fresh.is_fresh(now, ttl));

    let stale = CacheEntry::new(record, now - chrono::Duration::seconds(301));
    assert!(!stale.is_fresh(now, ttl));
}

#[test]
fn test_storage_key() {
    assert_eq!(storage_key("example.com"), "analysis_example.com");
}

#[test]
fn test_severity_ordering() {
    assert!(Severity::Low < Severity::Medium);
    assert!(Severity::Medium < Severity::High);
}

#[test]
fn test_analysis_type_display() {
    assert_eq!(AnalysisType::ContentScript.to_string(), "content_script");
    assert_eq!(AnalysisType::Quick.to_string(), "quick");
}
