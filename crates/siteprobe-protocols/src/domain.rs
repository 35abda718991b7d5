//! Hostname helpers used by every analysis tier.

/// URL prefixes of browser-internal pages that cannot be analyzed.
pub const PRIVILEGED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "moz-extension://",
    "edge://",
    "about:",
    "file://",
];

/// Whether `url` points at a browser-internal or otherwise restricted page.
pub fn is_privileged_url(url: &str) -> bool {
    PRIVILEGED_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

/// The last two dot-separated labels of `host`.
///
/// A coarse "same site" approximation: `a.b.example.co.uk` yields `co.uk`.
pub fn registrable_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].join(".")
}

/// Whether `host` has more than two labels.
pub fn has_subdomain(host: &str) -> bool {
    host.split('.').count() > 2
}

/// Whether `host` is a strict subdomain of `domain`.
pub fn is_subdomain_of(host: &str, domain: &str) -> bool {
    host != domain && host.ends_with(&format!(".{}", domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_urls() {
        assert!(is_privileged_url("chrome://settings"));
        assert!(is_privileged_url("chrome-extension://abc/popup.html"));
        assert!(is_privileged_url("moz-extension://abc/"));
        assert!(is_privileged_url("edge://flags"));
        assert!(is_privileged_url("about:blank"));
        assert!(is_privileged_url("file:///etc/hosts"));
        assert!(!is_privileged_url("https://example.com"));
        assert!(!is_privileged_url("http://example.com/about:blank"));
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("www.example.com"), "example.com");
        assert_eq!(registrable_domain("a.b.example.com"), "example.com");
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("localhost"), "localhost");
    }

    #[test]
    fn test_has_subdomain() {
        assert!(has_subdomain("blog.example.com"));
        assert!(!has_subdomain("example.com"));
    }

    #[test]
    fn test_is_subdomain_of() {
        assert!(is_subdomain_of("cdn.example.com", "example.com"));
        assert!(!is_subdomain_of("example.com", "example.com"));
        assert!(!is_subdomain_of("notexample.com", "example.com"));
    }
}
