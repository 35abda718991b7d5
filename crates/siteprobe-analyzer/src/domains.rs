//! Subdomain and external-domain harvesting from resource URLs.

use std::collections::BTreeSet;

use siteprobe_protocols::ResourceRef;
use siteprobe_protocols::domain::is_subdomain_of;
use siteprobe_protocols::error::DetectError;
use url::Url;

fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
}

/// Hosts under `domain` referenced by resources or requested by the page.
pub fn harvest_subdomains(
    resources: &[ResourceRef],
    observed: &[String],
    domain: &str,
) -> Result<BTreeSet<String>, DetectError> {
    if domain.is_empty() {
        return Err(DetectError::DocumentUnavailable(
            "page has no host".to_string(),
        ));
    }
    let domain = domain.to_lowercase();
    let subdomains = resources
        .iter()
        .map(|resource| resource.url.as_str())
        .chain(observed.iter().map(String::as_str))
        .filter_map(host_of)
        .filter(|host| is_subdomain_of(host, &domain))
        .collect();
    Ok(subdomains)
}

/// Hosts referenced by resources that are neither `domain` nor under it.
pub fn harvest_external_domains(
    resources: &[ResourceRef],
    domain: &str,
) -> Result<BTreeSet<String>, DetectError> {
    if domain.is_empty() {
        return Err(DetectError::DocumentUnavailable(
            "page has no host".to_string(),
        ));
    }
    let domain = domain.to_lowercase();
    let external = resources
        .iter()
        .filter_map(|resource| host_of(&resource.url))
        .filter(|host| *host != domain && !is_subdomain_of(host, &domain))
        .collect();
    Ok(external)
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteprobe_protocols::ResourceKind;

    fn resources() -> Vec<ResourceRef> {
        vec![
            ResourceRef::new(ResourceKind::Script, "https://cdn.example.com/app.js"),
            ResourceRef::new(ResourceKind::Link, "https://example.com/style.css"),
            ResourceRef::new(ResourceKind::Image, "https://images.example.com/logo.png"),
            ResourceRef::new(ResourceKind::Script, "https://www.googletagmanager.com/gtm.js"),
            ResourceRef::new(ResourceKind::Iframe, "https://www.youtube.com/embed/x"),
            ResourceRef::new(ResourceKind::Image, "data:image/png;base64,AAAA"),
            ResourceRef::new(ResourceKind::Script, "not a url"),
        ]
    }

    #[test]
    fn test_subdomains_from_resources() {
        let subdomains = harvest_subdomains(&resources(), &[], "example.com").unwrap();
        let expected: BTreeSet<String> = ["cdn.example.com", "images.example.com"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(subdomains, expected);
    }

    #[test]
    fn test_subdomains_include_observed_requests() {
        let observed = vec!["https://api.example.com/v1/user".to_string()];
        let subdomains = harvest_subdomains(&[], &observed, "example.com").unwrap();
        assert!(subdomains.contains("api.example.com"));
    }

    #[test]
    fn test_lookalike_host_is_not_subdomain() {
        let observed = vec!["https://notexample.com/".to_string()];
        let subdomains = harvest_subdomains(&[], &observed, "example.com").unwrap();
        assert!(subdomains.is_empty());
    }

    #[test]
    fn test_external_domains() {
        let external = harvest_external_domains(&resources(), "example.com").unwrap();
        let expected: BTreeSet<String> = ["www.googletagmanager.com", "www.youtube.com"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(external, expected);
    }

    #[test]
    fn test_missing_domain_fails() {
        assert!(harvest_subdomains(&resources(), &[], "").is_err());
        assert!(harvest_external_domains(&resources(), "").is_err());
    }
}
