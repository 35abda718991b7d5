//! Degraded analysis tiers computed by the coordinator from tab metadata.
//!
//! Neither tier touches the page; both only see the tab's URL, title and
//! scheme.

use std::collections::BTreeSet;

use siteprobe_protocols::domain::{has_subdomain, registrable_domain};
use siteprobe_protocols::{
    AnalysisRecord, AnalysisType, Confidence, Severity, TabInfo, TechnologyFinding,
    VulnerabilityFinding,
};

/// Hosting platforms recognized by a substring of the hostname.
pub const DOMAIN_TECHNOLOGIES: &[(&str, &str, &str)] = &[
    ("github.com", "GitHub", "Development Platform"),
    ("github.io", "GitHub Pages", "Hosting"),
    ("wordpress.com", "WordPress.com", "CMS"),
    ("shopify.com", "Shopify", "E-commerce"),
    ("myshopify.com", "Shopify Store", "E-commerce"),
    ("google.com", "Google Services", "Web Service"),
    ("googleapis.com", "Google APIs", "API Service"),
    ("cloudflare.com", "Cloudflare", "CDN"),
    ("amazonaws.com", "AWS", "Cloud Service"),
    ("netlify.app", "Netlify", "Hosting"),
    ("vercel.app", "Vercel", "Hosting"),
    ("herokuapp.com", "Heroku", "Hosting"),
];

/// CMS markers recognized by a substring of the full URL.
pub const PATH_TECHNOLOGIES: &[(&str, &str, &str)] = &[
    ("wp-content", "WordPress", "CMS"),
    ("wp-admin", "WordPress", "CMS"),
    ("wp-includes", "WordPress", "CMS"),
    ("drupal", "Drupal", "CMS"),
    ("joomla", "Joomla", "CMS"),
];

pub const COMMON_SUBDOMAINS: &[&str] = &["www", "api", "cdn", "static", "assets", "blog"];

pub const MAX_GUESSED_SUBDOMAINS: usize = 5;

pub const COMMON_EXTERNAL_DOMAINS: &[&str] = &[
    "googleapis.com",
    "googletagmanager.com",
    "google-analytics.com",
    "facebook.net",
    "cloudflare.com",
    "jsdelivr.net",
    "unpkg.com",
    "cdnjs.cloudflare.com",
];

/// Coarse analysis from tab metadata (`analysisType: basic`).
pub fn basic_analysis(tab: &TabInfo) -> AnalysisRecord {
    let mut record = AnalysisRecord::for_tab(tab, AnalysisType::Basic);
    record.technologies = detect_technologies(tab);
    record.subdomains = guess_subdomains(&tab.domain);
    record.external_domains = common_external_domains(&tab.domain);
    record.vulnerabilities = basic_vulnerabilities(tab);
    record.finalize()
}

/// Last-resort fixed-shape record (`analysisType: minimal`).
pub fn minimal_analysis(tab: &TabInfo) -> AnalysisRecord {
    let mut record = AnalysisRecord::for_tab(tab, AnalysisType::Minimal);
    record.technologies = vec![TechnologyFinding::new(
        "Web Browser",
        "Browser",
        Confidence::High,
        "Browser detected",
    )];
    if !tab.is_secure {
        record
            .vulnerabilities
            .push(VulnerabilityFinding::insecure_connection());
    }
    record
}

/// Technologies implied by the hostname, the URL path and the scheme.
pub fn detect_technologies(tab: &TabInfo) -> Vec<TechnologyFinding> {
    let domain = tab.domain.to_lowercase();
    let url = tab.url.to_lowercase();
    let mut technologies = Vec::new();

    for (marker, name, category) in DOMAIN_TECHNOLOGIES {
        if domain.contains(marker) {
            technologies.push(TechnologyFinding::new(
                *name,
                *category,
                Confidence::High,
                format!("{} domain detected", marker),
            ));
        }
    }

    for (marker, name, category) in PATH_TECHNOLOGIES {
        if url.contains(marker) {
            technologies.push(TechnologyFinding::new(
                *name,
                *category,
                Confidence::Medium,
                format!("{} path detected", marker),
            ));
        }
    }

    if tab.is_secure {
        technologies.push(TechnologyFinding::new(
            "HTTPS",
            "Security",
            Confidence::High,
            "HTTPS protocol detected",
        ));
    }

    technologies
}

/// The host itself plus common siblings, only when the host is a subdomain.
pub fn guess_subdomains(domain: &str) -> BTreeSet<String> {
    if !has_subdomain(domain) {
        return BTreeSet::new();
    }
    let main = registrable_domain(domain);

    std::iter::once(domain.to_string())
        .chain(
            COMMON_SUBDOMAINS
                .iter()
                .map(|sub| format!("{}.{}", sub, main))
                .filter(|candidate| candidate != domain),
        )
        .take(MAX_GUESSED_SUBDOMAINS)
        .collect()
}

/// Well-known third-party hosts that do not belong to the page's own site.
pub fn common_external_domains(domain: &str) -> BTreeSet<String> {
    let main = registrable_domain(domain);
    COMMON_EXTERNAL_DOMAINS
        .iter()
        .filter(|external| !external.contains(main.as_str()))
        .map(|external| external.to_string())
        .collect()
}

pub fn basic_vulnerabilities(tab: &TabInfo) -> Vec<VulnerabilityFinding> {
    let mut vulnerabilities = Vec::new();

    if !tab.is_secure {
        vulnerabilities.push(VulnerabilityFinding::insecure_connection());
    }

    if has_subdomain(&tab.domain) {
        vulnerabilities.push(VulnerabilityFinding::new(
            "Subdomain Usage",
            Severity::Low,
            "The site is served from a subdomain",
            "Review the security policies applied to every subdomain",
        ));
    }

    vulnerabilities
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
