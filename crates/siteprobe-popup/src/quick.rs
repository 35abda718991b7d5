//! The `quick` tier: computed by the popup when the coordinator is too slow.

use siteprobe_protocols::{
    AnalysisRecord, AnalysisType, Confidence, TabInfo, TechnologyFinding, VulnerabilityFinding,
};

/// Hostname substrings the popup recognizes on its own.
pub const QUICK_DOMAIN_TECHNOLOGIES: &[(&str, &str, &str)] = &[
    ("github.com", "GitHub", "Development"),
    ("google.com", "Google Services", "Web Service"),
    ("wordpress.com", "WordPress", "CMS"),
    ("shopify.com", "Shopify", "E-commerce"),
];

pub fn quick_analysis(tab: &TabInfo) -> AnalysisRecord {
    let mut record = AnalysisRecord::for_tab(tab, AnalysisType::Quick);
    let domain = tab.domain.to_lowercase();

    for (marker, name, category) in QUICK_DOMAIN_TECHNOLOGIES {
        if domain.contains(marker) {
            record.technologies.push(TechnologyFinding::new(
                *name,
                *category,
                Confidence::High,
                format!("{} domain", marker),
            ));
        }
    }

    if tab.is_secure {
        record.technologies.push(TechnologyFinding::new(
            "HTTPS",
            "Security",
            Confidence::High,
            "Secure protocol",
        ));
    } else {
        record
            .vulnerabilities
            .push(VulnerabilityFinding::insecure_connection());
    }

    record.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_analysis_secure_platform() {
        let tab = TabInfo::from_url(1, "https://gist.github.com/x", "Gist").unwrap();
        let record = quick_analysis(&tab);

        assert_eq!(record.analysis_type, AnalysisType::Quick);
        assert!(record.success);
        assert!(record.has_technology("GitHub"));
        assert!(record.has_technology("HTTPS"));
        assert!(record.vulnerabilities.is_empty());
        assert!(record.subdomains.is_empty());
        assert!(record.external_domains.is_empty());
    }

    #[test]
    fn test_quick_analysis_insecure() {
        let tab = TabInfo::from_url(1, "http://example.com/", "Example").unwrap();
        let record = quick_analysis(&tab);

        assert!(record.technologies.is_empty());
        assert!(record.has_vulnerability("Insecure Connection"));
        assert_eq!(record.title, "Example");
    }
}
