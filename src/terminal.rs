//! Terminal rendering of the popup.

use std::io::{IsTerminal, Write};

use siteprobe_popup::{UserMessage, View, security_score};
use siteprobe_protocols::AnalysisRecord;
use tracing::warn;

/// Progress goes to stderr when it is a terminal; results go to stdout.
pub(crate) struct TerminalView {
    json: bool,
    interactive: bool,
}

impl TerminalView {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            interactive: std::io::stderr().is_terminal(),
        }
    }

    fn clear_progress(&self) {
        if self.interactive {
            eprint!("\r{:<60}\r", "");
        }
    }
}

impl View for TerminalView {
    fn loading(&self) {
        if self.interactive {
            eprint!("\rAnalyzing...");
        }
    }

    fn progress(&self, percent: u8, status: &str) {
        if self.interactive {
            eprint!("\r{:>3}% {:<50}", percent, status);
            let _ = std::io::stderr().flush();
        }
    }

    fn render(&self, record: &AnalysisRecord) {
        self.clear_progress();
        if self.json {
            match serde_json::to_string_pretty(record) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("Failed to serialize analysis: {}", e),
            }
        } else {
            print!("{}", summary(record));
        }
    }

    fn error(&self, message: UserMessage) {
        self.clear_progress();
        eprintln!("{}", message);
    }

    fn idle(&self) {
        self.clear_progress();
    }
}

/// Human-readable report of `record`.
pub(crate) fn summary(record: &AnalysisRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", record.title));
    out.push_str(&format!("{}\n", record.url));
    out.push_str(&format!(
        "Analysis: {}   Security score: {}/100   Protocol: {}\n",
        record.analysis_type,
        security_score(record),
        record.protocol
    ));

    out.push_str("\nTechnologies\n");
    if record.technologies.is_empty() {
        out.push_str("  (none detected)\n");
    }
    for tech in &record.technologies {
        let name = match &tech.version {
            Some(version) => format!("{} {}", tech.name, version),
            None => tech.name.clone(),
        };
        out.push_str(&format!(
            "  {:<28} {:<22} {:?}\n",
            name, tech.category, tech.confidence
        ));
    }

    out.push_str("\nFindings\n");
    if record.vulnerabilities.is_empty() {
        out.push_str("  (none)\n");
    }
    for finding in &record.vulnerabilities {
        out.push_str(&format!(
            "  [{:<6}] {}: {}\n",
            finding.severity.to_string(),
            finding.kind,
            finding.description
        ));
    }

    if !record.subdomains.is_empty() {
        out.push_str(&format!(
            "\nSubdomains: {}\n",
            record.subdomains.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
    }
    if !record.external_domains.is_empty() {
        out.push_str(&format!(
            "External domains: {}\n",
            record
                .external_domains
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    out.push_str(&format!(
        "Forms: {}   Sitemap: {}   robots.txt: {}\n",
        record.forms.len(),
        yes_no(record.sitemap_exists),
        yes_no(record.robots_exists)
    ));
    out
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
