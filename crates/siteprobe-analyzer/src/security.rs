//! Heuristic vulnerability checks.

use serde_json::json;
use siteprobe_protocols::error::DetectError;
use siteprobe_protocols::{PageDocument, ResourceKind, Severity, VulnerabilityFinding};

use crate::headers::{CONTENT_SECURITY_POLICY, X_FRAME_OPTIONS};
use crate::identity::PageIdentity;

const DEFAULT_INLINE_SCRIPT_THRESHOLD: usize = 5;

/// Field name fragments that mark a field as sensitive.
const SENSITIVE_NAME_FRAGMENTS: &[&str] = &["password", "credit", "card", "cvv", "ssn"];

/// Autocomplete values that keep browsers from storing a field.
const SAFE_AUTOCOMPLETE: &[&str] = &["off", "new-password"];

/// Query parameters commonly used for redirects.
const REDIRECT_PARAMS: &[&str] = &["redirect", "url", "return", "goto", "next", "continue"];

/// Security checks run inside the page context.
#[derive(Debug, Clone)]
pub struct SecurityHeuristics {
    inline_script_threshold: usize,
}

impl Default for SecurityHeuristics {
    fn default() -> Self {
        Self::new(DEFAULT_INLINE_SCRIPT_THRESHOLD)
    }
}

impl SecurityHeuristics {
    /// Pages with more than `inline_script_threshold` inline scripts are
    /// reported.
    pub fn new(inline_script_threshold: usize) -> Self {
        Self {
            inline_script_threshold,
        }
    }

    /// Run every check, in a fixed order.
    pub fn assess(
        &self,
        document: &dyn PageDocument,
        identity: &PageIdentity,
    ) -> Result<Vec<VulnerabilityFinding>, DetectError> {
        let mut findings = Vec::new();

        if !identity.is_secure {
            findings.push(VulnerabilityFinding::insecure_connection());
        }

        let forms = document.forms();
        let has_password_field = forms.iter().any(|f| f.has_password_field());

        if !identity.is_secure && has_password_field {
            findings.push(VulnerabilityFinding::new(
                "Insecure Password Form",
                Severity::High,
                "A password form is submitted over an unencrypted HTTP connection",
                "Serve the page and its forms over HTTPS",
            ));
        }

        if let Some(finding) = self.mixed_content(document, identity) {
            findings.push(finding);
        }

        for (index, form) in forms.iter().enumerate() {
            let method = form.method.as_deref().unwrap_or("get");
            if method.eq_ignore_ascii_case("get") && form.has_password_field() {
                findings.push(
                    VulnerabilityFinding::new(
                        "Insecure Form Method",
                        Severity::High,
                        "A password field is submitted with the GET method",
                        "Submit credentials with POST",
                    )
                    .with_details(json!({ "formIndex": index })),
                );
            }
        }

        let inline_scripts = document.inline_script_count();
        if inline_scripts > self.inline_script_threshold {
            findings.push(VulnerabilityFinding::new(
                "Excessive Inline Scripts",
                Severity::Low,
                format!("{} inline scripts detected", inline_scripts),
                "Move scripts to external files and enforce a Content Security Policy",
            ));
        }

        if Self::clickjacking_risk(document) {
            findings.push(VulnerabilityFinding::new(
                "Clickjacking Risk",
                Severity::Medium,
                "No X-Frame-Options or CSP frame-ancestors protection found",
                "Send X-Frame-Options: DENY or SAMEORIGIN, or a CSP frame-ancestors directive",
            ));
        }

        if let Some(finding) = Self::sensitive_autocomplete(document) {
            findings.push(finding);
        }

        if let Some(finding) = Self::open_redirect(identity) {
            findings.push(finding);
        }

        Ok(findings)
    }

    fn mixed_content(
        &self,
        document: &dyn PageDocument,
        identity: &PageIdentity,
    ) -> Option<VulnerabilityFinding> {
        if !identity.is_secure {
            return None;
        }
        let insecure: Vec<_> = document
            .resources()
            .into_iter()
            .filter(|r| r.kind != ResourceKind::Iframe && r.url.starts_with("http://"))
            .map(|r| {
                let kind = match r.kind {
                    ResourceKind::Script => "script",
                    ResourceKind::Link => "stylesheet",
                    ResourceKind::Image => "image",
                    ResourceKind::Iframe => "iframe",
                };
                json!({ "type": kind, "url": r.url })
            })
            .collect();
        if insecure.is_empty() {
            return None;
        }
        Some(
            VulnerabilityFinding::new(
                "Mixed Content",
                Severity::Medium,
                format!("{} HTTP resources loaded on an HTTPS page", insecure.len()),
                "Load every resource over HTTPS",
            )
            .with_details(json!(insecure)),
        )
    }

    fn clickjacking_risk(document: &dyn PageDocument) -> bool {
        if document.meta_http_equiv(X_FRAME_OPTIONS).is_some() {
            return false;
        }
        !document
            .meta_http_equiv(CONTENT_SECURITY_POLICY)
            .is_some_and(|csp| csp.contains("frame-ancestors"))
    }

    fn sensitive_autocomplete(document: &dyn PageDocument) -> Option<VulnerabilityFinding> {
        let fields: Vec<_> = document
            .forms()
            .into_iter()
            .flat_map(|form| form.fields)
            .filter(|field| field.tag == "input")
            .filter(|field| {
                let name = field.name.to_lowercase();
                field.is_password()
                    || SENSITIVE_NAME_FRAGMENTS
                        .iter()
                        .any(|fragment| name.contains(fragment))
            })
            .filter(|field| {
                !field
                    .autocomplete
                    .as_deref()
                    .is_some_and(|value| SAFE_AUTOCOMPLETE.contains(&value))
            })
            .map(|field| {
                json!({
                    "type": field.input_type,
                    "name": field.name,
                    "autocomplete": field.autocomplete.unwrap_or_default(),
                })
            })
            .collect();
        if fields.is_empty() {
            return None;
        }
        Some(
            VulnerabilityFinding::new(
                "Sensitive Field Autocomplete",
                Severity::Low,
                "Autocomplete is enabled on sensitive fields",
                "Use autocomplete=\"off\" or \"new-password\" on password and payment fields",
            )
            .with_details(json!(fields)),
        )
    }

    fn open_redirect(identity: &PageIdentity) -> Option<VulnerabilityFinding> {
        let params: Vec<_> = identity
            .url
            .query_pairs()
            .filter(|(key, value)| {
                REDIRECT_PARAMS.contains(&&**key)
                    && (value.starts_with("http://") || value.starts_with("https://"))
            })
            .map(|(key, value)| json!({ "param": key, "value": value }))
            .collect();
        if params.is_empty() {
            return None;
        }
        Some(
            VulnerabilityFinding::new(
                "Potential Open Redirect",
                Severity::Medium,
                "A redirect-style query parameter carries an absolute URL",
                "Validate redirect targets against an allow-list",
            )
            .with_details(json!(params)),
        )
    }
}

#[cfg(test)]
#[path = "security_tests.rs"]
mod tests;
