//! Security header hints visible from page markup.
//!
//! Real response headers are not observable from the page context; only the
//! `<meta>` equivalents are reported.

use std::collections::BTreeMap;

use siteprobe_protocols::PageDocument;
use siteprobe_protocols::error::DetectError;

pub const CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";
pub const X_FRAME_OPTIONS: &str = "X-Frame-Options";
pub const REFERRER_POLICY: &str = "Referrer-Policy";

/// Collect `Content-Security-Policy`, `X-Frame-Options` and `Referrer-Policy`
/// hints from meta tags.
pub fn extract_header_hints(
    document: &dyn PageDocument,
) -> Result<BTreeMap<String, String>, DetectError> {
    let mut headers = BTreeMap::new();
    for name in [CONTENT_SECURITY_POLICY, X_FRAME_OPTIONS] {
        if let Some(value) = document.meta_http_equiv(name) {
            headers.insert(name.to_string(), value);
        }
    }
    if let Some(value) = document.meta_by_name("referrer") {
        headers.insert(REFERRER_POLICY.to_string(), value);
    }
    Ok(headers)
}
