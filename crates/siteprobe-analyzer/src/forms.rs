//! Form introspection.

use siteprobe_protocols::error::DetectError;
use siteprobe_protocols::{FormFinding, PageDocument};

use crate::identity::PageIdentity;

/// Summarize every `<form>` on the page in document order.
///
/// A missing method reads as `GET` and a missing action as the page URL. A
/// form with an explicit action is secure when that action is `https:`;
/// otherwise it inherits the page's transport.
pub fn introspect_forms(
    document: &dyn PageDocument,
    identity: &PageIdentity,
) -> Result<Vec<FormFinding>, DetectError> {
    let findings = document
        .forms()
        .iter()
        .enumerate()
        .map(|(index, form)| FormFinding {
            index,
            method: form
                .method
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or("GET")
                .to_uppercase(),
            action: form
                .action
                .clone()
                .unwrap_or_else(|| identity.url.to_string()),
            has_password_field: form.has_password_field(),
            has_file_upload: form.has_file_upload(),
            is_secure: match form.action.as_deref() {
                Some(action) => action.starts_with("https:"),
                None => identity.is_secure,
            },
            input_count: form.fields.len(),
        })
        .collect();
    Ok(findings)
}
