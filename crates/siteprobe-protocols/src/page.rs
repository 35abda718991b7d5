//! Page-context collaborator definitions.
//!
//! The page analyzer never touches a concrete DOM or network stack; the host
//! hands it implementations of these traits when the analyzer is injected.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DetectError;

/// Element kind a subresource reference was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Script,
    Link,
    Image,
    Iframe,
}

/// A `src`/`href` reference on a script, link, img or iframe element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    /// Absolute URL as resolved against the document base.
    pub url: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

/// An input, textarea or select element inside a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldElement {
    pub tag: String,
    /// `type` attribute, lowercased; empty for textarea/select.
    pub input_type: String,
    pub name: String,
    pub autocomplete: Option<String>,
}

impl FieldElement {
    pub fn input(input_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag: "input".to_string(),
            input_type: input_type.into(),
            name: name.into(),
            autocomplete: None,
        }
    }

    pub fn with_autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
        self.autocomplete = Some(autocomplete.into());
        self
    }

    pub fn is_password(&self) -> bool {
        self.tag == "input" && self.input_type == "password"
    }

    pub fn is_file(&self) -> bool {
        self.tag == "input" && self.input_type == "file"
    }
}

/// A `<form>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormElement {
    pub method: Option<String>,
    /// Absolute action URL; `None` when the attribute is absent.
    pub action: Option<String>,
    pub fields: Vec<FieldElement>,
}

impl FormElement {
    pub fn has_password_field(&self) -> bool {
        self.fields.iter().any(FieldElement::is_password)
    }

    pub fn has_file_upload(&self) -> bool {
        self.fields.iter().any(FieldElement::is_file)
    }
}

/// A page-global object (e.g. `window.React`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalValue {
    pub version: Option<String>,
}

/// Read access to the inspected page's document.
pub trait PageDocument: Send + Sync {
    fn title(&self) -> String;

    fn resources(&self) -> Vec<ResourceRef>;

    /// Number of `<script>` elements without a `src`.
    fn inline_script_count(&self) -> usize;

    fn forms(&self) -> Vec<FormElement>;

    /// Content of `meta[name=<name>]`.
    fn meta_by_name(&self, name: &str) -> Option<String>;

    /// Content of `meta[http-equiv=<name>]`.
    fn meta_http_equiv(&self, name: &str) -> Option<String>;

    /// Whether any element matches a CSS selector.
    fn matches(&self, selector: &str) -> Result<bool, DetectError>;

    /// Attribute of the first element matching `selector`.
    fn attribute(&self, selector: &str, attribute: &str) -> Result<Option<String>, DetectError>;

    /// Every class name used in the document.
    fn class_names(&self) -> Vec<String>;

    /// A global object exposed by page scripts.
    fn global(&self, name: &str) -> Option<GlobalValue>;
}

/// Observes requests the page issues after load.
pub trait NetworkObserver: Send + Sync {
    fn observed_requests(&self) -> Vec<String>;
}

/// Same-origin reachability check for well-known paths.
#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    async fn probe(&self, origin: &Url, path: &str) -> Result<bool, DetectError>;
}
