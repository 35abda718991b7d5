//! Location-derived identity of the inspected page.

use url::Url;

/// URL, domain and transport of the page at the moment an analysis starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIdentity {
    pub url: Url,
    pub domain: String,
    /// Scheme with a trailing colon, e.g. `https:`.
    pub protocol: String,
    pub is_secure: bool,
}

impl PageIdentity {
    pub fn from_url(url: &Url) -> Self {
        let protocol = format!("{}:", url.scheme());
        Self {
            url: url.clone(),
            domain: url.host_str().unwrap_or_default().to_string(),
            is_secure: protocol == "https:",
            protocol,
        }
    }

    /// `scheme://host[:port]` of the page.
    pub fn origin(&self) -> Url {
        let mut origin = self.url.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin
    }
}
