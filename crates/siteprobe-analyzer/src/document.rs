//! `PageDocument` backed by parsed HTML.

use std::collections::{BTreeSet, HashMap};

use scraper::{ElementRef, Html, Selector};
use siteprobe_protocols::error::DetectError;
use siteprobe_protocols::{
    FieldElement, FormElement, GlobalValue, PageDocument, ResourceKind, ResourceRef,
};
use url::Url;

const RESOURCE_SOURCES: &[(&str, &str, ResourceKind)] = &[
    ("script[src]", "src", ResourceKind::Script),
    ("link[href]", "href", ResourceKind::Link),
    ("img[src]", "src", ResourceKind::Image),
    ("iframe[src]", "src", ResourceKind::Iframe),
];

/// A static snapshot of a page.
///
/// The common queries are answered from data extracted at parse time; ad-hoc
/// selector queries re-parse the retained source. Page globals cannot be
/// observed from markup and are supplied with [`HtmlDocument::with_global`].
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    source: String,
    title: String,
    resources: Vec<ResourceRef>,
    inline_scripts: usize,
    forms: Vec<FormElement>,
    meta_names: HashMap<String, String>,
    meta_http_equiv: HashMap<String, String>,
    class_names: Vec<String>,
    globals: HashMap<String, GlobalValue>,
}

fn selector(css: &str) -> Result<Selector, DetectError> {
    Selector::parse(css).map_err(|e| DetectError::InvalidSelector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn select_all<'a>(html: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => html.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

impl HtmlDocument {
    /// Parse `html` as served from `base`.
    pub fn parse(html: &str, base: &Url) -> Self {
        let document = Html::parse_document(html);

        let title = select_all(&document, "title")
            .first()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let mut resources = Vec::new();
        for (css, attribute, kind) in RESOURCE_SOURCES {
            for element in select_all(&document, css) {
                let Some(raw) = element.value().attr(attribute) else {
                    continue;
                };
                if let Ok(resolved) = base.join(raw.trim()) {
                    resources.push(ResourceRef::new(*kind, resolved.to_string()));
                }
            }
        }

        let inline_scripts = select_all(&document, "script")
            .iter()
            .filter(|el| el.value().attr("src").is_none())
            .count();

        let forms = select_all(&document, "form")
            .into_iter()
            .map(|form| Self::form_element(form, base))
            .collect();

        let mut meta_names = HashMap::new();
        let mut meta_http_equiv = HashMap::new();
        for meta in select_all(&document, "meta") {
            let Some(content) = meta.value().attr("content") else {
                continue;
            };
            if let Some(name) = meta.value().attr("name") {
                meta_names
                    .entry(name.to_lowercase())
                    .or_insert_with(|| content.to_string());
            }
            if let Some(equiv) = meta.value().attr("http-equiv") {
                meta_http_equiv
                    .entry(equiv.to_lowercase())
                    .or_insert_with(|| content.to_string());
            }
        }

        let class_names: BTreeSet<String> = select_all(&document, "[class]")
            .iter()
            .flat_map(|el| el.value().classes().map(str::to_string).collect::<Vec<_>>())
            .collect();

        Self {
            source: html.to_string(),
            title,
            resources,
            inline_scripts,
            forms,
            meta_names,
            meta_http_equiv,
            class_names: class_names.into_iter().collect(),
            globals: HashMap::new(),
        }
    }

    /// Expose a page global, as page scripts would after running.
    pub fn with_global(mut self, name: impl Into<String>, value: GlobalValue) -> Self {
        self.globals.insert(name.into(), value);
        self
    }

    fn form_element(form: ElementRef<'_>, base: &Url) -> FormElement {
        let method = form.value().attr("method").map(str::to_lowercase);
        // An empty action attribute submits to the page itself.
        let action = form
            .value()
            .attr("action")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(|a| {
                base.join(a)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| a.to_string())
            });

        let fields = match Selector::parse("input, textarea, select") {
            Ok(sel) => form
                .select(&sel)
                .map(|field| {
                    let tag = field.value().name().to_lowercase();
                    let input_type = if tag == "input" {
                        field
                            .value()
                            .attr("type")
                            .unwrap_or("text")
                            .to_lowercase()
                    } else {
                        String::new()
                    };
                    FieldElement {
                        tag,
                        input_type,
                        name: field.value().attr("name").unwrap_or_default().to_string(),
                        autocomplete: field.value().attr("autocomplete").map(str::to_lowercase),
                    }
                })
                .collect(),
            Err(_) => Vec::new(),
        };

        FormElement {
            method,
            action,
            fields,
        }
    }
}

impl PageDocument for HtmlDocument {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn resources(&self) -> Vec<ResourceRef> {
        self.resources.clone()
    }

    fn inline_script_count(&self) -> usize {
        self.inline_scripts
    }

    fn forms(&self) -> Vec<FormElement> {
        self.forms.clone()
    }

    fn meta_by_name(&self, name: &str) -> Option<String> {
        self.meta_names.get(&name.to_lowercase()).cloned()
    }

    fn meta_http_equiv(&self, name: &str) -> Option<String> {
        self.meta_http_equiv.get(&name.to_lowercase()).cloned()
    }

    fn matches(&self, css: &str) -> Result<bool, DetectError> {
        let sel = selector(css)?;
        let document = Html::parse_document(&self.source);
        let found = document.select(&sel).next().is_some();
        Ok(found)
    }

    fn attribute(&self, css: &str, attribute: &str) -> Result<Option<String>, DetectError> {
        let sel = selector(css)?;
        let document = Html::parse_document(&self.source);
        let value = document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr(attribute).map(str::to_string));
        Ok(value)
    }

    fn class_names(&self) -> Vec<String> {
        self.class_names.clone()
    }

    fn global(&self, name: &str) -> Option<GlobalValue> {
        self.globals.get(name).cloned()
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
