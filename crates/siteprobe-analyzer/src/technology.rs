//! Rule-driven technology detection.

use std::sync::LazyLock;

use regex::Regex;
use siteprobe_protocols::error::DetectError;
use siteprobe_protocols::{Confidence, PageDocument, TechnologyFinding, dedup_technologies};
use tracing::{debug, warn};

use crate::identity::PageIdentity;

static RESOURCE_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").ok());

static TAILWIND_UTILITIES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"^bg-\w+(-\d+)?$", r"^text-\w+(-\d+)?$", r"^p-\d+$", r"^m-\d+$"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// One piece of evidence a technology may leave on a page.
#[derive(Debug, Clone)]
pub enum Signal {
    /// A page global such as `React`; its version is taken when exposed.
    Global(String),
    /// Any element matching a CSS selector.
    Selector(String),
    /// The value of `attribute` on the first element matching `selector`.
    SelectorAttribute { selector: String, attribute: String },
    /// A `meta[name=generator]` containing `contains` (case-insensitive);
    /// the first capture of `version_pattern` is the version.
    MetaGenerator {
        contains: String,
        version_pattern: Option<Regex>,
    },
    /// A resource URL containing the substring (case-insensitive).
    ResourceContains(String),
    /// Tailwind-style utility class names.
    TailwindClasses,
}

/// Outcome of evaluating a signal: `None` when absent, otherwise the version
/// it revealed, if any.
type SignalMatch = Option<Option<String>>;

impl Signal {
    pub fn global(name: impl Into<String>) -> Self {
        Signal::Global(name.into())
    }

    pub fn selector(css: impl Into<String>) -> Self {
        Signal::Selector(css.into())
    }

    pub fn resource(fragment: impl Into<String>) -> Self {
        Signal::ResourceContains(fragment.into())
    }

    pub fn generator(contains: impl Into<String>, version_pattern: Option<&str>) -> Self {
        Signal::MetaGenerator {
            contains: contains.into(),
            version_pattern: version_pattern.and_then(|p| Regex::new(p).ok()),
        }
    }

    fn evaluate(&self, document: &dyn PageDocument) -> Result<SignalMatch, DetectError> {
        let found = match self {
            Signal::Global(name) => document.global(name).map(|g| g.version),
            Signal::Selector(css) => document.matches(css)?.then_some(None),
            Signal::SelectorAttribute {
                selector,
                attribute,
            } => document
                .attribute(selector, attribute)?
                .map(|value| Some(value).filter(|v| !v.is_empty())),
            Signal::MetaGenerator {
                contains,
                version_pattern,
            } => document
                .meta_by_name("generator")
                .filter(|content| content.to_lowercase().contains(&contains.to_lowercase()))
                .map(|content| {
                    version_pattern.as_ref().and_then(|re| {
                        re.captures(&content)
                            .and_then(|caps| caps.get(1))
                            .map(|m| m.as_str().to_string())
                    })
                }),
            Signal::ResourceContains(fragment) => {
                let fragment = fragment.to_lowercase();
                document
                    .resources()
                    .into_iter()
                    .find(|r| r.url.to_lowercase().contains(&fragment))
                    .map(|r| {
                        RESOURCE_VERSION
                            .as_ref()
                            .and_then(|re| re.captures(&r.url))
                            .and_then(|caps| caps.get(1))
                            .map(|m| m.as_str().to_string())
                    })
            }
            Signal::TailwindClasses => document
                .class_names()
                .iter()
                .any(|class| TAILWIND_UTILITIES.iter().any(|re| re.is_match(class)))
                .then_some(None),
        };
        Ok(found)
    }
}

#[derive(Debug, Clone)]
struct Probe {
    signal: Signal,
    confidence: Confidence,
    evidence: String,
}

/// A technology and the signals that reveal it, strongest first.
#[derive(Debug, Clone)]
pub struct TechnologyRule {
    pub name: String,
    pub category: String,
    /// Whether findings carry a version (`Unknown` when none is revealed).
    pub versioned: bool,
    probes: Vec<Probe>,
}

impl TechnologyRule {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            versioned: false,
            probes: Vec::new(),
        }
    }

    pub fn versioned(mut self) -> Self {
        self.versioned = true;
        self
    }

    /// Add a signal; the first matching signal decides confidence and evidence.
    pub fn signal(
        mut self,
        signal: Signal,
        confidence: Confidence,
        evidence: impl Into<String>,
    ) -> Self {
        self.probes.push(Probe {
            signal,
            confidence,
            evidence: evidence.into(),
        });
        self
    }

    fn detect(&self, document: &dyn PageDocument) -> Result<Option<TechnologyFinding>, DetectError> {
        for probe in &self.probes {
            let matched = match probe.signal.evaluate(document) {
                Ok(matched) => matched,
                Err(DetectError::InvalidSelector { selector, message }) => {
                    warn!(
                        "Skipping {} signal with invalid selector {}: {}",
                        self.name, selector, message
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            if let Some(version) = matched {
                let finding = TechnologyFinding::new(
                    &self.name,
                    &self.category,
                    probe.confidence,
                    &probe.evidence,
                );
                let finding = if self.versioned {
                    finding.with_version(version)
                } else {
                    finding
                };
                return Ok(Some(finding));
            }
        }
        Ok(None)
    }
}

/// Detects frameworks, libraries, CMSs, analytics, e-commerce platforms and
/// CDNs from page evidence.
#[derive(Debug, Clone)]
pub struct TechnologyDetector {
    rules: Vec<TechnologyRule>,
}

impl Default for TechnologyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TechnologyDetector {
    /// Detector with the built-in rule table.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<TechnologyRule>) -> Self {
        Self { rules }
    }

    /// Append a rule evaluated after the existing ones.
    pub fn add_rule(&mut self, rule: TechnologyRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[TechnologyRule] {
        &self.rules
    }

    /// Run every rule against the page, then report HTTPS on secure pages.
    pub fn detect(
        &self,
        document: &dyn PageDocument,
        identity: &PageIdentity,
    ) -> Result<Vec<TechnologyFinding>, DetectError> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            if let Some(finding) = rule.detect(document)? {
                debug!("Detected {} ({})", finding.name, finding.evidence);
                findings.push(finding);
            }
        }
        if identity.is_secure {
            findings.push(TechnologyFinding::new(
                "HTTPS",
                "Security",
                Confidence::High,
                "Secure protocol",
            ));
        }
        Ok(dedup_technologies(findings))
    }
}

fn default_rules() -> Vec<TechnologyRule> {
    use Confidence::{High, Medium};

    vec![
        // JavaScript frameworks and libraries
        TechnologyRule::new("React", "JavaScript Framework")
            .versioned()
            .signal(Signal::global("React"), High, "window.React object")
            .signal(Signal::selector("[data-reactroot]"), Medium, "React root attribute")
            .signal(Signal::resource("react"), Medium, "React script"),
        TechnologyRule::new("Vue.js", "JavaScript Framework")
            .versioned()
            .signal(Signal::global("Vue"), High, "window.Vue object")
            .signal(Signal::selector("[data-v-app]"), Medium, "Vue app attribute")
            .signal(Signal::resource("vue"), Medium, "Vue script"),
        TechnologyRule::new("AngularJS", "JavaScript Framework")
            .versioned()
            .signal(Signal::global("angular"), High, "window.angular object")
            .signal(Signal::selector("[ng-app], [ng-controller]"), Medium, "AngularJS directives"),
        TechnologyRule::new("Angular", "JavaScript Framework")
            .versioned()
            .signal(
                Signal::SelectorAttribute {
                    selector: "[ng-version]".to_string(),
                    attribute: "ng-version".to_string(),
                },
                High,
                "ng-version attribute",
            )
            .signal(Signal::selector("app-root"), Medium, "Angular root component"),
        TechnologyRule::new("jQuery", "JavaScript Library")
            .versioned()
            .signal(Signal::global("jQuery"), High, "window.jQuery object")
            .signal(Signal::resource("jquery"), Medium, "jQuery script"),
        TechnologyRule::new("Next.js", "React Framework")
            .signal(Signal::global("__NEXT_DATA__"), High, "__NEXT_DATA__ object")
            .signal(Signal::selector("#__next, script#__NEXT_DATA__"), High, "Next.js root element")
            .signal(Signal::resource("/_next/"), High, "Next.js scripts"),
        TechnologyRule::new("Nuxt.js", "Vue.js Framework")
            .signal(Signal::global("__NUXT__"), High, "__NUXT__ object")
            .signal(Signal::selector("#__nuxt"), High, "Nuxt.js root element"),
        TechnologyRule::new("Svelte", "JavaScript Framework")
            .signal(Signal::selector("[data-svelte]"), Medium, "Svelte data attributes")
            .signal(Signal::resource("svelte"), Medium, "Svelte script"),
        // CSS frameworks
        TechnologyRule::new("Bootstrap", "CSS Framework")
            .signal(Signal::resource("bootstrap"), High, "Bootstrap stylesheet")
            .signal(Signal::selector(".container, .row, .col"), Medium, "Bootstrap CSS classes"),
        TechnologyRule::new("Tailwind CSS", "CSS Framework")
            .signal(Signal::resource("tailwind"), High, "Tailwind stylesheet")
            .signal(Signal::TailwindClasses, Medium, "Tailwind utility classes"),
        TechnologyRule::new("Font Awesome", "Icon Library")
            .signal(Signal::resource("font-awesome"), High, "Font Awesome stylesheet")
            .signal(Signal::resource("fontawesome"), High, "Font Awesome stylesheet"),
        TechnologyRule::new("Google Fonts", "Web Fonts")
            .signal(Signal::resource("fonts.googleapis.com"), High, "Google Fonts stylesheet"),
        // CMS
        TechnologyRule::new("WordPress", "CMS")
            .versioned()
            .signal(
                Signal::generator("wordpress", Some(r"WordPress ([\d.]+)")),
                High,
                "Meta generator tag",
            )
            .signal(Signal::resource("wp-content"), High, "wp-content paths"),
        TechnologyRule::new("Drupal", "CMS")
            .versioned()
            .signal(Signal::generator("drupal", Some(r"Drupal (\d+)")), High, "Meta generator tag")
            .signal(Signal::global("Drupal"), High, "window.Drupal object"),
        TechnologyRule::new("Joomla", "CMS")
            .versioned()
            .signal(
                Signal::generator("joomla", Some(r"Joomla! (\d+\.\d+)")),
                High,
                "Meta generator tag",
            )
            .signal(Signal::global("Joomla"), High, "window.Joomla object"),
        // Analytics
        TechnologyRule::new("Google Analytics", "Analytics")
            .signal(Signal::global("gtag"), High, "Google Analytics script")
            .signal(Signal::global("ga"), High, "Google Analytics script")
            .signal(Signal::resource("google-analytics.com"), High, "Google Analytics script"),
        TechnologyRule::new("Google Tag Manager", "Tag Manager")
            .signal(Signal::resource("googletagmanager.com"), High, "GTM scripts"),
        TechnologyRule::new("Facebook Pixel", "Analytics")
            .signal(Signal::global("fbq"), High, "Facebook Pixel script")
            .signal(Signal::resource("connect.facebook.net"), High, "Facebook Pixel script"),
        TechnologyRule::new("Hotjar", "Analytics")
            .signal(Signal::global("hj"), High, "Hotjar script")
            .signal(Signal::resource("hotjar"), High, "Hotjar script"),
        // E-commerce
        TechnologyRule::new("Shopify", "E-commerce")
            .signal(Signal::global("Shopify"), High, "window.Shopify object")
            .signal(Signal::resource("cdn.shopify.com"), High, "Shopify CDN assets"),
        TechnologyRule::new("WooCommerce", "E-commerce")
            .signal(Signal::resource("woocommerce"), High, "WooCommerce assets"),
        TechnologyRule::new("Magento", "E-commerce")
            .signal(Signal::global("Magento"), High, "window.Magento object")
            .signal(Signal::resource("magento"), High, "Magento assets"),
        // CDN and hosted services
        TechnologyRule::new("Cloudflare", "CDN")
            .signal(Signal::resource("cloudflare"), High, "Cloudflare resources"),
        TechnologyRule::new("Google APIs", "Web Service")
            .signal(Signal::resource("googleapis.com"), High, "Google APIs resources"),
        TechnologyRule::new("jsDelivr", "CDN")
            .signal(Signal::resource("jsdelivr"), High, "jsDelivr resources"),
        TechnologyRule::new("unpkg", "CDN").signal(Signal::resource("unpkg"), High, "unpkg resources"),
        TechnologyRule::new("AWS CloudFront", "CDN")
            .signal(Signal::resource("cloudfront"), High, "CloudFront resources"),
        // Security and payments
        TechnologyRule::new("reCAPTCHA", "Security")
            .signal(Signal::global("grecaptcha"), High, "reCAPTCHA object")
            .signal(Signal::resource("recaptcha"), High, "reCAPTCHA script"),
        TechnologyRule::new("Stripe", "Payment System")
            .signal(Signal::global("Stripe"), High, "Stripe object")
            .signal(Signal::resource("js.stripe.com"), High, "Stripe script"),
        TechnologyRule::new("PayPal", "Payment System")
            .signal(Signal::global("paypal"), High, "PayPal object")
            .signal(Signal::resource("paypal"), High, "PayPal script"),
    ]
}

#[cfg(test)]
#[path = "technology_tests.rs"]
mod tests;
