//! Script modules loaded into a page context.

use serde::{Deserialize, Serialize};

/// A unit of page-context code the coordinator can inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptModule {
    /// Security heuristics helper.
    SecurityHeuristics,
    /// Technology rule table helper.
    TechnologyRules,
    /// The page analyzer itself; announces readiness when loaded.
    Analyzer,
}

/// Helpers first: the analyzer is built from the helpers already registered.
pub const INJECTION_ORDER: [ScriptModule; 3] = [
    ScriptModule::SecurityHeuristics,
    ScriptModule::TechnologyRules,
    ScriptModule::Analyzer,
];

impl ScriptModule {
    /// Bundle file name of the module.
    pub fn file(&self) -> &'static str {
        match self {
            ScriptModule::SecurityHeuristics => "src/content/security-analyzer.js",
            ScriptModule::TechnologyRules => "src/content/technology-detector.js",
            ScriptModule::Analyzer => "src/content/content.js",
        }
    }

    /// Modules that must already be registered when this one loads.
    pub fn dependencies(&self) -> &'static [ScriptModule] {
        match self {
            ScriptModule::Analyzer => &[
                ScriptModule::SecurityHeuristics,
                ScriptModule::TechnologyRules,
            ],
            _ => &[],
        }
    }
}

impl std::fmt::Display for ScriptModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file())
    }
}
