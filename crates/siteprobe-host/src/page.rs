//! Page contexts and the script modules loaded into them.

use std::sync::Arc;

use parking_lot::Mutex;
use siteprobe_analyzer::{
    HtmlDocument, PageAnalyzer, RequestLog, SecurityHeuristics, TechnologyDetector,
};
use siteprobe_channel::{Endpoint, channel};
use siteprobe_config::AnalyzerConfig;
use siteprobe_protocols::{
    INJECTION_ORDER, InjectionError, PageRequest, PageResponse, ReachabilityProber,
    RuntimeRequest, RuntimeResponse, ScriptModule, TabId,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

/// What every page context needs to bring up an analyzer.
#[derive(Clone)]
pub(crate) struct AnalyzerEnv {
    pub config: AnalyzerConfig,
    pub prober: Arc<dyn ReachabilityProber>,
    pub runtime: Endpoint<RuntimeRequest, RuntimeResponse>,
}

struct LoadedAnalyzer {
    port: Endpoint<PageRequest, PageResponse>,
    task: JoinHandle<()>,
}

impl Drop for LoadedAnalyzer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Default)]
struct ModuleRegistry {
    security: Option<SecurityHeuristics>,
    technology: Option<TechnologyDetector>,
    analyzer: Option<LoadedAnalyzer>,
}

impl ModuleRegistry {
    fn contains(&self, module: ScriptModule) -> bool {
        match module {
            ScriptModule::SecurityHeuristics => self.security.is_some(),
            ScriptModule::TechnologyRules => self.technology.is_some(),
            ScriptModule::Analyzer => self.analyzer.is_some(),
        }
    }
}

/// One loaded document. Dropping it unloads every module and stops the
/// analyzer, failing its in-flight requests.
pub(crate) struct PageContext {
    tab: TabId,
    document: Arc<HtmlDocument>,
    location: watch::Sender<Url>,
    requests: Arc<RequestLog>,
    modules: Mutex<ModuleRegistry>,
}

impl PageContext {
    pub fn new(tab: TabId, document: HtmlDocument, url: Url) -> Self {
        let (location, _) = watch::channel(url);
        Self {
            tab,
            document: Arc::new(document),
            location,
            requests: Arc::new(RequestLog::new()),
            modules: Mutex::new(ModuleRegistry::default()),
        }
    }

    /// Same-document navigation.
    pub fn set_location(&self, url: Url) {
        self.location.send_replace(url);
    }

    pub fn record_request(&self, url: &str) {
        self.requests.record(url);
    }

    /// Port of the running analyzer, if one is loaded.
    pub fn port(&self) -> Option<Endpoint<PageRequest, PageResponse>> {
        self.modules
            .lock()
            .analyzer
            .as_ref()
            .map(|loaded| loaded.port.clone())
    }

    pub fn loaded_modules(&self) -> Vec<ScriptModule> {
        let modules = self.modules.lock();
        INJECTION_ORDER
            .into_iter()
            .filter(|m| modules.contains(*m))
            .collect()
    }

    /// Evaluate `module` in this page.
    ///
    /// Helpers are idempotent. Loading the analyzer again starts a fresh
    /// instance and stops the previous one.
    pub fn inject(&self, module: ScriptModule, env: &AnalyzerEnv) -> Result<(), InjectionError> {
        let mut modules = self.modules.lock();
        if let Some(missing) = module
            .dependencies()
            .iter()
            .copied()
            .find(|dep| !modules.contains(*dep))
        {
            return Err(InjectionError::MissingDependency { module, missing });
        }

        match module {
            ScriptModule::SecurityHeuristics => {
                modules.security = Some(SecurityHeuristics::new(env.config.inline_script_threshold));
            }
            ScriptModule::TechnologyRules => {
                modules.technology = Some(TechnologyDetector::new());
            }
            ScriptModule::Analyzer => {
                let (Some(security), Some(technology)) =
                    (modules.security.clone(), modules.technology.clone())
                else {
                    return Err(InjectionError::Failed(format!(
                        "{} loaded without its helpers",
                        module
                    )));
                };
                let analyzer = Arc::new(PageAnalyzer::new(
                    self.document.clone(),
                    technology,
                    security,
                    self.requests.clone(),
                    env.prober.clone(),
                    self.location.subscribe(),
                    env.config.clone(),
                ));
                let (port, inbox) = channel();
                let task = tokio::spawn(analyzer.clone().serve(inbox));
                if modules
                    .analyzer
                    .replace(LoadedAnalyzer { port, task })
                    .is_some()
                {
                    debug!("Replaced analyzer in tab {}", self.tab);
                }
                analyzer.announce(&env.runtime.with_origin(self.tab));
            }
        }
        debug!("Loaded {} into tab {}", module, self.tab);
        Ok(())
    }
}
