//! `analyze` subcommand.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::{info, warn};

use siteprobe_analyzer::HttpReachability;
use siteprobe_channel::channel;
use siteprobe_config::Config;
use siteprobe_coordinator::{Coordinator, FileAnalysisStore};
use siteprobe_host::{Browser, HttpLoader};
use siteprobe_popup::{CyclePhase, OpenOutcome, PresentationController, RuntimeClient, export_report};

use crate::terminal::TerminalView;

/// Open `url` in a fresh browser and run one popup cycle against it.
pub(crate) async fn handle_analyze(
    config: Config,
    url: &str,
    json: bool,
    export: Option<&Path>,
    auto_inject: bool,
) -> anyhow::Result<()> {
    let mut host_config = config.host.clone();
    host_config.auto_inject |= auto_inject;

    let loader = HttpLoader::new(&host_config.user_agent, host_config.fetch_timeout())?;
    let prober = HttpReachability::new(&host_config.user_agent, config.analyzer.probe_timeout())?;

    let (runtime, inbox) = channel();
    let browser = Arc::new(Browser::new(
        host_config,
        config.analyzer.clone(),
        Arc::new(loader),
        Arc::new(prober),
        runtime.clone(),
    ));

    let mut coordinator = Coordinator::new(browser.clone(), config.coordinator.clone());
    if config.storage.enabled {
        match FileAnalysisStore::new(&config.storage.path).await {
            Ok(store) => coordinator = coordinator.with_store(Arc::new(store)),
            Err(e) => warn!(
                "Analysis store unavailable at {}: {}",
                config.storage.path.display(),
                e
            ),
        }
    }
    let coordinator = Arc::new(coordinator);
    tokio::spawn(coordinator.clone().serve(inbox));
    tokio::spawn(coordinator.clone().watch_tabs(browser.subscribe()));

    let tab = browser
        .open_tab(url)
        .await
        .with_context(|| format!("cannot open {}", url))?;
    if let Some(error) = browser.load_error(tab).await {
        warn!("Page did not load, results will be coarse: {}", error);
    }

    let view = Arc::new(TerminalView::new(json));
    let controller = PresentationController::new(
        Arc::new(RuntimeClient::new(runtime)),
        view,
        config.popup.clone(),
    );
    if controller.open().await == OpenOutcome::Cached {
        info!("Showing cached analysis");
    }
    let phase = controller.settled().await;
    coordinator.flush().await;

    match phase {
        CyclePhase::Rendered(_) => {
            if let (Some(dir), Some(record)) = (export, controller.current_record()) {
                let path = export_report(&record, dir).await?;
                eprintln!("Report written to {}", path.display());
            }
            Ok(())
        }
        CyclePhase::Failed(message) => bail!("{}", message),
        other => bail!("analysis ended in unexpected state {:?}", other),
    }
}
