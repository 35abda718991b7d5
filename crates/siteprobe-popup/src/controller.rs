//! The bounded-latency presentation controller.

use std::sync::Arc;

use parking_lot::Mutex;
use siteprobe_config::PopupConfig;
use siteprobe_protocols::{AnalysisRecord, AnalysisType};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::classify::{FailureResponse, UserMessage, classify_failure};
use crate::client::CoordinatorClient;
use crate::quick::quick_analysis;
use crate::view::View;

/// Status text shown once a cycle runs longer than the slow-notice delay.
pub const SLOW_NOTICE: &str = "Analysis is taking longer, switching to quick analysis...";

/// Observable state of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    /// Cycle with this generation is in flight.
    Running(u64),
    Rendered(AnalysisType),
    Failed(UserMessage),
}

impl CyclePhase {
    pub fn is_running(&self) -> bool {
        matches!(self, CyclePhase::Running(_))
    }
}

/// Result of [`PresentationController::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A cached analysis was rendered immediately.
    Cached,
    /// A fresh cycle with this generation was started.
    Started(u64),
}

struct Cycle {
    generation: u64,
    task: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl Cycle {
    fn abort(self) {
        self.task.abort();
        self.ticker.abort();
    }
}

#[derive(Default)]
struct CycleState {
    next_generation: u64,
    current: Option<Cycle>,
}

/// Requests analyses and keeps at most one cycle in flight.
pub struct PresentationController {
    client: Arc<dyn CoordinatorClient>,
    view: Arc<dyn View>,
    config: PopupConfig,
    state: Mutex<CycleState>,
    phase: watch::Sender<CyclePhase>,
    shown: Mutex<Option<AnalysisRecord>>,
}

impl PresentationController {
    pub fn new(
        client: Arc<dyn CoordinatorClient>,
        view: Arc<dyn View>,
        config: PopupConfig,
    ) -> Arc<Self> {
        let (phase, _) = watch::channel(CyclePhase::Idle);
        Arc::new(Self {
            client,
            view,
            config,
            state: Mutex::new(CycleState::default()),
            phase,
            shown: Mutex::new(None),
        })
    }

    /// Show the cached analysis of the active tab, or start a fresh cycle.
    pub async fn open(self: &Arc<Self>) -> OpenOutcome {
        match self.client.tab_info().await {
            Ok(tab) if !tab.domain.is_empty() => {
                match self.client.cached_analysis(&tab.domain).await {
                    Ok(Some(entry)) => {
                        info!("Using cached analysis data for {}", tab.domain);
                        self.present(entry.record);
                        return OpenOutcome::Cached;
                    }
                    Ok(None) => debug!("No cached analysis for {}", tab.domain),
                    Err(e) => warn!("Failed to get cached analysis: {}", e),
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to get tab info: {}", e),
        }
        OpenOutcome::Started(self.analyze())
    }

    /// Start a cycle, cancelling the one in flight. Returns its generation.
    pub fn analyze(self: &Arc<Self>) -> u64 {
        let mut state = self.state.lock();
        if let Some(previous) = state.current.take() {
            debug!(
                "Analysis already in progress, cancelling cycle {}",
                previous.generation
            );
            previous.abort();
        }

        state.next_generation += 1;
        let generation = state.next_generation;
        info!("Starting analysis cycle {}", generation);

        self.view.loading();
        self.phase.send_replace(CyclePhase::Running(generation));

        let ticker = tokio::spawn(self.clone().tick(Instant::now()));
        let task = tokio::spawn(self.clone().run_cycle(generation));
        state.current = Some(Cycle {
            generation,
            task,
            ticker,
        });
        generation
    }

    /// Stop the cycle in flight without starting another.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if let Some(cycle) = state.current.take() {
            info!("Cancelling analysis cycle {}", cycle.generation);
            cycle.abort();
            self.view.idle();
            self.phase.send_replace(CyclePhase::Idle);
        }
    }

    pub fn retry(self: &Arc<Self>) -> u64 {
        self.cancel();
        self.analyze()
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CyclePhase> {
        self.phase.subscribe()
    }

    /// Wait until no cycle is in flight.
    pub async fn settled(&self) -> CyclePhase {
        let mut phase = self.phase.subscribe();
        match phase.wait_for(|p| !p.is_running()).await {
            Ok(settled) => settled.clone(),
            Err(_) => self.phase(),
        }
    }

    /// The record currently on screen.
    pub fn current_record(&self) -> Option<AnalysisRecord> {
        self.shown.lock().clone()
    }

    async fn run_cycle(self: Arc<Self>, generation: u64) {
        let outcome =
            tokio::time::timeout(self.config.ui_timeout(), self.client.analyze_current_tab())
                .await;

        match outcome {
            Ok(Ok(entry)) => {
                info!(
                    "Analysis completed ({}) for {}",
                    entry.record.analysis_type, entry.record.domain
                );
                self.finish(generation, Ok(entry.record));
            }
            Ok(Err(e)) => {
                warn!("Analysis failed: {}", e);
                match classify_failure(&e) {
                    FailureResponse::QuickAnalysis => self.quick(generation).await,
                    FailureResponse::Show(message) => self.finish(generation, Err(message)),
                }
            }
            Err(_) => {
                warn!(
                    "Analysis timed out after {:?}, switching to quick analysis",
                    self.config.ui_timeout()
                );
                self.quick(generation).await;
            }
        }
    }

    async fn quick(&self, generation: u64) {
        let result = match self.client.tab_info().await {
            Ok(tab) => Ok(quick_analysis(&tab)),
            Err(e) => {
                warn!("Quick analysis failed: {}", e);
                Err(UserMessage::QuickAnalysisFailed)
            }
        };
        self.finish(generation, result);
    }

    /// End cycle `generation` and show its outcome, unless it was superseded.
    fn finish(&self, generation: u64, result: Result<AnalysisRecord, UserMessage>) {
        let mut state = self.state.lock();
        let cycle = match state.current.take() {
            Some(cycle) if cycle.generation == generation => cycle,
            other => {
                state.current = other;
                debug!("Discarding result of superseded cycle {}", generation);
                return;
            }
        };
        cycle.ticker.abort();

        match result {
            Ok(record) => self.present(record),
            Err(message) => {
                self.view.error(message);
                self.phase.send_replace(CyclePhase::Failed(message));
            }
        }
    }

    fn present(&self, record: AnalysisRecord) {
        self.view.render(&record);
        self.phase
            .send_replace(CyclePhase::Rendered(record.analysis_type));
        *self.shown.lock() = Some(record);
    }

    async fn tick(self: Arc<Self>, started: Instant) {
        let mut interval = tokio::time::interval(self.config.progress_interval());
        // The first tick completes immediately.
        interval.tick().await;

        let mut progress: u8 = 0;
        loop {
            interval.tick().await;
            progress = progress
                .saturating_add(self.config.progress_step)
                .min(self.config.progress_cap);
            let status = if started.elapsed() > self.config.slow_notice_after() {
                SLOW_NOTICE.to_string()
            } else {
                format!("Analyzing... {}%", progress)
            };
            self.view.progress(progress, &status);
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
