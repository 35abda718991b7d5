//! Scripted tab host shared by the coordinator tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use siteprobe_protocols::{
    AnalysisError, AnalysisRecord, AnalysisType, ChannelError, InjectionError, PageRequest,
    PageResponse, ScriptModule, TabHost, TabId, TabInfo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ping {
    Ready,
    /// Never answers; the caller hits its timeout.
    Silent,
    /// No analyzer registered in the page.
    Unreachable,
}

pub struct MockHost {
    tab: Mutex<Option<TabInfo>>,
    resolutions: Mutex<VecDeque<Result<TabInfo, AnalysisError>>>,
    ping: Mutex<Ping>,
    analyses: Mutex<VecDeque<Result<PageResponse, ChannelError>>>,
    analysis_delay: Mutex<Duration>,
    injection_error: Mutex<Option<InjectionError>>,
    pub injected: Mutex<Vec<(TabId, ScriptModule)>>,
    pub pings: AtomicUsize,
    pub analysis_requests: AtomicUsize,
}

impl MockHost {
    pub fn with_tab(url: &str) -> Self {
        let host = Self::without_tab();
        host.navigate(url);
        host
    }

    pub fn without_tab() -> Self {
        Self {
            tab: Mutex::new(None),
            resolutions: Mutex::new(VecDeque::new()),
            ping: Mutex::new(Ping::Ready),
            analyses: Mutex::new(VecDeque::new()),
            analysis_delay: Mutex::new(Duration::ZERO),
            injection_error: Mutex::new(None),
            injected: Mutex::new(Vec::new()),
            pings: AtomicUsize::new(0),
            analysis_requests: AtomicUsize::new(0),
        }
    }

    /// Make tab 1 active at `url`.
    pub fn navigate(&self, url: &str) {
        *self.tab.lock() = TabInfo::from_url(1, url, "Test Page").ok();
    }

    /// Queue one-off `active_tab` results ahead of the active tab.
    pub fn queue_resolution(&self, result: Result<TabInfo, AnalysisError>) {
        self.resolutions.lock().push_back(result);
    }

    pub fn set_ping(&self, ping: Ping) {
        *self.ping.lock() = ping;
    }

    /// Queue `performAnalysis` results; once drained the page answers with a
    /// successful delegated record.
    pub fn queue_analysis(&self, result: Result<PageResponse, ChannelError>) {
        self.analyses.lock().push_back(result);
    }

    pub fn set_analysis_delay(&self, delay: Duration) {
        *self.analysis_delay.lock() = delay;
    }

    pub fn fail_injection(&self, error: InjectionError) {
        *self.injection_error.lock() = Some(error);
    }

    pub fn injected_modules(&self) -> Vec<ScriptModule> {
        self.injected.lock().iter().map(|(_, m)| *m).collect()
    }

    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn analysis_count(&self) -> usize {
        self.analysis_requests.load(Ordering::SeqCst)
    }

    fn delegated_record(&self) -> Result<PageResponse, ChannelError> {
        let tab = self.tab.lock().clone();
        match tab {
            Some(tab) => Ok(PageResponse::success(
                AnalysisRecord::for_tab(&tab, AnalysisType::ContentScript).finalize(),
            )),
            None => Err(ChannelError::NoReceiver),
        }
    }
}

#[async_trait]
impl TabHost for MockHost {
    async fn active_tab(&self) -> Result<TabInfo, AnalysisError> {
        if let Some(result) = self.resolutions.lock().pop_front() {
            return result;
        }
        self.tab
            .lock()
            .clone()
            .ok_or_else(|| AnalysisError::Resolution("no active tab".to_string()))
    }

    async fn send_to_tab(
        &self,
        _tab: TabId,
        request: PageRequest,
        timeout: Duration,
    ) -> Result<PageResponse, ChannelError> {
        let result = match request {
            PageRequest::Ping => {
                self.pings.fetch_add(1, Ordering::SeqCst);
                let ping = *self.ping.lock();
                match ping {
                    Ping::Ready => Ok(PageResponse::ready()),
                    Ping::Silent => Err(ChannelError::Timeout(timeout)),
                    Ping::Unreachable => Err(ChannelError::NoReceiver),
                }
            }
            PageRequest::PerformAnalysis => {
                self.analysis_requests.fetch_add(1, Ordering::SeqCst);
                let delay = *self.analysis_delay.lock();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let queued = self.analyses.lock().pop_front();
                queued.unwrap_or_else(|| self.delegated_record())
            }
        };

        if let Err(ChannelError::Timeout(_)) = result {
            tokio::time::sleep(timeout).await;
            return Err(ChannelError::Timeout(timeout));
        }
        result
    }

    async fn inject_script(&self, tab: TabId, module: ScriptModule) -> Result<(), InjectionError> {
        let error = self.injection_error.lock().clone();
        if let Some(error) = error {
            return Err(error);
        }
        self.injected.lock().push((tab, module));
        Ok(())
    }
}
