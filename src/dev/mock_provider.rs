/// Mock OSM data provider for development and testing
use crate::data_provider::{
    DownloadInvocationPlan, DownloadSummary, OsmDataProvider, ProviderSignature,
    BASE_PARAMETERS, TARGET_DATE_PARAM,
};
use crate::error::{ProbeError, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::info;

/// Mock provider that records download plans instead of fetching anything
pub struct MockProvider {
    historical_support: AtomicBool,
    introspectable: bool,
    fail_downloads: bool,
    probes: AtomicUsize,
    calls: Mutex<Vec<DownloadInvocationPlan>>,
}

impl MockProvider {
    fn new(historical_support: bool, introspectable: bool) -> Self {
        info!(
            "Creating MockProvider (historical support: {}, introspectable: {})",
            historical_support, introspectable
        );
        MockProvider {
            historical_support: AtomicBool::new(historical_support),
            introspectable,
            fail_downloads: false,
            probes: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider version that declares `target_date`
    pub fn historical() -> Self {
        Self::new(true, true)
    }

    /// A provider version without `target_date`
    pub fn latest_only() -> Self {
        Self::new(false, true)
    }

    /// A provider whose argument surface cannot be inspected
    pub fn without_introspection() -> Self {
        Self::new(true, false)
    }

    /// Make every download return an error
    pub fn failing_downloads(mut self) -> Self {
        self.fail_downloads = true;
        self
    }

    /// Simulate relinking against a different provider version
    pub fn set_historical_support(&self, supported: bool) {
        self.historical_support.store(supported, Ordering::SeqCst);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Plans received so far, in call order
    pub fn calls(&self) -> Vec<DownloadInvocationPlan> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl OsmDataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn signature(&self) -> Result<ProviderSignature, ProbeError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if !self.introspectable {
            return Err(ProbeError::Unsupported(self.name().to_string()));
        }

        let mut parameters: Vec<&str> = BASE_PARAMETERS.to_vec();
        if self.historical_support.load(Ordering::SeqCst) {
            parameters.push(TARGET_DATE_PARAM);
        }
        Ok(ProviderSignature::new(parameters))
    }

    async fn save_osm_data(
        &self,
        plan: &DownloadInvocationPlan,
    ) -> Result<DownloadSummary, ProviderError> {
        info!(
            "MockProvider: recording download of {:?} for {:?}",
            plan.args.features, plan.args.regions
        );
        match self.calls.lock() {
            Ok(mut calls) => calls.push(plan.clone()),
            Err(poisoned) => poisoned.into_inner().push(plan.clone()),
        }

        if self.fail_downloads {
            return Err(ProviderError::Failed("mock download failure".to_string()));
        }

        Ok(DownloadSummary {
            storage_dir: plan.storage_dir(),
            out_dir: plan.args.out_dir.clone(),
        })
    }
}
