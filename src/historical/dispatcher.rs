use crate::data_provider::{
    DownloadArgs, DownloadInvocationPlan, DownloadSummary, OsmDataProvider, TARGET_DATE_PARAM,
};
use crate::error::ProviderError;
use crate::historical::HistoricalDate;
use tracing::{debug, info, warn};

/// Whether the linked provider can honor a historical date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SupportsHistoricalDate,
    LatestOnly,
}

impl Capability {
    pub fn supports_historical_date(&self) -> bool {
        matches!(self, Capability::SupportsHistoricalDate)
    }
}

/// Which of the three dispatch branches was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPath {
    /// Date requested and passed to the provider
    HistoricalEnabled(HistoricalDate),
    /// Date requested but the provider cannot take it; latest data fetched instead
    HistoricalUnsupported(HistoricalDate),
    /// No date requested; latest data fetched
    NoHistoricalDate,
}

/// Outcome of a completed dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub path: DispatchPath,
    pub plan: DownloadInvocationPlan,
    pub summary: DownloadSummary,
}

/// Ask the provider what it accepts right now.
///
/// Runs on every call. A provider that cannot describe itself is treated as latest-only.
pub async fn probe_capability(provider: &dyn OsmDataProvider) -> Capability {
    match provider.signature().await {
        Ok(signature) if signature.accepts(TARGET_DATE_PARAM) => {
            Capability::SupportsHistoricalDate
        }
        Ok(_) => Capability::LatestOnly,
        Err(e) => {
            debug!(
                "Capability probe of '{}' failed, assuming latest-only: {}",
                provider.name(),
                e
            );
            Capability::LatestOnly
        }
    }
}

/// Choose the argument set for the download. Pure; the same inputs give the same plan.
pub fn plan(
    resolved: Option<HistoricalDate>,
    capability: Capability,
    args: DownloadArgs,
) -> (DownloadInvocationPlan, DispatchPath) {
    match resolved {
        None => (
            DownloadInvocationPlan::latest(args),
            DispatchPath::NoHistoricalDate,
        ),
        Some(date) if capability.supports_historical_date() => (
            DownloadInvocationPlan::as_of(args, date),
            DispatchPath::HistoricalEnabled(date),
        ),
        Some(date) => (
            DownloadInvocationPlan::latest(args),
            DispatchPath::HistoricalUnsupported(date),
        ),
    }
}

fn report_path(path: &DispatchPath, provider: &str) {
    match path {
        DispatchPath::HistoricalEnabled(date) => {
            info!(
                "Historical download enabled: fetching OSM data as of {} via '{}'",
                date, provider
            );
        }
        DispatchPath::HistoricalUnsupported(date) => {
            warn!(
                "Historical date {} requested but '{}' does not accept '{}'; \
                 falling back to latest data",
                date, provider, TARGET_DATE_PARAM
            );
        }
        DispatchPath::NoHistoricalDate => {
            info!(
                "No historical date requested; downloading latest OSM data via '{}'",
                provider
            );
        }
    }
}

/// Probe the provider, pick a branch, log it, and run exactly one download.
///
/// Lack of historical support never fails the run. Errors from the download itself
/// are returned unchanged.
pub async fn dispatch(
    provider: &dyn OsmDataProvider,
    resolved: Option<HistoricalDate>,
    args: DownloadArgs,
) -> Result<DispatchReport, ProviderError> {
    let capability = probe_capability(provider).await;
    let (plan, path) = plan(resolved, capability, args);
    report_path(&path, provider.name());

    let summary = provider.save_osm_data(&plan).await?;
    Ok(DispatchReport {
        path,
        plan,
        summary,
    })
}
