/// Trait for the OSM download collaborator, abstracting over the external
/// extraction tool and mock implementations
use crate::error::{ProbeError, ProviderError};
use crate::historical::HistoricalDate;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Name of the parameter a provider declares when it can fetch data as of a past date
pub const TARGET_DATE_PARAM: &str = "target_date";

/// Parameters every provider version declares, with or without historical support
pub const BASE_PARAMETERS: &[&str] = &[
    "regions",
    "features",
    "data_dir",
    "out_dir",
    "out_format",
    "out_aggregate",
    "update",
    "mp",
];

/// The argument surface a provider declares at the time it is asked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSignature {
    parameters: Vec<String>,
}

impl ProviderSignature {
    pub fn new<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProviderSignature {
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    pub fn accepts(&self, parameter: &str) -> bool {
        self.parameters.iter().any(|p| p == parameter)
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

/// Everything a download needs except the historical date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArgs {
    /// Top-level OSM tag to extract (e.g. "power")
    pub primary_name: String,
    pub regions: Vec<String>,
    pub features: Vec<String>,
    /// Root of the raw-data store; the plan's cache key selects a subdirectory
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub out_format: Vec<String>,
    pub out_aggregate: bool,
    pub update: bool,
    pub parallel: bool,
}

/// Storage key separating historical snapshots from the latest data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Latest,
    AsOf(HistoricalDate),
}

impl CacheKey {
    /// `base/latest` or `base/historical/YYYY-MM-DD`
    pub fn storage_dir(&self, base: &Path) -> PathBuf {
        match self {
            CacheKey::Latest => base.join("latest"),
            CacheKey::AsOf(date) => base.join("historical").join(date.to_string()),
        }
    }
}

/// The exact argument set handed to [`OsmDataProvider::save_osm_data`].
///
/// The target date is either fully present or absent; providers only add their
/// date argument when it is `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadInvocationPlan {
    pub args: DownloadArgs,
    pub target_date: Option<HistoricalDate>,
}

impl DownloadInvocationPlan {
    pub fn latest(args: DownloadArgs) -> Self {
        DownloadInvocationPlan {
            args,
            target_date: None,
        }
    }

    pub fn as_of(args: DownloadArgs, date: HistoricalDate) -> Self {
        DownloadInvocationPlan {
            args,
            target_date: Some(date),
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        match self.target_date {
            Some(date) => CacheKey::AsOf(date),
            None => CacheKey::Latest,
        }
    }

    /// Directory the provider should use for raw data of this plan
    pub fn storage_dir(&self) -> PathBuf {
        self.cache_key().storage_dir(&self.args.data_dir)
    }
}

/// What a finished download reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub storage_dir: PathBuf,
    pub out_dir: PathBuf,
}

/// Trait for OSM data providers, implemented by the earth_osm command and MockProvider
#[async_trait]
pub trait OsmDataProvider: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Report the parameters the provider currently accepts
    async fn signature(&self) -> Result<ProviderSignature, ProbeError>;

    /// Fetch and save OSM data as described by the plan
    async fn save_osm_data(
        &self,
        plan: &DownloadInvocationPlan,
    ) -> Result<DownloadSummary, ProviderError>;
}
