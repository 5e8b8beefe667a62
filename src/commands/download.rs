use crate::commands::date_request;
use crate::config::Config;
use crate::data_provider::{DownloadArgs, OsmDataProvider};
use crate::historical::{dispatch, resolve_historical_date, DispatchPath, DispatchReport};
use anyhow::{Context, Result};

/// Command-line overrides for the `[download]` section
#[derive(Debug, Clone, Default)]
pub struct DownloadOverrides {
    pub osm_date: Option<String>,
    pub regions: Vec<String>,
    pub features: Vec<String>,
    pub out_dir: Option<std::path::PathBuf>,
}

/// Merge CLI overrides into the configured download arguments
pub fn download_args(config: &Config, overrides: &DownloadOverrides) -> DownloadArgs {
    let mut args = config.download.to_args();
    if !overrides.regions.is_empty() {
        args.regions = overrides.regions.clone();
    }
    if !overrides.features.is_empty() {
        args.features = overrides.features.clone();
    }
    if let Some(out_dir) = &overrides.out_dir {
        args.out_dir = out_dir.clone();
    }
    args
}

pub fn format_report(report: &DispatchReport) -> String {
    let mode = match report.path {
        DispatchPath::HistoricalEnabled(date) => format!("historical snapshot as of {}", date),
        DispatchPath::HistoricalUnsupported(date) => format!(
            "latest data (historical date {} not supported by provider)",
            date
        ),
        DispatchPath::NoHistoricalDate => "latest data".to_string(),
    };

    let mut output = String::new();
    output.push_str(&format!("Downloaded {}\n", mode));
    output.push_str(&format!("  Regions:  {}\n", report.plan.args.regions.join(", ")));
    output.push_str(&format!("  Features: {}\n", report.plan.args.features.join(", ")));
    output.push_str(&format!("  Raw data: {}\n", report.summary.storage_dir.display()));
    output.push_str(&format!("  Output:   {}\n", report.summary.out_dir.display()));
    output
}

pub async fn run(
    provider: &dyn OsmDataProvider,
    config: &Config,
    overrides: DownloadOverrides,
) -> Result<DispatchReport> {
    let args = download_args(config, &overrides);
    if args.regions.is_empty() {
        anyhow::bail!(
            "No regions to download. Set download.regions in the config or pass --region"
        );
    }

    let request = date_request(config, overrides.osm_date);
    let resolved = resolve_historical_date(&request);

    let report = dispatch(provider, resolved, args)
        .await
        .context("Failed to download OSM data")?;

    print!("{}", format_report(&report));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::mock_provider::MockProvider;
    use std::path::PathBuf;

    fn config_with(osm_date: Option<&str>) -> Config {
        let mut config = Config::default();
        config.download.regions = vec!["NG".to_string()];
        config.historical_data.osm_date = osm_date.map(String::from);
        config
    }

    #[test]
    fn test_download_args_overrides() {
        let config = config_with(None);
        let overrides = DownloadOverrides {
            regions: vec!["BJ".to_string(), "TG".to_string()],
            out_dir: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };

        let args = download_args(&config, &overrides);
        assert_eq!(args.regions, vec!["BJ", "TG"]);
        assert_eq!(args.features, config.download.features);
        assert_eq!(args.out_dir, PathBuf::from("/tmp/out"));
    }

    #[tokio::test]
    async fn test_run_uses_config_date() {
        let provider = MockProvider::historical();
        let config = config_with(Some("2020-01-01"));
        let report = run(&provider, &config, DownloadOverrides::default())
            .await
            .unwrap();

        assert_eq!(
            report.plan.target_date.map(|d| d.to_string()),
            Some("2020-01-01".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_cli_date_overrides_config() {
        let provider = MockProvider::historical();
        let overrides = DownloadOverrides {
            osm_date: Some("2019-05-01".to_string()),
            ..Default::default()
        };

        let report = run(&provider, &config_with(Some("2021-01-01")), overrides)
            .await
            .unwrap();

        assert_eq!(
            provider.calls()[0].target_date.map(|d| d.to_string()),
            Some("2019-05-01".to_string())
        );
        assert!(matches!(report.path, DispatchPath::HistoricalEnabled(_)));
    }

    #[tokio::test]
    async fn test_run_invalid_date_downloads_latest() {
        let provider = MockProvider::historical();
        let config = config_with(Some("2021-02-30"));
        let report = run(&provider, &config, DownloadOverrides::default())
            .await
            .unwrap();

        assert_eq!(report.path, DispatchPath::NoHistoricalDate);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_run_without_regions_is_error() {
        let provider = MockProvider::historical();
        let result = run(&provider, &Config::default(), DownloadOverrides::default()).await;

        assert!(result.is_err());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_propagates_download_failure() {
        let provider = MockProvider::latest_only().failing_downloads();
        let result = run(&provider, &config_with(None), DownloadOverrides::default()).await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("mock download failure"));
    }

    #[tokio::test]
    async fn test_format_report_fallback() {
        let provider = MockProvider::latest_only();
        let config = config_with(Some("2020-01-01"));
        let report = run(&provider, &config, DownloadOverrides::default())
            .await
            .unwrap();

        let output = format_report(&report);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "Downloaded latest data (historical date 2020-01-01 not supported by provider)"
        );
        assert_eq!(lines[1], "  Regions:  NG");
        assert_eq!(lines[3], "  Raw data: data/osm/latest");
    }
}
