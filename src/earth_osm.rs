//! Provider backed by the external `earth_osm` extraction command.
//!
//! Whether the installed version accepts `--target_date` is read from its
//! `extract --help` output each time it is asked, unless the configuration pins
//! the capability.

use crate::data_provider::{
    DownloadInvocationPlan, DownloadSummary, OsmDataProvider, ProviderSignature,
    BASE_PARAMETERS, TARGET_DATE_PARAM,
};
use crate::error::{ProbeError, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Default executable name
pub const DEFAULT_COMMAND: &str = "earth_osm";

/// Subcommand that performs the extraction
const EXTRACT_SUBCOMMAND: &str = "extract";

/// How the provider decides whether it accepts a historical date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityMode {
    /// Inspect `extract --help` on every probe
    #[default]
    Auto,
    /// Assume `--target_date` is accepted
    Historical,
    /// Assume it is not
    LatestOnly,
}

impl fmt::Display for CapabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityMode::Auto => write!(f, "auto"),
            CapabilityMode::Historical => write!(f, "historical"),
            CapabilityMode::LatestOnly => write!(f, "latest-only"),
        }
    }
}

pub struct EarthOsmCommand {
    command: String,
    mode: CapabilityMode,
}

impl EarthOsmCommand {
    pub fn new(command: impl Into<String>, mode: CapabilityMode) -> Self {
        EarthOsmCommand {
            command: command.into(),
            mode,
        }
    }

    async fn introspect(&self) -> Result<ProviderSignature, ProbeError> {
        let output = Command::new(&self.command)
            .args([EXTRACT_SUBCOMMAND, "--help"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Status {
                command: self.command.clone(),
                status: output.status.to_string(),
            });
        }

        let help = String::from_utf8_lossy(&output.stdout);
        let signature = ProviderSignature::new(parse_help_flags(&help));
        debug!(
            "'{}' declares parameters: {:?}",
            self.command,
            signature.parameters()
        );
        Ok(signature)
    }
}

/// Collect the long option names from `--help` output, with dashes normalized to underscores
fn parse_help_flags(help: &str) -> Vec<String> {
    let mut flags: Vec<String> = Vec::new();
    for token in help.split_whitespace() {
        let Some(start) = token.find("--") else {
            continue;
        };
        let name: String = token[start + 2..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .map(|c| if c == '-' { '_' } else { c })
            .collect();
        if !name.is_empty() && !flags.contains(&name) {
            flags.push(name);
        }
    }
    flags
}

/// Build the `extract` argument vector for a plan.
///
/// `--target_date` is present only when the plan carries a date.
fn build_args(plan: &DownloadInvocationPlan) -> Vec<String> {
    let args = &plan.args;
    let mut argv = vec![EXTRACT_SUBCOMMAND.to_string(), args.primary_name.clone()];

    argv.push("--regions".to_string());
    argv.extend(args.regions.iter().cloned());
    argv.push("--features".to_string());
    argv.extend(args.features.iter().cloned());
    argv.push("--data_dir".to_string());
    argv.push(plan.storage_dir().display().to_string());
    argv.push("--out_dir".to_string());
    argv.push(args.out_dir.display().to_string());
    if !args.out_format.is_empty() {
        argv.push("--out_format".to_string());
        argv.extend(args.out_format.iter().cloned());
    }
    if args.out_aggregate {
        argv.push("--out_aggregate".to_string());
    }
    if args.update {
        argv.push("--update".to_string());
    }
    if args.parallel {
        argv.push("--mp".to_string());
    }
    if let Some(date) = plan.target_date {
        argv.push(format!("--{}", TARGET_DATE_PARAM));
        argv.push(date.to_string());
    }
    argv
}

#[async_trait]
impl OsmDataProvider for EarthOsmCommand {
    fn name(&self) -> &str {
        &self.command
    }

    async fn signature(&self) -> Result<ProviderSignature, ProbeError> {
        match self.mode {
            CapabilityMode::Auto => self.introspect().await,
            CapabilityMode::Historical => {
                let mut parameters = BASE_PARAMETERS.to_vec();
                parameters.push(TARGET_DATE_PARAM);
                Ok(ProviderSignature::new(parameters))
            }
            CapabilityMode::LatestOnly => {
                Ok(ProviderSignature::new(BASE_PARAMETERS.iter().copied()))
            }
        }
    }

    async fn save_osm_data(
        &self,
        plan: &DownloadInvocationPlan,
    ) -> Result<DownloadSummary, ProviderError> {
        let storage_dir = plan.storage_dir();
        tokio::fs::create_dir_all(&storage_dir)
            .await
            .map_err(|e| ProviderError::StorageDir(storage_dir.clone(), e))?;

        let argv = build_args(plan);
        info!("Running {} {}", self.command, argv.join(" "));

        let output = Command::new(&self.command)
            .args(&argv)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ProviderError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            debug!("{}: {}", self.command, line);
        }

        if !output.status.success() {
            return Err(ProviderError::Status {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(DownloadSummary {
            storage_dir,
            out_dir: plan.args.out_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_provider::DownloadArgs;
    use crate::dev::mock_provider::MockProvider;
    use crate::historical::HistoricalDate;
    use std::path::PathBuf;

    const MISSING_COMMAND: &str = "definitely-not-installed-earth-osm";

    const HELP_WITH_DATE: &str = r#"
usage: earth_osm extract [-h] --regions REGIONS [REGIONS ...]
                         [--features FEATURES [FEATURES ...]] [--update]
                         [--mp] [--data_dir DATA_DIR] [--out_dir OUT_DIR]
                         [--out_format {csv,geojson} [{csv,geojson} ...]]
                         [--out_aggregate] [--target_date TARGET_DATE]
                         primary

options:
  --target_date TARGET_DATE
                        Date (YYYY-MM-DD) of the historical snapshot
"#;

    const HELP_WITHOUT_DATE: &str = r#"
usage: earth_osm extract [-h] --regions REGIONS [REGIONS ...]
                         [--features FEATURES [FEATURES ...]] [--update]
                         [--mp] [--data_dir DATA_DIR] [--out_dir OUT_DIR]
                         [--out_format {csv,geojson} [{csv,geojson} ...]]
                         [--out_aggregate]
                         primary
"#;

    fn args() -> DownloadArgs {
        DownloadArgs {
            primary_name: "power".to_string(),
            regions: vec!["BJ".to_string(), "NG".to_string()],
            features: vec!["substation".to_string(), "line".to_string()],
            data_dir: PathBuf::from("data/osm"),
            out_dir: PathBuf::from("resources/osm"),
            out_format: vec!["csv".to_string(), "geojson".to_string()],
            out_aggregate: true,
            update: false,
            parallel: true,
        }
    }

    #[test]
    fn test_parse_help_with_target_date() {
        let sig = ProviderSignature::new(parse_help_flags(HELP_WITH_DATE));
        assert!(sig.accepts("target_date"));
        assert!(sig.accepts("regions"));
        assert!(sig.accepts("out_aggregate"));
        assert_eq!(
            sig.parameters().iter().filter(|p| *p == "target_date").count(),
            1
        );
    }

    #[test]
    fn test_parse_help_without_target_date() {
        let sig = ProviderSignature::new(parse_help_flags(HELP_WITHOUT_DATE));
        assert!(!sig.accepts("target_date"));
        assert!(sig.accepts("data_dir"));
    }

    #[test]
    fn test_parse_help_normalizes_dashes() {
        let flags = parse_help_flags("[--target-date TARGET_DATE] [--out-dir=DIR]");
        assert_eq!(flags, vec!["target_date".to_string(), "out_dir".to_string()]);
    }

    #[test]
    fn test_build_args_latest() {
        let plan = DownloadInvocationPlan::latest(args());
        let argv = build_args(&plan);
        assert_eq!(
            argv.join(" "),
            "extract power --regions BJ NG --features substation line \
             --data_dir data/osm/latest --out_dir resources/osm \
             --out_format csv geojson --out_aggregate --mp"
        );
        assert!(!argv.iter().any(|a| a == "--target_date"));
    }

    #[test]
    fn test_build_args_historical() {
        let date: HistoricalDate = "2020-01-01".parse().unwrap();
        let plan = DownloadInvocationPlan::as_of(args(), date);
        let argv = build_args(&plan);

        let pos = argv.iter().position(|a| a == "--target_date").unwrap();
        assert_eq!(argv[pos + 1], "2020-01-01");
        assert!(argv.contains(&"data/osm/historical/2020-01-01".to_string()));
    }

    #[tokio::test]
    async fn test_pinned_modes_skip_introspection() {
        let provider = EarthOsmCommand::new(MISSING_COMMAND, CapabilityMode::Historical);
        assert!(provider.signature().await.unwrap().accepts(TARGET_DATE_PARAM));

        let provider = EarthOsmCommand::new(MISSING_COMMAND, CapabilityMode::LatestOnly);
        assert!(!provider.signature().await.unwrap().accepts(TARGET_DATE_PARAM));
    }

    #[tokio::test]
    async fn test_signature_matches_mock_provider() {
        let pinned = EarthOsmCommand::new(MISSING_COMMAND, CapabilityMode::LatestOnly);
        assert_eq!(
            pinned.signature().await.unwrap(),
            MockProvider::latest_only().signature().await.unwrap()
        );

        let pinned = EarthOsmCommand::new(MISSING_COMMAND, CapabilityMode::Historical);
        assert_eq!(
            pinned.signature().await.unwrap(),
            MockProvider::historical().signature().await.unwrap()
        );
    }

    #[test]
    fn test_help_output_declares_base_parameters() {
        let sig = ProviderSignature::new(parse_help_flags(HELP_WITHOUT_DATE));
        for parameter in BASE_PARAMETERS {
            assert!(sig.accepts(parameter), "{}", parameter);
        }
    }

    #[tokio::test]
    async fn test_missing_command_probe_fails() {
        let provider = EarthOsmCommand::new(MISSING_COMMAND, CapabilityMode::Auto);
        assert!(matches!(
            provider.signature().await,
            Err(ProbeError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_command_download_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut download_args = args();
        download_args.data_dir = dir.path().to_path_buf();

        let provider = EarthOsmCommand::new(MISSING_COMMAND, CapabilityMode::Auto);
        let result = provider
            .save_osm_data(&DownloadInvocationPlan::latest(download_args))
            .await;

        assert!(matches!(result, Err(ProviderError::Spawn { .. })));
        assert!(dir.path().join("latest").is_dir());
    }
}
