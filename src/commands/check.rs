use crate::config::Config;
use crate::data_provider::{OsmDataProvider, TARGET_DATE_PARAM};
use crate::historical::HistoricalDate;
use anyhow::Result;

/// Outcome of one integration check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: &'static str, detail: String) -> Self {
        CheckResult { name, passed: true, detail }
    }

    fn fail(name: &'static str, detail: String) -> Self {
        CheckResult { name, passed: false, detail }
    }
}

/// The `[historical_data]` section carries a parseable `osm_date`
pub fn check_configuration(config: &Config) -> CheckResult {
    const NAME: &str = "Configuration Parsing";

    let Some(osm_date) = config.historical_data.osm_date.as_deref() else {
        return CheckResult::fail(NAME, "osm_date missing from historical_data".to_string());
    };

    match osm_date.parse::<HistoricalDate>() {
        Ok(date) => CheckResult::pass(NAME, format!("Configuration parsing successful: {}", date)),
        Err(e) => CheckResult::fail(NAME, e.to_string()),
    }
}

/// The provider declares the historical date parameter
pub async fn check_provider(provider: &dyn OsmDataProvider) -> CheckResult {
    const NAME: &str = "Provider Integration";

    match provider.signature().await {
        Ok(signature) if signature.accepts(TARGET_DATE_PARAM) => CheckResult::pass(
            NAME,
            format!("'{}' has {} parameter", provider.name(), TARGET_DATE_PARAM),
        ),
        Ok(_) => CheckResult::fail(
            NAME,
            format!("'{}' missing {} parameter", provider.name(), TARGET_DATE_PARAM),
        ),
        Err(e) => CheckResult::fail(NAME, format!("Could not inspect provider: {}", e)),
    }
}

pub fn format_results(results: &[CheckResult]) -> String {
    let mut output = String::new();
    output.push_str("\nHistorical OSM Data Checks\n");
    output.push_str(&format!("{}\n", "═".repeat(50)));

    for result in results {
        let mark = if result.passed { "✓" } else { "✗" };
        output.push_str(&format!("{} {}: {}\n", mark, result.name, result.detail));
    }

    output.push_str(&format!("{}\n", "─".repeat(50)));
    for result in results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        output.push_str(&format!("{} - {}\n", status, result.name));
    }
    let passed = results.iter().filter(|r| r.passed).count();
    output.push_str(&format!("{}/{} checks passed\n", passed, results.len()));
    output
}

/// Run all checks, print them, and report whether all passed
pub async fn run(provider: &dyn OsmDataProvider, config: &Config) -> Result<bool> {
    let results = vec![check_configuration(config), check_provider(provider).await];
    print!("{}", format_results(&results));
    Ok(results.iter().all(|r| r.passed))
}
