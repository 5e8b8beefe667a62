/// Raw, unvalidated historical date input gathered from the two sources.
///
/// Built once per run from the `--osm-date` flag and the `historical_data.osm_date`
/// configuration key. Empty or whitespace-only values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRequest {
    cli_value: Option<String>,
    config_value: Option<String>,
}

impl DateRequest {
    pub fn new(cli_value: Option<String>, config_value: Option<String>) -> Self {
        DateRequest {
            cli_value,
            config_value,
        }
    }

    pub fn cli_value(&self) -> Option<&str> {
        self.cli_value.as_deref()
    }

    pub fn config_value(&self) -> Option<&str> {
        self.config_value.as_deref()
    }

    /// Merge both sources into the single candidate handed to the validator.
    ///
    /// A present command-line value wins over the configuration value.
    /// `None` means no historical date was requested.
    pub fn resolve(&self) -> Option<&str> {
        present(self.cli_value()).or_else(|| present(self.config_value()))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
