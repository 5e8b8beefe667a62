pub mod check;
pub mod download;

use crate::config::Config;
use crate::historical::DateRequest;

/// Build the date request from the `--osm-date` flag and `historical_data.osm_date`
///
/// The flag takes precedence; resolution itself happens in [`DateRequest::resolve`].
pub fn date_request(config: &Config, cli_date: Option<String>) -> DateRequest {
    DateRequest::new(cli_date, config.historical_data.osm_date.clone())
}
