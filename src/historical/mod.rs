//! Historical date handling: resolve the requested date from CLI and config,
//! validate it, and dispatch the download with or without it depending on what
//! the provider supports.

pub mod dispatcher;
pub mod resolver;
pub mod validator;

pub use dispatcher::{dispatch, Capability, DispatchPath, DispatchReport};
pub use resolver::DateRequest;
pub use validator::{validate, FormatError, FormatErrorKind, HistoricalDate};

use tracing::warn;

/// Resolve and validate the requested date.
///
/// An invalid date never aborts the run: it is logged and treated as if no date
/// had been requested, so the latest data is fetched instead.
pub fn resolve_historical_date(request: &DateRequest) -> Option<HistoricalDate> {
    match validate(request.resolve()) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("{}; ignoring it and using latest OSM data", e);
            None
        }
    }
}
