/// Development utilities module
///
/// This module contains utilities for development and testing,
/// such as a provider that records downloads instead of running them.

pub mod log_capture;
pub mod mock_provider;
