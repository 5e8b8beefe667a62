pub mod commands;
pub mod config;
pub mod data_provider;
pub mod earth_osm;
pub mod error;
pub mod historical;

#[cfg(any(test, feature = "development"))]
pub mod dev;
