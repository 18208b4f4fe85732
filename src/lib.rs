// Library exports for the binaries and integration tests
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod validation;
