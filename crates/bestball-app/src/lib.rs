// Library root: re-exports the app modules so integration tests can drive
// the pipelines directly.

pub mod config;
pub mod ranking;
pub mod scoring;
pub mod validate;
