// Library target shared by the binary, integration tests and criterion
// benchmarks. The terminal front end (app, event, ui) lives only in the binary.

pub mod bank;
pub mod config;
pub mod engine;
pub mod export;
pub mod session;
pub mod store;
