pub mod app;
pub mod cancel;
pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod routing;
pub mod session;
pub mod store;
pub mod time_utils;
pub mod ui;
pub mod views;

#[cfg(test)]
#[path = "tests/support.rs"]
mod tests_support;
