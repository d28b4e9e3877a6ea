pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod random;
pub mod session;

#[cfg(test)]
mod sim_test;
