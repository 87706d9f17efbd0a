#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use routes::{AppState, router};
