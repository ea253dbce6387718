pub mod agent;
pub mod api;
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod tools;
pub mod ui;
