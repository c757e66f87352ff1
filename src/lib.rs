//! Chronic disease indicator dashboard.
//!
//! The `data` module is the pure core: it loads indicator tables and
//! reshapes them into per-chart aggregates. Everything else is the egui
//! front end and its configuration.

pub mod app;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
