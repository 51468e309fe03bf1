//! Multi-scene price/volume charts for a single stock's daily history.

pub mod chart;
pub mod config;
pub mod loader;
pub mod models;
pub mod page;
pub mod scene;
pub mod utils;
