//! # canopy-core
//!
//! Core library for canopy - plantation analytics and yield forecasting.
//!
//! This library provides:
//! - Domain types for plantations, tasks, collaborators, and yield checkpoints
//! - The analytics engine that turns a plantation collection into one snapshot
//! - Read-only plantation sources and a content-keyed snapshot cache
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! The engine is a pure function over an in-memory collection:
//! - **Input:** `&[Plantation]`, owned by the dashboard's stores (read-only here)
//! - **Aggregators:** independent passes (stage, timeline, cohort, forecast,
//!   geo, wallet, collaborators)
//! - **Output:** one [`AnalyticsSnapshot`], recomputed whenever input changes
//!
//! ## Example
//!
//! ```rust,no_run
//! use canopy_core::store::{JsonPlantationFile, PlantationSource};
//! use canopy_core::{build_analytics_snapshot, Config};
//!
//! let config = Config::load().expect("failed to load config");
//! let plantations = JsonPlantationFile::new("plantations.json")
//!     .plantations()
//!     .expect("failed to load plantations");
//!
//! let snapshot = build_analytics_snapshot(&plantations, &config.analytics);
//! println!("{} plantations, {} kg forecast", snapshot.total, snapshot.total_forecast_kg());
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{build_analytics_snapshot, build_analytics_snapshot_at, AnalyticsSnapshot};
pub use config::Config;
pub use error::{Error, Result};
pub use store::{load_plantations_from_str, JsonPlantationFile, PlantationSource};
pub use types::*;

// Public modules
pub mod activity;
pub mod analytics;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod store;
pub mod types;
