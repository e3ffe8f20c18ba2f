//! Bird Banding Dashboard
//!
//! Interactive dashboard over bird-banding population counts by species,
//! year and subdivision.
//!
//! - `data`: CSV loading with Polars into typed tables
//! - `options`: dropdown/checklist options and deduplication
//! - `views`: pure chart selectors (population, choropleth, heatmap, checklist)
//! - `illustration`: generated species photo with fallback
//! - `orchestrator`: input → output dependency table and recomputation turns
//! - `api_server`: axum router (feature `api`)

pub mod config;
pub mod data;
pub mod figure;
pub mod illustration;
pub mod options;
pub mod orchestrator;
pub mod regions;
pub mod views;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use config::{DashboardConfig, ImageSettings, ViewSettings};
pub use data::{DashboardData, HeatmapCount, YearlyCount};
pub use figure::{Figure, Trace};
pub use illustration::{IllustrationError, IllustrationFetcher, ImageProvider, OpenAiImageClient};
pub use options::{drop_duplicate_options, SelectOption};
pub use orchestrator::{Controls, InputId, Orchestrator, OutputId, OutputUpdate, OutputValue};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
