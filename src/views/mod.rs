//! View selectors
//!
//! Pure projections over the loaded tables. Each takes the current control
//! values and returns a renderable value; none of them fail. A filter that
//! matches nothing yields that view's empty state.

pub mod checklist;
pub mod choropleth;
pub mod heatmap;
pub mod population;

pub use checklist::{region_checklist_options, subdivisions_for_species};
pub use choropleth::choropleth_time_slider;
pub use heatmap::{geo_scatter_heatmap, NO_DATA_TITLE};
pub use population::{population_figure, population_series, YearSeries};
