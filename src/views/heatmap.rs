//! Geo-scatter "heatmap" for a single configured year

use crate::config::ViewSettings;
use crate::data::{DashboardData, HeatmapCount};
use crate::figure::{Figure, GeoLayout, GeoScatterTrace, Layout, Marker, Trace};

pub const NO_DATA_TITLE: &str = "No Data Available";

/// Largest rendered marker diameter in pixels
const MAX_MARKER_SIZE: f64 = 20.0;

// Coordinates keep their decimal point: 38.0, not 38
fn hover_text(row: &HeatmapCount) -> String {
    format!(
        "Geo: {}, Lat: {:?}, Lon: {:?}",
        row.iso_subdivision, row.lat_dd, row.lon_dd
    )
}

/// Area-mode scaling so the largest count maps to `MAX_MARKER_SIZE`
fn size_ref(max_count: u64) -> f64 {
    if max_count == 0 {
        return 1.0;
    }
    2.0 * max_count as f64 / (MAX_MARKER_SIZE * MAX_MARKER_SIZE)
}

/// One point per heatmap row for the species in the configured year
///
/// With no matching rows the result is still a `Figure`, titled
/// `NO_DATA_TITLE` and carrying no traces.
pub fn geo_scatter_heatmap(data: &DashboardData, species: &str, settings: &ViewSettings) -> Figure {
    let year = settings.heatmap_year;
    let rows: Vec<&HeatmapCount> = data
        .heatmap
        .iter()
        .filter(|row| row.species_name == species && row.event_year == year)
        .collect();

    if rows.is_empty() {
        tracing::debug!("No heatmap rows for '{}' in {}", species, year);
        let mut layout = Layout::titled(NO_DATA_TITLE);
        layout.geo = Some(GeoLayout::mercator());
        return Figure { data: Vec::new(), layout };
    }

    let sizes: Vec<u64> = rows.iter().map(|r| r.item_count).collect();
    let max_count = sizes.iter().copied().max().unwrap_or(0);

    let trace = GeoScatterTrace {
        lat: rows.iter().map(|r| r.lat_dd).collect(),
        lon: rows.iter().map(|r| r.lon_dd).collect(),
        hovertext: rows.iter().map(|r| hover_text(r)).collect(),
        marker: Marker {
            size: sizes,
            sizemode: "area".to_string(),
            sizeref: size_ref(max_count),
        },
        visible: true,
    };

    let mut layout = Layout::titled(format!("Heatmap of bird population at {}", year));
    layout.geo = Some(GeoLayout::mercator());

    Figure {
        data: vec![Trace::Scattergeo(trace)],
        layout,
    }
}
