//! Population-over-time line chart

use crate::data::{DashboardData, YearlyCount};
use crate::figure::{Axis, Figure, Layout, LineTrace, Trace};
use rustc_hash::{FxHashMap, FxHashSet};

/// Yearly counts for one subdivision
#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    pub subdivision: String,
    /// `(event_year, item_count)` in table order
    pub points: Vec<(i64, u64)>,
}

fn matches(row: &YearlyCount, species: &str, regions: &FxHashSet<&str>) -> bool {
    row.species_name == species && regions.contains(row.iso_subdivision.as_str())
}

/// One series per selected subdivision that has rows for the species
///
/// Series appear in the order their subdivision is first seen in the table.
pub fn population_series(data: &DashboardData, species: &str, regions: &[String]) -> Vec<YearSeries> {
    let selected: FxHashSet<&str> = regions.iter().map(String::as_str).collect();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut series: Vec<YearSeries> = Vec::new();

    for row in data.yearly.iter().filter(|row| matches(row, species, &selected)) {
        let slot = *index.entry(row.iso_subdivision.as_str()).or_insert_with(|| {
            series.push(YearSeries {
                subdivision: row.iso_subdivision.clone(),
                points: Vec::new(),
            });
            series.len() - 1
        });
        series[slot].points.push((row.event_year, row.item_count));
    }

    series
}

/// Line chart with one trace per subdivision; zero traces when nothing matches
pub fn population_figure(data: &DashboardData, species: &str, regions: &[String]) -> Figure {
    let traces = population_series(data, species, regions)
        .into_iter()
        .map(|s| {
            let (x, y) = s.points.into_iter().unzip();
            Trace::Scatter(LineTrace {
                name: s.subdivision,
                mode: "lines".to_string(),
                x,
                y,
                visible: true,
            })
        })
        .collect();

    let mut layout = Layout::titled(format!("Population of {} Over Time", species));
    layout.xaxis = Some(Axis::titled("event_year"));
    layout.yaxis = Some(Axis::titled("item_count"));

    Figure { data: traces, layout }
}
