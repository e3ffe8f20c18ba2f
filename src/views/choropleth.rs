//! Choropleth map with a year slider
//!
//! One layer per year present for the species. Only one layer is visible at a
//! time; each slider step shows its own layer and retitles the chart.

use crate::config::ViewSettings;
use crate::data::DashboardData;
use crate::figure::{
    ChoroplethTrace, CurrentValue, Figure, Layout, Pad, Slider, SliderStep, TitleUpdate, Trace,
    VisibilityUpdate,
};
use crate::regions::location_key;
use std::collections::BTreeSet;

pub const CHOROPLETH_TITLE: &str = "Birds population changes over time";
const COLORSCALE: &str = "Viridis";
const FEATURE_ID_KEY: &str = "properties.name";

fn step_title(year: i64) -> String {
    format!("Item count for year: {}", year)
}

fn layer(data: &DashboardData, species: &str, year: i64, settings: &ViewSettings) -> ChoroplethTrace {
    let rows: Vec<_> = data
        .yearly_for_species(species)
        .filter(|row| row.event_year == year)
        .collect();

    ChoroplethTrace {
        name: year.to_string(),
        locations: rows.iter().map(|r| location_key(&r.iso_subdivision)).collect(),
        z: rows.iter().map(|r| r.item_count).collect(),
        text: rows.iter().map(|r| r.species_name.clone()).collect(),
        colorscale: COLORSCALE.to_string(),
        autocolorscale: false,
        showscale: true,
        geojson: settings.geojson_url.clone(),
        featureidkey: FEATURE_ID_KEY.to_string(),
        visible: false,
    }
}

/// Build the time-slider choropleth for a species
///
/// A species with no rows gives a titled figure with no layers and no
/// slider steps.
pub fn choropleth_time_slider(data: &DashboardData, species: &str, settings: &ViewSettings) -> Figure {
    let years: Vec<i64> = data
        .yearly_for_species(species)
        .map(|row| row.event_year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut traces: Vec<Trace> = years
        .iter()
        .map(|&year| Trace::Choropleth(layer(data, species, year, settings)))
        .collect();

    if let Some(first) = traces.first_mut() {
        first.set_visible(true);
    }

    let steps: Vec<SliderStep> = years
        .iter()
        .enumerate()
        .map(|(i, &year)| {
            let mut visible = vec![false; years.len()];
            visible[i] = true;
            SliderStep {
                method: "update".to_string(),
                args: (VisibilityUpdate { visible }, TitleUpdate { title: step_title(year) }),
                label: year.to_string(),
            }
        })
        .collect();

    let mut layout = Layout::titled(CHOROPLETH_TITLE);
    layout.sliders = vec![Slider {
        active: 0,
        currentvalue: CurrentValue {
            prefix: "Year: ".to_string(),
        },
        pad: Pad { t: 50 },
        steps,
    }];
    layout.height = Some(600);
    layout.width = Some(1000);

    tracing::debug!("Choropleth for '{}': {} year layers", species, traces.len());

    Figure { data: traces, layout }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::YearlyCount;

    fn record(species: &str, code: &str, year: i64, count: u64) -> YearlyCount {
        YearlyCount {
            species_id: "1".to_string(),
            species_name: species.to_string(),
            iso_subdivision: code.to_string(),
            event_year: year,
            item_count: count,
        }
    }

    fn data() -> DashboardData {
        DashboardData::from_records(
            vec![
                record("Blue Goose", "US-CA", 2021, 9),
                record("Blue Goose", "US-CA", 2019, 5),
                record("Blue Goose", "US-NY", 2019, 3),
                record("Blue Goose", "US-TX", 2020, 8),
                record("Mallard", "US-CA", 2018, 40),
            ],
            Vec::new(),
        )
    }

    fn layer_of(figure: &Figure, i: usize) -> &ChoroplethTrace {
        match &figure.data[i] {
            Trace::Choropleth(t) => t,
            other => panic!("expected choropleth, got {:?}", other),
        }
    }

    #[test]
    fn test_one_step_per_distinct_year() {
        let figure = choropleth_time_slider(&data(), "Blue Goose", &ViewSettings::default());

        assert_eq!(figure.data.len(), 3);
        let labels: Vec<&str> = figure.layout.sliders[0].steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["2019", "2020", "2021"]);
    }

    #[test]
    fn test_initially_only_earliest_year_visible() {
        let figure = choropleth_time_slider(&data(), "Blue Goose", &ViewSettings::default());

        assert_eq!(figure.visible_traces(), vec![0]);
        assert_eq!(figure.layout.sliders[0].active, 0);
        assert_eq!(layer_of(&figure, 0).name, "2019");
        assert_eq!(figure.layout.title.text, CHOROPLETH_TITLE);
    }

    #[test]
    fn test_layer_contents() {
        let settings = ViewSettings::default();
        let figure = choropleth_time_slider(&data(), "Blue Goose", &settings);
        let first = layer_of(&figure, 0);

        assert_eq!(first.locations, vec!["California", "New York"]);
        assert_eq!(first.z, vec![5, 3]);
        assert_eq!(first.text, vec!["Blue Goose", "Blue Goose"]);
        assert_eq!(first.geojson, settings.geojson_url);
        assert_eq!(first.featureidkey, "properties.name");
        assert_eq!(first.colorscale, "Viridis");
    }

    #[test]
    fn test_activating_step_shows_only_that_layer() {
        let mut figure = choropleth_time_slider(&data(), "Blue Goose", &ViewSettings::default());

        for i in [2, 1, 0] {
            assert!(figure.apply_slider_step(0, i));
            assert_eq!(figure.visible_traces(), vec![i]);
            assert_eq!(figure.layout.sliders[0].active, i);
        }

        figure.apply_slider_step(0, 2);
        assert_eq!(figure.layout.title.text, "Item count for year: 2021");
    }

    #[test]
    fn test_species_without_rows() {
        let figure = choropleth_time_slider(&data(), "Dodo", &ViewSettings::default());

        assert!(figure.data.is_empty());
        assert!(figure.layout.sliders[0].steps.is_empty());
        assert!(figure.visible_traces().is_empty());
    }
}
