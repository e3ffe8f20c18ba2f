//! Chart figure model
//!
//! Typed figures serialized in the JSON shape Plotly.js reads
//! (`{data: [...traces], layout: {...}}`). Views build these; the browser only
//! renders them.

use serde::Serialize;

/// A renderable chart: traces plus layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Figure with no traces and the given title
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout::titled(title),
        }
    }

    /// Indices of the traces currently shown
    pub fn visible_traces(&self) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, trace)| trace.is_visible())
            .map(|(i, _)| i)
            .collect()
    }

    /// Apply a slider step the way Plotly's `update` method does
    ///
    /// Sets each trace's visibility from the step's mask, replaces the title,
    /// and marks the step active. Returns false if the slider or step does
    /// not exist.
    pub fn apply_slider_step(&mut self, slider: usize, step: usize) -> bool {
        let Some(found) = self
            .layout
            .sliders
            .get(slider)
            .and_then(|s| s.steps.get(step))
            .cloned()
        else {
            return false;
        };

        let (restyle, relayout) = found.args;
        for (trace, visible) in self.data.iter_mut().zip(restyle.visible) {
            trace.set_visible(visible);
        }
        self.layout.title = Title::new(relayout.title);
        self.layout.sliders[slider].active = step;
        true
    }
}

/// Chart series, tagged by Plotly trace type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(LineTrace),
    Choropleth(ChoroplethTrace),
    Scattergeo(GeoScatterTrace),
}

impl Trace {
    pub fn is_visible(&self) -> bool {
        match self {
            Trace::Scatter(t) => t.visible,
            Trace::Choropleth(t) => t.visible,
            Trace::Scattergeo(t) => t.visible,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Trace::Scatter(t) => t.visible = visible,
            Trace::Choropleth(t) => t.visible = visible,
            Trace::Scattergeo(t) => t.visible = visible,
        }
    }
}

/// One line of an x/y line chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub name: String,
    pub mode: String,
    pub x: Vec<i64>,
    pub y: Vec<u64>,
    pub visible: bool,
}

/// One choropleth layer (one year of the time slider)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethTrace {
    pub name: String,
    pub locations: Vec<String>,
    pub z: Vec<u64>,
    pub text: Vec<String>,
    pub colorscale: String,
    pub autocolorscale: bool,
    pub showscale: bool,
    pub geojson: String,
    pub featureidkey: String,
    pub visible: bool,
}

/// Sized points on a map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoScatterTrace {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub hovertext: Vec<String>,
    pub marker: Marker,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: Vec<u64>,
    pub sizemode: String,
    pub sizeref: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoLayout>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sliders: Vec<Slider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl Layout {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Title::new(title),
            xaxis: None,
            yaxis: None,
            geo: None,
            sliders: Vec::new(),
            height: None,
            width: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

impl Axis {
    pub fn titled(text: impl Into<String>) -> Self {
        Self { title: Title::new(text) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoLayout {
    pub projection: Projection,
}

impl GeoLayout {
    pub fn mercator() -> Self {
        Self {
            projection: Projection {
                kind: "mercator".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub active: usize,
    pub currentvalue: CurrentValue,
    pub pad: Pad,
    pub steps: Vec<SliderStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentValue {
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pad {
    pub t: u32,
}

/// One slider position; `args` is `[restyle, relayout]` for Plotly's `update`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderStep {
    pub method: String,
    pub args: (VisibilityUpdate, TitleUpdate),
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityUpdate {
    pub visible: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleUpdate {
    pub title: String,
}
