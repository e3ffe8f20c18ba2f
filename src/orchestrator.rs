//! Reactive orchestrator
//!
//! A fixed dependency table maps each output to its handler and the inputs it
//! reads. A turn takes the set of changed inputs and recomputes exactly the
//! outputs that depend on one of them, in table order.

use crate::config::ViewSettings;
use crate::data::DashboardData;
use crate::figure::Figure;
use crate::illustration::IllustrationFetcher;
use crate::options::SelectOption;
use crate::views;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Controls the UI owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputId {
    Species,
    Regions,
}

impl InputId {
    pub const ALL: [InputId; 2] = [InputId::Species, InputId::Regions];
}

/// Views the orchestrator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputId {
    RegionOptions,
    PopulationOverTime,
    BirdImage,
    TimeSlider,
    Heatmap,
}

/// Current control values, as sent by the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub species: String,
    #[serde(default)]
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    Figure(Figure),
    Options(Vec<SelectOption<String>>),
    ImageSrc(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputUpdate {
    pub output: OutputId,
    pub value: OutputValue,
}

/// Everything a pure view may read
pub struct ViewContext<'a> {
    pub data: &'a DashboardData,
    pub settings: &'a ViewSettings,
}

type ViewFn = fn(&ViewContext<'_>, &Controls) -> OutputValue;

#[derive(Clone, Copy)]
enum Handler {
    View(ViewFn),
    Illustration,
}

struct Binding {
    output: OutputId,
    inputs: &'static [InputId],
    handler: Handler,
}

impl Binding {
    fn depends_on(&self, changed: &[InputId]) -> bool {
        self.inputs.iter().any(|input| changed.contains(input))
    }
}

fn region_options(ctx: &ViewContext<'_>, controls: &Controls) -> OutputValue {
    OutputValue::Options(views::region_checklist_options(ctx.data, &controls.species))
}

fn population_over_time(ctx: &ViewContext<'_>, controls: &Controls) -> OutputValue {
    OutputValue::Figure(views::population_figure(ctx.data, &controls.species, &controls.regions))
}

fn time_slider(ctx: &ViewContext<'_>, controls: &Controls) -> OutputValue {
    OutputValue::Figure(views::choropleth_time_slider(ctx.data, &controls.species, ctx.settings))
}

fn heatmap(ctx: &ViewContext<'_>, controls: &Controls) -> OutputValue {
    OutputValue::Figure(views::geo_scatter_heatmap(ctx.data, &controls.species, ctx.settings))
}

fn dependency_table() -> Vec<Binding> {
    vec![
        Binding {
            output: OutputId::RegionOptions,
            inputs: &[InputId::Species],
            handler: Handler::View(region_options),
        },
        Binding {
            output: OutputId::PopulationOverTime,
            inputs: &[InputId::Species, InputId::Regions],
            handler: Handler::View(population_over_time),
        },
        Binding {
            output: OutputId::BirdImage,
            inputs: &[InputId::Species],
            handler: Handler::Illustration,
        },
        Binding {
            output: OutputId::TimeSlider,
            inputs: &[InputId::Species],
            handler: Handler::View(time_slider),
        },
        Binding {
            output: OutputId::Heatmap,
            inputs: &[InputId::Species],
            handler: Handler::View(heatmap),
        },
    ]
}

pub struct Orchestrator {
    data: Arc<DashboardData>,
    settings: ViewSettings,
    illustrations: IllustrationFetcher,
    bindings: Vec<Binding>,
}

impl Orchestrator {
    pub fn new(data: Arc<DashboardData>, settings: ViewSettings, illustrations: IllustrationFetcher) -> Self {
        Self {
            data,
            settings,
            illustrations,
            bindings: dependency_table(),
        }
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Declared inputs of an output
    pub fn inputs_of(&self, output: OutputId) -> &'static [InputId] {
        self.bindings
            .iter()
            .find(|b| b.output == output)
            .map(|b| b.inputs)
            .unwrap_or(&[])
    }

    /// Outputs that a change to `changed` would recompute, in table order
    pub fn affected(&self, changed: &[InputId]) -> Vec<OutputId> {
        self.bindings
            .iter()
            .filter(|b| b.depends_on(changed))
            .map(|b| b.output)
            .collect()
    }

    /// Control values shown before the user touches anything
    ///
    /// The configured species if the table has it, else the first species.
    /// All subdivisions are selected.
    pub fn default_controls(&self, preferred_species: &str) -> Controls {
        let species = if self.data.has_species(preferred_species) {
            preferred_species.to_string()
        } else {
            self.data
                .species_options
                .first()
                .map(|o| o.value.clone())
                .unwrap_or_default()
        };

        Controls {
            species,
            regions: self.data.subdivisions.clone(),
        }
    }

    /// Recompute every output that depends on a changed input
    pub async fn turn(&self, changed: &[InputId], controls: &Controls) -> Vec<OutputUpdate> {
        let affected: Vec<&Binding> = self.bindings.iter().filter(|b| b.depends_on(changed)).collect();
        if affected.is_empty() {
            return Vec::new();
        }

        tracing::debug!(
            "Turn for {:?} (species '{}', {} regions): recomputing {:?}",
            changed,
            controls.species,
            controls.regions.len(),
            affected.iter().map(|b| b.output).collect::<Vec<_>>()
        );

        let views: Vec<(OutputId, ViewFn)> = affected
            .iter()
            .filter_map(|binding| match binding.handler {
                Handler::View(view) => Some((binding.output, view)),
                Handler::Illustration => None,
            })
            .collect();
        let wants_image = affected
            .iter()
            .any(|binding| matches!(binding.handler, Handler::Illustration));

        // Pure views have no dependency on each other; keep the CPU work off the async workers
        let data = Arc::clone(&self.data);
        let settings = self.settings.clone();
        let view_controls = controls.clone();
        let pending_views = tokio::task::spawn_blocking(move || {
            let ctx = ViewContext {
                data: &data,
                settings: &settings,
            };
            views
                .par_iter()
                .map(|(output, view)| (*output, view(&ctx, &view_controls)))
                .collect::<Vec<_>>()
        });

        let pending_image = async {
            if wants_image {
                Some(self.illustrations.fetch(&controls.species).await)
            } else {
                None
            }
        };

        let (view_values, image) = tokio::join!(pending_views, pending_image);
        let mut values: FxHashMap<OutputId, OutputValue> = match view_values {
            Ok(values) => values.into_iter().collect(),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::error!("View recomputation cancelled: {}", e);
                FxHashMap::default()
            }
        };
        if let Some(src) = image {
            values.insert(OutputId::BirdImage, OutputValue::ImageSrc(src));
        }

        affected
            .iter()
            .filter_map(|binding| {
                values.remove(&binding.output).map(|value| OutputUpdate {
                    output: binding.output,
                    value,
                })
            })
            .collect()
    }

    /// First turn after page load: every input counts as changed
    pub async fn initial_turn(&self, controls: &Controls) -> Vec<OutputUpdate> {
        self.turn(&InputId::ALL, controls).await
    }
}
