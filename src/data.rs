//! Data Loading and Management
//!
//! Loads the yearly-count and heatmap-count CSV tables with Polars, converts
//! them into typed records, and derives the option lists the controls need.
//! Loading happens once at startup; the resulting tables are read-only.

use crate::options::{drop_duplicate_options, SelectOption};
use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashSet;
use std::collections::HashSet;
use std::path::Path;

/// Columns required in the yearly-count table
pub const YEARLY_COLUMNS: &[&str] = &[
    "species_id",
    "species_name",
    "iso_subdivision",
    "event_year",
    "item_count",
];

/// Columns required in the heatmap-count table
pub const HEATMAP_COLUMNS: &[&str] = &[
    "species_name",
    "event_year",
    "iso_subdivision",
    "lat_dd",
    "lon_dd",
    "item_count",
];

/// One row of the yearly-count table
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyCount {
    pub species_id: String,
    pub species_name: String,
    pub iso_subdivision: String,
    pub event_year: i64,
    pub item_count: u64,
}

/// One row of the per-location heatmap table
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapCount {
    pub species_name: String,
    pub event_year: i64,
    pub iso_subdivision: String,
    pub lat_dd: f64,
    pub lon_dd: f64,
    pub item_count: u64,
}

/// All datasets the dashboard serves, plus option lists derived at load time
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    /// Species × subdivision × year counts
    pub yearly: Vec<YearlyCount>,

    /// Per-location counts (geo-scatter view only)
    pub heatmap: Vec<HeatmapCount>,

    /// Distinct subdivision codes in first-seen order
    pub subdivisions: Vec<String>,

    /// Species dropdown options (label = value = species name)
    pub species_options: Vec<SelectOption<String>>,

    /// Subdivision options (label = value = code)
    pub subdivision_options: Vec<SelectOption<String>>,
}

impl DashboardData {
    /// Load both CSV tables and derive option lists
    ///
    /// Fails if either file is missing, unreadable, lacks a required column,
    /// or holds a null/uncastable value in a required column.
    pub fn load(yearly_path: &Path, heatmap_path: &Path) -> Result<Self> {
        tracing::info!("Loading yearly counts from {}", yearly_path.display());
        let yearly_df = read_csv(yearly_path)?;
        let yearly = yearly_from_dataframe(&yearly_df)
            .with_context(|| format!("Invalid yearly counts table: {}", yearly_path.display()))?;

        tracing::info!("Loading heatmap counts from {}", heatmap_path.display());
        let heatmap_df = read_csv(heatmap_path)?;
        let heatmap = heatmap_from_dataframe(&heatmap_df)
            .with_context(|| format!("Invalid heatmap table: {}", heatmap_path.display()))?;

        let data = Self::from_records(yearly, heatmap);

        tracing::info!("  Yearly rows: {}", data.yearly.len());
        tracing::info!("  Heatmap rows: {}", data.heatmap.len());
        tracing::info!("  Species: {}", data.species_options.len());
        tracing::info!("  Subdivisions: {}", data.subdivisions.len());

        Ok(data)
    }

    /// Build from already-typed records, deriving the option lists
    pub fn from_records(yearly: Vec<YearlyCount>, heatmap: Vec<HeatmapCount>) -> Self {
        let species_options = drop_duplicate_options(
            yearly
                .iter()
                .map(|row| SelectOption::new(row.species_name.clone(), row.species_name.clone()))
                .collect(),
        );

        let subdivision_options = drop_duplicate_options(
            yearly
                .iter()
                .map(|row| SelectOption::same(&row.iso_subdivision))
                .collect(),
        );

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let subdivisions: Vec<String> = yearly
            .iter()
            .filter(|row| seen.insert(row.iso_subdivision.as_str()))
            .map(|row| row.iso_subdivision.clone())
            .collect();

        Self {
            yearly,
            heatmap,
            subdivisions,
            species_options,
            subdivision_options,
        }
    }

    /// Whether any yearly row names this species
    pub fn has_species(&self, species: &str) -> bool {
        self.yearly.iter().any(|row| row.species_name == species)
    }

    /// Yearly rows for one species
    pub fn yearly_for_species<'a>(&'a self, species: &'a str) -> impl Iterator<Item = &'a YearlyCount> + 'a {
        self.yearly.iter().filter(move |row| row.species_name == species)
    }
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(anyhow!("CSV file not found: {}", path.display()));
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))
}

/// Check that every required column is present
fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    let actual: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for &expected in columns {
        if !actual.contains(expected) {
            return Err(anyhow!(
                "Missing expected column '{}'. Available columns: {:?}",
                expected,
                actual
            ));
        }
    }

    Ok(())
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))?;

    column
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(str::to_string)
                .ok_or_else(|| anyhow!("Null value in column '{}' at row {}", name, row))
        })
        .collect()
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let source = df.column(name)?.as_materialized_series();

    // Float-typed columns only pass when every value is whole
    if source.dtype().is_float() {
        let floats = source.cast(&DataType::Float64)?;
        return floats
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
                Some(v) => Err(anyhow!("Non-integer value {} in column '{}' at row {}", v, name, row)),
                None => Err(anyhow!("Null value in column '{}' at row {}", name, row)),
            })
            .collect();
    }

    let column = source
        .strict_cast(&DataType::Int64)
        .with_context(|| format!("Column '{}' is not an integer column", name))?;

    column
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| anyhow!("Null value in column '{}' at row {}", name, row)))
        .collect()
}

fn count_column(df: &DataFrame, name: &str) -> Result<Vec<u64>> {
    int_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            u64::try_from(value)
                .map_err(|_| anyhow!("Negative count {} in column '{}' at row {}", value, name, row))
        })
        .collect()
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)?
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not a numeric column", name))?;

    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| anyhow!("Null value in column '{}' at row {}", name, row))
        })
        .collect()
}

fn yearly_from_dataframe(df: &DataFrame) -> Result<Vec<YearlyCount>> {
    require_columns(df, YEARLY_COLUMNS)?;

    let species_ids = string_column(df, "species_id")?;
    let species_names = string_column(df, "species_name")?;
    let subdivisions = string_column(df, "iso_subdivision")?;
    let years = int_column(df, "event_year")?;
    let counts = count_column(df, "item_count")?;

    let rows = species_ids
        .into_iter()
        .zip(species_names)
        .zip(subdivisions)
        .zip(years)
        .zip(counts)
        .map(
            |((((species_id, species_name), iso_subdivision), event_year), item_count)| YearlyCount {
                species_id,
                species_name,
                iso_subdivision,
                event_year,
                item_count,
            },
        )
        .collect();

    Ok(rows)
}

fn heatmap_from_dataframe(df: &DataFrame) -> Result<Vec<HeatmapCount>> {
    require_columns(df, HEATMAP_COLUMNS)?;

    let species_names = string_column(df, "species_name")?;
    let years = int_column(df, "event_year")?;
    let subdivisions = string_column(df, "iso_subdivision")?;
    let lats = float_column(df, "lat_dd")?;
    let lons = float_column(df, "lon_dd")?;
    let counts = count_column(df, "item_count")?;

    let rows = species_names
        .into_iter()
        .zip(years)
        .zip(subdivisions)
        .zip(lats)
        .zip(lons)
        .zip(counts)
        .map(
            |(((((species_name, event_year), iso_subdivision), lat_dd), lon_dd), item_count)| HeatmapCount {
                species_name,
                event_year,
                iso_subdivision,
                lat_dd,
                lon_dd,
                item_count,
            },
        )
        .collect();

    Ok(rows)
}
