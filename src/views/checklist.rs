//! Region checklist options

use crate::data::DashboardData;
use crate::options::SelectOption;
use rustc_hash::FxHashSet;

/// Subdivisions with at least one yearly row for the species, first-seen order
pub fn subdivisions_for_species(data: &DashboardData, species: &str) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    data.yearly_for_species(species)
        .filter(|row| seen.insert(row.iso_subdivision.as_str()))
        .map(|row| row.iso_subdivision.clone())
        .collect()
}

/// Checklist options for the selected species
///
/// Always the full subdivision universe; the species-specific subset is only
/// reported in the debug log. See DESIGN.md before narrowing this.
pub fn region_checklist_options(data: &DashboardData, species: &str) -> Vec<SelectOption<String>> {
    let available = subdivisions_for_species(data, species);
    tracing::debug!(
        "Species '{}' has rows in {} of {} subdivisions",
        species,
        available.len(),
        data.subdivisions.len()
    );

    data.subdivisions
        .iter()
        .map(|code| SelectOption::same(code))
        .collect()
}
