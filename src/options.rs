//! Selectable control options
//!
//! Label/value pairs shown by the species dropdown and the region checklist.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Display/value pair for a selectable control
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption<T> {
    pub label: String,
    pub value: T,
}

impl<T> SelectOption<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl SelectOption<String> {
    /// Option whose label and value are the same string (subdivision codes)
    pub fn same(code: &str) -> Self {
        Self::new(code, code.to_string())
    }
}

/// Remove structurally equal options, keeping the first occurrence of each
///
/// Equality covers both label and value. Output order is the order in which
/// each distinct record was first seen.
pub fn drop_duplicate_options<T>(options: Vec<SelectOption<T>>) -> Vec<SelectOption<T>>
where
    T: Eq + Hash + Clone,
{
    let mut seen: FxHashSet<SelectOption<T>> = FxHashSet::default();
    let mut result = Vec::with_capacity(options.len());

    for option in options {
        if seen.insert(option.clone()) {
            result.push(option);
        }
    }

    result
}
