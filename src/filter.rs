use crate::loader::Row;
use std::collections::BTreeSet;

/// A categorical filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Country,
    Category,
}

impl Facet {
    pub fn label(self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::Category => "Type",
        }
    }

    fn value(self, row: &Row) -> Option<&str> {
        match self {
            Self::Country => row.country.as_deref(),
            Self::Category => row.category.as_deref(),
        }
    }
}

/// Current filter selections. Empty means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub selected_countries: BTreeSet<String>,
    pub selected_categories: BTreeSet<String>,
    pub search_text: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.selected_countries.is_empty()
            && self.selected_categories.is_empty()
            && self.search_text.trim().is_empty()
    }

    pub fn selected(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Country => &self.selected_countries,
            Facet::Category => &self.selected_categories,
        }
    }

    /// Flip one facet value in or out of the selection.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let set = match facet {
            Facet::Country => &mut self.selected_countries,
            Facet::Category => &mut self.selected_categories,
        };
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected_countries.clear();
        self.selected_categories.clear();
        self.search_text.clear();
    }
}

fn facet_passes(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    selected.is_empty() || value.is_some_and(|v| selected.contains(v))
}

/// `needle` must already be trimmed and lowercased.
fn search_passes(row: &Row, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        row.category.as_deref(),
        Some(row.name.as_str()),
        row.company_name.as_deref(),
        row.role.as_deref(),
        row.country.as_deref(),
        row.short_description.as_deref(),
    ]
    .into_iter()
    .any(|field| field.unwrap_or("").to_lowercase().contains(needle))
}

fn passes(row: &Row, criteria: &FilterCriteria, needle: &str) -> bool {
    facet_passes(&criteria.selected_countries, row.country.as_deref())
        && facet_passes(&criteria.selected_categories, row.category.as_deref())
        && search_passes(row, needle)
}

/// Positions of rows matching `criteria`, in input order.
pub fn filter_indices(rows: &[Row], criteria: &FilterCriteria) -> Vec<usize> {
    let needle = criteria.search_text.trim().to_lowercase();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| passes(row, criteria, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// Rows matching `criteria`, in input order.
pub fn filter<'a>(rows: &'a [Row], criteria: &FilterCriteria) -> Vec<&'a Row> {
    filter_indices(rows, criteria)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}

/// Sorted distinct non-empty values of a facet across all rows.
pub fn facet_values(rows: &[Row], facet: Facet) -> Vec<String> {
    rows.iter()
        .filter_map(|row| facet.value(row))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
