use crate::assets::{Assets, Avatar, FlagAsset};
use crate::loader::Row;
use std::collections::HashSet;

/// Expand state of a single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardState {
    #[default]
    Collapsed,
    Expanded,
}

impl CardState {
    pub fn toggle(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }

    /// Label of the control, i.e. the action it performs.
    pub fn control_label(self) -> &'static str {
        match self {
            Self::Collapsed => "Expand",
            Self::Expanded => "Collapse",
        }
    }
}

/// Which loaded rows are expanded, keyed by load position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<usize>,
}

impl ExpansionState {
    pub fn state(&self, index: usize) -> CardState {
        if self.expanded.contains(&index) {
            CardState::Expanded
        } else {
            CardState::Collapsed
        }
    }

    /// Flip one row and return its new state.
    pub fn toggle(&mut self, index: usize) -> CardState {
        let next = self.state(index).toggle();
        match next {
            CardState::Expanded => self.expanded.insert(index),
            CardState::Collapsed => self.expanded.remove(&index),
        };
        next
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Company {
    Link { name: String, url: String },
    Plain(String),
}

impl Company {
    pub fn name(&self) -> &str {
        match self {
            Self::Link { name, .. } | Self::Plain(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLink {
    Active(String),
    Disabled,
}

/// Everything a card shows, resolved from one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub index: usize,
    pub avatar: Avatar,
    pub initials: String,
    pub name: String,
    pub role: String,
    pub company: Company,
    pub flag: Option<&'static FlagAsset>,
    pub category: String,
    pub short_description: String,
    /// Set only while expanded and the row has one.
    pub long_description: Option<String>,
    pub state: CardState,
    pub profile: ProfileLink,
}

impl CardView {
    pub fn build(index: usize, row: &Row, state: CardState, assets: &Assets) -> Self {
        let name = if row.name.is_empty() {
            "Unknown Name".to_string()
        } else {
            row.name.clone()
        };
        let company_name = row
            .company_name
            .clone()
            .unwrap_or_else(|| "Unknown Company".to_string());
        let company = match &row.company_link {
            Some(url) => Company::Link {
                name: company_name,
                url: url.clone(),
            },
            None => Company::Plain(company_name),
        };
        let long_description = match state {
            CardState::Expanded => row.long_description.clone(),
            CardState::Collapsed => None,
        };

        Self {
            index,
            avatar: assets.avatar(row.image_url.as_deref()),
            initials: initials(&row.name),
            name,
            role: row.role.clone().unwrap_or_else(|| "Unknown Role".to_string()),
            company,
            flag: assets.flag(row.country.as_deref()),
            category: row.category.clone().unwrap_or_else(|| "Unknown".to_string()),
            short_description: row
                .short_description
                .clone()
                .unwrap_or_else(|| "No description available.".to_string()),
            long_description,
            state,
            profile: match &row.profile_link {
                Some(link) => ProfileLink::Active(link.clone()),
                None => ProfileLink::Disabled,
            },
        }
    }
}

/// What the results area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    Empty,
    Cards(Vec<CardView>),
}

impl ResultsView {
    /// One card per matched position, in the given order.
    pub fn build(
        rows: &[Row],
        matched: &[usize],
        expansion: &ExpansionState,
        assets: &Assets,
    ) -> Self {
        if matched.is_empty() {
            return Self::Empty;
        }
        Self::Cards(
            matched
                .iter()
                .filter_map(|&i| {
                    rows.get(i)
                        .map(|row| CardView::build(i, row, expansion.state(i), assets))
                })
                .collect(),
        )
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}
