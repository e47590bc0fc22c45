//! Keyword-based category tagging for article titles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Editorial category of an article
///
/// Serialized with the Portuguese labels shown in the community feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Saúde")]
    Health,
    #[serde(rename = "Nutrição")]
    Nutrition,
    #[serde(rename = "Comportamento")]
    Behavior,
    #[serde(rename = "Adoção")]
    Adoption,
    #[serde(rename = "Entretenimento")]
    Entertainment,
}

impl Category {
    /// Label displayed to users
    pub fn label(&self) -> &'static str {
        match self {
            Category::Health => "Saúde",
            Category::Nutrition => "Nutrição",
            Category::Behavior => "Comportamento",
            Category::Adoption => "Adoção",
            Category::Entertainment => "Entretenimento",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Checked in order; the first set with a hit wins.
const RULES: &[(Category, &[&str])] = &[
    (
        Category::Health,
        &["saúde", "veterinár", "doença", "medicina", "health", "vet"],
    ),
    (
        Category::Nutrition,
        &["alimentação", "nutrição", "ração", "dieta", "food", "nutrition"],
    ),
    (
        Category::Behavior,
        &[
            "comportamento",
            "treinamento",
            "adestramento",
            "behavior",
            "training",
        ],
    ),
    (
        Category::Adoption,
        &["adoção", "abandono", "resgate", "adoption", "rescue"],
    ),
];

/// Tag a title with a category by substring search
///
/// Titles without any known keyword, including empty ones, are
/// [`Category::Entertainment`].
pub fn categorize(title: &str) -> Category {
    let title = title.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Entertainment)
}
