//! Practice categories and technique categorisation
//!
//! Every technique id maps to exactly one of five categories using ordered
//! keyword matching.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Practice category a technique or challenge belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Calm,
    Focus,
    Sleep,
    School,
    Mood,
}

impl Category {
    /// All categories in declaration order (used for tie-breaking)
    pub const ALL: [Category; 5] = [
        Category::Calm,
        Category::Focus,
        Category::Sleep,
        Category::School,
        Category::Mood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Focus => "focus",
            Self::Sleep => "sleep",
            Self::School => "school",
            Self::Mood => "mood",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Calm => 0,
            Self::Focus => 1,
            Self::Sleep => 2,
            Self::School => 3,
            Self::Mood => 4,
        }
    }
}

/// Keyword lists in match priority. Sleep is checked before calm so ids like
/// "sleepy-calm" resolve to sleep.
const KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Sleep, &["sleep", "4-7-8", "478", "wind", "insomnia"]),
    (Category::Focus, &["focus", "garden", "study", "work", "attention"]),
    (Category::School, &["school", "class", "teacher", "lesson"]),
    (Category::Mood, &["mood", "depress", "burnout"]),
    (Category::Calm, &["box", "sos", "coherent", "breath", "calm"]),
];

/// Lowercase and trim a technique id
pub fn normalise_tech_id(tech_id: &str) -> String {
    tech_id.trim().to_lowercase()
}

/// Map a free-text technique id to its category. Unknown or empty ids are calm.
pub fn categorize(tech_id: &str) -> Category {
    let t = normalise_tech_id(tech_id);
    if t.is_empty() {
        return Category::Calm;
    }

    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| t.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Calm)
}

/// Per-category counters in declaration order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts([u64; 5]);

impl CategoryCounts {
    pub fn get(&self, category: Category) -> u64 {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: Category, value: u64) {
        self.0[category.index()] = value;
    }

    pub fn add(&mut self, category: Category, value: u64) {
        let slot = &mut self.0[category.index()];
        *slot = slot.saturating_add(value);
    }

    pub fn total(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Iterate `(category, count)` in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Sum technique usage counts into their categories
    pub fn from_tech_counts(tech_counts: &BTreeMap<String, u64>) -> Self {
        let mut counts = Self::default();
        for (id, count) in tech_counts {
            counts.add(categorize(id), *count);
        }
        counts
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for (category, count) in self.iter() {
            map.serialize_entry(category.as_str(), &count)?;
        }
        map.end()
    }
}
