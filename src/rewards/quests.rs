//! Next-quest recommendation
//!
//! Steers the user toward the category they have used least, avoiding the
//! category of their most recent session.

use std::collections::BTreeMap;

use serde::Serialize;

use super::category::{Category, CategoryCounts, categorize};

/// A suggested next activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestSuggestion {
    pub category: Category,
    pub title: &'static str,
    pub description: &'static str,
    pub link: &'static str,
    pub points_hint: &'static str,
}

/// One suggestion per category, in declaration order
static SUGGESTIONS: &[QuestSuggestion] = &[
    QuestSuggestion {
        category: Category::Calm,
        title: "1-minute calm reset (SOS 60)",
        description: "Do a simple 60-second reset to reduce stress load before any task.",
        link: "sos-60.html?pattern=4,4,4,4&minutes=1&tts=off&vib=off",
        points_hint: "+10-20 points",
    },
    QuestSuggestion {
        category: Category::Focus,
        title: "Focus Garden (2 minutes)",
        description: "Short focus training with a gentle timer and low-stimulation visuals.",
        link: "focus-garden.html",
        points_hint: "+20-40 points",
    },
    QuestSuggestion {
        category: Category::Sleep,
        title: "4-7-8 wind-down (2-3 minutes)",
        description: "Use 4-7-8 breathing to support sleep onset and downshift.",
        link: "4-7-8-breathing.html",
        points_hint: "+20-40 points",
    },
    QuestSuggestion {
        category: Category::School,
        title: "Dyslexia reading drill (5 minutes)",
        description: "Run one short reading drill and log it for progress + badges.",
        link: "dyslexia-reading-training.html#daily-practice",
        points_hint: "+50+ points",
    },
    QuestSuggestion {
        category: Category::Mood,
        title: "Low mood reset (2 minutes)",
        description: "Choose one gentle action to reduce overwhelm and build momentum.",
        link: "low-mood-burnout.html",
        points_hint: "+20-40 points",
    },
];

/// Static suggestion for a category
pub fn suggestion_for(category: Category) -> &'static QuestSuggestion {
    SUGGESTIONS
        .iter()
        .find(|s| s.category == category)
        .unwrap_or(&SUGGESTIONS[0])
}

/// Pick the category to recommend.
///
/// Without any usage data this is calm. Otherwise it is the least-used
/// category (ties go to declaration order), skipping the last session's
/// category when another one is available.
pub fn pick_category(tech_counts: &BTreeMap<String, u64>, last_session: Option<&str>) -> Category {
    let counts = CategoryCounts::from_tech_counts(tech_counts);
    if counts.total() == 0 {
        return Category::Calm;
    }

    let mut ranked: Vec<(Category, u64)> = counts.iter().collect();
    // Stable sort keeps declaration order for ties
    ranked.sort_by_key(|(_, count)| *count);

    let last_category = last_session.map(categorize);
    ranked
        .iter()
        .find(|(category, _)| Some(*category) != last_category)
        .or_else(|| ranked.first())
        .map(|(category, _)| *category)
        .unwrap_or(Category::Calm)
}
