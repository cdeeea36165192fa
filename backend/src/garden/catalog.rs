//! Constant lookup data for the garden: which flower a mood grows and the
//! achievement catalog shown to users.

use crate::models::garden::{Achievement, FlowerKind};

/// Species grown for moods missing from [`MOOD_FLOWERS`].
pub const DEFAULT_FLOWER: FlowerKind = FlowerKind::Dandelion;

/// Normalized mood label → flower species.
pub const MOOD_FLOWERS: &[(&str, FlowerKind)] = &[
    ("happy", FlowerKind::Sunflower),
    ("excited", FlowerKind::Tulip),
    ("energetic", FlowerKind::Marigold),
    ("calm", FlowerKind::Lavender),
    ("peaceful", FlowerKind::Lotus),
    ("grateful", FlowerKind::Rose),
    ("neutral", FlowerKind::Daisy),
    ("sad", FlowerKind::Bluebell),
    ("anxious", FlowerKind::Chamomile),
    ("angry", FlowerKind::Cactus),
    ("tired", FlowerKind::Poppy),
];

pub fn normalize_mood(mood: &str) -> String {
    mood.trim().to_lowercase()
}

/// Expects a label already passed through [`normalize_mood`].
pub fn flower_for_mood(mood: &str) -> FlowerKind {
    MOOD_FLOWERS
        .iter()
        .find(|(m, _)| *m == mood)
        .map(|(_, f)| *f)
        .unwrap_or(DEFAULT_FLOWER)
}

pub struct AchievementInfo {
    pub achievement: Achievement,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const ACHIEVEMENT_CATALOG: &[AchievementInfo] = &[
    AchievementInfo {
        achievement: Achievement::FirstFive,
        name: "Budding Gardener",
        description: "Grow 5 different flowers",
        icon: "🌱",
    },
    AchievementInfo {
        achievement: Achievement::FirstBloom,
        name: "First Bloom",
        description: "Bring a flower to full bloom",
        icon: "🌸",
    },
    AchievementInfo {
        achievement: Achievement::WeekWarrior,
        name: "Week Warrior",
        description: "Water your garden 7 days in a row",
        icon: "💧",
    },
    AchievementInfo {
        achievement: Achievement::DedicatedGardener,
        name: "Dedicated Gardener",
        description: "Water your garden 50 times",
        icon: "🏆",
    },
    AchievementInfo {
        achievement: Achievement::SeasonMaster,
        name: "Season Master",
        description: "Tend your garden in all four seasons",
        icon: "🍂",
    },
    AchievementInfo {
        achievement: Achievement::MoodExplorer,
        name: "Mood Explorer",
        description: "Grow a flower for every mood",
        icon: "🌈",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_grows_sunflower() {
        assert_eq!(flower_for_mood("happy"), FlowerKind::Sunflower);
    }

    #[test]
    fn test_unknown_mood_falls_back_to_dandelion() {
        assert_eq!(flower_for_mood("bewildered"), FlowerKind::Dandelion);
        assert_eq!(flower_for_mood(""), FlowerKind::Dandelion);
    }

    #[test]
    fn test_normalize_mood() {
        assert_eq!(normalize_mood("  Happy "), "happy");
        assert_eq!(flower_for_mood(&normalize_mood("CALM")), FlowerKind::Lavender);
    }

    #[test]
    fn test_mood_table_has_no_duplicates() {
        for (i, (a, _)) in MOOD_FLOWERS.iter().enumerate() {
            assert!(
                MOOD_FLOWERS[i + 1..].iter().all(|(b, _)| a != b),
                "duplicate mood {a}"
            );
        }
    }

    #[test]
    fn test_catalog_covers_every_achievement() {
        for a in Achievement::ALL {
            assert!(
                ACHIEVEMENT_CATALOG.iter().any(|info| info.achievement == a),
                "{} missing from catalog",
                a.id()
            );
        }
        assert_eq!(ACHIEVEMENT_CATALOG.len(), Achievement::ALL.len());
    }
}
