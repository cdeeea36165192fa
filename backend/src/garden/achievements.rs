use std::collections::BTreeSet;

use crate::garden::catalog::MOOD_FLOWERS;
use crate::garden::season::Season;
use crate::models::garden::{Achievement, Garden, GardenFlower};

pub const FIRST_FIVE_FLOWERS: i32 = 5;
pub const WEEK_WARRIOR_STREAK: i32 = 7;
pub const DEDICATED_GARDENER_WATERINGS: i32 = 50;

/// Every achievement whose predicate currently holds.
pub fn satisfied(garden: &Garden, flowers: &[GardenFlower]) -> BTreeSet<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| holds(*a, garden, flowers))
        .collect()
}

fn holds(achievement: Achievement, garden: &Garden, flowers: &[GardenFlower]) -> bool {
    match achievement {
        Achievement::FirstFive => garden.flowers >= FIRST_FIVE_FLOWERS,
        Achievement::FirstBloom => flowers.iter().any(GardenFlower::is_bloomed),
        Achievement::WeekWarrior => garden.watering_streak >= WEEK_WARRIOR_STREAK,
        Achievement::DedicatedGardener => garden.total_waterings >= DEDICATED_GARDENER_WATERINGS,
        Achievement::SeasonMaster => Season::ALL.iter().all(|s| garden.has_seen(*s)),
        Achievement::MoodExplorer => MOOD_FLOWERS
            .iter()
            .all(|(mood, _)| flowers.iter().any(|f| f.mood_type == *mood)),
    }
}

/// Unions newly satisfied achievements into `unlocked`, returning only the
/// new ones. Nothing is ever removed.
pub fn unlock(
    unlocked: &mut BTreeSet<Achievement>,
    garden: &Garden,
    flowers: &[GardenFlower],
) -> Vec<Achievement> {
    let mut fresh = Vec::new();
    for achievement in satisfied(garden, flowers) {
        if unlocked.insert(achievement) {
            fresh.push(achievement);
        }
    }
    fresh
}
