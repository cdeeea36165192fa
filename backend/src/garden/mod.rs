//! Garden progression rules. Everything in here is pure: callers load a
//! [`GardenState`], apply an event, and persist the result.

pub mod achievements;
pub mod catalog;
pub mod progression;
pub mod season;
pub mod watering;

use std::collections::BTreeSet;

use crate::models::garden::{Achievement, Garden, GardenFlower};

/// The garden aggregate: the garden row, its flower records and the set of
/// unlocked achievements.
#[derive(Debug, Clone)]
pub struct GardenState {
    pub garden: Garden,
    pub flowers: Vec<GardenFlower>,
    pub achievements: BTreeSet<Achievement>,
}

impl GardenState {
    pub fn sync_flower_count(&mut self) {
        self.garden.flowers = self.flowers.len() as i32;
    }

    pub fn unlock_achievements(&mut self) -> Vec<Achievement> {
        achievements::unlock(&mut self.achievements, &self.garden, &self.flowers)
    }
}

/// Sums of decimal steps drift below 1.0 (ten 0.1 steps give
/// 0.9999999999999999); anything this close counts as full.
const UNIT_EPSILON: f64 = 1e-9;

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value > 1.0 - UNIT_EPSILON {
        1.0
    } else {
        value.max(0.0)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    use super::GardenState;
    use crate::garden::catalog::flower_for_mood;
    use crate::models::garden::{Garden, GardenFlower};

    /// Noon UTC on the given date.
    pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    pub fn garden() -> Garden {
        Garden::new(Uuid::new_v4(), at(2026, 1, 1))
    }

    pub fn flower(garden: &Garden, mood: &str) -> GardenFlower {
        GardenFlower {
            id: Uuid::new_v4(),
            garden_id: garden.id,
            mood_type: mood.to_string(),
            flower_type: flower_for_mood(mood),
            growth_stage: 0.0,
            health: 1.0,
            bloom_count: 0,
            position_x: 40.0,
            position_y: 40.0,
            created_at: garden.created_at,
            updated_at: garden.created_at,
        }
    }

    pub fn empty_state() -> GardenState {
        GardenState {
            garden: garden(),
            flowers: Vec::new(),
            achievements: BTreeSet::new(),
        }
    }
}
