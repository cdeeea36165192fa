use chrono::{DateTime, Utc};
use rand::Rng;

use crate::garden::progression::grow;
use crate::garden::season::Season;
use crate::garden::{clamp_unit, GardenState};
use crate::models::garden::{Achievement, Garden};

pub const MAX_WATER: i32 = 100;
pub const WATER_PER_WATERING: i32 = 25;
pub const WATER_DECAY_PER_DAY: i32 = 10;
pub const HEALTH_BOOST: f64 = 0.1;
pub const GROWTH_CHANCE: f64 = 0.30;
pub const GROWTH_PER_WATERING: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub enum WateringOutcome {
    AlreadyWatered,
    Watered {
        water_level: i32,
        watering_streak: i32,
        rewards: Vec<String>,
        new_achievements: Vec<Achievement>,
    },
}

/// Calendar days (UTC) between the last watering and `now`.
fn days_since_watered(garden: &Garden, now: DateTime<Utc>) -> Option<i64> {
    garden
        .last_watered
        .map(|last| (now.date_naive() - last.date_naive()).num_days())
}

/// Stored water level minus the drain accumulated since the last watering.
/// A garden that was never watered keeps its stored level.
pub fn effective_water_level(garden: &Garden, now: DateTime<Utc>) -> i32 {
    let days = days_since_watered(garden, now).unwrap_or(0).max(0);
    let drained = days.saturating_mul(WATER_DECAY_PER_DAY as i64);
    (garden.water_level as i64 - drained).clamp(0, MAX_WATER as i64) as i32
}

/// Daily watering. A second call on the same UTC date changes nothing.
pub fn water<R: Rng + ?Sized>(
    state: &mut GardenState,
    now: DateTime<Utc>,
    rng: &mut R,
) -> WateringOutcome {
    let gap = days_since_watered(&state.garden, now);
    if gap == Some(0) {
        return WateringOutcome::AlreadyWatered;
    }

    let garden = &mut state.garden;
    garden.water_level = (effective_water_level(garden, now) + WATER_PER_WATERING).min(MAX_WATER);
    garden.watering_streak = if gap == Some(1) {
        garden.watering_streak + 1
    } else {
        1
    };
    garden.total_waterings += 1;
    garden.last_watered = Some(now);
    garden.last_updated = now;
    garden.mark_season(Season::from_date(now));

    let mut rewards = Vec::new();
    for flower in state.flowers.iter_mut() {
        let name = flower.flower_type.display_name();
        if flower.health < 1.0 {
            flower.health = clamp_unit(flower.health + HEALTH_BOOST);
            rewards.push(format!("{name} received a health boost"));
        }
        if rng.gen_bool(GROWTH_CHANCE) && grow(flower, GROWTH_PER_WATERING) {
            rewards.push(format!("{name} bloomed"));
        }
        flower.updated_at = now;
    }

    let new_achievements = state.unlock_achievements();

    WateringOutcome::Watered {
        water_level: state.garden.water_level,
        watering_streak: state.garden.watering_streak,
        rewards,
        new_achievements,
    }
}
