use chrono::{DateTime, Utc};
use rand::Rng;
use std::ops::RangeInclusive;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::garden::catalog::{flower_for_mood, normalize_mood};
use crate::garden::season::Season;
use crate::garden::{clamp_unit, GardenState};
use crate::models::garden::{Achievement, FlowerKind, GardenFlower};

/// Growth added to an existing flower per unit of intensity.
pub const GROWTH_PER_INTENSITY: f64 = 0.1;

// Percent-of-viewport bounds that keep flowers clear of the fixed UI chrome.
pub const POSITION_X: RangeInclusive<f64> = 15.0..=75.0;
pub const POSITION_Y: RangeInclusive<f64> = 20.0..=70.0;

/// A validated mood log.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodEvent {
    pub mood: String,
    pub intensity: f64,
}

impl MoodEvent {
    pub fn new(mood: &str, intensity: Option<f64>) -> AppResult<Self> {
        let mood = normalize_mood(mood);
        if mood.is_empty() {
            return Err(AppError::Validation("mood is required".into()));
        }
        if mood.chars().count() > 50 {
            return Err(AppError::Validation(
                "mood must be at most 50 characters".into(),
            ));
        }
        let intensity = intensity.unwrap_or(1.0);
        if !intensity.is_finite() || intensity <= 0.0 {
            return Err(AppError::Validation(
                "intensity must be a positive number".into(),
            ));
        }
        Ok(Self { mood, intensity })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodOutcome {
    pub growth_level: i64,
    pub flowers: i32,
    /// Set only when this log planted a new flower.
    pub new_flower: Option<FlowerKind>,
    pub new_achievements: Vec<Achievement>,
}

/// Applies one mood log to the garden aggregate.
pub fn apply_mood<R: Rng + ?Sized>(
    state: &mut GardenState,
    event: &MoodEvent,
    now: DateTime<Utc>,
    rng: &mut R,
) -> MoodOutcome {
    let garden = &mut state.garden;
    garden.overall_vibe = event.mood.clone();
    garden.growth_level += 1;
    garden.mark_season(Season::from_date(now));
    garden.last_updated = now;

    let flower_type = flower_for_mood(&event.mood);
    let new_flower = match state
        .flowers
        .iter_mut()
        .find(|f| f.mood_type == event.mood)
    {
        Some(flower) => {
            grow(flower, event.intensity * GROWTH_PER_INTENSITY);
            flower.updated_at = now;
            None
        }
        None => {
            state.flowers.push(GardenFlower {
                id: Uuid::new_v4(),
                garden_id: garden.id,
                mood_type: event.mood.clone(),
                flower_type,
                growth_stage: 0.0,
                health: 1.0,
                bloom_count: 0,
                position_x: rng.gen_range(POSITION_X),
                position_y: rng.gen_range(POSITION_Y),
                created_at: now,
                updated_at: now,
            });
            Some(flower_type)
        }
    };

    state.sync_flower_count();
    let new_achievements = state.unlock_achievements();

    MoodOutcome {
        growth_level: state.garden.growth_level,
        flowers: state.garden.flowers,
        new_flower,
        new_achievements,
    }
}

/// Adds `delta` to the growth stage. Returns true when this call brought the
/// flower into full bloom; a flower already at 1.0 does not bloom again.
pub(crate) fn grow(flower: &mut GardenFlower, delta: f64) -> bool {
    let before = flower.growth_stage;
    flower.growth_stage = clamp_unit(before + delta);
    let bloomed = before < 1.0 && flower.growth_stage >= 1.0;
    if bloomed {
        flower.bloom_count += 1;
    }
    bloomed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::test_support::{at, empty_state};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn log(state: &mut GardenState, mood: &str, intensity: Option<f64>) -> MoodOutcome {
        let mut rng = StdRng::seed_from_u64(7);
        let event = MoodEvent::new(mood, intensity).unwrap();
        apply_mood(state, &event, at(2026, 4, 2), &mut rng)
    }

    #[test]
    fn test_first_happy_log_plants_sunflower() {
        let mut state = empty_state();
        let out = log(&mut state, "happy", None);

        assert_eq!(out.growth_level, 1);
        assert_eq!(out.flowers, 1);
        assert_eq!(out.new_flower, Some(FlowerKind::Sunflower));
        assert_eq!(state.garden.overall_vibe, "happy");

        let f = &state.flowers[0];
        assert_eq!(f.flower_type, FlowerKind::Sunflower);
        assert_eq!(f.growth_stage, 0.0);
        assert_eq!(f.health, 1.0);
        assert_eq!(f.bloom_count, 0);
        assert!(POSITION_X.contains(&f.position_x));
        assert!(POSITION_Y.contains(&f.position_y));
    }

    #[test]
    fn test_repeat_mood_grows_in_place() {
        let mut state = empty_state();
        log(&mut state, "happy", None);
        let (x, y) = (state.flowers[0].position_x, state.flowers[0].position_y);

        let out = log(&mut state, "happy", Some(2.0));
        assert_eq!(out.growth_level, 2);
        assert_eq!(out.flowers, 1);
        assert_eq!(out.new_flower, None);
        assert!((state.flowers[0].growth_stage - 0.2).abs() < 1e-9);
        // Position is fixed at planting.
        assert_eq!(state.flowers[0].position_x, x);
        assert_eq!(state.flowers[0].position_y, y);
    }

    #[test]
    fn test_mood_labels_are_normalized() {
        let mut state = empty_state();
        log(&mut state, "Happy", None);
        let out = log(&mut state, "  HAPPY ", None);
        assert_eq!(out.flowers, 1);
        assert_eq!(state.flowers[0].mood_type, "happy");
    }

    #[test]
    fn test_growth_is_clamped_for_huge_intensity() {
        let mut state = empty_state();
        log(&mut state, "calm", None);
        log(&mut state, "calm", Some(1e12));
        let f = &state.flowers[0];
        assert_eq!(f.growth_stage, 1.0);
        assert!((0.0..=1.0).contains(&f.health));
    }

    #[test]
    fn test_bloom_counts_only_the_transition() {
        let mut state = empty_state();
        log(&mut state, "calm", None);
        log(&mut state, "calm", Some(10.0));
        assert_eq!(state.flowers[0].bloom_count, 1);

        log(&mut state, "calm", Some(10.0));
        log(&mut state, "calm", None);
        assert_eq!(state.flowers[0].bloom_count, 1);
    }

    #[test]
    fn test_ten_default_logs_reach_full_bloom() {
        let mut state = empty_state();
        log(&mut state, "calm", None);
        for _ in 0..9 {
            log(&mut state, "calm", None);
        }
        assert!(state.flowers[0].growth_stage < 1.0);

        let out = log(&mut state, "calm", None);
        let f = &state.flowers[0];
        assert_eq!(f.growth_stage, 1.0);
        assert_eq!(f.bloom_count, 1);
        assert!(out.new_achievements.contains(&Achievement::FirstBloom));

        log(&mut state, "calm", None);
        assert_eq!(state.flowers[0].bloom_count, 1);
    }

    #[test]
    fn test_first_five_unlocks_on_fifth_distinct_mood() {
        let mut state = empty_state();
        for mood in ["happy", "sad", "calm", "angry"] {
            let out = log(&mut state, mood, None);
            assert!(!out.new_achievements.contains(&Achievement::FirstFive));
            assert!(!state.achievements.contains(&Achievement::FirstFive));
        }
        let out = log(&mut state, "tired", None);
        assert_eq!(out.flowers, 5);
        assert!(out.new_achievements.contains(&Achievement::FirstFive));
        assert!(state.achievements.contains(&Achievement::FirstFive));
    }

    #[test]
    fn test_flower_count_tracks_records() {
        let mut state = empty_state();
        for mood in ["happy", "happy", "sad", "whatever", "sad"] {
            let out = log(&mut state, mood, None);
            assert_eq!(out.flowers as usize, state.flowers.len());
            assert_eq!(state.garden.flowers as usize, state.flowers.len());
        }
        assert_eq!(state.flowers.len(), 3);
    }

    #[test]
    fn test_unmapped_mood_plants_dandelion() {
        let mut state = empty_state();
        let out = log(&mut state, "bewildered", None);
        assert_eq!(out.new_flower, Some(FlowerKind::Dandelion));
    }

    #[test]
    fn test_mood_log_marks_current_season() {
        let mut state = empty_state();
        log(&mut state, "happy", None);
        assert!(state.garden.has_seen(Season::Spring));
        assert!(!state.garden.has_seen(Season::Winter));
    }

    #[test]
    fn test_event_validation() {
        assert!(matches!(
            MoodEvent::new("   ", None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            MoodEvent::new("happy", Some(0.0)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            MoodEvent::new("happy", Some(-1.0)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            MoodEvent::new("happy", Some(f64::NAN)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            MoodEvent::new(&"x".repeat(51), None),
            Err(AppError::Validation(_))
        ));
        let ev = MoodEvent::new("Happy", None).unwrap();
        assert_eq!(ev.mood, "happy");
        assert_eq!(ev.intensity, 1.0);
    }
}
