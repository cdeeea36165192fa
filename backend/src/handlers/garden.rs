use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::garden::catalog::ACHIEVEMENT_CATALOG;
use crate::garden::progression::MoodEvent;
use crate::garden::watering::{effective_water_level, WateringOutcome};
use crate::garden::GardenState;
use crate::models::garden::{
    AchievementView, AchievementsResponse, FlowerView, GardenView, LogMoodRequest,
    LogMoodResponse, WaterResponse,
};
use crate::services::garden as store;
use crate::AppState;

pub async fn log_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<LogMoodRequest>,
) -> AppResult<Json<LogMoodResponse>> {
    let event = MoodEvent::new(&body.mood, body.intensity)?;
    let outcome = store::log_mood(&state.db, auth_user.id, &event).await?;

    Ok(Json(LogMoodResponse {
        message: format!("Mood '{}' logged, garden updated!", event.mood),
        growth_level: outcome.growth_level,
        flowers: outcome.flowers,
        new_flower: outcome.new_flower,
        new_achievements: outcome.new_achievements,
    }))
}

pub async fn get_garden(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<GardenView>> {
    let garden_state = store::fetch(&state.db, auth_user.id).await?;
    Ok(Json(garden_view(&garden_state, Utc::now())))
}

/// The stored water level is as of the last watering; the view reports it
/// drained up to `now`.
fn garden_view(garden_state: &GardenState, now: DateTime<Utc>) -> GardenView {
    let garden = &garden_state.garden;
    GardenView {
        user_id: garden.user_id,
        overall_vibe: garden.overall_vibe.clone(),
        growth_level: garden.growth_level,
        flowers: garden.flowers,
        water_level: effective_water_level(garden, now),
        watering_streak: garden.watering_streak,
        total_waterings: garden.total_waterings,
        current_season: garden.current_season,
        achievements: garden_state.achievements.iter().copied().collect(),
        flowers_data: garden_state.flowers.iter().map(FlowerView::from).collect(),
        seasonal_theme: garden.current_season.theme(),
        last_updated: garden.last_updated,
    }
}

pub async fn water_garden(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<WaterResponse>> {
    let response = match store::water_garden(&state.db, auth_user.id).await? {
        WateringOutcome::AlreadyWatered => WaterResponse::AlreadyWatered {
            message: "Garden already watered today".into(),
            already_watered: true,
        },
        WateringOutcome::Watered {
            water_level,
            watering_streak,
            rewards,
            new_achievements,
        } => WaterResponse::Watered {
            message: "Garden watered!".into(),
            water_level,
            watering_streak,
            rewards,
            new_achievements,
        },
    };
    Ok(Json(response))
}

pub async fn list_achievements(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<AchievementsResponse>> {
    let unlocked = store::unlocked_achievements(&state.db, auth_user.id).await?;

    let achievements = ACHIEVEMENT_CATALOG
        .iter()
        .map(|info| AchievementView {
            id: info.achievement,
            name: info.name,
            description: info.description,
            icon: info.icon,
            unlocked: unlocked.contains(&info.achievement),
        })
        .collect();

    Ok(Json(AchievementsResponse { achievements }))
}

#[cfg(test)]
mod tests {
    use super::garden_view;
    use crate::garden::season::Season;
    use crate::garden::test_support::{at, empty_state, flower};
    use crate::models::garden::{Achievement, FlowerKind, LogMoodResponse, WaterResponse};

    #[test]
    fn test_garden_view_shape() {
        let mut state = empty_state();
        let mut rose = flower(&state.garden, "grateful");
        rose.growth_stage = 0.5;
        rose.bloom_count = 2;
        state.flowers = vec![rose];
        state.sync_flower_count();
        state.garden.current_season = Season::Autumn;
        state.achievements.insert(Achievement::FirstBloom);

        let json = serde_json::to_value(garden_view(&state, at(2026, 10, 17))).unwrap();
        assert_eq!(json["user_id"], state.garden.user_id.to_string());
        assert_eq!(json["overall_vibe"], "neutral");
        assert_eq!(json["flowers"], 1);
        assert_eq!(json["current_season"], "autumn");
        assert_eq!(json["achievements"][0], "first_bloom");

        let f = &json["flowers_data"][0];
        assert_eq!(f["mood_type"], "grateful");
        assert_eq!(f["flower_type"], FlowerKind::Rose.as_str());
        assert_eq!(f["growth_stage"], 0.5);
        assert_eq!(f["health"], 1.0);
        assert_eq!(f["bloom_count"], 2);
        assert_eq!(f["position_x"], 40.0);
        assert_eq!(f["position_y"], 40.0);

        let theme = &json["seasonal_theme"];
        assert_eq!(theme["colors"].as_array().unwrap().len(), 4);
        assert!(theme["background"].is_string());
    }

    #[test]
    fn test_garden_view_reports_drained_water() {
        let mut state = empty_state();
        state.garden.water_level = 80;
        state.garden.last_watered = Some(at(2026, 10, 14));

        let view = garden_view(&state, at(2026, 10, 17));
        assert_eq!(view.water_level, 50);
        // The stored level is untouched by reading.
        assert_eq!(state.garden.water_level, 80);

        let never_watered = empty_state();
        assert_eq!(garden_view(&never_watered, at(2026, 10, 17)).water_level, 100);
    }

    #[test]
    fn test_mood_response_shape() {
        let resp = LogMoodResponse {
            message: "Mood 'happy' logged, garden updated!".into(),
            growth_level: 1,
            flowers: 1,
            new_flower: Some(FlowerKind::Sunflower),
            new_achievements: vec![],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["new_flower"], "sunflower");
        assert_eq!(json["growth_level"], 1);

        let again = LogMoodResponse {
            new_flower: None,
            ..resp
        };
        let json = serde_json::to_value(&again).unwrap();
        assert!(json["new_flower"].is_null());
    }

    #[test]
    fn test_water_response_variants() {
        let already = serde_json::to_value(WaterResponse::AlreadyWatered {
            message: "Garden already watered today".into(),
            already_watered: true,
        })
        .unwrap();
        assert_eq!(already["already_watered"], true);
        assert!(already.get("water_level").is_none());

        let watered = serde_json::to_value(WaterResponse::Watered {
            message: "Garden watered!".into(),
            water_level: 100,
            watering_streak: 7,
            rewards: vec!["Rose bloomed".into()],
            new_achievements: vec![Achievement::WeekWarrior],
        })
        .unwrap();
        assert_eq!(watered["water_level"], 100);
        assert_eq!(watered["new_achievements"][0], "week_warrior");
        assert!(watered.get("already_watered").is_none());
    }
}
