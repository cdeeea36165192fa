use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::garden::season::Season;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Garden {
    pub id: Uuid,
    pub user_id: Uuid,
    pub overall_vibe: String,
    pub growth_level: i64,
    pub flowers: i32,
    pub water_level: i32,
    pub watering_streak: i32,
    pub total_waterings: i32,
    pub last_watered: Option<DateTime<Utc>>,
    pub current_season: Season,
    /// Bitset of [`Season::bit`] for every season the garden was tended in.
    pub seasons_seen: i16,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Garden {
    /// A fresh garden as created on first mood log or first fetch.
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            overall_vibe: "neutral".into(),
            growth_level: 0,
            flowers: 0,
            water_level: 100,
            watering_streak: 0,
            total_waterings: 0,
            last_watered: None,
            current_season: Season::from_date(now),
            seasons_seen: 0,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn mark_season(&mut self, season: Season) {
        self.seasons_seen |= season.bit();
    }

    pub fn has_seen(&self, season: Season) -> bool {
        self.seasons_seen & season.bit() != 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GardenFlower {
    pub id: Uuid,
    pub garden_id: Uuid,
    pub mood_type: String,
    pub flower_type: FlowerKind,
    pub growth_stage: f64,
    pub health: f64,
    pub bloom_count: i32,
    pub position_x: f64,
    pub position_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GardenFlower {
    pub fn is_bloomed(&self) -> bool {
        self.growth_stage >= 1.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "flower_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FlowerKind {
    Sunflower,
    Tulip,
    Marigold,
    Lavender,
    Lotus,
    Rose,
    Daisy,
    Bluebell,
    Chamomile,
    Cactus,
    Poppy,
    Dandelion,
}

impl FlowerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunflower => "sunflower",
            Self::Tulip => "tulip",
            Self::Marigold => "marigold",
            Self::Lavender => "lavender",
            Self::Lotus => "lotus",
            Self::Rose => "rose",
            Self::Daisy => "daisy",
            Self::Bluebell => "bluebell",
            Self::Chamomile => "chamomile",
            Self::Cactus => "cactus",
            Self::Poppy => "poppy",
            Self::Dandelion => "dandelion",
        }
    }

    /// Capitalized name used in reward lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sunflower => "Sunflower",
            Self::Tulip => "Tulip",
            Self::Marigold => "Marigold",
            Self::Lavender => "Lavender",
            Self::Lotus => "Lotus",
            Self::Rose => "Rose",
            Self::Daisy => "Daisy",
            Self::Bluebell => "Bluebell",
            Self::Chamomile => "Chamomile",
            Self::Cactus => "Cactus",
            Self::Poppy => "Poppy",
            Self::Dandelion => "Dandelion",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[sqlx(type_name = "achievement_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstFive,
    FirstBloom,
    WeekWarrior,
    DedicatedGardener,
    SeasonMaster,
    MoodExplorer,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstFive,
        Achievement::FirstBloom,
        Achievement::WeekWarrior,
        Achievement::DedicatedGardener,
        Achievement::SeasonMaster,
        Achievement::MoodExplorer,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::FirstFive => "first_five",
            Self::FirstBloom => "first_bloom",
            Self::WeekWarrior => "week_warrior",
            Self::DedicatedGardener => "dedicated_gardener",
            Self::SeasonMaster => "season_master",
            Self::MoodExplorer => "mood_explorer",
        }
    }
}

// ── Requests / Responses ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LogMoodRequest {
    #[serde(default)]
    pub mood: String,
    pub intensity: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LogMoodResponse {
    pub message: String,
    pub growth_level: i64,
    pub flowers: i32,
    pub new_flower: Option<FlowerKind>,
    pub new_achievements: Vec<Achievement>,
}

#[derive(Debug, Serialize)]
pub struct FlowerView {
    pub mood_type: String,
    pub flower_type: FlowerKind,
    pub growth_stage: f64,
    pub position_x: f64,
    pub position_y: f64,
    pub health: f64,
    pub bloom_count: i32,
}

impl From<&GardenFlower> for FlowerView {
    fn from(f: &GardenFlower) -> Self {
        Self {
            mood_type: f.mood_type.clone(),
            flower_type: f.flower_type,
            growth_stage: f.growth_stage,
            position_x: f.position_x,
            position_y: f.position_y,
            health: f.health,
            bloom_count: f.bloom_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeasonalTheme {
    pub colors: Vec<&'static str>,
    pub background: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GardenView {
    pub user_id: Uuid,
    pub overall_vibe: String,
    pub growth_level: i64,
    pub flowers: i32,
    pub water_level: i32,
    pub watering_streak: i32,
    pub total_waterings: i32,
    pub current_season: Season,
    pub achievements: Vec<Achievement>,
    pub flowers_data: Vec<FlowerView>,
    pub seasonal_theme: SeasonalTheme,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WaterResponse {
    Watered {
        message: String,
        water_level: i32,
        watering_streak: i32,
        rewards: Vec<String>,
        new_achievements: Vec<Achievement>,
    },
    AlreadyWatered {
        message: String,
        already_watered: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct AchievementView {
    pub id: Achievement,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlocked: bool,
}

#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementView>,
}
