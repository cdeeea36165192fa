//! Persistence for the garden aggregate.
//!
//! Every public operation is one unit of work: it opens a transaction, loads
//! the garden row with `FOR UPDATE`, runs the pure rules from
//! [`crate::garden`], writes the result and commits. An early return drops the
//! transaction, which rolls it back, so the cached flower count and the
//! achievement set are never written without the flower rows.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::{PgConnection, PgPool};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::garden::progression::{apply_mood, MoodEvent, MoodOutcome};
use crate::garden::season::Season;
use crate::garden::watering::{water, WateringOutcome};
use crate::garden::GardenState;
use crate::models::garden::{Achievement, Garden, GardenFlower};

fn require_user(user_id: Uuid) -> AppResult<()> {
    if user_id.is_nil() {
        return Err(AppError::Validation("user_id is required".into()));
    }
    Ok(())
}

fn garden_not_found() -> AppError {
    AppError::NotFound("Garden not found".into())
}

// ── Operations ───────────────────────────────────────────────────────────────

pub async fn log_mood(db: &PgPool, user_id: Uuid, event: &MoodEvent) -> AppResult<MoodOutcome> {
    require_user(user_id)?;
    let now = Utc::now();
    let mut rng = StdRng::from_entropy();

    let mut tx = db.begin().await?;
    let mut state = load_or_create(&mut tx, user_id, now).await?;
    let outcome = apply_mood(&mut state, event, now, &mut rng);
    save(&mut tx, &state).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = %user_id,
        mood = %event.mood,
        growth_level = outcome.growth_level,
        flowers = outcome.flowers,
        new_flower = outcome.new_flower.map(|f| f.as_str()),
        "Mood logged"
    );
    log_unlocks(user_id, &outcome.new_achievements);

    Ok(outcome)
}

/// Loads the garden, creating a default one if the user has none yet, and
/// refreshes its informational season.
pub async fn fetch(db: &PgPool, user_id: Uuid) -> AppResult<GardenState> {
    require_user(user_id)?;
    let now = Utc::now();

    let mut tx = db.begin().await?;
    let mut state = load_or_create(&mut tx, user_id, now).await?;
    state.garden.current_season = Season::from_date(now);
    sqlx::query("UPDATE gardens SET current_season = $2 WHERE id = $1")
        .bind(state.garden.id)
        .bind(state.garden.current_season)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(state)
}

pub async fn water_garden(db: &PgPool, user_id: Uuid) -> AppResult<WateringOutcome> {
    require_user(user_id)?;
    let now = Utc::now();
    let mut rng = StdRng::from_entropy();

    let mut tx = db.begin().await?;
    let mut state = load(&mut tx, user_id)
        .await?
        .ok_or_else(garden_not_found)?;
    let outcome = water(&mut state, now, &mut rng);

    match &outcome {
        WateringOutcome::AlreadyWatered => {
            tracing::debug!(user_id = %user_id, "Garden already watered today");
        }
        WateringOutcome::Watered {
            water_level,
            watering_streak,
            rewards,
            new_achievements,
        } => {
            save(&mut tx, &state).await?;
            tracing::info!(
                user_id = %user_id,
                water_level,
                watering_streak,
                rewards = rewards.len(),
                "Garden watered"
            );
            log_unlocks(user_id, new_achievements);
        }
    }
    tx.commit().await?;

    Ok(outcome)
}

pub async fn unlocked_achievements(db: &PgPool, user_id: Uuid) -> AppResult<BTreeSet<Achievement>> {
    require_user(user_id)?;
    let mut conn = db.acquire().await?;
    let garden_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM gardens WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(garden_not_found)?;
    load_achievements(&mut conn, garden_id).await
}

fn log_unlocks(user_id: Uuid, unlocked: &[Achievement]) {
    for achievement in unlocked {
        tracing::info!(user_id = %user_id, achievement = achievement.id(), "Achievement unlocked");
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

async fn load(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Option<GardenState>> {
    let garden = sqlx::query_as::<_, Garden>(
        "SELECT * FROM gardens WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(garden) = garden else {
        return Ok(None);
    };

    let flowers = sqlx::query_as::<_, GardenFlower>(
        "SELECT * FROM garden_flowers WHERE garden_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(garden.id)
    .fetch_all(&mut *conn)
    .await?;
    let achievements = load_achievements(conn, garden.id).await?;

    Ok(Some(GardenState {
        garden,
        flowers,
        achievements,
    }))
}

async fn load_or_create(
    conn: &mut PgConnection,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<GardenState> {
    if let Some(state) = load(conn, user_id).await? {
        return Ok(state);
    }

    let garden = Garden::new(user_id, now);
    // A concurrent request may have created it in the meantime.
    sqlx::query(
        r#"
        INSERT INTO gardens (id, user_id, overall_vibe, growth_level, flowers, water_level,
                             watering_streak, total_waterings, current_season, seasons_seen,
                             created_at, last_updated)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(garden.id)
    .bind(garden.user_id)
    .bind(&garden.overall_vibe)
    .bind(garden.growth_level)
    .bind(garden.flowers)
    .bind(garden.water_level)
    .bind(garden.watering_streak)
    .bind(garden.total_waterings)
    .bind(garden.current_season)
    .bind(garden.seasons_seen)
    .bind(garden.created_at)
    .bind(garden.last_updated)
    .execute(&mut *conn)
    .await?;

    tracing::debug!(user_id = %user_id, "Created garden");

    load(conn, user_id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("garden vanished after insert")))
}

async fn load_achievements(
    conn: &mut PgConnection,
    garden_id: Uuid,
) -> AppResult<BTreeSet<Achievement>> {
    let rows = sqlx::query_scalar::<_, Achievement>(
        "SELECT achievement FROM garden_achievements WHERE garden_id = $1",
    )
    .bind(garden_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().collect())
}

async fn save(conn: &mut PgConnection, state: &GardenState) -> AppResult<()> {
    let g = &state.garden;
    sqlx::query(
        r#"
        UPDATE gardens SET
            overall_vibe = $2,
            growth_level = $3,
            flowers = $4,
            water_level = $5,
            watering_streak = $6,
            total_waterings = $7,
            last_watered = $8,
            current_season = $9,
            seasons_seen = $10,
            last_updated = $11
        WHERE id = $1
        "#,
    )
    .bind(g.id)
    .bind(&g.overall_vibe)
    .bind(g.growth_level)
    .bind(g.flowers)
    .bind(g.water_level)
    .bind(g.watering_streak)
    .bind(g.total_waterings)
    .bind(g.last_watered)
    .bind(g.current_season)
    .bind(g.seasons_seen)
    .bind(g.last_updated)
    .execute(&mut *conn)
    .await?;

    for f in &state.flowers {
        sqlx::query(
            r#"
            INSERT INTO garden_flowers (id, garden_id, mood_type, flower_type, growth_stage, health,
                                        bloom_count, position_x, position_y, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                growth_stage = EXCLUDED.growth_stage,
                health = EXCLUDED.health,
                bloom_count = EXCLUDED.bloom_count,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(f.id)
        .bind(f.garden_id)
        .bind(&f.mood_type)
        .bind(f.flower_type)
        .bind(f.growth_stage)
        .bind(f.health)
        .bind(f.bloom_count)
        .bind(f.position_x)
        .bind(f.position_y)
        .bind(f.created_at)
        .bind(f.updated_at)
        .execute(&mut *conn)
        .await?;
    }

    for achievement in &state.achievements {
        sqlx::query(
            r#"
            INSERT INTO garden_achievements (garden_id, achievement)
            VALUES ($1, $2)
            ON CONFLICT (garden_id, achievement) DO NOTHING
            "#,
        )
        .bind(g.id)
        .bind(*achievement)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
