use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::entry::{
    capsule_settings, entry_mood, CreateTextEntryRequest, CreatedEntryResponse, Entry, EntryKind,
    EntryView, VoiceEntryQuery, ENTRY_COLUMNS,
};
use crate::AppState;

async fn find_entry(state: &AppState, user_id: Uuid, entry_id: Uuid) -> AppResult<Entry> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1 AND user_id = $2");
    sqlx::query_as::<_, Entry>(&sql)
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))
}

pub async fn create_text_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateTextEntryRequest>,
) -> AppResult<(StatusCode, Json<CreatedEntryResponse>)> {
    body.validate()?;
    if body.title.trim().is_empty() || body.content.trim().is_empty() {
        return Err(AppError::Validation("Title and content are required".into()));
    }
    let (is_capsule, open_date) =
        capsule_settings(body.is_capsule, body.capsule_open_date, Utc::now())?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO entries (id, user_id, title, kind, content, mood, is_capsule, capsule_open_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(body.title.trim())
    .bind(EntryKind::Text)
    .bind(&body.content)
    .bind(entry_mood(body.mood.as_deref()))
    .bind(is_capsule)
    .bind(open_date)
    .execute(&state.db)
    .await?;

    tracing::info!(user_id = %auth_user.id, entry_id = %id, is_capsule, "Text entry saved");

    Ok((
        StatusCode::CREATED,
        Json(CreatedEntryResponse {
            message: "Entry saved successfully".into(),
            id,
        }),
    ))
}

/// The audio is the raw request body; its `Content-Type` must be `audio/*`.
pub async fn create_voice_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<VoiceEntryQuery>,
    headers: HeaderMap,
    audio: Bytes,
) -> AppResult<(StatusCode, Json<CreatedEntryResponse>)> {
    query.validate()?;
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("audio/"))
        .ok_or_else(|| AppError::Validation("Content-Type must be an audio/* type".into()))?
        .to_string();

    if audio.is_empty() {
        return Err(AppError::Validation("No audio uploaded".into()));
    }
    if audio.len() > state.config.max_audio_bytes {
        return Err(AppError::Validation(format!(
            "Audio exceeds {} bytes",
            state.config.max_audio_bytes
        )));
    }

    let (is_capsule, open_date) =
        capsule_settings(query.is_capsule, query.capsule_open_date, Utc::now())?;
    let title = query
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Voice note");

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO entries (id, user_id, title, kind, audio_data, audio_mime, mood, is_capsule, capsule_open_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(title)
    .bind(EntryKind::Voice)
    .bind(audio.as_ref())
    .bind(&mime)
    .bind(entry_mood(query.mood.as_deref()))
    .bind(is_capsule)
    .bind(open_date)
    .execute(&state.db)
    .await?;

    tracing::info!(
        user_id = %auth_user.id,
        entry_id = %id,
        bytes = audio.len(),
        mime = %mime,
        "Voice entry saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedEntryResponse {
            message: "Voice note saved".into(),
            id,
        }),
    ))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<EntryView>>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = $1 ORDER BY created_at DESC"
    );
    let entries = sqlx::query_as::<_, Entry>(&sql)
        .bind(auth_user.id)
        .fetch_all(&state.db)
        .await?;

    let now = Utc::now();
    Ok(Json(entries.into_iter().map(|e| e.into_view(now)).collect()))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<EntryView>> {
    let entry = find_entry(&state, auth_user.id, entry_id).await?;
    Ok(Json(entry.into_view(Utc::now())))
}

pub async fn get_entry_audio(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<([(HeaderName, String); 1], Vec<u8>)> {
    let entry = find_entry(&state, auth_user.id, entry_id).await?;
    if entry.kind != EntryKind::Voice {
        return Err(AppError::NotFound("Entry has no audio".into()));
    }
    if entry.is_locked(Utc::now()) {
        return Err(AppError::Forbidden("Time capsule is still sealed".into()));
    }

    let audio = sqlx::query_scalar::<_, Option<Vec<u8>>>(
        "SELECT audio_data FROM entries WHERE id = $1",
    )
    .bind(entry.id)
    .fetch_one(&state.db)
    .await?
    .ok_or(AppError::NotFound("Entry has no audio".into()))?;

    let mime = entry
        .audio_mime
        .unwrap_or_else(|| "application/octet-stream".into());
    Ok(([(header::CONTENT_TYPE, mime)], audio))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Entry not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true, "id": entry_id })))
}

/// Number of entries per mood label, for the dashboard chart.
pub async fn mood_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<BTreeMap<String, i64>>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT mood, COUNT(*) FROM entries
        WHERE user_id = $1
        GROUP BY mood
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().collect()))
}
