use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::todo::{CreateTodoRequest, Todo, TodoStats, UpdateTodoRequest};
use crate::AppState;

pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Todo>>> {
    let todos = sqlx::query_as::<_, Todo>(
        "SELECT * FROM todos WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(todos))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateTodoRequest>,
) -> AppResult<(StatusCode, Json<Todo>)> {
    body.validate()?;
    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }

    let todo = sqlx::query_as::<_, Todo>(
        r#"
        INSERT INTO todos (id, user_id, title, description, priority, category, due_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.title.trim())
    .bind(body.description.as_deref().unwrap_or(""))
    .bind(body.priority.unwrap_or_default())
    .bind(body.category.as_deref().unwrap_or("general"))
    .bind(body.due_date)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(todo_id): Path<Uuid>,
    Json(body): Json<UpdateTodoRequest>,
) -> AppResult<Json<Todo>> {
    body.validate()?;
    let title = body.trimmed_title()?;

    // $8 distinguishes "leave due_date alone" from "set it (possibly to NULL)".
    let todo = sqlx::query_as::<_, Todo>(
        r#"
        UPDATE todos SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            completed = COALESCE($5, completed),
            priority = COALESCE($6, priority),
            category = COALESCE($7, category),
            due_date = CASE WHEN $8 THEN $9 ELSE due_date END,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(todo_id)
    .bind(auth_user.id)
    .bind(title)
    .bind(&body.description)
    .bind(body.completed)
    .bind(body.priority)
    .bind(&body.category)
    .bind(body.due_date.is_some())
    .bind(body.due_date.flatten())
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Todo not found".into()))?;

    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(todo_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(todo_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Todo not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true, "id": todo_id })))
}

pub async fn todo_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<TodoStats>> {
    let todos = sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE user_id = $1")
        .bind(auth_user.id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(TodoStats::compute(&todos, Utc::now())))
}
