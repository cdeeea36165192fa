use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: TodoPriority,
    pub category: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TodoPriority>,
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update. `due_date: null` clears the due date, while an absent
/// `due_date` leaves it untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<TodoPriority>,
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateTodoRequest {
    /// The new title, trimmed. A title that is present but blank is rejected
    /// rather than stored.
    pub fn trimmed_title(&self) -> AppResult<Option<&str>> {
        match self.title.as_deref().map(str::trim) {
            Some("") => Err(AppError::Validation("Title is required".into())),
            other => Ok(other),
        }
    }
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percent of todos completed, 0 when there are none.
    pub completion_rate: f64,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub overdue: usize,
}

impl TodoStats {
    /// Priority and overdue counts only consider pending todos.
    pub fn compute(todos: &[Todo], now: DateTime<Utc>) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|t| t.completed).count();
        let pending: Vec<&Todo> = todos.iter().filter(|t| !t.completed).collect();
        let by_priority = |p: TodoPriority| pending.iter().filter(|t| t.priority == p).count();

        Self {
            total,
            completed,
            pending: pending.len(),
            completion_rate: if total > 0 {
                completed as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            high_priority: by_priority(TodoPriority::High),
            medium_priority: by_priority(TodoPriority::Medium),
            low_priority: by_priority(TodoPriority::Low),
            overdue: pending
                .iter()
                .filter(|t| t.due_date.is_some_and(|due| due < now))
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn todo(priority: TodoPriority, completed: bool, due: Option<DateTime<Utc>>) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "water the ferns".into(),
            description: String::new(),
            completed,
            priority,
            category: "general".into(),
            due_date: due,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stats_for_no_todos() {
        let stats = TodoStats::compute(&[], Utc::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn test_stats_count_only_pending_by_priority() {
        let now = Utc::now();
        let todos = vec![
            todo(TodoPriority::High, false, Some(now - Duration::days(1))),
            todo(TodoPriority::High, true, Some(now - Duration::days(1))),
            todo(TodoPriority::Medium, false, Some(now + Duration::days(1))),
            todo(TodoPriority::Low, true, None),
        ];
        let stats = TodoStats::compute(&todos, now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.completion_rate, 50.0);
        assert_eq!(stats.high_priority, 1);
        assert_eq!(stats.medium_priority, 1);
        assert_eq!(stats.low_priority, 0);
        assert_eq!(stats.overdue, 1);
    }

    #[test]
    fn test_update_distinguishes_null_from_absent_due_date() {
        let absent: UpdateTodoRequest = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(absent.due_date, None);

        let cleared: UpdateTodoRequest = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: UpdateTodoRequest =
            serde_json::from_str(r#"{"due_date": "2026-11-01T09:00:00Z"}"#).unwrap();
        assert!(matches!(set.due_date, Some(Some(_))));
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let blank: UpdateTodoRequest = serde_json::from_str(r#"{"title": "   "}"#).unwrap();
        assert!(blank.validate().is_ok());
        assert!(matches!(blank.trimmed_title(), Err(AppError::Validation(_))));

        let padded: UpdateTodoRequest = serde_json::from_str(r#"{"title": "  ferns "}"#).unwrap();
        assert_eq!(padded.trimmed_title().unwrap(), Some("ferns"));

        let absent: UpdateTodoRequest = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(absent.trimmed_title().unwrap(), None);
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(TodoPriority::default(), TodoPriority::Medium);
        let p: TodoPriority = serde_json::from_str(r#""high""#).unwrap();
        assert_eq!(p, TodoPriority::High);
    }
}
