use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AppError;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 100;

/// Represents the priority of a todo.
/// Corresponds to the `todo_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(AppError::ValidationError(
                "priority: Priority must be low, medium, or high".into(),
            )),
        }
    }
}

/// Represents a todo as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier for the todo (UUID v4).
    pub id: Uuid,
    /// Owner. Set once at creation and never reassigned.
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated todo ready to be stored. Unset priority and tags get their defaults in `Todo::new`.
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<DateTime<Utc>>,
}

/// A partial update. `None` means "leave the stored value alone" for every field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Request body for `POST /todos`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: String,

    /// Kept as a string so that an empty value means "use the default".
    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    #[validate(
        length(max = 10, message = "Cannot have more than 10 tags"),
        custom = "validate_tags"
    )]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    #[validate(custom = "validate_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Request body for `PUT /todos/{id}`.
///
/// Strings that are empty after trimming count as "not supplied", while
/// `completed` is merged whenever it is present, including `false`.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: Option<bool>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    #[validate(
        length(max = 10, message = "Cannot have more than 10 tags"),
        custom = "validate_tags"
    )]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    #[validate(custom = "validate_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Query parameters for `GET /todos`.
///
/// Both values are taken as raw strings: an unparseable `completed` means no
/// filter and an unparseable or out-of-range `limit` falls back to the default.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TodoQuery {
    pub completed: Option<String>,
    pub limit: Option<String>,
}

#[allow(clippy::ptr_arg)]
fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.iter().any(|tag| tag.trim().chars().count() > 20) {
        let mut err = ValidationError::new("tag_length");
        err.message = Some("Tag cannot exceed 20 characters".into());
        return Err(err);
    }
    Ok(())
}

fn validate_due_date(due_date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *due_date < Utc::now() - Duration::hours(24) {
        let mut err = ValidationError::new("due_date_past");
        err.message = Some("Due date cannot be in the past".into());
        return Err(err);
    }
    Ok(())
}

fn trim_tags(tags: Option<Vec<String>>) -> Option<Vec<String>> {
    tags.map(|tags| tags.into_iter().map(|t| t.trim().to_string()).collect())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_priority(value: Option<String>) -> Result<Option<Priority>, AppError> {
    non_empty(value).map(|p| p.parse()).transpose()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses a path identifier, rejecting anything that is not a UUID.
pub fn parse_todo_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidId)
}

impl CreateTodoRequest {
    /// Trims, validates and converts the request into a `NewTodo`.
    pub fn into_new_todo(mut self) -> Result<NewTodo, AppError> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.tags = trim_tags(self.tags.take());
        self.validate()?;

        Ok(NewTodo {
            priority: parse_priority(self.priority)?,
            title: self.title,
            description: self.description,
            tags: self.tags,
            due_date: self.due_date,
        })
    }
}

impl UpdateTodoRequest {
    /// Trims, validates and converts the request into a `TodoPatch`.
    ///
    /// Fails with `BadRequest` when nothing would be updated.
    pub fn into_patch(mut self) -> Result<TodoPatch, AppError> {
        self.title = non_empty(self.title.take());
        self.description = non_empty(self.description.take());
        self.tags = trim_tags(self.tags.take());
        self.validate()?;

        let patch = TodoPatch {
            priority: parse_priority(self.priority)?,
            title: self.title,
            description: self.description,
            completed: self.completed,
            tags: self.tags,
            due_date: self.due_date,
        };
        if patch.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }
        Ok(patch)
    }
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.due_date.is_none()
    }
}

impl TodoQuery {
    /// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their false
    /// counterparts. Anything else means no filter.
    pub fn completed_filter(&self) -> Option<bool> {
        self.completed.as_deref().and_then(|c| parse_flag(c.trim()))
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| (1..=MAX_LIST_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

impl Todo {
    /// Creates a new `Todo` owned by `user_id`, filling in defaults and timestamps.
    pub fn new(input: NewTodo, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            description: input.description,
            completed: false,
            priority: input.priority.unwrap_or_default(),
            tags: input.tags.unwrap_or_default(),
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the supplied fields of `patch` and bumps `updated_at`.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = Utc::now().max(self.updated_at);
    }
}
