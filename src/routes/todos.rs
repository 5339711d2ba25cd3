use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{parse_todo_id, CreateTodoRequest, TodoQuery, UpdateTodoRequest},
    repository::todo_not_found,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::debug;
use serde_json::json;

/// Retrieves the authenticated user's todos.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false`. Any other value means no filter.
/// - `limit` (optional): 1 to 100, default 50. Out-of-range values fall back to the default.
///
/// ## Responses:
/// - `200 OK`: `{ "todos": [...], "total": n, "limit": n }` where `total` counts all
///   of the user's todos regardless of filter and limit.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn list_todos(
    state: web::Data<AppState>,
    query: web::Query<TodoQuery>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let completed = query.completed_filter();
    let limit = query.limit();

    let todos = state
        .todos
        .list(auth_user.user_id, completed, limit)
        .await?;
    let total = state.todos.count_by_user(auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "todos": todos,
        "total": total,
        "limit": limit
    })))
}

/// Creates a todo owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: `{ "todo": {...} }`
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: title, description, priority, tags or due date invalid.
#[post("")]
pub async fn create_todo(
    state: web::Data<AppState>,
    todo_data: web::Json<CreateTodoRequest>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let new_todo = todo_data.into_inner().into_new_todo()?;
    let todo = state.todos.create(auth_user.user_id, new_todo).await?;
    debug!("User {} created todo {}", auth_user.user_id, todo.id);

    Ok(HttpResponse::Created().json(json!({ "todo": todo })))
}

/// Fetches one todo. A todo owned by someone else is reported exactly like a missing one.
#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&path)?;
    let todo = state
        .todos
        .get_by_id(id, auth_user.user_id)
        .await?
        .ok_or_else(todo_not_found)?;

    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}

/// Partially updates a todo.
///
/// Empty strings count as "not supplied"; `completed: false` and `tags: []`
/// are applied. A body that supplies nothing is a 400.
#[put("/{id}")]
pub async fn update_todo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    todo_data: web::Json<UpdateTodoRequest>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&path)?;
    let patch = todo_data.into_inner().into_patch()?;
    let todo = state.todos.update(id, auth_user.user_id, patch).await?;

    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}

#[delete("/{id}")]
pub async fn delete_todo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&path)?;
    state.todos.delete(id, auth_user.user_id).await?;
    debug!("User {} deleted todo {}", auth_user.user_id, id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Todo deleted successfully" })))
}
