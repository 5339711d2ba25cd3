use crate::{
    auth::{AuthResponse, AuthenticatedUser, LoginRequest, RegisterRequest},
    error::AppError,
    models::{NewUser, UserResponse},
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Creates a new account and returns a token together with the public user.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let mut register_data = register_data.into_inner();
    register_data.normalize();
    register_data.validate()?;

    // Fast path only; the store's unique index has the final say.
    if state.users.find_by_email(&register_data.email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = state.hasher.hash(&register_data.password)?;

    let user = state
        .users
        .create(NewUser {
            email: register_data.email,
            password_hash,
            name: register_data.name,
        })
        .await?;

    let token = state.tokens.issue(user.id, &user.email)?;
    info!("Registered user {}", user.id);

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// Login user
///
/// Unknown email and wrong password produce the same 401 response.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let mut login_data = login_data.into_inner();
    login_data.normalize();
    login_data.validate()?;

    let user = match state.users.find_by_email(&login_data.email).await? {
        Some(user) => user,
        None => {
            warn!("Failed login attempt: unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !state.hasher.verify(&user.password_hash, &login_data.password) {
        warn!("Failed login attempt for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, &user.email)?;
    info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// Current user
///
/// Resolves the token subject against the credential store.
#[get("")]
pub async fn me(
    state: web::Data<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = state
        .users
        .find_by_id(auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "user": UserResponse::from(&user) })))
}
