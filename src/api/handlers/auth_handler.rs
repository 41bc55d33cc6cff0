//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::{AccessToken, TokenPair};
use crate::types::DetailResponse;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Desired username
    #[validate(length(min = 1, message = "This field is required."))]
    #[schema(example = "jdoe")]
    pub username: String,
    /// Password (minimum 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    #[schema(example = "Str0ngPass123!", min_length = 6)]
    pub password: String,
    /// Password repeated for confirmation
    #[schema(example = "Str0ngPass123!")]
    pub password_confirm: String,
    /// Optional contact email
    #[schema(example = "jdoe@example.com")]
    pub email: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "This field is required."))]
    #[schema(example = "jdoe")]
    pub username: String,
    #[validate(length(min = 1, message = "This field is required."))]
    #[schema(example = "Str0ngPass123!")]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    /// Refresh token from login
    #[validate(length(min = 1, message = "This field is required."))]
    pub refresh: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordChangeRequest {
    #[validate(length(min = 1, message = "This field is required."))]
    pub old_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub new_password: String,
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// Routes that require an authenticated user
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/password_change", post(password_change))
}

/// Register a new staff user
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth_service
        .register(
            payload.username,
            payload.password,
            payload.password_confirm,
            payload.email,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login and get an access + refresh token pair
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state
        .auth_service
        .login(payload.username, payload.password)
        .await?;

    Ok(Json(pair))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 401, description = "Malformed or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<AccessToken>> {
    let token = state.auth_service.refresh(&payload.refresh).await?;
    Ok(Json(token))
}

/// Logout acknowledgment.
///
/// Tokens are stateless; clients discard the pair. The endpoint exists so
/// the UI has a logout target.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout() -> Json<DetailResponse> {
    Json(DetailResponse::new("Logged out"))
}

/// Current identity
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.profile(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/auth/password_change",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn password_change(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<PasswordChangeRequest>,
) -> AppResult<Json<DetailResponse>> {
    state
        .auth_service
        .change_password(current_user.id, payload.old_password, payload.new_password)
        .await?;

    Ok(Json(DetailResponse::new("Password changed successfully")))
}
