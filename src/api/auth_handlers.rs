use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{AuthUser, Session, UserProfile};
use crate::error::AppError;

use super::responses::*;
use super::state::AppState;

/// Create an account and sign in
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = Session),
        (status = 400, description = "Invalid email or weak password", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let session = state
        .auth
        .signup(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Session),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.auth.login(&request.email, &request.password).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> StatusCode {
    state.auth.logout(&user.token);
    StatusCode::NO_CONTENT
}

/// Profile of the signed-in user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current profile", body = UserProfile),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn me(user: AuthUser) -> Json<UserProfile> {
    Json(user.profile)
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    tag = "Auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .auth
        .update_profile(user.uid(), request.display_name.as_deref())
        .await?;
    Ok(Json(profile))
}
