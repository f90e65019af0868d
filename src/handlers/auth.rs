use axum::extract::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::user_store::PgUserStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{LoginInput, RegisterInput, Session, UserService};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: Option<String>,
    pub password: Option<String>,
}

async fn user_service() -> Result<UserService<PgUserStore>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    Ok(UserService::new(PgUserStore::new(pool)))
}

fn session_payload(session: &Session) -> Value {
    json!({
        "token": session.token,
        "user": session.user,
    })
}

/// POST /auth/register - create an account and receive a JWT
pub async fn register(Json(body): Json<RegisterBody>) -> ApiResult<Value> {
    let service = user_service().await?;
    let session = service
        .register(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(ApiResponse::created(session_payload(&session)))
}

/// POST /auth/login - authenticate and receive a JWT
pub async fn login(Json(body): Json<LoginBody>) -> ApiResult<Value> {
    let service = user_service().await?;
    let session = service
        .login(LoginInput {
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok(ApiResponse::success(session_payload(&session)))
}

/// GET /api/auth/whoami - current account, as seen by the JWT middleware
pub async fn whoami(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    let service = user_service().await?;
    let user = service
        .find(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(ApiResponse::success(json!({ "user": user })))
}
