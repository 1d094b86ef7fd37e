//! 로그인 (토큰 발급) endpoint.
//!
//! 자격증명 쌍을 검증하고 KIS 접근 토큰을 발급합니다. 발급된 토큰은
//! 캐시에 저장되어 이후 시세 조회에서 재사용되며, 토큰 자체는 클라이언트에
//! 반환하지 않습니다.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// KIS 앱키
    #[serde(default)]
    pub app_key: Option<String>,
    /// KIS 앱시크릿
    #[serde(default)]
    pub app_secret: Option<String>,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/login - 자격증명 검증 및 토큰 발급.
///
/// appKey/appSecret이 누락되거나 비어 있으면 업스트림 호출 없이 400을
/// 반환합니다.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 400, description = "자격증명 누락", body = ErrorBody),
        (status = 401, description = "토큰 발급 거부", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(app_key), Some(app_secret)) = (
        req.app_key.filter(|k| !k.is_empty()),
        req.app_secret.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::bad_request("APP KEY와 APP SECRET이 필요합니다."));
    };

    state
        .quotes
        .tokens()
        .get_access_token(&app_key, &app_secret)
        .await?;

    info!("Login succeeded (AppKey: {}...)", app_key.chars().take(8).collect::<String>());

    Ok(Json(LoginResponse {
        success: true,
        message: "로그인 성공".to_string(),
    }))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}
