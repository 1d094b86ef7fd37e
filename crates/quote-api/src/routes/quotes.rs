//! 시세 조회 endpoints.
//!
//! 요청 본문의 자격증명을 그대로 업스트림에 주입하고, KIS 응답을
//! `{success:true, data}` 엔벨로프로 정규화합니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/volume-rank` - 거래량 상위 종목
//! - `POST /api/change-rank` - 등락률 상위 종목 (상승/하락)
//! - `POST /api/daily-chart` - 일봉 차트 (최근 3개월, 비성공 시 빈 배열)
//! - `POST /api/price` - 현재가

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::{ApiResult, ErrorBody};
use crate::state::AppState;

/// 거래량 순위 조회 요청.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRankRequest {
    pub app_key: String,
    pub app_secret: String,
    /// 가격 하한 (기본값: "10")
    #[serde(default)]
    pub price_min: Option<String>,
    /// 가격 상한 (기본값: "999")
    #[serde(default)]
    pub price_max: Option<String>,
}

/// 등락률 순위 조회 요청.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRankRequest {
    pub app_key: String,
    pub app_secret: String,
    #[serde(default)]
    pub price_min: Option<String>,
    #[serde(default)]
    pub price_max: Option<String>,
    /// true면 상승률 순위, false면 하락률 순위
    #[serde(default)]
    pub is_up: bool,
}

/// 종목코드 기반 조회 요청 (일봉 차트, 현재가).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockCodeRequest {
    pub app_key: String,
    pub app_secret: String,
    /// 종목코드 (예: "005930")
    pub stock_code: String,
}

/// 현재가 조회 요청.
pub type PriceRequest = StockCodeRequest;

/// 시세 조회 성공 엔벨로프.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    pub success: bool,
    /// 업스트림 페이로드 (해석 없이 전달)
    #[schema(value_type = Object)]
    pub data: Value,
}

impl QueryResponse {
    fn rows(rows: Vec<Value>) -> Self {
        Self {
            success: true,
            data: Value::Array(rows),
        }
    }
}

/// POST /api/volume-rank - 거래량 상위 종목 조회.
#[utoipa::path(
    post,
    path = "/api/volume-rank",
    tag = "quotes",
    request_body = VolumeRankRequest,
    responses(
        (status = 200, description = "조회 성공", body = QueryResponse),
        (status = 400, description = "업스트림 조회 거부", body = ErrorBody),
        (status = 401, description = "인증 실패", body = ErrorBody),
        (status = 500, description = "전송 오류", body = ErrorBody)
    )
)]
pub async fn volume_rank(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VolumeRankRequest>,
) -> ApiResult<Json<QueryResponse>> {
    debug!(
        price_min = req.price_min.as_deref(),
        price_max = req.price_max.as_deref(),
        "거래량 순위 조회 요청"
    );

    let rows = state
        .quotes
        .volume_rank(
            &req.app_key,
            &req.app_secret,
            req.price_min.as_deref(),
            req.price_max.as_deref(),
        )
        .await?;

    Ok(Json(QueryResponse::rows(rows)))
}

/// POST /api/change-rank - 등락률 상위 종목 조회.
#[utoipa::path(
    post,
    path = "/api/change-rank",
    tag = "quotes",
    request_body = ChangeRankRequest,
    responses(
        (status = 200, description = "조회 성공", body = QueryResponse),
        (status = 400, description = "업스트림 조회 거부", body = ErrorBody),
        (status = 401, description = "인증 실패", body = ErrorBody),
        (status = 500, description = "전송 오류", body = ErrorBody)
    )
)]
pub async fn change_rank(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChangeRankRequest>,
) -> ApiResult<Json<QueryResponse>> {
    debug!(is_up = req.is_up, "등락률 순위 조회 요청");

    let rows = state
        .quotes
        .change_rank(
            &req.app_key,
            &req.app_secret,
            req.price_min.as_deref(),
            req.price_max.as_deref(),
            req.is_up,
        )
        .await?;

    Ok(Json(QueryResponse::rows(rows)))
}

/// POST /api/daily-chart - 일봉 차트 조회.
///
/// 업스트림이 비성공을 반환해도 빈 배열로 200을 반환합니다
/// ("해당 조건의 데이터 없음"을 에러로 보지 않음).
#[utoipa::path(
    post,
    path = "/api/daily-chart",
    tag = "quotes",
    request_body = StockCodeRequest,
    responses(
        (status = 200, description = "조회 성공 (데이터 없으면 빈 배열)", body = QueryResponse),
        (status = 401, description = "인증 실패", body = ErrorBody),
        (status = 500, description = "전송 오류", body = ErrorBody)
    )
)]
pub async fn daily_chart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StockCodeRequest>,
) -> ApiResult<Json<QueryResponse>> {
    debug!(stock_code = %req.stock_code, "일봉 차트 조회 요청");

    let rows = state
        .quotes
        .daily_chart(&req.app_key, &req.app_secret, &req.stock_code)
        .await?;

    Ok(Json(QueryResponse::rows(rows)))
}

/// POST /api/price - 현재가 조회.
#[utoipa::path(
    post,
    path = "/api/price",
    tag = "quotes",
    request_body = PriceRequest,
    responses(
        (status = 200, description = "조회 성공", body = QueryResponse),
        (status = 400, description = "업스트림 조회 거부", body = ErrorBody),
        (status = 401, description = "인증 실패", body = ErrorBody),
        (status = 500, description = "전송 오류", body = ErrorBody)
    )
)]
pub async fn price(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StockCodeRequest>,
) -> ApiResult<Json<QueryResponse>> {
    debug!(stock_code = %req.stock_code, "현재가 조회 요청");

    let data = state
        .quotes
        .price(&req.app_key, &req.app_secret, &req.stock_code)
        .await?;

    Ok(Json(QueryResponse {
        success: true,
        data,
    }))
}

/// 시세 조회 라우터 생성.
pub fn quotes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/volume-rank", post(volume_rank))
        .route("/change-rank", post(change_rank))
        .route("/daily-chart", post(daily_chart))
        .route("/price", post(price))
}
