//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `GET /health` - 헬스 체크
//! - `POST /api/login` - 자격증명 검증 및 토큰 발급
//! - `POST /api/volume-rank` - 거래량 상위 종목 조회
//! - `POST /api/change-rank` - 등락률 상위 종목 조회
//! - `POST /api/daily-chart` - 일봉 차트 조회 (최근 3개월)
//! - `POST /api/price` - 현재가 조회

pub mod auth;
pub mod health;
pub mod quotes;

pub use auth::{auth_router, LoginRequest, LoginResponse};
pub use health::{health_router, HealthResponse};
pub use quotes::{
    quotes_router, ChangeRankRequest, PriceRequest, QueryResponse, StockCodeRequest,
    VolumeRankRequest,
};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api", auth_router().merge(quotes_router()))
}
