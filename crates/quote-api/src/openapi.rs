//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ErrorBody;
use crate::routes::{
    ChangeRankRequest, HealthResponse, LoginRequest, LoginResponse, QueryResponse,
    StockCodeRequest, VolumeRankRequest,
};

/// Quote Proxy API 문서.
///
/// 모든 엔드포인트와 스키마를 포함하는 OpenAPI 3.0 스펙입니다.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "KIS Quote Proxy API",
        version = "0.1.0",
        description = r#"
# KIS 시세 프록시 REST API

한국투자증권(KIS) 개방 API로 시세 조회를 중계하는 프록시입니다.
요청 본문의 자격증명(appKey/appSecret)으로 접근 토큰을 발급·캐싱하고,
업스트림 응답을 `{success:true, data}` / `{error}` 엔벨로프로 정규화합니다.

## 주요 기능

- **로그인**: 자격증명 검증 및 토큰 발급
- **거래량 순위**: 거래량 상위 종목 조회 (가격 범위 필터)
- **등락률 순위**: 상승/하락 상위 종목 조회
- **일봉 차트**: 최근 3개월 일봉 데이터
- **현재가**: 종목 현재가 조회
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::login,
        crate::routes::quotes::volume_rank,
        crate::routes::quotes::change_rank,
        crate::routes::quotes::daily_chart,
        crate::routes::quotes::price,
    ),
    components(schemas(
        HealthResponse,
        LoginRequest,
        LoginResponse,
        VolumeRankRequest,
        ChangeRankRequest,
        StockCodeRequest,
        QueryResponse,
        ErrorBody,
    )),
    tags(
        (name = "health", description = "헬스 체크"),
        (name = "auth", description = "자격증명 검증 및 토큰 발급"),
        (name = "quotes", description = "시세 조회"),
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// `/swagger-ui`와 `/api-docs/openapi.json`을 제공합니다.
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
