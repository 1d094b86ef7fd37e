//! KIS 시세 프록시 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 요청 단위 자격증명 주입 및 토큰 캐싱 (quote-kis)
//! - 업스트림 응답의 success/error 엔벨로프 정규화
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`error`]: 엔벨로프 에러 타입 및 상태 코드 매핑
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorBody};
pub use routes::create_api_router;
pub use state::AppState;
