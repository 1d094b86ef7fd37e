//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트의 실패는 `{"error": message}` 엔벨로프와 HTTP 상태 코드로
//! 변환됩니다. 아무것도 핸들러 밖으로 전파되지 않습니다.
//!
//! # 상태 코드 매핑
//!
//! - 입력 누락 → 400
//! - 토큰 발급 거부 (`KisError::Unauthorized`) → 401
//! - 업스트림 비성공 응답 (`KisError::ApiError`) → 400
//! - 네트워크/파싱 실패 → 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quote_kis::KisError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 에러 엔벨로프 본문.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
}

/// 상태 코드가 결합된 API 에러.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// 401 Unauthorized.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<KisError> for ApiError {
    fn from(err: KisError) -> Self {
        match err {
            KisError::Unauthorized(message) => Self::unauthorized(message),
            KisError::ApiError { message, .. } => Self::bad_request(message),
            KisError::NetworkError(message) | KisError::ParseError(message) => {
                Self::internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kis_error_status_mapping() {
        let auth: ApiError = KisError::Unauthorized("bad key".into()).into();
        assert_eq!(auth.status, StatusCode::UNAUTHORIZED);

        let rejected: ApiError = KisError::ApiError {
            code: "1".into(),
            message: "조회 실패".into(),
        }
        .into();
        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected.message, "조회 실패");

        let network: ApiError = KisError::NetworkError("timeout".into()).into();
        assert_eq!(network.status, StatusCode::INTERNAL_SERVER_ERROR);

        let parse: ApiError = KisError::ParseError("bad json".into()).into();
        assert_eq!(parse.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody {
            error: "APP KEY와 APP SECRET이 필요합니다.".into(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.starts_with(r#"{"error":"#));
    }
}
