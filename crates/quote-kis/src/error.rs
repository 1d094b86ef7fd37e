//! KIS API 에러 타입.

use thiserror::Error;

/// KIS 연동 관련 에러.
#[derive(Debug, Error)]
pub enum KisError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 인증/권한 에러 (토큰 발급 거부 포함)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// API 에러 응답 (rt_cd != "0")
    #[error("API error {code}: {message}")]
    ApiError { code: String, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl KisError {
    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, KisError::Unauthorized(_))
    }

    /// 전송 계층 에러(네트워크/파싱)인지 확인.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, KisError::NetworkError(_) | KisError::ParseError(_))
    }
}
