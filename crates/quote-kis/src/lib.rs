//! 한국투자증권 (KIS) 시세 조회 클라이언트.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - OAuth 2.0 접근 토큰 발급 및 단일 슬롯 캐싱
//! - 시세 조회 API (거래량 순위, 등락률 순위, 일봉 차트, 현재가)
//! - KIS 응답 코드(rt_cd) 해석 및 에러 정규화

pub mod error;
pub mod kis;

pub use error::*;
pub use kis::auth::{TokenCache, TokenRecord};
pub use kis::config::KisConfig;
pub use kis::quotations::KisQuoteClient;
