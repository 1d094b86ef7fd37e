//! 한국투자증권 (KIS) 연동 모듈.
//!
//! 국내 주식 시세 조회 API와의 연동을 제공합니다.
//!
//! # 기능
//!
//! - OAuth 2.0 인증 및 토큰 재사용 (단일 슬롯 캐시)
//! - 거래량 순위 / 등락률 순위 조회
//! - 일봉 차트 조회 (최근 3개월)
//! - 현재가 조회
//!
//! # API 문서
//!
//! 공식 API 문서: <https://apiportal.koreainvestment.com/>
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use quote_kis::{KisConfig, KisQuoteClient, TokenCache};
//!
//! let cache = TokenCache::new(KisConfig::default())?;
//! let client = KisQuoteClient::new(cache);
//!
//! let rows = client.volume_rank("app_key", "app_secret", None, None).await?;
//! println!("{} rows", rows.len());
//! ```

pub mod auth;
pub mod config;
pub mod quotations;

pub use auth::{TokenCache, TokenRecord};
pub use config::KisConfig;
pub use quotations::KisQuoteClient;

/// KIS 거래 ID (tr_id) 상수 모음.
///
/// 거래 ID는 모든 조회 호출에서 작업 유형을 식별하기 위해 필요합니다.
pub mod tr_id {
    /// 거래량 순위 조회
    pub const VOLUME_RANK: &str = "FHPST01710000";

    /// 등락률 순위 조회
    pub const CHANGE_RATE_RANK: &str = "FHPST01700000";

    /// 국내 주식 기간별 시세 (일/주/월/년)
    pub const DAILY_ITEM_CHART: &str = "FHKST03010100";

    /// 국내 주식 현재가 조회
    pub const PRICE: &str = "FHKST01010100";
}
