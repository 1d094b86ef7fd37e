//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 안전하게 공유되며,
//! Axum의 State extractor를 통해 핸들러에 주입됩니다.

use quote_kis::{KisConfig, KisQuoteClient, TokenCache};

/// 애플리케이션 공유 상태.
pub struct AppState {
    /// KIS 시세 조회 클라이언트 (토큰 캐시 포함).
    ///
    /// 토큰 캐시는 프로세스 전체에서 슬롯 하나만 유지합니다. 매 요청마다
    /// 새 클라이언트를 생성하면 토큰 발급 제한(1분 1회)에 걸리므로
    /// 공유 인스턴스를 재사용합니다.
    pub quotes: KisQuoteClient,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `KisError`를 반환합니다.
    pub fn new(config: KisConfig) -> Result<Self, quote_kis::KisError> {
        let quotes = KisQuoteClient::new(TokenCache::new(config)?);

        Ok(Self {
            quotes,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
