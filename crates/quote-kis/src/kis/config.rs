//! 한국투자증권 (KIS) API 설정.
//!
//! app_key와 app_secret은 설정이 아닌 요청 단위로 전달되므로
//! 여기에는 엔드포인트와 타임아웃만 포함됩니다.

use serde::{Deserialize, Serialize};

/// 실전투자 REST API 기본 URL.
pub const REAL_BASE_URL: &str = "https://openapi.koreainvestment.com:9443";

/// 기본 요청 타임아웃 (초).
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// KIS API 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KisConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl KisConfig {
    /// 지정한 기본 URL로 설정 생성.
    ///
    /// 테스트에서 mock 서버를 가리킬 때 사용합니다.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// 환경 변수에서 설정 로드.
    ///
    /// # 환경변수
    /// - `KIS_BASE_URL`: 기본 URL 재정의 (기본값: 실전투자)
    /// - `KIS_TIMEOUT_SECS`: 요청 타임아웃 (기본값: 10)
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("KIS_BASE_URL").unwrap_or_else(|_| REAL_BASE_URL.to_string());
        let timeout_secs = std::env::var("KIS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url,
            timeout_secs,
        }
    }
}

impl Default for KisConfig {
    fn default() -> Self {
        Self::new(REAL_BASE_URL)
    }
}
