//! KIS OAuth 2.0 인증 모듈.
//!
//! 접근 토큰 발급 (POST /oauth2/tokenP)과 단일 슬롯 토큰 캐시를 제공합니다.
//!
//! 토큰은 요청에 포함된 자격증명 쌍(app_key, app_secret) 단위로 발급되며,
//! 캐시는 슬롯 하나만 유지합니다. 다른 자격증명으로 요청이 오면 슬롯을
//! 덮어씁니다. KIS API는 토큰 발급을 분당 1회로 제한하므로 동일 자격증명의
//! 반복 요청은 반드시 캐시를 재사용해야 합니다.

use super::config::KisConfig;
use crate::KisError;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 토큰 만료 안전 여유 (초). 발급 시각 + expires_in에서 이만큼 미리 만료 처리.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// expires_in이 누락된 경우의 대체값 (초). KIS 토큰의 통상 수명은 24시간.
const DEFAULT_EXPIRES_IN_SECS: i64 = 86_400;

/// KIS OAuth 토큰 발급 응답.
///
/// 발급 실패 시 access_token 없이 msg1 또는 error_description만 내려오므로
/// 모든 필드가 선택적입니다.
#[derive(Debug, Clone, Deserialize)]
struct TokenIssueResponse {
    /// 접근 토큰
    access_token: Option<String>,
    /// 토큰 만료 시간 (초)
    expires_in: Option<i64>,
    /// API 에러 메시지
    msg1: Option<String>,
    /// OAuth 에러 설명 (예: "유효하지 않은 AppKey입니다.")
    error_description: Option<String>,
}

/// 캐시된 토큰 레코드.
///
/// 소유 자격증명 쌍과 만료 시각을 함께 저장합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// 접근 토큰
    pub access_token: String,
    /// 만료 시각 (안전 여유 차감 후)
    pub expires_at: DateTime<Utc>,
    /// 토큰을 발급받은 앱키
    pub app_key: String,
    /// 토큰을 발급받은 앱시크릿
    pub app_secret: String,
}

impl TokenRecord {
    /// 주어진 시각 기준으로 토큰이 유효한지 확인.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// 요청 자격증명 쌍이 이 레코드의 소유자와 일치하는지 확인.
    pub fn owned_by(&self, app_key: &str, app_secret: &str) -> bool {
        self.app_key == app_key && self.app_secret == app_secret
    }

    /// 인증 헤더 값 반환.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// 단일 슬롯 토큰 캐시.
///
/// 전역 가변 상태 대신 명시적으로 소유되는 캐시 객체로, `AppState`가 보유하고
/// 핸들러에 주입됩니다. 슬롯은 `RwLock`으로 보호되지만 조회-발급 사이의
/// 원자성은 보장하지 않습니다. 서로 다른 자격증명의 동시 요청은 서로의
/// 슬롯을 덮어쓸 수 있으며, 이는 단일 슬롯 설계의 수용된 한계입니다.
pub struct TokenCache {
    config: KisConfig,
    client: Client,
    slot: RwLock<Option<TokenRecord>>,
}

impl TokenCache {
    /// 새 토큰 캐시 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `KisError::NetworkError`를 반환합니다.
    pub fn new(config: KisConfig) -> Result<Self, KisError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KisError::NetworkError(format!("HTTP client 생성 실패: {}", e)))?;

        Ok(Self {
            config,
            client,
            slot: RwLock::new(None),
        })
    }

    /// 설정 반환.
    pub fn config(&self) -> &KisConfig {
        &self.config
    }

    /// 유효한 접근 토큰 반환, 필요시 새로 발급.
    ///
    /// 캐시된 레코드가 만료 전이고 소유 자격증명이 요청과 일치하면
    /// 네트워크 호출 없이 캐시된 토큰을 반환합니다. 그 외에는 새 토큰을
    /// 발급받아 슬롯을 덮어씁니다. 발급 실패 시 슬롯은 변경되지 않습니다.
    pub async fn get_access_token(
        &self,
        app_key: &str,
        app_secret: &str,
    ) -> Result<String, KisError> {
        {
            let slot = self.slot.read().await;
            if let Some(record) = slot.as_ref() {
                if record.is_valid_at(Utc::now()) && record.owned_by(app_key, app_secret) {
                    debug!("Using cached KIS token (expires at: {})", record.expires_at);
                    return Ok(record.access_token.clone());
                }
                debug!(
                    "Cached KIS token not reusable (expired or different credentials), reissuing"
                );
            }
        }

        self.issue_token(app_key, app_secret).await
    }

    /// 슬롯에 토큰 레코드 직접 설정.
    ///
    /// 만료된 레코드는 무시됩니다. 테스트에서 슬롯을 시드할 때 사용합니다.
    pub async fn set_cached(&self, record: TokenRecord) {
        if record.is_valid_at(Utc::now()) {
            let mut slot = self.slot.write().await;
            *slot = Some(record);
        } else {
            debug!("Ignoring expired token record");
        }
    }

    /// 현재 캐시된 레코드 반환 (네트워크 호출 없이).
    pub async fn cached(&self) -> Option<TokenRecord> {
        let slot = self.slot.read().await;
        slot.clone()
    }

    /// 접근 토큰 발급.
    async fn issue_token(&self, app_key: &str, app_secret: &str) -> Result<String, KisError> {
        info!(
            "Requesting new KIS access token... (AppKey: {}...)",
            app_key.chars().take(8).collect::<String>()
        );

        let url = format!("{}/oauth2/tokenP", self.config.base_url);

        #[derive(Serialize)]
        struct TokenRequest<'a> {
            grant_type: &'a str,
            appkey: &'a str,
            appsecret: &'a str,
        }

        let request_body = TokenRequest {
            grant_type: "client_credentials",
            appkey: app_key,
            appsecret: app_secret,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| KisError::NetworkError(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| KisError::NetworkError(e.to_string()))?;

        let resp: TokenIssueResponse = serde_json::from_str(&body).map_err(|e| {
            KisError::ParseError(format!("Failed to parse token response: {}", e))
        })?;

        let Some(access_token) = resp.access_token else {
            let message = resp
                .msg1
                .or(resp.error_description)
                .unwrap_or_else(|| "토큰 발급 실패".to_string());
            warn!("KIS token issuance rejected: {}", message);
            return Err(KisError::Unauthorized(message));
        };

        let expires_in = resp.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let record = TokenRecord {
            access_token: access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(expires_in - TOKEN_EXPIRY_MARGIN_SECS),
            app_key: app_key.to_string(),
            app_secret: app_secret.to_string(),
        };

        info!("KIS access token obtained, expires at: {}", record.expires_at);

        {
            let mut slot = self.slot.write().await;
            *slot = Some(record);
        }

        Ok(access_token)
    }
}
