//! KIS 국내 주식 시세 조회 클라이언트.
//!
//! 이 모듈은 한국투자증권 API를 통해 국내 주식 시세를 조회하는
//! REST API 클라이언트를 제공합니다.
//!
//! # 지원 기능
//!
//! - 거래량 순위 조회
//! - 등락률 순위 조회 (상승/하락)
//! - 일봉 차트 조회 (최근 3개월)
//! - 현재가 조회
//!
//! 모든 조회는 엔드포인트별 기술자(`QuoteQuery`)와 하나의 공통 전송 루틴으로
//! 처리됩니다. 응답 페이로드는 해석 없이 JSON 값 그대로 전달합니다.

use super::auth::TokenCache;
use super::tr_id;
use crate::KisError;
use chrono::{Months, Utc};
use chrono_tz::Asia::Seoul;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// 가격 하한 기본값.
const DEFAULT_PRICE_MIN: &str = "10";

/// 가격 상한 기본값.
const DEFAULT_PRICE_MAX: &str = "999";

/// 일봉 차트 조회 기간 (개월). 호출자가 조정할 수 없는 고정 윈도우.
const CHART_WINDOW_MONTHS: u32 = 3;

/// 업스트림이 rt_cd != "0"을 반환했을 때의 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RejectPolicy {
    /// 에러로 전파 (msg1 포함)
    Error,
    /// 빈 데이터로 허용 ("해당 조건의 데이터 없음"을 에러로 보지 않음)
    EmptyData,
}

/// 엔드포인트별 조회 기술자.
///
/// 경로, 거래 ID, 성공 페이로드 필드, custtype 헤더 여부,
/// 비성공 응답 처리 방식을 선언적으로 정의합니다.
struct QuoteQuery {
    path: &'static str,
    tr_id: &'static str,
    /// 성공 시 꺼낼 페이로드 필드 ("output" | "output2")
    payload_field: &'static str,
    /// 개인 고객 구분 헤더 (custtype: P) 전송 여부
    custtype: bool,
    on_reject: RejectPolicy,
}

/// 거래량 순위 조회.
const VOLUME_RANK: QuoteQuery = QuoteQuery {
    path: "/uapi/domestic-stock/v1/quotations/volume-rank",
    tr_id: tr_id::VOLUME_RANK,
    payload_field: "output",
    custtype: true,
    on_reject: RejectPolicy::Error,
};

/// 등락률 순위 조회.
const CHANGE_RATE_RANK: QuoteQuery = QuoteQuery {
    path: "/uapi/domestic-stock/v1/quotations/chgrate-rank",
    tr_id: tr_id::CHANGE_RATE_RANK,
    payload_field: "output",
    custtype: true,
    on_reject: RejectPolicy::Error,
};

/// 일봉 차트 조회.
const DAILY_ITEM_CHART: QuoteQuery = QuoteQuery {
    path: "/uapi/domestic-stock/v1/quotations/inquire-daily-itemchartprice",
    tr_id: tr_id::DAILY_ITEM_CHART,
    payload_field: "output2",
    custtype: false,
    on_reject: RejectPolicy::EmptyData,
};

/// 현재가 조회.
const PRICE: QuoteQuery = QuoteQuery {
    path: "/uapi/domestic-stock/v1/quotations/inquire-price",
    tr_id: tr_id::PRICE,
    payload_field: "output",
    custtype: true,
    on_reject: RejectPolicy::Error,
};

/// KIS 시세 조회 공통 응답.
///
/// 페이로드는 엔드포인트에 따라 output 또는 output2에 담기며,
/// 비성공 응답에서는 둘 다 누락될 수 있습니다.
#[derive(Debug, Deserialize)]
struct KisQuoteResponse {
    /// 응답 코드 ("0" = 성공)
    rt_cd: String,
    /// 메시지 내용
    msg1: Option<String>,
    output: Option<Value>,
    output2: Option<Value>,
}

impl KisQuoteResponse {
    fn payload(self, field: &str) -> Option<Value> {
        match field {
            "output2" => self.output2,
            _ => self.output,
        }
    }
}

/// KIS 시세 조회 클라이언트.
///
/// `TokenCache`를 `Arc`로 공유하여 동일한 자격증명을 사용하는 요청들이
/// 토큰을 재사용합니다. KIS API는 토큰 발급을 1분에 1회로 제한하므로
/// 토큰 공유가 필수적입니다.
pub struct KisQuoteClient {
    tokens: Arc<TokenCache>,
    client: Client,
}

impl KisQuoteClient {
    /// 새로운 시세 조회 클라이언트 생성 (소유권 이전).
    pub fn new(tokens: TokenCache) -> Self {
        Self::with_shared_cache(Arc::new(tokens))
    }

    /// 공유된 토큰 캐시로 시세 조회 클라이언트 생성.
    pub fn with_shared_cache(tokens: Arc<TokenCache>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(
                tokens.config().timeout_secs,
            ))
            .build()
            .expect("Failed to create HTTP client");

        Self { tokens, client }
    }

    /// 내부 토큰 캐시 참조 반환.
    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    // ========================================
    // Market Data APIs (시세 조회)
    // ========================================

    /// 거래량 상위 종목 조회.
    ///
    /// # 인자
    /// * `price_min` - 가격 하한 (기본값: "10")
    /// * `price_max` - 가격 상한 (기본값: "999")
    pub async fn volume_rank(
        &self,
        app_key: &str,
        app_secret: &str,
        price_min: Option<&str>,
        price_max: Option<&str>,
    ) -> Result<Vec<Value>, KisError> {
        let params = [
            ("FID_COND_MRKT_DIV_CODE", "J"),
            ("FID_COND_SCR_DIV_CODE", "20171"),
            ("FID_INPUT_ISCD", "0000"),
            ("FID_DIV_CLS_CODE", "0"),
            ("FID_BLNG_CLS_CODE", "0"),
            ("FID_TRGT_CLS_CODE", "111111111"),
            ("FID_TRGT_EXLS_CLS_CODE", "000000"),
            ("FID_INPUT_PRICE_1", price_min.unwrap_or(DEFAULT_PRICE_MIN)),
            ("FID_INPUT_PRICE_2", price_max.unwrap_or(DEFAULT_PRICE_MAX)),
            ("FID_VOL_CNT", "100000"),
            ("FID_INPUT_DATE_1", ""),
        ];

        let payload = self
            .fetch(app_key, app_secret, &VOLUME_RANK, &params)
            .await?;
        Ok(into_rows(payload))
    }

    /// 등락률 상위 종목 조회.
    ///
    /// # 인자
    /// * `is_up` - true면 상승률 순위, false면 하락률 순위
    pub async fn change_rank(
        &self,
        app_key: &str,
        app_secret: &str,
        price_min: Option<&str>,
        price_max: Option<&str>,
        is_up: bool,
    ) -> Result<Vec<Value>, KisError> {
        let params = [
            ("FID_COND_MRKT_DIV_CODE", "J"),
            ("FID_COND_SCR_DIV_CODE", "20170"),
            ("FID_INPUT_ISCD", "0000"),
            ("FID_DIV_CLS_CODE", if is_up { "0" } else { "1" }),
            ("FID_BLNG_CLS_CODE", "0"),
            ("FID_TRGT_CLS_CODE", "111111111"),
            ("FID_TRGT_EXLS_CLS_CODE", "000000"),
            ("FID_INPUT_PRICE_1", price_min.unwrap_or(DEFAULT_PRICE_MIN)),
            ("FID_INPUT_PRICE_2", price_max.unwrap_or(DEFAULT_PRICE_MAX)),
            ("FID_VOL_CNT", "10000"),
            ("FID_INPUT_DATE_1", ""),
        ];

        let payload = self
            .fetch(app_key, app_secret, &CHANGE_RATE_RANK, &params)
            .await?;
        Ok(into_rows(payload))
    }

    /// 일봉 차트 조회 (최근 3개월, KST 기준 오늘까지).
    ///
    /// 업스트림이 비성공(rt_cd != "0")을 반환하면 빈 배열을 반환합니다.
    ///
    /// # 인자
    /// * `stock_code` - 종목코드 (예: "005930" 삼성전자)
    pub async fn daily_chart(
        &self,
        app_key: &str,
        app_secret: &str,
        stock_code: &str,
    ) -> Result<Vec<Value>, KisError> {
        let today = Utc::now().with_timezone(&Seoul).date_naive();
        let end_date = today.format("%Y%m%d").to_string();
        let start_date = today
            .checked_sub_months(Months::new(CHART_WINDOW_MONTHS))
            .unwrap_or(today)
            .format("%Y%m%d")
            .to_string();

        let params = [
            ("FID_COND_MRKT_DIV_CODE", "J"),
            ("FID_INPUT_ISCD", stock_code),
            ("FID_INPUT_DATE_1", start_date.as_str()),
            ("FID_INPUT_DATE_2", end_date.as_str()),
            ("FID_PERIOD_DIV_CODE", "D"),
            ("FID_ORG_ADJ_PRC", "0"),
        ];

        let payload = self
            .fetch(app_key, app_secret, &DAILY_ITEM_CHART, &params)
            .await?;
        Ok(into_rows(payload))
    }

    /// 주식현재가 시세 조회.
    ///
    /// # 인자
    /// * `stock_code` - 종목코드
    pub async fn price(
        &self,
        app_key: &str,
        app_secret: &str,
        stock_code: &str,
    ) -> Result<Value, KisError> {
        let params = [
            ("FID_COND_MRKT_DIV_CODE", "J"),
            ("FID_INPUT_ISCD", stock_code),
        ];

        let payload = self.fetch(app_key, app_secret, &PRICE, &params).await?;
        Ok(payload.unwrap_or(Value::Null))
    }

    // ========================================
    // 공통 전송 루틴
    // ========================================

    /// 조회 기술자와 쿼리 파라미터로 업스트림 호출 수행.
    ///
    /// 토큰 획득 → GET 요청 → rt_cd 해석 순서로 처리하며,
    /// 성공 시 페이로드 필드를 반환합니다 (누락 시 `None`).
    async fn fetch(
        &self,
        app_key: &str,
        app_secret: &str,
        query: &QuoteQuery,
        params: &[(&str, &str)],
    ) -> Result<Option<Value>, KisError> {
        let token = self.tokens.get_access_token(app_key, app_secret).await?;
        let url = format!("{}{}", self.tokens.config().base_url, query.path);

        let mut request = self
            .client
            .get(&url)
            .header("Content-Type", "application/json; charset=utf-8")
            .header("authorization", format!("Bearer {}", token))
            .header("appkey", app_key)
            .header("appsecret", app_secret)
            .header("tr_id", query.tr_id);

        if query.custtype {
            request = request.header("custtype", "P"); // P = Personal
        }

        let response = request
            .query(params)
            .send()
            .await
            .map_err(|e| KisError::NetworkError(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| KisError::NetworkError(e.to_string()))?;

        debug!(tr_id = query.tr_id, "KIS quote response: {}", body);

        let resp: KisQuoteResponse = serde_json::from_str(&body).map_err(|e| {
            KisError::ParseError(format!("Failed to parse quote response: {}", e))
        })?;

        if resp.rt_cd != "0" {
            return match query.on_reject {
                RejectPolicy::Error => {
                    error!(
                        tr_id = query.tr_id,
                        rt_cd = %resp.rt_cd,
                        "KIS quote inquiry rejected"
                    );
                    Err(KisError::ApiError {
                        code: resp.rt_cd,
                        message: resp.msg1.unwrap_or_else(|| "조회 실패".to_string()),
                    })
                }
                RejectPolicy::EmptyData => Ok(None),
            };
        }

        Ok(resp.payload(query.payload_field))
    }
}

/// 페이로드를 행 배열로 변환. 누락되었거나 배열이 아니면 빈 배열.
fn into_rows(payload: Option<Value>) -> Vec<Value> {
    match payload {
        Some(Value::Array(rows)) => rows,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kis::config::KisConfig;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> KisQuoteClient {
        KisQuoteClient::new(TokenCache::new(KisConfig::new(server.url())).unwrap())
    }

    async fn mock_token(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/oauth2/tokenP")
            .with_status(200)
            .with_body(r#"{"access_token":"tok-q","expires_in":86400}"#)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_volume_rank_success_returns_rows() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        let mock = server
            .mock("GET", "/uapi/domestic-stock/v1/quotations/volume-rank")
            .match_header("tr_id", tr_id::VOLUME_RANK)
            .match_header("authorization", "Bearer tok-q")
            .match_header("appkey", "key-a")
            .match_header("custtype", "P")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("FID_COND_SCR_DIV_CODE".into(), "20171".into()),
                Matcher::UrlEncoded("FID_INPUT_PRICE_1".into(), "10".into()),
                Matcher::UrlEncoded("FID_INPUT_PRICE_2".into(), "999".into()),
                Matcher::UrlEncoded("FID_VOL_CNT".into(), "100000".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"rt_cd":"0","msg1":"정상처리","output":[{"mksc_shrn_iscd":"005930"}]}"#)
            .create_async()
            .await;

        let rows = client(&server)
            .volume_rank("key-a", "secret-a", None, None)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["mksc_shrn_iscd"], "005930");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_volume_rank_custom_price_bounds() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        let mock = server
            .mock("GET", "/uapi/domestic-stock/v1/quotations/volume-rank")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("FID_INPUT_PRICE_1".into(), "5000".into()),
                Matcher::UrlEncoded("FID_INPUT_PRICE_2".into(), "50000".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"rt_cd":"0","output":[]}"#)
            .create_async()
            .await;

        let rows = client(&server)
            .volume_rank("key-a", "secret-a", Some("5000"), Some("50000"))
            .await
            .unwrap();

        assert!(rows.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_change_rank_direction_flag() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        // 하락률 순위 → FID_DIV_CLS_CODE=1
        let mock = server
            .mock("GET", "/uapi/domestic-stock/v1/quotations/chgrate-rank")
            .match_header("tr_id", tr_id::CHANGE_RATE_RANK)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("FID_COND_SCR_DIV_CODE".into(), "20170".into()),
                Matcher::UrlEncoded("FID_DIV_CLS_CODE".into(), "1".into()),
                Matcher::UrlEncoded("FID_VOL_CNT".into(), "10000".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"rt_cd":"0","output":[{"stck_shrn_iscd":"000660"}]}"#)
            .create_async()
            .await;

        let rows = client(&server)
            .change_rank("key-a", "secret-a", None, None, false)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ranking_rejection_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        server
            .mock("GET", "/uapi/domestic-stock/v1/quotations/chgrate-rank")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"rt_cd":"1","msg1":"조회할 자료가 없습니다"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .change_rank("key-a", "secret-a", None, None, true)
            .await
            .unwrap_err();

        match err {
            KisError::ApiError { code, message } => {
                assert_eq!(code, "1");
                assert_eq!(message, "조회할 자료가 없습니다");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_daily_chart_rejection_tolerated_as_empty() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        server
            .mock(
                "GET",
                "/uapi/domestic-stock/v1/quotations/inquire-daily-itemchartprice",
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"rt_cd":"1","msg1":"조회할 자료가 없습니다"}"#)
            .create_async()
            .await;

        let rows = client(&server)
            .daily_chart("key-a", "secret-a", "005930")
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_daily_chart_uses_output2() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        let mock = server
            .mock(
                "GET",
                "/uapi/domestic-stock/v1/quotations/inquire-daily-itemchartprice",
            )
            .match_header("tr_id", tr_id::DAILY_ITEM_CHART)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("FID_INPUT_ISCD".into(), "005930".into()),
                Matcher::UrlEncoded("FID_PERIOD_DIV_CODE".into(), "D".into()),
                Matcher::UrlEncoded("FID_ORG_ADJ_PRC".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"rt_cd":"0","output1":{"stck_prpr":"71000"},"output2":[{"stck_bsop_date":"20260828"}]}"#,
            )
            .create_async()
            .await;

        let rows = client(&server)
            .daily_chart("key-a", "secret-a", "005930")
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["stck_bsop_date"], "20260828");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_price_returns_object_payload() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        let mock = server
            .mock("GET", "/uapi/domestic-stock/v1/quotations/inquire-price")
            .match_header("tr_id", tr_id::PRICE)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("FID_COND_MRKT_DIV_CODE".into(), "J".into()),
                Matcher::UrlEncoded("FID_INPUT_ISCD".into(), "005930".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"rt_cd":"0","output":{"stck_prpr":"71000"}}"#)
            .create_async()
            .await;

        let data = client(&server)
            .price("key-a", "secret-a", "005930")
            .await
            .unwrap();

        assert_eq!(data["stck_prpr"], "71000");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_auth_failure_propagates_without_quote_call() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth2/tokenP")
            .with_status(403)
            .with_body(r#"{"error_description":"유효하지 않은 AppKey입니다."}"#)
            .create_async()
            .await;

        let quote_mock = server
            .mock("GET", "/uapi/domestic-stock/v1/quotations/inquire-price")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client(&server)
            .price("bad-key", "bad-secret", "005930")
            .await
            .unwrap_err();

        assert!(err.is_auth_error());
        quote_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_parse_error() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        server
            .mock("GET", "/uapi/domestic-stock/v1/quotations/volume-rank")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("<html>Internal Server Error</html>")
            .create_async()
            .await;

        let err = client(&server)
            .volume_rank("key-a", "secret-a", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, KisError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_token_reused_across_queries() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("POST", "/oauth2/tokenP")
            .with_status(200)
            .with_body(r#"{"access_token":"tok-q","expires_in":86400}"#)
            .expect(1)
            .create_async()
            .await;

        server
            .mock("GET", "/uapi/domestic-stock/v1/quotations/inquire-price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"rt_cd":"0","output":{"stck_prpr":"71000"}}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client(&server);
        client.price("key-a", "secret-a", "005930").await.unwrap();
        client.price("key-a", "secret-a", "005930").await.unwrap();

        // 두 번째 조회는 캐시된 토큰을 재사용 (발급 호출 1회)
        token_mock.assert_async().await;
    }
}
