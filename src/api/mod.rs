//! Marketing API clients for ad platforms

pub mod linkedin;
pub mod meta;
pub mod tiktok;
pub mod whatsapp;

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::config::ApiSettings;
use crate::models::{ApiCredentials, ApiPlatform, DateRange, FetchedKpiData};

/// Failures talking to a marketing API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Connection-level failure
    #[error("network error: {0}")]
    Transport(String),
    /// Request timed out
    #[error("timeout")]
    Timeout,
    /// Non-success HTTP status
    #[error("http {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },
    /// HTTP 429
    #[error("rate limited")]
    RateLimited,
    /// HTTP 401/403
    #[error("unauthorized (check the access token)")]
    Unauthorized,
    /// The vendor answered 200 with an error envelope
    #[error("api error {code}: {message}")]
    Vendor {
        /// Vendor error code
        code: i64,
        /// Vendor message
        message: String,
    },
    /// Body didn't match the expected shape
    #[error("json error: {0}")]
    Decode(String),
    /// Required credential fields are blank
    #[error("missing {platform} credentials: {fields}")]
    MissingCredentials {
        /// Platform of the credentials
        platform: ApiPlatform,
        /// Comma-separated field names
        fields: String,
    },
}

impl ApiError {
    /// Returns true if the error is transient and should be retried.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Unified API trait for ad platforms
#[allow(async_fn_in_trait)]
pub trait AdsApi {
    /// Which platform this client talks to
    fn platform(&self) -> ApiPlatform;

    /// Fetch and aggregate insights for a date range (one attempt)
    async fn fetch_insights(&self, range: &DateRange) -> Result<FetchedKpiData, ApiError>;
}

/// Unified client that wraps platform-specific implementations
pub enum Client {
    /// Meta Marketing API client
    Meta(meta::MetaClient),
    /// TikTok Business API client
    TikTok(tiktok::TikTokClient),
    /// WhatsApp Business Cloud client
    WhatsApp(whatsapp::WhatsAppClient),
    /// LinkedIn Marketing client
    LinkedIn(linkedin::LinkedInClient),
}

impl Client {
    /// Which platform this client talks to
    pub fn platform(&self) -> ApiPlatform {
        match self {
            Client::Meta(c) => c.platform(),
            Client::TikTok(c) => c.platform(),
            Client::WhatsApp(c) => c.platform(),
            Client::LinkedIn(c) => c.platform(),
        }
    }

    /// Fetch insights once
    pub async fn fetch_insights(&self, range: &DateRange) -> Result<FetchedKpiData, ApiError> {
        match self {
            Client::Meta(c) => c.fetch_insights(range).await,
            Client::TikTok(c) => c.fetch_insights(range).await,
            Client::WhatsApp(c) => c.fetch_insights(range).await,
            Client::LinkedIn(c) => c.fetch_insights(range).await,
        }
    }

    /// Fetch insights, retrying transient failures with exponential backoff
    /// (1 s base delay, doubling, `max_attempts` attempts in total).
    pub async fn fetch_with_retry(
        &self,
        range: &DateRange,
        max_attempts: usize,
    ) -> Result<FetchedKpiData, ApiError> {
        retry_transient(self.platform(), max_attempts, || self.fetch_insights(range)).await
    }
}

/// Run `op` until it succeeds, fails with a non-transient error or has been
/// tried `max_attempts` times
pub(crate) async fn retry_transient<T, F, Fut>(
    platform: ApiPlatform,
    max_attempts: usize,
    op: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    op.retry(
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(30))
            .with_max_times(max_attempts.saturating_sub(1)),
    )
    .when(ApiError::should_retry)
    .notify(|e, dur| {
        tracing::warn!(
            "{} API call failed, retrying after {:.2}s: {}",
            platform.name(),
            dur.as_secs_f64(),
            e
        );
    })
    .await
}

/// Build the client for a set of credentials, after checking required fields
pub fn get_client(creds: &ApiCredentials, settings: &ApiSettings) -> Result<Client, ApiError> {
    let missing = creds.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::MissingCredentials {
            platform: creds.platform,
            fields: missing.join(", "),
        });
    }

    let http = http_client(settings)?;
    let field = |name: &str| creds.fields.get(name).unwrap_or_default().trim().to_string();

    let client = match creds.platform {
        ApiPlatform::Meta => Client::Meta(meta::MetaClient::new(
            http,
            &field("page_access_token"),
            &field("ad_account_id"),
        )),
        ApiPlatform::TikTok => Client::TikTok(tiktok::TikTokClient::new(
            http,
            &field("access_token"),
            &field("advertiser_id"),
        )),
        ApiPlatform::WhatsApp => Client::WhatsApp(whatsapp::WhatsAppClient::new(
            http,
            &field("permanent_access_token"),
            &field("waba_id"),
        )),
        ApiPlatform::LinkedIn => Client::LinkedIn(linkedin::LinkedInClient::new(
            http,
            &field("access_token"),
            &field("ad_account_urn"),
        )),
    };
    Ok(client)
}

fn http_client(settings: &ApiSettings) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
        .user_agent(concat!("warp-planner/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ApiError::Transport(e.to_string()))
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(e.to_string())
    }
}

/// Check the status and decode the body, keeping the raw JSON alongside
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
) -> Result<(T, serde_json::Value), ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(map_reqwest_error)?;

    match status {
        s if s.is_success() => {}
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(ApiError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => return Err(ApiError::RateLimited),
        s => {
            return Err(ApiError::Http {
                status: s.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }
    }

    parse_body(&body)
}

/// Decode a success body into `T` and its raw JSON
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<(T, serde_json::Value), ApiError> {
    let raw: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let parsed = T::deserialize(&raw).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok((parsed, raw))
}

/// Finite value from a JSON number or numeric string
fn finite_number(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// Numeric value from a JSON number or numeric string; anything else
/// (including "NaN" and "inf") is 0
pub(crate) fn number_of(value: &serde_json::Value) -> f64 {
    finite_number(value).unwrap_or(0.0)
}

/// Deserialize a number that vendors may send as a string (missing/null/garbage → 0)
pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.as_ref().map_or(0.0, number_of))
}

/// Like [`lenient_f64`] but keeps "not reported" distinct from zero
pub(crate) fn lenient_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(finite_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CredentialFields;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[test]
    fn test_should_retry() {
        assert!(ApiError::Timeout.should_retry());
        assert!(ApiError::RateLimited.should_retry());
        assert!(ApiError::Transport("reset".into()).should_retry());
        assert!(ApiError::Http { status: 503, body: String::new() }.should_retry());
        assert!(!ApiError::Http { status: 400, body: String::new() }.should_retry());
        assert!(!ApiError::Unauthorized.should_retry());
        assert!(!ApiError::Decode("eof".into()).should_retry());
    }

    /// Stub call that fails with `error` until `failures` attempts have been made
    fn flaky(
        calls: &AtomicUsize,
        failures: usize,
        error: fn() -> ApiError,
    ) -> impl Future<Output = Result<u32, ApiError>> {
        let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move { if attempt <= failures { Err(error()) } else { Ok(7) } }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_backs_off_then_gives_up() {
        let calls = AtomicUsize::new(0);
        let start = tokio::time::Instant::now();
        let result = retry_transient(ApiPlatform::Meta, 3, || {
            flaky(&calls, usize::MAX, || ApiError::Http { status: 503, body: String::new() })
        })
        .await;
        assert!(matches!(result, Err(ApiError::Http { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1 s then 2 s
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_recovers() {
        let calls = AtomicUsize::new(0);
        let result = retry_transient(ApiPlatform::TikTok, 3, || {
            flaky(&calls, 2, || ApiError::RateLimited)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_stops_on_permanent_errors() {
        let calls = AtomicUsize::new(0);
        let result =
            retry_transient(ApiPlatform::LinkedIn, 3, || flaky(&calls, usize::MAX, || ApiError::Unauthorized))
                .await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let calls = AtomicUsize::new(0);
        let result = retry_transient(ApiPlatform::WhatsApp, 3, || {
            flaky(&calls, usize::MAX, || ApiError::Decode("eof".into()))
        })
        .await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_finite_numbers_are_dropped() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_f64")]
            spend: f64,
            #[serde(default, deserialize_with = "lenient_opt_f64")]
            roas: Option<f64>,
            #[serde(default, deserialize_with = "lenient_opt_f64")]
            ctr: Option<f64>,
        }
        let row: Row = serde_json::from_str(r#"{"spend": "NaN", "roas": "inf", "ctr": "-infinity"}"#).unwrap();
        assert_eq!(row.spend, 0.0);
        assert_eq!(row.roas, None);
        assert_eq!(row.ctr, None);
        assert_eq!(number_of(&serde_json::json!("Infinity")), 0.0);
        assert_eq!(number_of(&serde_json::json!("4.5")), 4.5);
    }

    #[test]
    fn test_get_client_requires_fields() {
        let mut fields = CredentialFields::default();
        fields.set("access_token", "tok");
        let creds = ApiCredentials::new(Uuid::nil(), ApiPlatform::TikTok, fields);
        let Err(err) = get_client(&creds, &ApiSettings::default()) else {
            panic!("expected missing credentials");
        };
        assert_eq!(err.to_string(), "missing TikTok credentials: advertiser_id");
    }

    #[test]
    fn test_get_client_builds_matching_variant() {
        let mut fields = CredentialFields::default();
        fields.set("waba_id", "1029");
        fields.set("permanent_access_token", "EAAG");
        let creds = ApiCredentials::new(Uuid::nil(), ApiPlatform::WhatsApp, fields);
        let client = get_client(&creds, &ApiSettings::default()).unwrap();
        assert_eq!(client.platform(), ApiPlatform::WhatsApp);
    }

    #[test]
    fn test_lenient_numbers() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_f64")]
            a: f64,
            #[serde(default, deserialize_with = "lenient_f64")]
            b: f64,
            #[serde(default, deserialize_with = "lenient_f64")]
            c: f64,
            #[serde(default, deserialize_with = "lenient_opt_f64")]
            d: Option<f64>,
            #[serde(default, deserialize_with = "lenient_opt_f64")]
            e: Option<f64>,
        }
        let row: Row = serde_json::from_str(r#"{"a": "12.5", "b": 3, "c": "n/a", "d": null}"#).unwrap();
        assert_eq!(row.a, 12.5);
        assert_eq!(row.b, 3.0);
        assert_eq!(row.c, 0.0);
        assert_eq!(row.d, None);
        assert_eq!(row.e, None);
    }

    #[test]
    fn test_parse_body_keeps_raw() {
        #[derive(Deserialize)]
        struct Body {
            n: u32,
        }
        let (body, raw): (Body, _) = parse_body(r#"{"n": 4, "extra": true}"#).unwrap();
        assert_eq!(body.n, 4);
        assert_eq!(raw["extra"], serde_json::Value::Bool(true));
        assert!(matches!(parse_body::<Body>("<html>"), Err(ApiError::Decode(_))));
    }
}
