//! Subscription Entitlements
//!
//! Gates platform pages on the visitor's subscriptions. The bearer token is
//! issued by the auth service and only decoded here; signature checks
//! happen server-side when the token is presented to the API.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::{PaymentError, Result};

const DEFAULT_AUTH_API_URL: &str = "https://windload-api.onrender.com";
const DEFAULT_AUTH_LOGIN_URL: &str = "https://windload-auth.onrender.com";
const SUBSCRIPTIONS_PATH: &str = "/api/auth/user-subscriptions";

/// Auth service locations
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntitlementConfig {
    /// API answering subscription lookups
    pub api_url: String,
    /// Login page visitors are sent to
    pub login_url: String,
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_AUTH_API_URL.into(),
            login_url: DEFAULT_AUTH_LOGIN_URL.into(),
        }
    }
}

impl EntitlementConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("WINDLOAD_AUTH_API_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_API_URL.into()),
            login_url: std::env::var("WINDLOAD_AUTH_LOGIN_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_LOGIN_URL.into()),
        }
    }
}

// ============================================================================
// Token
// ============================================================================

/// Claims carried in the bearer token payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default = "default_role")]
    pub role: String,

    /// Expiry, seconds since the epoch
    #[serde(default)]
    pub exp: Option<i64>,
}

fn default_role() -> String {
    "user".into()
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

impl TokenClaims {
    /// Decode the payload segment of a `header.payload[.signature]` token
    pub fn decode(token: &str) -> Result<Self> {
        let payload = token
            .trim()
            .split('.')
            .nth(1)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PaymentError::InvalidToken("missing payload segment".into()))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| PaymentError::InvalidToken(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| PaymentError::InvalidToken(e.to_string()))
    }

    /// Tokens without an expiry never expire
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp < now.timestamp())
    }
}

/// Token handed over in an auto-login link's `token` parameter
pub fn token_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Login page URL that returns the visitor to `return_url` afterwards
pub fn login_redirect_url(auth_url: &str, return_url: &str) -> Result<String> {
    let mut url = Url::parse(auth_url).map_err(|e| PaymentError::Config(format!("auth url: {e}")))?;
    url.query_pairs_mut().append_pair("return_url", return_url);
    Ok(url.into())
}

// ============================================================================
// Subscriptions
// ============================================================================

/// One active subscription
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub product_code: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Answer from the subscription lookup
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSummary {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub has_bip: bool,
    #[serde(default)]
    pub has_calculator: bool,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Source of a user's subscriptions
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SubscriptionSource: Send + Sync {
    async fn load(&self, token: &str, claims: &TokenClaims) -> Result<SubscriptionSummary>;
}

/// Subscription lookup against the auth API
pub struct HttpSubscriptionSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubscriptionSource {
    pub fn new(config: &EntitlementConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{SUBSCRIPTIONS_PATH}", config.api_url.trim_end_matches('/')),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SubscriptionSource for HttpSubscriptionSource {
    async fn load(&self, token: &str, claims: &TokenClaims) -> Result<SubscriptionSummary> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&serde_json::json!({ "user_id": claims.user_id }))
            .send()
            .await?;

        let status = response.status();
        let summary: SubscriptionSummary = response
            .json()
            .await
            .map_err(|e| PaymentError::Subscriptions(format!("HTTP {status}: {e}")))?;

        if summary.success {
            Ok(summary)
        } else {
            Err(PaymentError::Subscriptions(
                summary.error.unwrap_or_else(|| format!("HTTP {status}")),
            ))
        }
    }
}

// ============================================================================
// Tiers and features
// ============================================================================

/// Building Intelligence Platform tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTier {
    Starter,
    Pro,
    Premium,
}

impl PlatformTier {
    pub fn from_product_code(code: &str) -> Option<Self> {
        match code {
            "bip_starter" => Some(Self::Starter),
            "bip_pro" => Some(Self::Pro),
            "bip_premium" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Highest tier among the subscribed product codes
    pub fn highest<'a>(codes: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        codes.into_iter().filter_map(Self::from_product_code).max()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Premium => "premium",
        }
    }

    pub const fn features(self) -> &'static [Feature] {
        match self {
            Self::Starter => &[
                Feature::WindVelocity,
                Feature::HurricaneRisk,
                Feature::SolarFinder,
                Feature::BasicExport,
            ],
            Self::Pro => &[
                Feature::WindVelocity,
                Feature::HurricaneRisk,
                Feature::SolarFinder,
                Feature::BasicExport,
                Feature::MultiZipComparison,
                Feature::EnhancedExport,
                Feature::ApiAccess,
            ],
            Self::Premium => &[
                Feature::WindVelocity,
                Feature::HurricaneRisk,
                Feature::SolarFinder,
                Feature::BasicExport,
                Feature::MultiZipComparison,
                Feature::EnhancedExport,
                Feature::ApiAccess,
                Feature::AiReports,
                Feature::UnlimitedExports,
                Feature::PrioritySupport,
            ],
        }
    }

    pub fn allows(self, feature: Feature) -> bool {
        self.features().contains(&feature)
    }

    pub const fn export_access(self) -> ExportAccess {
        match self {
            Self::Starter => ExportAccess::PdfOnly,
            Self::Pro | Self::Premium => ExportAccess::All,
        }
    }
}

impl std::fmt::Display for PlatformTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gated platform feature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    WindVelocity,
    HurricaneRisk,
    SolarFinder,
    BasicExport,
    MultiZipComparison,
    EnhancedExport,
    ApiAccess,
    AiReports,
    UnlimitedExports,
    PrioritySupport,
}

/// Which report exports a user may run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportAccess {
    #[default]
    None,
    PdfOnly,
    All,
}

/// What a signed-in user may do
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    pub claims: TokenClaims,
    pub tier: Option<PlatformTier>,
    pub has_platform: bool,
    pub has_calculator: bool,
}

impl Entitlements {
    pub fn from_summary(claims: TokenClaims, summary: &SubscriptionSummary) -> Self {
        Self {
            claims,
            tier: PlatformTier::highest(summary.subscriptions.iter().map(|s| s.product_code.as_str())),
            has_platform: summary.has_bip,
            has_calculator: summary.has_calculator,
        }
    }

    /// Signed in, but nothing could be confirmed
    pub const fn unverified(claims: TokenClaims) -> Self {
        Self {
            claims,
            tier: None,
            has_platform: false,
            has_calculator: false,
        }
    }

    pub fn can_access(&self, feature: Feature) -> bool {
        self.tier.is_some_and(|tier| tier.allows(feature))
    }

    pub fn export_access(&self) -> ExportAccess {
        self.tier.map_or(ExportAccess::None, PlatformTier::export_access)
    }

    /// Label for the plan badge
    pub fn tier_label(&self) -> String {
        self.tier
            .map_or_else(|| "NO SUBSCRIPTION".into(), |t| t.as_str().to_uppercase())
    }
}

// ============================================================================
// Gate
// ============================================================================

/// Outcome of gating a platform page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// No usable token; send the visitor to the login page
    LoginRequired,
    /// Signed in without platform access; show the shop link
    SubscriptionRequired(Entitlements),
    Granted(Entitlements),
}

impl GateDecision {
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Decides whether a visitor may use the platform
pub struct EntitlementGate<S: SubscriptionSource> {
    source: S,
    config: EntitlementConfig,
}

impl EntitlementGate<HttpSubscriptionSource> {
    pub fn from_env() -> Self {
        let config = EntitlementConfig::from_env();
        Self::new(HttpSubscriptionSource::new(&config), config)
    }
}

impl<S: SubscriptionSource> EntitlementGate<S> {
    pub const fn new(source: S, config: EntitlementConfig) -> Self {
        Self { source, config }
    }

    pub const fn config(&self) -> &EntitlementConfig {
        &self.config
    }

    /// Gate a visitor holding `token` at time `now`
    pub async fn evaluate(&self, token: Option<&str>, now: DateTime<Utc>) -> GateDecision {
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            tracing::debug!("No token");
            return GateDecision::LoginRequired;
        };

        let claims = match TokenClaims::decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting token");
                return GateDecision::LoginRequired;
            }
        };

        if claims.is_expired_at(now) {
            tracing::info!(user_id = %claims.user_id, "Token expired");
            return GateDecision::LoginRequired;
        }

        let entitlements = match self.source.load(token, &claims).await {
            Ok(summary) => Entitlements::from_summary(claims, &summary),
            Err(e) => {
                tracing::error!(user_id = %claims.user_id, error = %e, "Failed to load subscriptions");
                return GateDecision::SubscriptionRequired(Entitlements::unverified(claims));
            }
        };

        if entitlements.has_platform {
            tracing::info!(
                user_id = %entitlements.claims.user_id,
                tier = ?entitlements.tier,
                "Platform access granted"
            );
            GateDecision::Granted(entitlements)
        } else {
            GateDecision::SubscriptionRequired(entitlements)
        }
    }

    /// Where to send a visitor who must log in
    pub fn login_redirect(&self, return_url: &str) -> Result<String> {
        login_redirect_url(&self.config.login_url, return_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token_with(payload: &serde_json::Value) -> String {
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("eyJhbGciOiJIUzI1NiJ9.{body}.sig")
    }

    struct FixedSource(Result<SubscriptionSummary>);

    #[async_trait]
    impl SubscriptionSource for FixedSource {
        async fn load(&self, _token: &str, _claims: &TokenClaims) -> Result<SubscriptionSummary> {
            match &self.0 {
                Ok(summary) => Ok(summary.clone()),
                Err(e) => Err(PaymentError::Subscriptions(e.to_string())),
            }
        }
    }

    fn summary(codes: &[&str]) -> SubscriptionSummary {
        SubscriptionSummary {
            success: true,
            has_bip: codes.iter().any(|c| c.starts_with("bip_")),
            has_calculator: codes.iter().any(|c| c.starts_with("cc_")),
            subscriptions: codes
                .iter()
                .map(|c| SubscriptionRecord {
                    product_code: (*c).into(),
                    status: Some("active".into()),
                })
                .collect(),
            error: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_decode_claims() {
        let token = token_with(&serde_json::json!({
            "user_id": 42,
            "email": "eng@example.com",
            "exp": now().timestamp() + 60
        }));
        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.user_id, "42");
        assert_eq!(claims.role, "user");
        assert!(!claims.is_expired_at(now()));
        assert!(claims.is_expired_at(now() + chrono::Duration::minutes(2)));

        let token = token_with(&serde_json::json!({ "user_id": "u-7", "role": "admin" }));
        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.user_id, "u-7");
        assert_eq!(claims.role, "admin");
        assert!(!claims.is_expired_at(now()));
    }

    #[test]
    fn test_malformed_tokens() {
        for token in ["", "nodots", "a..c", "a.!!!.c", "a.bm90IGpzb24.c"] {
            assert!(
                matches!(TokenClaims::decode(token), Err(PaymentError::InvalidToken(_))),
                "{token}"
            );
        }
    }

    #[test]
    fn test_highest_tier_wins() {
        assert_eq!(
            PlatformTier::highest(["cc_walls_pro", "bip_starter", "bip_premium", "bip_pro"]),
            Some(PlatformTier::Premium)
        );
        assert_eq!(PlatformTier::highest(["cc_walls_pro"]), None);
    }

    #[test]
    fn test_feature_table() {
        assert!(PlatformTier::Starter.allows(Feature::SolarFinder));
        assert!(!PlatformTier::Starter.allows(Feature::ApiAccess));
        assert!(PlatformTier::Pro.allows(Feature::MultiZipComparison));
        assert!(!PlatformTier::Pro.allows(Feature::AiReports));
        assert!(PlatformTier::Premium.allows(Feature::PrioritySupport));
        assert!(PlatformTier::Premium.allows(Feature::AiReports));

        assert_eq!(PlatformTier::Starter.export_access(), ExportAccess::PdfOnly);
        assert_eq!(PlatformTier::Pro.export_access(), ExportAccess::All);

        let claims = TokenClaims::decode(&token_with(&serde_json::json!({ "user_id": 1 }))).unwrap();
        let none = Entitlements::unverified(claims);
        assert!(!none.can_access(Feature::WindVelocity));
        assert_eq!(none.export_access(), ExportAccess::None);
        assert_eq!(none.tier_label(), "NO SUBSCRIPTION");
    }

    #[test]
    fn test_url_helpers() {
        assert_eq!(
            token_from_url("https://windloadcalc.com/bip.html?token=abc.def.ghi&x=1").as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(token_from_url("https://windloadcalc.com/bip.html"), None);
        assert_eq!(token_from_url("not a url"), None);

        let url = login_redirect_url(
            "https://windload-auth.onrender.com",
            "https://windloadcalc.com/bip.html?a=1&b=2",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://windload-auth.onrender.com/?return_url=https%3A%2F%2Fwindloadcalc.com%2Fbip.html%3Fa%3D1%26b%3D2"
        );
    }

    #[tokio::test]
    async fn test_gate_decisions() {
        let gate = EntitlementGate::new(FixedSource(Ok(summary(&["bip_pro"]))), EntitlementConfig::default());
        let good = token_with(&serde_json::json!({ "user_id": 9, "exp": now().timestamp() + 3600 }));
        let expired = token_with(&serde_json::json!({ "user_id": 9, "exp": now().timestamp() - 1 }));

        assert_eq!(gate.evaluate(None, now()).await, GateDecision::LoginRequired);
        assert_eq!(gate.evaluate(Some("garbage"), now()).await, GateDecision::LoginRequired);
        assert_eq!(gate.evaluate(Some(&expired), now()).await, GateDecision::LoginRequired);

        match gate.evaluate(Some(&good), now()).await {
            GateDecision::Granted(ent) => {
                assert_eq!(ent.tier, Some(PlatformTier::Pro));
                assert!(ent.can_access(Feature::ApiAccess));
            }
            other => panic!("unexpected {other:?}"),
        }

        let calc_only =
            EntitlementGate::new(FixedSource(Ok(summary(&["cc_walls_starter"]))), EntitlementConfig::default());
        match calc_only.evaluate(Some(&good), now()).await {
            GateDecision::SubscriptionRequired(ent) => assert!(ent.has_calculator),
            other => panic!("unexpected {other:?}"),
        }

        let failing = EntitlementGate::new(
            FixedSource(Err(PaymentError::Network("down".into()))),
            EntitlementConfig::default(),
        );
        assert!(matches!(
            failing.evaluate(Some(&good), now()).await,
            GateDecision::SubscriptionRequired(_)
        ));
    }
}
