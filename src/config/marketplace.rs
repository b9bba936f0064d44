use serde::Deserialize;
use std::fmt;

pub const DEFAULT_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";
pub const DEFAULT_ORDERS_API_BASE: &str = "https://sellingpartnerapi-na.amazon.com";
pub const DEFAULT_GRANTLESS_SCOPE: &str = "sellingpartnerapi::notifications";
pub const DEFAULT_SESSION_NAME: &str = "order-sync";

/// ================================
/// Marketplace (order source) side
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct MarketplaceConfig {
    pub auth_strategy: AuthStrategy,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(flatten)]
    pub credentials: LwaCredentials,
    pub marketplace_id: String,
    /// ISO-8601 lower bound for `CreatedAfter`; a trigger may override it.
    pub created_after: Option<String>,
    /// Fetch line items for every order (logged, never forwarded).
    #[serde(default)]
    pub include_items: bool,
    pub identity: Option<IdentityConfig>,
}

/// Which exchange produces the bearer token, and whether a temporary
/// identity is assumed afterwards.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthStrategy {
    RefreshToken,
    ClientCredentials,
    ClientCredentialsAssumedRole,
}

impl AuthStrategy {
    pub fn grant_type(&self) -> &'static str {
        match self {
            AuthStrategy::RefreshToken => "refresh_token",
            AuthStrategy::ClientCredentials | AuthStrategy::ClientCredentialsAssumedRole => {
                "client_credentials"
            }
        }
    }

    pub fn assumes_identity(&self) -> bool {
        matches!(self, AuthStrategy::ClientCredentialsAssumedRole)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStrategy::RefreshToken => "refresh_token",
            AuthStrategy::ClientCredentials => "client_credentials",
            AuthStrategy::ClientCredentialsAssumedRole => "client_credentials_assumed_role",
        }
    }
}

/// LWA application credentials.
#[derive(Deserialize, Clone)]
pub struct LwaCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl fmt::Debug for LwaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LwaCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("scope", &self.scope)
            .finish()
    }
}

/// IAM user and role used for the STS `AssumeRole` step.
#[derive(Deserialize, Clone)]
pub struct IdentityConfig {
    pub role_arn: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default = "default_session_name")]
    pub session_name: String,
    /// Defaults to the regional endpoint `https://sts.{region}.amazonaws.com`.
    pub sts_endpoint: Option<String>,
    pub duration_seconds: Option<u32>,
}

impl IdentityConfig {
    pub fn sts_endpoint(&self) -> String {
        self.sts_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://sts.{}.amazonaws.com", self.region))
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("role_arn", &self.role_arn)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_name", &self.session_name)
            .field("sts_endpoint", &self.sts_endpoint)
            .field("duration_seconds", &self.duration_seconds)
            .finish()
    }
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_ORDERS_API_BASE.to_string()
}

fn default_scope() -> String {
    DEFAULT_GRANTLESS_SCOPE.to_string()
}

fn default_session_name() -> String {
    DEFAULT_SESSION_NAME.to_string()
}
