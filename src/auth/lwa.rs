use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::credential::Credential;
use crate::config::marketplace::{AuthStrategy, LwaCredentials};
use crate::error::{truncate_body, AuthError};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;

const ENDPOINT: &str = "token endpoint";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges LWA application credentials for a bearer token.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    client: Client,
    token_url: String,
}

impl TokenProvider {
    pub fn new(client: Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }

    /// Runs the grant selected by `strategy`. The assumed-role strategy only
    /// contributes its client-credentials grant here.
    pub async fn acquire_token(
        &self,
        strategy: AuthStrategy,
        credentials: &LwaCredentials,
    ) -> Result<Credential, AuthError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        let strategy_label = strategy.as_str();
        metrics
            .token_requests
            .with_label_values(&[strategy_label])
            .inc();

        let result = self.exchange(strategy, credentials).await;
        metrics
            .token_duration
            .with_label_values(&[strategy_label])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => info!(strategy = strategy_label, "token acquired"),
            Err(err) => {
                warn!(strategy = strategy_label, error = %err, "token exchange failed");
                metrics
                    .token_failures
                    .with_label_values(&[strategy_label])
                    .inc();
            }
        }
        result
    }

    async fn exchange(
        &self,
        strategy: AuthStrategy,
        credentials: &LwaCredentials,
    ) -> Result<Credential, AuthError> {
        let mut form: Vec<(&str, &str)> = vec![("grant_type", strategy.grant_type())];
        match strategy {
            AuthStrategy::RefreshToken => {
                let refresh_token = credentials
                    .refresh_token
                    .as_deref()
                    .ok_or(AuthError::MissingRefreshToken)?;
                form.push(("refresh_token", refresh_token));
            }
            AuthStrategy::ClientCredentials | AuthStrategy::ClientCredentialsAssumedRole => {
                form.push(("scope", credentials.scope.as_str()));
            }
        }
        form.push(("client_id", credentials.client_id.as_str()));
        form.push(("client_secret", credentials.client_secret.as_str()));

        debug!(url = %self.token_url, grant_type = strategy.grant_type(), "requesting token");
        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|source| AuthError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| AuthError::Transport {
            endpoint: ENDPOINT,
            source,
        })?;
        if !status.is_success() {
            return Err(AuthError::Status {
                endpoint: ENDPOINT,
                status,
                body: truncate_body(body),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| AuthError::Parse {
            endpoint: ENDPOINT,
            reason: e.to_string(),
        })?;
        Ok(Credential::new(token.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::marketplace::DEFAULT_GRANTLESS_SCOPE;
    use crate::tests::common::{build_reqwest_client, spawn_axum};
    use axum::{routing::post, Form, Json, Router};
    use http::StatusCode;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn lwa_credentials(refresh_token: Option<&str>) -> LwaCredentials {
        LwaCredentials {
            client_id: "client-1".to_owned(),
            client_secret: "secret-1".to_owned(),
            refresh_token: refresh_token.map(str::to_owned),
            scope: DEFAULT_GRANTLESS_SCOPE.to_owned(),
        }
    }

    /// Token endpoint that records every submitted form.
    async fn recording_token_server() -> (
        tokio::task::JoinHandle<()>,
        String,
        Arc<Mutex<Vec<HashMap<String, String>>>>,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let router = Router::new().route(
            "/auth/o2/token",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let seen = seen_clone.clone();
                async move {
                    seen.lock().unwrap().push(form);
                    Json(json!({"access_token": "T", "token_type": "bearer", "expires_in": 3600}))
                }
            }),
        );
        let (handle, addr) = spawn_axum(router).await;
        (handle, format!("http://{}/auth/o2/token", addr), seen)
    }

    #[tokio::test]
    async fn refresh_token_grant_returns_access_token() {
        let (handle, url, seen) = recording_token_server().await;
        let provider = TokenProvider::new(build_reqwest_client(), url);

        let credential = provider
            .acquire_token(AuthStrategy::RefreshToken, &lwa_credentials(Some("Atzr|r")))
            .await
            .unwrap();

        assert_eq!(credential.as_str(), "T");
        let forms = seen.lock().unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0]["grant_type"], "refresh_token");
        assert_eq!(forms[0]["refresh_token"], "Atzr|r");
        assert_eq!(forms[0]["client_id"], "client-1");
        assert_eq!(forms[0]["client_secret"], "secret-1");
        assert!(!forms[0].contains_key("scope"));
        handle.abort();
    }

    #[tokio::test]
    async fn client_credentials_grant_sends_scope() {
        let (handle, url, seen) = recording_token_server().await;
        let provider = TokenProvider::new(build_reqwest_client(), url);

        let credential = provider
            .acquire_token(AuthStrategy::ClientCredentials, &lwa_credentials(None))
            .await
            .unwrap();

        assert_eq!(credential.as_str(), "T");
        let forms = seen.lock().unwrap();
        assert_eq!(forms[0]["grant_type"], "client_credentials");
        assert_eq!(forms[0]["scope"], DEFAULT_GRANTLESS_SCOPE);
        assert!(!forms[0].contains_key("refresh_token"));
        handle.abort();
    }

    #[tokio::test]
    async fn unauthorized_is_auth_error() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/auth/o2/token");
            then.status(401)
                .json_body(json!({"error": "invalid_client", "error_description": "Client authentication failed"}));
        });
        let provider = TokenProvider::new(build_reqwest_client(), server.url("/auth/o2/token"));

        let err = provider
            .acquire_token(AuthStrategy::RefreshToken, &lwa_credentials(Some("r")))
            .await
            .unwrap_err();

        mock.assert();
        match err {
            AuthError::Status { status, body, .. } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(body.contains("invalid_client"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn body_without_access_token_is_parse_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/auth/o2/token");
            then.status(200).body("<html>maintenance</html>");
        });
        let provider = TokenProvider::new(build_reqwest_client(), server.url("/auth/o2/token"));

        let err = provider
            .acquire_token(AuthStrategy::ClientCredentials, &lwa_credentials(None))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Parse { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn refresh_strategy_without_refresh_token_fails_before_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/auth/o2/token");
            then.status(200).json_body(json!({"access_token": "T"}));
        });
        let provider = TokenProvider::new(build_reqwest_client(), server.url("/auth/o2/token"));

        let err = provider
            .acquire_token(AuthStrategy::RefreshToken, &lwa_credentials(None))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MissingRefreshToken));
        assert_eq!(mock.hits(), 0);
    }
}
