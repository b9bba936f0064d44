use reqwest::{header, Client, Method, Request, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::credential::TemporaryIdentity;
use crate::auth::sigv4::RequestSigner;
use crate::config::marketplace::IdentityConfig;
use crate::error::{truncate_body, AuthError};
use crate::helpers::time::now_utc;
use crate::observability::metrics::get_metrics;

const ENDPOINT: &str = "sts endpoint";
const STS_SERVICE: &str = "sts";
const STS_VERSION: &str = "2011-06-15";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleEnvelope {
    assume_role_response: AssumeRoleResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    assume_role_result: AssumeRoleResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResult {
    credentials: StsCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
}

/// Assumes a role through the STS query API and returns the temporary keys.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    client: Client,
    config: IdentityConfig,
}

impl IdentityProvider {
    pub fn new(client: Client, config: IdentityConfig) -> Self {
        Self { client, config }
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// One `AssumeRole` call, signed with the long-lived IAM user keys.
    pub async fn assume_identity(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<TemporaryIdentity, AuthError> {
        let metrics = get_metrics().await;
        metrics.identity_requests.inc();

        let result = self.assume_role(role_arn, session_name).await;
        match &result {
            Ok(identity) => info!(
                role_arn,
                access_key_id = %identity.access_key_id,
                "temporary identity assumed"
            ),
            Err(err) => {
                warn!(role_arn, error = %err, "assume role failed");
                metrics.identity_failures.inc();
            }
        }
        result
    }

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<TemporaryIdentity, AuthError> {
        let endpoint = self.config.sts_endpoint();
        let url = Url::parse(&endpoint).map_err(|e| AuthError::Parse {
            endpoint: ENDPOINT,
            reason: format!("invalid url '{}': {}", endpoint, e),
        })?;

        let mut params: Vec<(&str, String)> = vec![
            ("Action", "AssumeRole".to_owned()),
            ("Version", STS_VERSION.to_owned()),
            ("RoleArn", role_arn.to_owned()),
            ("RoleSessionName", session_name.to_owned()),
        ];
        if let Some(duration) = self.config.duration_seconds {
            params.push(("DurationSeconds", duration.to_string()));
        }
        let body = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let mut request = Request::new(Method::POST, url);
        let headers = request.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(body.into());

        let signer = RequestSigner::new(
            self.config.access_key_id.clone(),
            self.config.secret_access_key.clone(),
            None,
            self.config.region.clone(),
            STS_SERVICE,
        );
        signer.sign(&mut request, now_utc())?;

        debug!(url = %endpoint, role_arn, "requesting temporary identity");
        let response = self
            .client
            .execute(request)
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

        let envelope: AssumeRoleEnvelope =
            serde_json::from_str(&body).map_err(|e| AuthError::Parse {
                endpoint: ENDPOINT,
                reason: e.to_string(),
            })?;
        let creds = envelope.assume_role_response.assume_role_result.credentials;
        Ok(TemporaryIdentity {
            access_key_id: creds.access_key_id,
            secret_access_key: creds.secret_access_key,
            session_token: creds.session_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::build_reqwest_client;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    fn identity_config(endpoint: String) -> IdentityConfig {
        IdentityConfig {
            role_arn: "arn:aws:iam::123456789012:role/SellingPartner".to_owned(),
            region: "us-east-1".to_owned(),
            access_key_id: "AKIDEXAMPLE".to_owned(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_owned(),
            session_name: "order-sync".to_owned(),
            sts_endpoint: Some(endpoint),
            duration_seconds: None,
        }
    }

    #[tokio::test]
    async fn assume_identity_returns_temporary_keys() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .header("accept", "application/json")
                .header_exists("authorization")
                .header_exists("x-amz-date");
            then.status(200).json_body(json!({
                "AssumeRoleResponse": {
                    "AssumeRoleResult": {
                        "AssumedRoleUser": {
                            "Arn": "arn:aws:sts::123456789012:assumed-role/SellingPartner/order-sync",
                            "AssumedRoleId": "AROAEXAMPLE:order-sync"
                        },
                        "Credentials": {
                            "AccessKeyId": "ASIATEMP",
                            "Expiration": 1.7e9,
                            "SecretAccessKey": "temp-secret",
                            "SessionToken": "temp-session"
                        }
                    },
                    "ResponseMetadata": {"RequestId": "c6104cbe"}
                }
            }));
        });
        let provider = IdentityProvider::new(build_reqwest_client(), identity_config(server.url("/")));

        let identity = provider
            .assume_identity("arn:aws:iam::123456789012:role/SellingPartner", "order-sync")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(identity.access_key_id, "ASIATEMP");
        assert_eq!(identity.secret_access_key, "temp-secret");
        assert_eq!(identity.session_token, "temp-session");
    }

    #[tokio::test]
    async fn access_denied_is_auth_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/");
            then.status(403).json_body(json!({
                "Error": {"Code": "AccessDenied", "Message": "not authorized to perform sts:AssumeRole"}
            }));
        });
        let provider = IdentityProvider::new(build_reqwest_client(), identity_config(server.url("/")));

        let err = provider
            .assume_identity("arn:aws:iam::123456789012:role/SellingPartner", "order-sync")
            .await
            .unwrap_err();

        match err {
            AuthError::Status { endpoint, body, .. } => {
                assert_eq!(endpoint, ENDPOINT);
                assert!(body.contains("AccessDenied"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
