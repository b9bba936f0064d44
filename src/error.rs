//! Error taxonomy for the sync pipeline.
//!
//! Auth and upstream failures abort a trigger; forward failures are
//! handled per record according to the configured forward mode.

use http::StatusCode;
use thiserror::Error;

/// Request signing failed before anything was sent.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("request url has no host")]
    MissingHost,
    #[error("invalid header value for '{0}'")]
    InvalidHeader(&'static str),
    #[error("invalid signing key")]
    InvalidKey,
}

/// Token or temporary identity exchange failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("{endpoint} response could not be parsed: {reason}")]
    Parse {
        endpoint: &'static str,
        reason: String,
    },
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("identity is required for strategy '{0}' but is not configured")]
    MissingIdentity(&'static str),
    #[error("refresh token is required for strategy 'refresh_token'")]
    MissingRefreshToken,
    #[error("signing sts request failed: {0}")]
    Signing(#[from] SigningError),
}

/// Order or order-item listing failed.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("{endpoint} response could not be parsed: {reason}")]
    Parse { endpoint: String, reason: String },
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("signing listing request failed: {0}")]
    Signing(#[from] SigningError),
}

/// Destination push failed.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("destination returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("destination response could not be parsed: {0}")]
    Parse(String),
    #[error("destination request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Hard failure of a sync trigger.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("auth: {0}")]
    Auth(#[from] AuthError),
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Keeps error bodies in logs and responses bounded.
pub(crate) fn truncate_body(body: String) -> String {
    const MAX: usize = 512;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("denied".to_owned()), "denied");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(400);
        let out = truncate_body(body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 515);
    }

    #[test]
    fn sync_error_carries_auth_message() {
        let err = SyncError::from(AuthError::Status {
            endpoint: "token endpoint",
            status: StatusCode::UNAUTHORIZED,
            body: "invalid_client".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            "auth: token endpoint returned 401 Unauthorized: invalid_client"
        );
    }
}
