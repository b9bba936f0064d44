//! AWS Signature Version 4 signing for outgoing reqwest requests.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, HOST};
use reqwest::{Request, Url};
use sha2::{Digest, Sha256};

use crate::auth::credential::TemporaryIdentity;
use crate::error::SigningError;
use crate::helpers::time::{amz_date, amz_short_date};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// Signs requests with a key pair (and optional session token) for one
/// region/service scope.
#[derive(Clone)]
pub struct RequestSigner {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    region: String,
    service: String,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("access_key_id", &self.access_key_id)
            .field("region", &self.region)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Signing adapter for calls made under an assumed identity.
    pub fn from_identity(identity: &TemporaryIdentity, region: &str, service: &str) -> Self {
        Self::new(
            identity.access_key_id.clone(),
            identity.secret_access_key.clone(),
            Some(identity.session_token.clone()),
            region,
            service,
        )
    }

    /// Adds `host`, `x-amz-date`, `x-amz-security-token` (when present) and
    /// `authorization`. Every header already on the request is signed.
    pub fn sign(&self, request: &mut Request, now: DateTime<Utc>) -> Result<(), SigningError> {
        let date_time = amz_date(&now);
        let date = amz_short_date(&now);
        let host = host_header(request.url())?;

        let headers = request.headers_mut();
        headers.remove(AUTHORIZATION);
        headers.insert(
            HOST,
            HeaderValue::from_str(&host).map_err(|_| SigningError::InvalidHeader("host"))?,
        );
        headers.insert(
            HeaderName::from_static(X_AMZ_DATE),
            HeaderValue::from_str(&date_time).map_err(|_| SigningError::InvalidHeader(X_AMZ_DATE))?,
        );
        if let Some(token) = &self.session_token {
            headers.insert(
                HeaderName::from_static(X_AMZ_SECURITY_TOKEN),
                HeaderValue::from_str(token)
                    .map_err(|_| SigningError::InvalidHeader(X_AMZ_SECURITY_TOKEN))?,
            );
        }

        let payload: &[u8] = request.body().and_then(|b| b.as_bytes()).unwrap_or(&[]);
        let (canonical_headers, signed_headers) = canonical_headers(request);
        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            request.method().as_str(),
            canonical_uri(request.url()),
            canonical_query(request.url()),
            canonical_headers,
            signed_headers,
            hex_sha256(payload),
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            date_time,
            scope,
            hex_sha256(canonical_request.as_bytes())
        );
        let key = signing_key(&self.secret_access_key, &date, &self.region, &self.service)?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key_id, scope, signed_headers, signature
        );
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&authorization)
                .map_err(|_| SigningError::InvalidHeader("authorization"))?,
        );
        Ok(())
    }
}

fn host_header(url: &Url) -> Result<String, SigningError> {
    let host = url.host_str().ok_or(SigningError::MissingHost)?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_owned(),
    })
}

/// The request path with every segment encoded once more; `url.path()` is
/// already percent-encoded and non-S3 services sign the double-encoded form.
pub(crate) fn canonical_uri(url: &Url) -> String {
    match url.path() {
        "" => "/".to_owned(),
        path => path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/"),
    }
}

/// Query pairs re-encoded with RFC 3986 unreserved rules and sorted.
pub(crate) fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (urlencoding::encode(&k).into_owned(), urlencoding::encode(&v).into_owned()))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Returns (canonical header block, signed header list).
fn canonical_headers(request: &Request) -> (String, String) {
    let mut entries: Vec<(String, String)> = Vec::new();
    for name in request.headers().keys() {
        if *name == AUTHORIZATION {
            continue;
        }
        let value = request
            .headers()
            .get_all(name)
            .iter()
            .map(|v| normalize_value(&String::from_utf8_lossy(v.as_bytes())))
            .collect::<Vec<_>>()
            .join(",");
        entries.push((name.as_str().to_lowercase(), value));
    }
    entries.sort();

    let block = entries
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v))
        .collect::<String>();
    let signed = entries
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (block, signed)
}

fn normalize_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SigningError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub(crate) fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
