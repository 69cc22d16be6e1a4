// Request authentication: API key headers and owner request signing

use super::config::AccountConfig;
use super::error::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

pub const CONTENT_TYPE: &str = "application/json";
pub const USER_AGENT: &str = "lecli";

/// RFC 1123 date as expected in the `Date` header of signed requests
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

type HmacSha1 = Hmac<Sha1>;

/// Credential tier used for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyKind {
    /// `ro_api_key` sent as `x-api-key`
    ReadOnly,
    /// `rw_api_key` sent as `x-api-key`
    ReadWrite,
    /// HMAC-signed with the owner key
    Owner,
}

impl std::fmt::Display for ApiKeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKeyKind::ReadOnly => write!(f, "ro"),
            ApiKeyKind::ReadWrite => write!(f, "rw"),
            ApiKeyKind::Owner => write!(f, "owner"),
        }
    }
}

/// Compute the owner signature of a request
///
/// canonical = method + content_type + date + path + base64(sha256(body))
/// signature = base64(hmac_sha1(api_key, canonical))
///
/// `path` is the request path without a leading slash and `body` must be the
/// exact bytes sent on the wire (empty string when there is no body).
pub fn sign(
    api_key: &str,
    date: &str,
    content_type: &str,
    method: &str,
    path: &str,
    body: &str,
) -> String {
    let hashed_body = BASE64.encode(Sha256::digest(body.as_bytes()));
    let canonical = format!("{}{}{}{}{}", method, content_type, date, path, hashed_body);

    // HMAC accepts keys of any length
    let mut mac = HmacSha1::new_from_slice(api_key.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC key of any size is valid"));
    mac.update(canonical.as_bytes());

    BASE64.encode(mac.finalize().into_bytes())
}

/// Build request headers for the given credential tier
///
/// # Arguments
/// * `method` - HTTP method (only used for owner signing)
/// * `path` - signed request path (only used for owner signing)
/// * `body` - serialized body (only used for owner signing)
/// * `now` - request time (only used for owner signing)
pub fn generate_headers(
    kind: ApiKeyKind,
    config: &AccountConfig,
    method: &str,
    path: &str,
    body: &str,
    now: DateTime<Utc>,
) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::with_capacity(4);

    match kind {
        ApiKeyKind::ReadOnly => {
            headers.push(("x-api-key".to_string(), config.ro_api_key()?.to_string()));
        }
        ApiKeyKind::ReadWrite => {
            headers.push(("x-api-key".to_string(), config.rw_api_key()?.to_string()));
        }
        ApiKeyKind::Owner => {
            let date = now.format(DATE_FORMAT).to_string();
            let signature = sign(
                config.owner_api_key()?,
                &date,
                CONTENT_TYPE,
                method,
                path,
                body,
            );
            headers.push((
                "authorization-api-key".to_string(),
                format!("{}:{}", config.owner_api_key_id()?, signature),
            ));
            headers.push(("Date".to_string(), date));
        }
    }

    headers.push(("Content-Type".to_string(), CONTENT_TYPE.to_string()));
    headers.push(("User-Agent".to_string(), USER_AGENT.to_string()));

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KEY: &str = "123456789012345678901234567890123456";
    const KEY_ID: &str = "abcdefghijabcdefghijabcdefghijabcdef";
    const DATE: &str = "Mon, 06 Jun 2016 10:00:00 GMT";
    const PATH: &str = "management/accounts/abc/users";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 6, 6, 10, 0, 0).unwrap()
    }

    fn config() -> AccountConfig {
        let mut config = AccountConfig::default();
        config.auth.ro_api_key = Some(KEY.to_string());
        config.auth.rw_api_key = Some(KEY.to_string());
        config.auth.owner_api_key = Some(KEY.to_string());
        config.auth.owner_api_key_id = Some(KEY_ID.to_string());
        config
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_sign_empty_body() {
        let signature = sign(KEY, DATE, CONTENT_TYPE, "GET", PATH, "");
        assert_eq!(signature, "rapX0/W3lgwKTaF9dIRpuBIyQvg=");
    }

    #[test]
    fn test_sign_covers_method_and_body() {
        let body = r#"{"apikey":{"active":true}}"#;
        assert_eq!(
            sign(KEY, DATE, CONTENT_TYPE, "PATCH", PATH, body),
            "8Th4dQTt7JtXLVkiMHPt1EjQ+/E="
        );
        assert_eq!(
            sign(KEY, DATE, CONTENT_TYPE, "PATCH", PATH, ""),
            "g69asv7ng+a3bF/3Rd2ue+CAWiE="
        );
    }

    #[test]
    fn test_rw_headers() {
        let headers =
            generate_headers(ApiKeyKind::ReadWrite, &config(), "GET", PATH, "", now()).unwrap();
        assert_eq!(header(&headers, "x-api-key"), Some(KEY));
        assert_eq!(header(&headers, "User-Agent"), Some("lecli"));
        assert_eq!(header(&headers, "Content-Type"), Some("application/json"));
        assert!(header(&headers, "authorization-api-key").is_none());
    }

    #[test]
    fn test_owner_headers_are_signed() {
        let headers =
            generate_headers(ApiKeyKind::Owner, &config(), "GET", PATH, "", now()).unwrap();
        assert_eq!(header(&headers, "Date"), Some(DATE));
        assert_eq!(
            header(&headers, "authorization-api-key"),
            Some(format!("{}:rapX0/W3lgwKTaF9dIRpuBIyQvg=", KEY_ID).as_str())
        );
        assert!(header(&headers, "x-api-key").is_none());
    }

    #[test]
    fn test_missing_key_fails() {
        let config = AccountConfig::default();
        assert!(generate_headers(ApiKeyKind::ReadOnly, &config, "GET", PATH, "", now()).is_err());
    }
}
