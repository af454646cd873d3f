//! Unverified decoding of identity-token payloads.
//!
//! These helpers read the claims of a JWT **without checking any
//! signature**. They exist so applications can show a display field such
//! as the user's email address; the result must never be treated as a
//! verified identity or used for authorization.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

/// Errors decoding a token payload.
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// The token does not have the three dot-separated JWT segments.
    #[error("token is not in JWT format")]
    Malformed,

    /// The payload segment is not valid base64url.
    #[error("token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload segment is not valid JSON.
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a JWT's claims **without verifying its signature**.
pub fn unverified_claims(token: &str) -> Result<serde_json::Value, ClaimsError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) => payload,
        _ => return Err(ClaimsError::Malformed),
    };
    if segments.next().is_some() {
        return Err(ClaimsError::Malformed);
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Extract the `email` claim from a token, without verification.
pub fn unverified_email(token: &str) -> Result<Option<String>, ClaimsError> {
    let claims = unverified_claims(token)?;
    Ok(claims
        .get("email")
        .and_then(|value| value.as_str())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_jwt(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        let signature = URL_SAFE_NO_PAD.encode(b"signature");
        format!("{header}.{body}.{signature}")
    }

    #[test]
    fn decodes_email_claim() {
        let token = encode_jwt(r#"{"email":"person@example.com","sub":"u1"}"#);
        assert_eq!(
            unverified_email(&token).unwrap(),
            Some("person@example.com".to_string())
        );
    }

    #[test]
    fn missing_email_claim_is_none() {
        let token = encode_jwt(r#"{"sub":"u1"}"#);
        assert_eq!(unverified_email(&token).unwrap(), None);
    }

    #[test]
    fn rejects_non_jwt_token() {
        assert!(matches!(
            unverified_claims("not-a-jwt"),
            Err(ClaimsError::Malformed)
        ));
        assert!(matches!(
            unverified_claims("a.b.c.d"),
            Err(ClaimsError::Malformed)
        ));
    }

    #[test]
    fn rejects_invalid_base64_payload() {
        assert!(matches!(
            unverified_claims("header.!!!.signature"),
            Err(ClaimsError::Base64(_))
        ));
    }

    #[test]
    fn rejects_non_json_payload() {
        let payload = URL_SAFE_NO_PAD.encode(b"plain text");
        let token = format!("header.{payload}.signature");
        assert!(matches!(unverified_claims(&token), Err(ClaimsError::Json(_))));
    }
}
