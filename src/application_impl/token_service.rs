use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::application_port::{AccessTokenService, AuthError};
use crate::domain_model::{AccessToken, UserId};

/// Fixed issuer claim binding tokens to this service; a token minted by
/// anything else, even with the same secret, is rejected.
pub const TOKEN_ISSUER: &str = "chirpy";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    iat: i64,
    exp: i64,
}

pub struct JwtAccessTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtAccessTokens {
    pub fn new(secret: &[u8]) -> Self {
        JwtAccessTokens {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

impl AccessTokenService for JwtAccessTokens {
    fn issue(&self, subject: UserId, ttl: Duration) -> Result<AccessToken, AuthError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + ttl;
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: Some(subject.to_string()),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(AccessToken(token))
    }

    fn validate(&self, token: &str) -> Result<UserId, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // no grace window: a token past `exp` is expired, full stop
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::SignatureInvalid,
            }
        })?;

        if data.claims.iss != TOKEN_ISSUER {
            return Err(AuthError::IssuerMismatch);
        }
        let sub = data
            .claims
            .sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSubject)?;
        UserId::from_str(sub).map_err(|_| AuthError::MissingSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"secret";
    const WRONG_SECRET: &[u8] = b"wrong_secret";

    fn subject() -> UserId {
        UserId(uuid::Uuid::new_v4())
    }

    #[test]
    fn issued_token_validates_to_its_subject() {
        let tokens = JwtAccessTokens::new(SECRET);
        let user_id = subject();
        let token = tokens.issue(user_id, Duration::seconds(3600)).unwrap();
        assert_eq!(tokens.validate(&token.0).unwrap(), user_id);
    }

    #[test]
    fn garbage_token_string_is_rejected() {
        let tokens = JwtAccessTokens::new(SECRET);
        let err = tokens.validate("invalid.token.string").unwrap_err();
        assert!(matches!(err, AuthError::SignatureInvalid));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let tokens = JwtAccessTokens::new(SECRET);
        let other = JwtAccessTokens::new(WRONG_SECRET);
        let token = tokens.issue(subject(), Duration::seconds(3600)).unwrap();
        let err = other.validate(&token.0).unwrap_err();
        assert!(matches!(err, AuthError::SignatureInvalid));
    }

    #[test]
    fn negative_ttl_token_is_already_expired() {
        let tokens = JwtAccessTokens::new(SECRET);
        let token = tokens.issue(subject(), Duration::seconds(-1)).unwrap();
        let err = tokens.validate(&token.0).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let claims = Claims {
            iss: "not-chirpy".to_string(),
            sub: Some(subject().to_string()),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        let tokens = JwtAccessTokens::new(SECRET);
        assert!(matches!(
            tokens.validate(&token).unwrap_err(),
            AuthError::IssuerMismatch
        ));
    }

    #[test]
    fn missing_subject_is_rejected() {
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: None,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        let tokens = JwtAccessTokens::new(SECRET);
        assert!(matches!(
            tokens.validate(&token).unwrap_err(),
            AuthError::MissingSubject
        ));
    }

    #[test]
    fn wire_format_is_three_part_hs256_with_exactly_the_registered_claims() {
        let tokens = JwtAccessTokens::new(SECRET);
        let token = tokens.issue(subject(), Duration::seconds(3600)).unwrap();

        assert_eq!(token.0.split('.').count(), 3);
        let header = jsonwebtoken::decode_header(&token.0).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let payload =
            decode::<serde_json::Value>(&token.0, &DecodingKey::from_secret(SECRET), &validation)
                .unwrap()
                .claims;
        let object = payload.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["exp", "iat", "iss", "sub"]);
        assert_eq!(object["iss"], "chirpy");
    }
}
