use crate::application_port::AuthError;

/// Pull the credential out of a `Bearer <token>` Authorization header.
///
/// The scheme word is case-sensitive and must be the leading token, followed
/// by whitespace. An absent header and an unrecognized scheme both fail with
/// `MalformedAuthHeader`.
pub fn bearer_token(header: Option<&str>) -> Result<String, AuthError> {
    strip_scheme(header, "Bearer")
}

/// Same shape for the `ApiKey <key>` convention used by the Polka webhook.
pub fn api_key(header: Option<&str>) -> Result<String, AuthError> {
    strip_scheme(header, "ApiKey")
}

fn strip_scheme(header: Option<&str>, scheme: &str) -> Result<String, AuthError> {
    let value = header.ok_or(AuthError::MalformedAuthHeader)?;
    let rest = value
        .trim_start()
        .strip_prefix(scheme)
        .ok_or(AuthError::MalformedAuthHeader)?;
    if !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        return Err(AuthError::MalformedAuthHeader);
    }
    Ok(rest.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(Some("Bearer abc123")).unwrap(), "abc123");
    }

    #[test]
    fn extra_internal_whitespace_is_tolerated() {
        assert_eq!(bearer_token(Some("Bearer   abc123")).unwrap(), "abc123");
    }

    #[test]
    fn trailing_whitespace_is_trimmed() {
        assert_eq!(bearer_token(Some("Bearer abc123  ")).unwrap(), "abc123");
    }

    #[test]
    fn absent_header_is_malformed() {
        assert!(matches!(
            bearer_token(None).unwrap_err(),
            AuthError::MalformedAuthHeader
        ));
    }

    #[test]
    fn scheme_is_case_sensitive() {
        assert!(bearer_token(Some("bearer abc123")).is_err());
        assert!(bearer_token(Some("BEARER abc123")).is_err());
    }

    #[test]
    fn scheme_must_be_its_own_leading_token() {
        assert!(bearer_token(Some("Bearerabc123")).is_err());
        assert!(bearer_token(Some("token Bearer abc123")).is_err());
    }

    #[test]
    fn wrong_scheme_is_rejected() {
        assert!(bearer_token(Some("ApiKey abc123")).is_err());
        assert!(api_key(Some("Bearer abc123")).is_err());
    }

    #[test]
    fn api_key_is_extracted() {
        assert_eq!(api_key(Some("ApiKey f271c81f")).unwrap(), "f271c81f");
    }
}
