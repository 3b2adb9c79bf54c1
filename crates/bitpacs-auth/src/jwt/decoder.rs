//! JWT token validation.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use bitpacs_core::config::AuthConfig;
use bitpacs_core::error::AppError;

use super::claims::Claims;

/// Validates JWT access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew
        validation.set_issuer(&[&config.issuer]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::super::encoder::JwtEncoder;
    use super::*;
    use bitpacs_entity::user::{Role, User};
    use chrono::Utc;
    use uuid::Uuid;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-at-least-32-bytes-long!".to_string(),
            jwt_access_ttl_minutes: 60,
            issuer: "bitpacs".to_string(),
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Dr. Silva".to_string(),
            email: "silva@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Clinician,
            facility_key: "unidade-centro".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_roundtrip() {
        let config = test_config();
        let user = test_user();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let (token, _) = encoder.generate_access_token(&user).unwrap();
        let claims = decoder.decode_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Clinician);
        assert_eq!(claims.facility_key, "unidade-centro");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let user = test_user();
        let encoder = JwtEncoder::new(&test_config());
        let (token, _) = encoder.generate_access_token(&user).unwrap();

        let mut other = test_config();
        other.jwt_secret = "another-secret-also-32-bytes-long!!".to_string();
        let decoder = JwtDecoder::new(&other);

        let err = decoder.decode_access_token(&token).unwrap_err();
        assert_eq!(err.kind, bitpacs_core::error::ErrorKind::Authentication);
    }

    #[test]
    fn test_garbage_rejected() {
        let decoder = JwtDecoder::new(&test_config());
        assert!(decoder.decode_access_token("not-a-token").is_err());
    }
}
