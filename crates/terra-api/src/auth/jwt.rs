use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id as string
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

/// Generate a JWT token for a user
pub fn generate_jwt_token(
    user_id: Uuid,
    email: String,
    jwt_secret: &str,
    expiry_hours: i64,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email,
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(expiry_hours)).timestamp() as usize,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Auth(format!("Failed to generate token: {e}")))?;

    Ok(token)
}

/// Verify and decode a JWT token
pub fn verify_jwt_token(token: &str, jwt_secret: &str) -> Result<Claims, ApiError> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Auth("Invalid or expired token".to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_jwt_token() {
        let user_id = Uuid::new_v4();
        let email = "test@example.com".to_string();
        let secret = "test_jwt_secret_minimum_32_characters_long";

        // Generate token
        let token = generate_jwt_token(user_id, email.clone(), secret, 24)
            .expect("Failed to generate token");

        assert!(!token.is_empty(), "Token should not be empty");

        // Verify token
        let claims = verify_jwt_token(&token, secret).expect("Failed to verify token");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, email);
        assert!(
            claims.exp > claims.iat,
            "Expiration should be after issued at"
        );
    }

    #[test]
    fn test_verify_jwt_token_with_wrong_secret() {
        let user_id = Uuid::new_v4();
        let email = "test@example.com".to_string();
        let secret = "test_jwt_secret_minimum_32_characters_long";
        let wrong_secret = "wrong_jwt_secret_minimum_32_characters_long";

        // Generate token with correct secret
        let token =
            generate_jwt_token(user_id, email, secret, 24).expect("Failed to generate token");

        // Try to verify with wrong secret
        let result = verify_jwt_token(&token, wrong_secret);

        assert!(result.is_err(), "Verification should fail with wrong secret");
        match result {
            Err(ApiError::Auth(msg)) => {
                assert!(msg.contains("Invalid or expired token"));
            }
            _ => panic!("Expected Auth error"),
        }
    }

    #[test]
    fn test_verify_invalid_jwt_token() {
        let secret = "test_jwt_secret_minimum_32_characters_long";
        let invalid_token = "invalid.jwt.token";

        let result = verify_jwt_token(invalid_token, secret);

        assert!(result.is_err(), "Verification should fail for invalid token");
        match result {
            Err(ApiError::Auth(msg)) => {
                assert!(msg.contains("Invalid or expired token"));
            }
            _ => panic!("Expected Auth error"),
        }
    }

    #[test]
    fn test_jwt_token_expiration() {
        let user_id = Uuid::new_v4();
        let email = "test@example.com".to_string();
        let secret = "test_jwt_secret_minimum_32_characters_long";

        let token =
            generate_jwt_token(user_id, email, secret, 24).expect("Failed to generate token");

        let claims = verify_jwt_token(&token, secret).expect("Failed to verify token");

        // Token should expire in approximately 24 hours (86400 seconds)
        let expiration_duration = claims.exp - claims.iat;
        assert!(
            (86390..=86410).contains(&expiration_duration),
            "Token should expire in approximately 24 hours, got {} seconds",
            expiration_duration
        );
    }
}
