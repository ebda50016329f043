use axum::Json;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::User;
use crate::result::ApiResponse;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

pub fn generate_token(
    user: &User,
    config: &Config,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let lifetime = Duration::from_std(config.jwt_expiration()).unwrap_or(Duration::hours(24));
    let expiration = (now + lifetime).timestamp();

    let claims = Claims {
        sub: user.user_id.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        is_admin: user.is_admin,
        exp: expiration,
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok((token, expiration))
}

/// Drops an optional `Bearer ` prefix from an authorization header value.
pub fn strip_bearer(header: &str) -> &str {
    let header = header.trim();
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

/// Checks signature and expiry, whatever the partition.
pub fn decode_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        strip_bearer(token),
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Claims of a valid token issued to the expected partition.
pub fn verify_token(token: &str, config: &Config, expect_admin: bool) -> Option<Claims> {
    match decode_token(token, config) {
        Ok(claims) if claims.is_admin == expect_admin => Some(claims),
        Ok(claims) => {
            tracing::debug!(
                "Token of {} rejected for the {} partition",
                claims.sub,
                if expect_admin { "admin" } else { "user" }
            );
            None
        }
        Err(e) => {
            tracing::debug!("Token rejected: {}", e);
            None
        }
    }
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const USER_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const CONFLICT: i32 = 1006;
    pub const TIMEOUT: i32 = 1007;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::AdminRole;

    fn user(admin_role: Option<AdminRole>) -> User {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User::new(
            "ada".to_string(),
            "ada@mrkt.test".to_string(),
            "hash".to_string(),
            admin_role,
            at,
        )
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hashed = hash_password("s3cret-pass").unwrap();

        assert_ne!(hashed, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hashed).unwrap());
        assert!(!verify_password("s3cret-pasS", &hashed).unwrap());
    }

    #[test]
    fn token_round_trips_within_its_partition() {
        let config = Config::for_tests();
        let user = user(None);
        let (token, exp) = generate_token(&user, &config).unwrap();

        let claims = verify_token(&token, &config, false).unwrap();

        assert_eq!(claims.sub, user.user_id);
        assert_eq!(claims.email, "ada@mrkt.test");
        assert_eq!(claims.exp, exp);
        assert!(!claims.is_admin);
    }

    #[test]
    fn partitions_do_not_cross() {
        let config = Config::for_tests();
        let (user_token, _) = generate_token(&user(None), &config).unwrap();
        let (admin_token, _) = generate_token(&user(Some(AdminRole::Super)), &config).unwrap();

        assert!(verify_token(&user_token, &config, true).is_none());
        assert!(verify_token(&admin_token, &config, false).is_none());
        assert!(verify_token(&admin_token, &config, true).is_some());
    }

    #[test]
    fn bearer_prefix_is_optional() {
        let config = Config::for_tests();
        let (token, _) = generate_token(&user(None), &config).unwrap();

        assert!(verify_token(&format!("Bearer {token}"), &config, false).is_some());
        assert_eq!(strip_bearer("  Bearer abc "), "abc");
        assert_eq!(strip_bearer("abc"), "abc");
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let config = Config::for_tests();
        let (token, _) = generate_token(&user(None), &config).unwrap();
        let other = Config {
            jwt_secret: "another-secret".to_string(),
            ..Config::for_tests()
        };

        assert!(verify_token(&token, &other, false).is_none());
        assert!(verify_token("not-a-token", &config, false).is_none());
    }
}
