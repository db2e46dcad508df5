use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crm_core::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserJwtClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Signing material for bearer tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

fn user_validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::try_seconds(ttl_seconds).unwrap_or(Duration::MAX),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, String> {
        let exp = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| "Token lifetime is out of range".to_string())?
            .timestamp() as usize;
        let claims = UserJwtClaims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| format!("Failed to sign user JWT: {}", err))
    }

    pub fn verify(&self, token: &str) -> Result<UserJwtClaims, String> {
        decode::<UserJwtClaims>(token, &self.decoding, &user_validation())
            .map(|decoded| decoded.claims)
            .map_err(|err| format!("Invalid user JWT: {}", err))
    }
}
