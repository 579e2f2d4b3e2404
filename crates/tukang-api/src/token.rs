use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use tukang_types::api::Claims;
use tukang_types::models::Role;

/// Tokens expire 24 hours after issue.
pub const TOKEN_TTL_HOURS: i64 = 24;

const APP_NAME: &str = "tukang-backend";

/// HS256 signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, user_id: i64, role: Role) -> jsonwebtoken::errors::Result<String> {
        let claims = Claims {
            user_id,
            role,
            apps: APP_NAME.to_string(),
            exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry and return the claims.
    pub fn decode(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new(b"test-secret-key-for-testing")
    }

    #[test]
    fn issue_and_decode() {
        let keys = keys();
        let token = keys.issue(42, Role::Store).unwrap();

        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, Role::Store);
        assert_eq!(claims.apps, APP_NAME);

        let ttl = claims.exp as i64 - chrono::Utc::now().timestamp();
        assert!(ttl > (TOKEN_TTL_HOURS - 1) * 3600 && ttl <= TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = keys().issue(1, Role::Tukang).unwrap();
        assert!(TokenKeys::new(b"different-secret").decode(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            user_id: 1,
            role: Role::Tukang,
            apps: APP_NAME.to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-for-testing"),
        )
        .unwrap();

        assert!(keys().decode(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(keys().decode("not-a-token").is_err());
    }
}
