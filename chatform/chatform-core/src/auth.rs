//! Password hashing and bearer-token helpers. Tokens are HS256 JWTs
//! carrying the user id and email; verification is behind a trait so
//! the API layer can be handed any verifier.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::User;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Option<Claims>;
}

/// Issues and verifies HS256 tokens from a shared secret.
pub struct Hs256Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Tokens {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(Into::into)
    }
}

#[async_trait]
impl TokenVerifier for Hs256Tokens {
    async fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry no expiry claim.
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);
        decode::<Claims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "tester".to_string(),
            email: "tester@example.com".to_string(),
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("Sup3rS3cret!").unwrap();
        assert!(verify_password("Sup3rS3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("Sup3rS3cret!", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn token_round_trip() {
        let tokens = Hs256Tokens::new("secret");
        let user = user();
        let token = tokens.issue(&user).unwrap();

        let claims = tokens.verify(&token).await.unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);

        assert!(tokens.verify("garbage").await.is_none());
        let other = Hs256Tokens::new("different-secret");
        assert!(other.verify(&token).await.is_none());
    }
}
