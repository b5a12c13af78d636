use crate::configuration::Configuration;
use crate::error::{Error, Result};
use jwt_simple::prelude::{Claims, Duration as TokenDuration, HS256Key, MACLike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::task;

/// Role granted to every registered user
pub const USER_ROLE: &str = "user";
/// Role required to manage categories
pub const ADMIN_ROLE: &str = "admin";
/// Shortest signing secret accepted, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Custom claims carried by every token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub username: String,
    pub role: String,
}

/// The identity recovered from a verified token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

/// Hashes passwords and issues HS256 tokens.
#[derive(Clone)]
pub struct Authenticator {
    key: HS256Key,
    expiration: Duration,
    cost: u32,
}

impl Authenticator {
    /// Create an authenticator signing with the given secret.
    ///
    /// # Errors
    /// * [`Configuration`](Error::Configuration) if the secret is shorter than
    ///   [`MIN_SECRET_LENGTH`] bytes
    pub fn new(secret: &str, expiration: Duration) -> Result<Self> {
        check_secret(secret)?;
        Ok(Self {
            key: HS256Key::from_bytes(secret.as_bytes()),
            expiration,
            cost: bcrypt::DEFAULT_COST,
        })
    }

    /// # Errors
    /// * If `auth.secret` is too short
    pub fn from_configuration(configuration: &Configuration) -> Result<Self> {
        Ok(
            Self::new(&configuration.auth_secret, configuration.auth_expiration)?
                .with_cost(configuration.auth_cost),
        )
    }

    /// Set the bcrypt cost used for new hashes
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Hash a password on the blocking thread pool.
    ///
    /// # Errors
    /// * If the cost is out of range or the hashing task fails
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|error| Error::PasswordHash(error.to_string()))?
            .map_err(Error::from)
    }

    /// Check a password against a stored hash on the blocking thread pool.
    ///
    /// # Errors
    /// * If the stored hash is malformed or the verification task fails
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|error| Error::PasswordHash(error.to_string()))?
            .map_err(Error::from)
    }

    /// Issue a token whose subject is the user id.
    ///
    /// # Errors
    /// * If the token cannot be signed
    pub fn issue_token(&self, user_id: i64, username: &str, role: &str) -> Result<String> {
        let custom_claims = UserClaims {
            username: username.to_string(),
            role: role.to_string(),
        };
        let claims = Claims::with_custom_claims(
            custom_claims,
            TokenDuration::from_secs(self.expiration.as_secs()),
        )
        .with_subject(user_id);
        self.key
            .authenticate(claims)
            .map_err(|error| Error::Token(error.to_string()))
    }

    /// Verify a token and return the identity it was issued for.
    ///
    /// # Errors
    /// * [`Unauthorized`](Error::Unauthorized) if the token is malformed, expired or signed with
    ///   another key
    pub fn verify_token(&self, token: &str) -> Result<Identity> {
        let claims = self
            .key
            .verify_token::<UserClaims>(token, None)
            .map_err(|_| Error::Unauthorized("Invalid token".to_string()))?;
        let user_id = claims
            .subject
            .as_deref()
            .and_then(|subject| subject.parse::<i64>().ok())
            .ok_or_else(|| Error::Unauthorized("Invalid token".to_string()))?;

        Ok(Identity {
            user_id,
            username: claims.custom.username,
            role: claims.custom.role,
        })
    }
}

/// Reject signing secrets too short for HS256.
///
/// # Errors
/// * [`Configuration`](Error::Configuration) if the secret is shorter than [`MIN_SECRET_LENGTH`]
pub fn check_secret(secret: &str) -> Result<()> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(Error::Configuration(format!(
            "auth.secret must be at least {MIN_SECRET_LENGTH} bytes"
        )));
    }
    Ok(())
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Authenticator")
            .field("expiration", &self.expiration)
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TEST_COST: u32 = 4;
    const TEST_SECRET: &str = "ucrud-test-secret-0123456789abcdef";

    fn authenticator() -> Authenticator {
        Authenticator::new(TEST_SECRET, Duration::from_secs(3600))
            .map(|authenticator| authenticator.with_cost(TEST_COST))
            .unwrap_or_else(|error| panic!("{error}"))
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = Authenticator::new("change-me", Duration::from_secs(3600));
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(check_secret(&"x".repeat(MIN_SECRET_LENGTH)).is_ok());
    }

    #[test]
    fn test_default_secret_signs_tokens() -> anyhow::Result<()> {
        let authenticator =
            Authenticator::new(crate::configuration::DEFAULT_SECRET, Duration::from_secs(60))?;
        let token = authenticator.issue_token(7, "carol", USER_ROLE)?;
        assert_eq!(authenticator.verify_token(&token)?.user_id, 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_hash_and_verify_password() -> anyhow::Result<()> {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("secret123").await?;

        assert_ne!(hash, "secret123");
        assert!(authenticator.verify_password("secret123", &hash).await?);
        assert!(!authenticator.verify_password("wrong", &hash).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_malformed_hash() {
        let result = authenticator().verify_password("secret123", "not-a-hash").await;
        assert!(matches!(result, Err(Error::PasswordHash(_))));
    }

    #[tokio::test]
    async fn test_invalid_cost() {
        let result = authenticator().with_cost(1).hash_password("secret123").await;
        assert!(matches!(result, Err(Error::PasswordHash(_))));
    }

    #[test]
    fn test_issue_and_verify_token() -> anyhow::Result<()> {
        let authenticator = authenticator();
        let token = authenticator.issue_token(42, "alice", ADMIN_ROLE)?;

        let identity = authenticator.verify_token(&token)?;
        assert_eq!(
            identity,
            Identity {
                user_id: 42,
                username: "alice".to_string(),
                role: ADMIN_ROLE.to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_token_signed_with_other_secret() -> anyhow::Result<()> {
        let token = Authenticator::new(
            "another-secret-0123456789abcdefghij",
            Duration::from_secs(3600),
        )?
        .issue_token(1, "bob", USER_ROLE)?;

        let result = authenticator().verify_token(&token);
        assert!(matches!(result, Err(Error::Unauthorized(message)) if message == "Invalid token"));
        Ok(())
    }

    #[test]
    fn test_malformed_token() {
        let result = authenticator().verify_token("not.a.token");
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", authenticator());
        assert!(debug.contains("cost: 4"));
        assert!(!debug.contains(TEST_SECRET));
    }
}
