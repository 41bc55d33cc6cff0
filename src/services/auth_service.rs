//! Authentication service - registration, login, token refresh and
//! password change for staff users.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH};
use crate::domain::{Password, User, ValidationReport};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Distinguishes the two halves of a token pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub token_type: TokenKind,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Token pair returned after successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    /// Short-lived access token
    pub access: String,
    /// Long-lived refresh token
    pub refresh: String,
}

/// Fresh access token returned by the refresh endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new staff user
    async fn register(
        &self,
        username: String,
        password: String,
        password_confirm: String,
        email: Option<String>,
    ) -> AppResult<User>;

    /// Login and return an access + refresh token pair
    async fn login(&self, username: String, password: String) -> AppResult<TokenPair>;

    /// Exchange a valid refresh token for a new access token
    async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken>;

    /// Change the password of an authenticated user
    async fn change_password(
        &self,
        user_id: i64,
        old_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Current identity for an authenticated user
    async fn profile(&self, user_id: i64) -> AppResult<User>;

    /// Verify an access token and extract its claims
    fn verify_access_token(&self, token: &str) -> AppResult<Claims>;
}

/// Sign a token of the given kind for a user
fn generate_token(user: &User, kind: TokenKind, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let lifetime = match kind {
        TokenKind::Access => Duration::minutes(config.access_token_minutes),
        TokenKind::Refresh => Duration::hours(config.refresh_token_hours),
    };

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        token_type: kind,
        exp: (now + lifetime).timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

/// Decode a token and check it is of the expected kind
fn decode_token(token: &str, kind: TokenKind, config: &Config) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    if data.claims.token_type != kind {
        return Err(AppError::Unauthorized);
    }
    Ok(data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(
        &self,
        username: String,
        password: String,
        password_confirm: String,
        email: Option<String>,
    ) -> AppResult<User> {
        let mut report = ValidationReport::new();
        if username.trim().is_empty() {
            report.add("username", "This field is required.");
        } else if username.len() > MAX_USERNAME_LENGTH {
            report.add("username", "Username is too long.");
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            report.add(
                "password",
                format!("Password must be at least {} characters.", MIN_PASSWORD_LENGTH),
            );
        }
        if password != password_confirm {
            report.add("password_confirm", "The two password fields didn't match.");
        }
        if !report.is_empty() {
            return Err(AppError::FieldErrors(report));
        }

        if self.uow.users().find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();
        self.uow
            .users()
            .create_staff(username, email.unwrap_or_default(), password_hash)
            .await
    }

    async fn login(&self, username: String, password: String) -> AppResult<TokenPair> {
        let user_result = self.uow.users().find_by_username(&username).await?;

        // Verify against a dummy hash when the user is unknown so the
        // response time does not leak which usernames exist.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let password_valid = Password::from_hash(password_hash.to_string()).verify(&password);

        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = user_result.as_ref().unwrap();
        Ok(TokenPair {
            access: generate_token(user, TokenKind::Access, &self.config)?,
            refresh: generate_token(user, TokenKind::Refresh, &self.config)?,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken> {
        let claims = decode_token(refresh_token, TokenKind::Refresh, &self.config)?;

        // The identity may have been deleted since the pair was issued
        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AccessToken {
            access: generate_token(&user, TokenKind::Access, &self.config)?,
        })
    }

    async fn change_password(
        &self,
        user_id: i64,
        old_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !Password::from_hash(user.password_hash.clone()).verify(&old_password) {
            return Err(AppError::field_error("old_password", "Incorrect password."));
        }
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::field_error(
                "new_password",
                format!("Password must be at least {} characters.", MIN_PASSWORD_LENGTH),
            ));
        }

        let hash = Password::new(&new_password)?.into_string();
        self.uow.users().set_password_hash(user.id, hash).await
    }

    async fn profile(&self, user_id: i64) -> AppResult<User> {
        self.uow.users().find_by_id(user_id).await?.ok_or_not_found()
    }

    fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        decode_token(token, TokenKind::Access, &self.config)
    }
}
