//! Authentication service for registration, login, and token issuance
//!
//! New accounts register as Staff in Pending status and cannot log in
//! until an admin approves them.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Claims;
use shared::models::{User, UserStatus};
use shared::validation::{validate_email, validate_password};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a new staff account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub name: String,
    pub password: String,
}

/// Response after a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new staff account. The account starts Pending and
    /// needs admin approval before login.
    pub async fn register(&self, input: RegisterInput) -> AppResult<User> {
        validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;

        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        validate_password(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
        })?;

        let email_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(input.email.trim())
                .fetch_one(&self.db)
                .await?;

        if email_taken {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let name_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE name = $1)")
                .bind(input.name.trim())
                .fetch_one(&self.db)
                .await?;

        if name_taken {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, role, status)
            VALUES ($1, $2, $3, 'staff', 'pending')
            RETURNING id, email, name, password_hash, role, status, created_at, updated_at
            "#,
        )
        .bind(input.email.trim())
        .bind(input.name.trim())
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user.id, "new staff registration pending approval");

        Ok(user)
    }

    /// Log in with name and password. Wrong name and wrong password are
    /// indistinguishable to the caller.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        if input.name.trim().is_empty() || input.password.trim().is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, status, created_at, updated_at
            FROM users
            WHERE name = $1
            "#,
        )
        .bind(input.name.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let password_ok = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !password_ok {
            return Err(AppError::InvalidCredentials);
        }

        match user.status {
            UserStatus::Pending => {
                return Err(AppError::AccountNotApproved(
                    "Your account is awaiting admin approval".to_string(),
                ));
            }
            UserStatus::Rejected => {
                return Err(AppError::AccountNotApproved(
                    "Your account was rejected by an admin".to_string(),
                ));
            }
            UserStatus::Banned => {
                return Err(AppError::AccountNotApproved(
                    "Your account has been banned".to_string(),
                ));
            }
            UserStatus::Active => {}
        }

        let access_token = self.issue_token(&user)?;

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user,
        })
    }

    /// Issue a JWT carrying the resolved actor (user id and role)
    fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }
}
