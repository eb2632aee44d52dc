//! User management service: approval workflow and staff administration
//!
//! All operations here sit behind the admin route gate; the service
//! receives calls only for an already-resolved admin actor.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Role, User, UserStatus};

/// User management service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Dashboard counters for the admin landing page
#[derive(Debug, Serialize)]
pub struct UserCounts {
    pub total_users: i64,
    pub pending_users: i64,
    pub active_users: i64,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List users awaiting approval
    pub async fn pending_users(&self) -> AppResult<Vec<User>> {
        self.list_by_statuses(&[UserStatus::Pending]).await
    }

    /// List staff accounts filtered by status
    pub async fn list_by_statuses(&self, statuses: &[UserStatus]) -> AppResult<Vec<User>> {
        let status_strs: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, status, created_at, updated_at
            FROM users
            WHERE role = 'staff' AND status = ANY($1::user_status[])
            ORDER BY created_at
            "#,
        )
        .bind(&status_strs)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// Dashboard counts: total users excluding admins, pending, active
    pub async fn counts(&self) -> AppResult<UserCounts> {
        let total_users = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role != 'admin'",
        )
        .fetch_one(&self.db)
        .await?;

        let pending_users =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE status = 'pending'")
                .fetch_one(&self.db)
                .await?;

        let active_users =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE status = 'active'")
                .fetch_one(&self.db)
                .await?;

        Ok(UserCounts {
            total_users,
            pending_users,
            active_users,
        })
    }

    /// Approve a pending account
    pub async fn approve(&self, id: Uuid) -> AppResult<User> {
        self.set_status(id, UserStatus::Active).await
    }

    /// Reject a pending account
    pub async fn reject(&self, id: Uuid) -> AppResult<User> {
        self.set_status(id, UserStatus::Rejected).await
    }

    /// Approve every pending account at once
    pub async fn approve_all_pending(&self) -> AppResult<u64> {
        let result = sqlx::query("UPDATE users SET status = 'active', updated_at = NOW() WHERE status = 'pending'")
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Ban a staff account. Admin accounts cannot be banned.
    pub async fn ban(&self, id: Uuid) -> AppResult<User> {
        let target = self.get(id).await?;

        if target.role != Role::Staff {
            return Err(AppError::ValidationError(
                "Only staff accounts can be banned".to_string(),
            ));
        }

        self.set_status(id, UserStatus::Banned).await
    }

    /// Permanently delete a staff account. The account must already be
    /// banned.
    pub async fn delete_banned(&self, id: Uuid) -> AppResult<()> {
        let target = self.get(id).await?;

        if target.status != UserStatus::Banned {
            return Err(AppError::ValidationError(
                "User must be banned before deletion".to_string(),
            ));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, status, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn set_status(&self, id: Uuid, status: UserStatus) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, name, password_hash, role, status, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}
