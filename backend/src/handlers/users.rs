//! Admin user management handlers
//!
//! All routes here sit behind the admin gate in the router; the
//! middleware has already verified the caller's role.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::user::{UserCounts, UserService};
use crate::AppState;
use shared::models::{User, UserStatus};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    /// Comma-separated status filter, e.g. "pending,active"
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApproveAllResponse {
    pub approved: u64,
}

/// List staff accounts, filtered by status when given
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<Vec<User>>> {
    let service = UserService::new(state.db);

    let statuses: Vec<UserStatus> = query
        .status
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter_map(|s| match s.trim() {
            "pending" => Some(UserStatus::Pending),
            "active" => Some(UserStatus::Active),
            "rejected" => Some(UserStatus::Rejected),
            "banned" => Some(UserStatus::Banned),
            _ => None,
        })
        .collect();

    let users = if statuses.is_empty() {
        service
            .list_by_statuses(&[
                UserStatus::Pending,
                UserStatus::Active,
                UserStatus::Rejected,
                UserStatus::Banned,
            ])
            .await?
    } else {
        service.list_by_statuses(&statuses).await?
    };

    Ok(Json(users))
}

/// List accounts awaiting approval
pub async fn list_pending_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let service = UserService::new(state.db);
    let users = service.pending_users().await?;
    Ok(Json(users))
}

/// Dashboard counters
pub async fn user_counts(State(state): State<AppState>) -> AppResult<Json<UserCounts>> {
    let service = UserService::new(state.db);
    let counts = service.counts().await?;
    Ok(Json(counts))
}

/// Approve a pending account
pub async fn approve_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service.approve(user_id).await?;
    Ok(Json(user))
}

/// Reject a pending account
pub async fn reject_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service.reject(user_id).await?;
    Ok(Json(user))
}

/// Approve every pending account in one call
pub async fn approve_all_users(
    State(state): State<AppState>,
) -> AppResult<Json<ApproveAllResponse>> {
    let service = UserService::new(state.db);
    let approved = service.approve_all_pending().await?;
    Ok(Json(ApproveAllResponse { approved }))
}

/// Ban a staff account
pub async fn ban_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service.ban(user_id).await?;
    Ok(Json(user))
}

/// Delete a banned staff account
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = UserService::new(state.db);
    service.delete_banned(user_id).await?;
    Ok(Json(()))
}
