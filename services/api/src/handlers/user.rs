//! Admin-only user management.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::{PathParams, QueryString};

use crate::domain::policy::{Action, authorize_role};
use crate::error::ApiError;
use crate::handlers::IdPath;
use crate::handlers::auth::{AccountResponse, UserResponse, account};
use crate::state::AppState;
use crate::usecase::account::{DeleteUserUseCase, GetProfileKindUseCase, ListUsersUseCase};

// ── GET /api/users ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}

pub async fn list_users(
    principal: Principal,
    State(state): State<AppState>,
    QueryString(query): QueryString<UserQuery>,
) -> Result<Reply<Vec<UserResponse>>, ApiError> {
    let usecase = ListUsersUseCase {
        accounts: state.account_repo(),
    };
    let users = usecase.execute(&principal, query.email.as_deref()).await?;
    Ok(Reply::list(users.into_iter().map(UserResponse::from).collect()))
}

// ── GET /api/users/{id} ──────────────────────────────────────────────────────

pub async fn get_user(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<AccountResponse>, ApiError> {
    authorize_role(&principal, Action::ManageUsers).into_result()?;
    account(&state, path.id).await
}

// ── GET /api/users/{id}/profile-kind ─────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProfileKindResponse {
    pub profile: Option<&'static str>,
}

pub async fn get_profile_kind(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<ProfileKindResponse>, ApiError> {
    let usecase = GetProfileKindUseCase {
        accounts: state.account_repo(),
        directory: state.directory(),
    };
    let kind = usecase.execute(&principal, path.id).await?;
    Ok(Reply::ok(ProfileKindResponse {
        profile: kind.map(|k| k.as_str()),
    }))
}

// ── DELETE /api/users/{id} ───────────────────────────────────────────────────

pub async fn delete_user(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeleteUserUseCase {
        accounts: state.account_repo(),
    };
    usecase.execute(&principal, path.id).await?;
    Ok(Reply::message("user deleted"))
}
