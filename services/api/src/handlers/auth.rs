use axum::extract::State;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::JsonBody;
use cisne_domain::id::EntityId;

use crate::domain::types::User;
use crate::error::ApiError;
use crate::handlers::centre::CentreResponse;
use crate::handlers::patient::PatientResponse;
use crate::handlers::therapist::TherapistResponse;
use crate::state::AppState;
use crate::usecase::account::{
    GetAccountUseCase, LoginInput, LoginUseCase, Profile, RegisterInput, RegisterUseCase, Session,
};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: EntityId,
    pub email: String,
    pub role: &'static str,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    /// Unix seconds.
    pub expires_at: u64,
    pub user: UserResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token.token,
            expires_at: session.token.expires_at,
            user: session.user.into(),
        }
    }
}

// ── POST /api/auth/register ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    pub name: Option<String>,
    pub nif: Option<String>,
    pub cif: Option<String>,
    pub location: Option<String>,
    pub society_id: Option<String>,
    pub profession: Option<String>,
    pub diagnosis: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<Reply<SessionResponse>, ApiError> {
    let usecase = RegisterUseCase {
        accounts: state.account_repo(),
        directory: state.directory(),
        tokens: state.tokens.clone(),
    };
    let session = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            role: body.role,
            name: body.name,
            nif: body.nif,
            cif: body.cif,
            location: body.location,
            society_id: body.society_id,
            profession: body.profession,
            diagnosis: body.diagnosis,
        })
        .await?;
    Ok(Reply::created(session.into()).with_message("account registered"))
}

// ── POST /api/auth/login ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Reply<SessionResponse>, ApiError> {
    let usecase = LoginUseCase {
        accounts: state.account_repo(),
        tokens: state.tokens.clone(),
    };
    let session = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Reply::ok(session.into()))
}

// ── GET /api/auth/me ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileResponse {
    Centre(CentreResponse),
    Therapist(TherapistResponse),
    Patient(PatientResponse),
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Centre(centre) => Self::Centre(centre.into()),
            Profile::Therapist(therapist) => Self::Therapist(therapist.into()),
            Profile::Patient(patient) => Self::Patient(patient.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: UserResponse,
    pub profile: Option<ProfileResponse>,
}

pub(crate) async fn account(
    state: &AppState,
    id: EntityId,
) -> Result<Reply<AccountResponse>, ApiError> {
    let usecase = GetAccountUseCase {
        accounts: state.account_repo(),
        centres: state.centre_repo(),
        therapists: state.therapist_repo(),
        patients: state.patient_repo(),
    };
    let account = usecase.execute(id).await?;
    Ok(Reply::ok(AccountResponse {
        user: account.user.into(),
        profile: account.profile.map(ProfileResponse::from),
    }))
}

pub async fn me(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<AccountResponse>, ApiError> {
    account(&state, principal.id).await
}
