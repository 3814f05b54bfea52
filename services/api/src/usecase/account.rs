use std::sync::OnceLock;

use anyhow::Context as _;

use cisne_auth_types::password::{hash_password, verify_password};
use cisne_auth_types::principal::Principal;
use cisne_auth_types::token::{IssuedToken, TokenSettings, issue_token};
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

use crate::domain::policy::{Action, authorize_role};
use crate::domain::repository::{
    AccountRepository, CentreRepository, EntityDirectory, PatientRepository, TherapistRepository,
};
use crate::domain::types::{
    Centre, MIN_PASSWORD_LEN, NewAccount, NewProfile, Patient, Therapist, User,
    is_plausible_email, normalize_email,
};
use crate::error::ApiError;
use crate::usecase::centre::CentreInput;
use crate::usecase::patient::PatientInput;
use crate::usecase::therapist::{TherapistInput, ensure_nif_free};

/// A user together with a freshly issued session token.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: IssuedToken,
}

fn open_session(tokens: &TokenSettings, user: User) -> Result<Session, ApiError> {
    let token =
        issue_token(tokens, user.id, &user.email, user.role).context("sign session token")?;
    Ok(Session { user, token })
}

fn validated_email(email: &str) -> Result<String, ApiError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if !is_plausible_email(&email) {
        return Err(ApiError::InvalidEmail);
    }
    Ok(email)
}

/// Resolve the requested role. An absent role means PATIENT; anything
/// present must name a self-registrable role.
fn requested_role(role: Option<&str>) -> Result<Role, ApiError> {
    let Some(raw) = role.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Role::Patient);
    };
    match raw.parse::<Role>() {
        Ok(role) if role.is_self_registrable() => Ok(role),
        _ => Err(ApiError::UnsupportedRole(raw.to_owned())),
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    /// Display name for people, organization name for centres.
    pub name: Option<String>,
    pub nif: Option<String>,
    pub cif: Option<String>,
    pub location: Option<String>,
    pub society_id: Option<String>,
    pub profession: Option<String>,
    pub diagnosis: Option<String>,
}

impl RegisterInput {
    fn into_profile(self, role: Role) -> Result<NewProfile, ApiError> {
        match role {
            Role::Centre => CentreInput {
                cif: self.cif,
                name: self.name,
                location: self.location,
                service_id: None,
            }
            .validate()
            .map(NewProfile::Centre),
            Role::Therapist => TherapistInput {
                name: self.name,
                nif: self.nif,
                society_id: self.society_id,
                profession: self.profession,
                ..Default::default()
            }
            .validate()
            .map(NewProfile::Therapist),
            Role::Patient => PatientInput {
                name: self.name,
                nif: self.nif,
                diagnosis: self.diagnosis,
                ..Default::default()
            }
            .validate()
            .map(NewProfile::Patient),
            Role::Admin => Err(ApiError::UnsupportedRole(role.as_str().to_owned())),
        }
    }
}

pub struct RegisterUseCase<A: AccountRepository, D: EntityDirectory> {
    pub accounts: A,
    pub directory: D,
    pub tokens: TokenSettings,
}

impl<A: AccountRepository, D: EntityDirectory> RegisterUseCase<A, D> {
    /// Validate, check uniqueness, then write user and profile atomically.
    ///
    /// The pre-checks give precise errors for the common case; the store's
    /// unique constraints still decide concurrent races and map to the same errors.
    pub async fn execute(&self, mut input: RegisterInput) -> Result<Session, ApiError> {
        let email = validated_email(&input.email)?;
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::PasswordTooShort);
        }
        let role = requested_role(input.role.as_deref())?;
        let password = std::mem::take(&mut input.password);
        let profile = input.into_profile(role)?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }
        match &profile {
            NewProfile::Centre(centre) => {
                if self.directory.cif_taken(&centre.cif, None).await? {
                    return Err(ApiError::CifTaken);
                }
            }
            NewProfile::Therapist(therapist) => {
                ensure_nif_free(&self.directory, &therapist.nif, None).await?;
            }
            NewProfile::Patient(patient) => {
                ensure_nif_free(&self.directory, &patient.nif, None).await?;
            }
        }

        let password_hash = hash_password(&password).context("hash password")?;
        let user = self
            .accounts
            .register(&NewAccount {
                email,
                password_hash,
                profile,
            })
            .await?;
        tracing::info!(user_id = %user.id, role = %user.role, "account registered");
        open_session(&self.tokens, user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Digest verified against when the email is unknown, so both failure paths
/// cost one Argon2 verification.
fn decoy_digest() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| hash_password("cisne-decoy-password").ok())
        .as_deref()
}

pub struct LoginUseCase<A: AccountRepository> {
    pub accounts: A,
    pub tokens: TokenSettings,
}

impl<A: AccountRepository> LoginUseCase<A> {
    pub async fn execute(&self, input: LoginInput) -> Result<Session, ApiError> {
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(ApiError::MissingField("email"));
        }
        if input.password.is_empty() {
            return Err(ApiError::MissingField("password"));
        }

        let Some(user) = self.accounts.find_by_email(&email).await? else {
            if let Some(decoy) = decoy_digest() {
                let _ = verify_password(&input.password, decoy);
            }
            return Err(ApiError::InvalidCredentials);
        };
        if !verify_password(&input.password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }
        open_session(&self.tokens, user)
    }
}

// ── Me ───────────────────────────────────────────────────────────────────────

/// The role-specific profile attached to a user, if any.
#[derive(Debug)]
pub enum Profile {
    Centre(Centre),
    Therapist(Therapist),
    Patient(Patient),
}

#[derive(Debug)]
pub struct Account {
    pub user: User,
    pub profile: Option<Profile>,
}

pub struct GetAccountUseCase<A, C, T, P>
where
    A: AccountRepository,
    C: CentreRepository,
    T: TherapistRepository,
    P: PatientRepository,
{
    pub accounts: A,
    pub centres: C,
    pub therapists: T,
    pub patients: P,
}

impl<A, C, T, P> GetAccountUseCase<A, C, T, P>
where
    A: AccountRepository,
    C: CentreRepository,
    T: TherapistRepository,
    P: PatientRepository,
{
    pub async fn execute(&self, id: EntityId) -> Result<Account, ApiError> {
        let user = self
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::User))?;
        let profile = match user.role {
            Role::Admin => None,
            Role::Centre => self.centres.find_by_id(id).await?.map(Profile::Centre),
            Role::Therapist => self.therapists.find_by_id(id).await?.map(Profile::Therapist),
            Role::Patient => self.patients.find_by_id(id).await?.map(Profile::Patient),
        };
        Ok(Account { user, profile })
    }
}

// ── Users (admin) ────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> ListUsersUseCase<A> {
    pub async fn execute(
        &self,
        principal: &Principal,
        email_contains: Option<&str>,
    ) -> Result<Vec<User>, ApiError> {
        authorize_role(principal, Action::ManageUsers).into_result()?;
        let fragment = email_contains.map(normalize_email).filter(|f| !f.is_empty());
        self.accounts.list(fragment.as_deref()).await
    }
}

/// Which profile table references a user; `None` for ADMIN or unprovisioned users.
pub struct GetProfileKindUseCase<A: AccountRepository, D: EntityDirectory> {
    pub accounts: A,
    pub directory: D,
}

impl<A: AccountRepository, D: EntityDirectory> GetProfileKindUseCase<A, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        id: EntityId,
    ) -> Result<Option<EntityKind>, ApiError> {
        authorize_role(principal, Action::ManageUsers).into_result()?;
        if self.accounts.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(EntityKind::User));
        }
        self.directory.profile_kind(id).await
    }
}

pub struct DeleteUserUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> DeleteUserUseCase<A> {
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<(), ApiError> {
        authorize_role(principal, Action::ManageUsers).into_result()?;
        if !self.accounts.delete(id).await? {
            return Err(ApiError::NotFound(EntityKind::User));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_role_defaults_to_patient() {
        assert_eq!(requested_role(None).unwrap(), Role::Patient);
        assert_eq!(requested_role(Some("  ")).unwrap(), Role::Patient);
    }

    #[test]
    fn present_role_is_parsed_case_insensitively() {
        assert_eq!(requested_role(Some("centre")).unwrap(), Role::Centre);
        assert_eq!(requested_role(Some("THERAPIST")).unwrap(), Role::Therapist);
    }

    #[test]
    fn invalid_or_admin_role_is_rejected() {
        assert!(matches!(
            requested_role(Some("DOCTOR")),
            Err(ApiError::UnsupportedRole(r)) if r == "DOCTOR"
        ));
        assert!(matches!(
            requested_role(Some("admin")),
            Err(ApiError::UnsupportedRole(_))
        ));
    }

    #[test]
    fn email_is_normalized_and_checked() {
        assert_eq!(validated_email(" A@B.es ").unwrap(), "a@b.es");
        assert!(matches!(validated_email(""), Err(ApiError::MissingField("email"))));
        assert!(matches!(validated_email("nope"), Err(ApiError::InvalidEmail)));
    }

    #[test]
    fn centre_profile_requires_location() {
        let input = RegisterInput {
            name: Some("Clinic A".into()),
            cif: Some("B12345678".into()),
            ..Default::default()
        };
        assert!(matches!(
            input.into_profile(Role::Centre),
            Err(ApiError::MissingField("location"))
        ));
    }

    #[test]
    fn patient_profile_splits_display_name() {
        let input = RegisterInput {
            name: Some("Ana López".into()),
            nif: Some(" 12345678z ".into()),
            ..Default::default()
        };
        let NewProfile::Patient(patient) = input.into_profile(Role::Patient).unwrap() else {
            panic!("expected patient profile");
        };
        assert_eq!(patient.first_name, "Ana");
        assert_eq!(patient.last_name, "López");
        assert_eq!(patient.nif, "12345678Z");
    }
}
