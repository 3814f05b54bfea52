use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use cisne_auth_types::token::TokenSettings;

use crate::infra::account::DbAccountRepository;
use crate::infra::catalog::{DbCourseRepository, DbResourceRepository, DbServiceRepository};
use crate::infra::directory::DbEntityDirectory;
use crate::infra::invoice::DbInvoiceRepository;
use crate::infra::link::DbLinkRepository;
use crate::infra::profile::{DbCentreRepository, DbPatientRepository, DbTherapistRepository};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenSettings,
}

impl FromRef<AppState> for TokenSettings {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn centre_repo(&self) -> DbCentreRepository {
        DbCentreRepository {
            db: self.db.clone(),
        }
    }

    pub fn therapist_repo(&self) -> DbTherapistRepository {
        DbTherapistRepository {
            db: self.db.clone(),
        }
    }

    pub fn patient_repo(&self) -> DbPatientRepository {
        DbPatientRepository {
            db: self.db.clone(),
        }
    }

    pub fn service_repo(&self) -> DbServiceRepository {
        DbServiceRepository {
            db: self.db.clone(),
        }
    }

    pub fn course_repo(&self) -> DbCourseRepository {
        DbCourseRepository {
            db: self.db.clone(),
        }
    }

    pub fn resource_repo(&self) -> DbResourceRepository {
        DbResourceRepository {
            db: self.db.clone(),
        }
    }

    pub fn invoice_repo(&self) -> DbInvoiceRepository {
        DbInvoiceRepository {
            db: self.db.clone(),
        }
    }

    pub fn link_repo(&self) -> DbLinkRepository {
        DbLinkRepository {
            db: self.db.clone(),
        }
    }

    pub fn directory(&self) -> DbEntityDirectory {
        DbEntityDirectory {
            db: self.db.clone(),
        }
    }
}
