use cisne_api::domain::repository::{
    AccountRepository, LinkRepository, PatientRepository, TherapistRepository,
};
use cisne_api::domain::types::{
    NewAccount, NewCentre, NewPatient, NewProfile, NewTherapist, PatientPatch,
};
use cisne_api::error::ApiError;
use cisne_api::infra::account::DbAccountRepository;
use cisne_api::infra::link::DbLinkRepository;
use cisne_api::infra::profile::{DbPatientRepository, DbTherapistRepository};
use cisne_domain::link::{Link, LinkKey, LinkKind, LinkPayload};
use cisne_testing::db::migrated_sqlite;

// These call the repositories directly, as two requests that both passed the
// application pre-checks would.

fn therapist(email: &str, nif: &str) -> NewAccount {
    NewAccount {
        email: email.into(),
        password_hash: "hash".into(),
        profile: NewProfile::Therapist(NewTherapist {
            first_name: "Laura".into(),
            last_name: "Martín".into(),
            nif: nif.into(),
            society_id: None,
            profession: None,
        }),
    }
}

fn patient(email: &str, nif: &str) -> NewAccount {
    NewAccount {
        email: email.into(),
        password_hash: "hash".into(),
        profile: NewProfile::Patient(NewPatient {
            first_name: "Pablo".into(),
            last_name: "Ruiz".into(),
            nif: nif.into(),
            diagnosis: None,
        }),
    }
}

fn centre(email: &str, cif: &str) -> NewAccount {
    NewAccount {
        email: email.into(),
        password_hash: "hash".into(),
        profile: NewProfile::Centre(NewCentre {
            cif: cif.into(),
            name: "Clinic".into(),
            location: None,
            service_id: None,
        }),
    }
}

#[tokio::test]
async fn should_refuse_nif_held_by_other_profile_kind_at_insert() {
    let accounts = DbAccountRepository {
        db: migrated_sqlite().await,
    };

    accounts
        .register(&therapist("t@x.com", "12345678Z"))
        .await
        .unwrap();
    let result = accounts.register(&patient("p@x.com", "12345678Z")).await;
    assert!(matches!(result, Err(ApiError::NifTakenByTherapist)));
    assert!(accounts.find_by_email("p@x.com").await.unwrap().is_none());

    accounts
        .register(&patient("p2@x.com", "87654321X"))
        .await
        .unwrap();
    let result = accounts.register(&therapist("t2@x.com", "87654321X")).await;
    assert!(matches!(result, Err(ApiError::NifTakenByPatient)));
    assert!(accounts.find_by_email("t2@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn should_refuse_nif_change_onto_other_profile_kind() {
    let db = migrated_sqlite().await;
    let accounts = DbAccountRepository { db: db.clone() };
    let patients = DbPatientRepository { db };

    accounts
        .register(&therapist("t@x.com", "12345678Z"))
        .await
        .unwrap();
    let owner = accounts
        .register(&patient("p@x.com", "11111111A"))
        .await
        .unwrap();

    let patch = PatientPatch {
        nif: Some("12345678Z".into()),
        ..Default::default()
    };
    let result = patients.update(owner.id, &patch).await;
    assert!(matches!(result, Err(ApiError::NifTakenByTherapist)));

    let kept = patients.find_by_id(owner.id).await.unwrap().unwrap();
    assert_eq!(kept.nif, "11111111A");

    // The old NIF is still held, the new one is free to move into.
    let patch = PatientPatch {
        nif: Some("22222222B".into()),
        ..Default::default()
    };
    patients.update(owner.id, &patch).await.unwrap();
    let result = accounts.register(&therapist("t2@x.com", "22222222B")).await;
    assert!(matches!(result, Err(ApiError::NifTakenByPatient)));
    accounts
        .register(&therapist("t3@x.com", "11111111A"))
        .await
        .unwrap();
}

#[tokio::test]
async fn should_free_nif_when_profile_is_deleted() {
    let db = migrated_sqlite().await;
    let accounts = DbAccountRepository { db: db.clone() };
    let therapists = DbTherapistRepository { db };

    let user = accounts
        .register(&therapist("t@x.com", "12345678Z"))
        .await
        .unwrap();
    assert!(therapists.delete(user.id).await.unwrap());

    accounts
        .register(&patient("p@x.com", "12345678Z"))
        .await
        .unwrap();
}

#[tokio::test]
async fn should_map_duplicate_email_at_insert_to_conflict() {
    let accounts = DbAccountRepository {
        db: migrated_sqlite().await,
    };
    accounts
        .register(&patient("ana@x.com", "11111111A"))
        .await
        .unwrap();

    let result = accounts.register(&patient("ana@x.com", "22222222B")).await;
    assert!(matches!(result, Err(ApiError::EmailTaken)));
}

#[tokio::test]
async fn should_map_duplicate_link_at_insert_to_conflict() {
    let db = migrated_sqlite().await;
    let accounts = DbAccountRepository { db: db.clone() };
    let links = DbLinkRepository { db };

    let employer = accounts
        .register(&centre("c@x.com", "B12345678"))
        .await
        .unwrap();
    let employee = accounts
        .register(&therapist("t@x.com", "12345678Z"))
        .await
        .unwrap();
    let link = Link {
        key: LinkKey::new(LinkKind::Employs, employer.id, employee.id),
        payload: LinkPayload::Contract("full-time".into()),
    };

    links.insert(&link).await.unwrap();
    let result = links.insert(&link).await;
    assert!(matches!(result, Err(ApiError::LinkExists(LinkKind::Employs))));

    let stored = links.find(link.key).await.unwrap().unwrap();
    assert_eq!(stored.payload, link.payload);
}
