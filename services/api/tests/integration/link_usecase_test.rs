use chrono::NaiveDate;

use cisne_api::domain::types::Course;
use cisne_api::error::ApiError;
use cisne_api::usecase::course::AvailableCoursesUseCase;
use cisne_api::usecase::link::{
    CreateLinkUseCase, DeleteLinkUseCase, ListLinkedUseCase, Side, UpdateLinkUseCase,
};
use cisne_auth_types::principal::Principal;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::link::{LinkAttributes, LinkKey, LinkKind, LinkPayload};
use cisne_domain::role::Role;

use crate::helpers::{MockCourses, MockDirectory, MockLinkRepo, course, link};

fn principal(id: i32, role: Role) -> Principal {
    Principal {
        id: EntityId::new(id),
        email: format!("user{id}@cisne.test"),
        role,
    }
}

fn key(kind: LinkKind, left: i32, right: i32) -> LinkKey {
    LinkKey::new(kind, EntityId::new(left), EntityId::new(right))
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
}

// ── CreateLink ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_check_owner_before_endpoints() {
    let usecase = CreateLinkUseCase {
        links: MockLinkRepo::default(),
        directory: MockDirectory::new(&[]),
    };
    let result = usecase
        .execute(
            &principal(2, Role::Centre),
            key(LinkKind::Employs, 1, 7),
            LinkAttributes::default(),
            today(),
        )
        .await;
    assert!(matches!(result, Err(ApiError::ForbiddenNotOwner)));
}

#[tokio::test]
async fn should_report_missing_right_endpoint_without_writing() {
    let links = MockLinkRepo::default();
    let handle = links.links_handle();
    let usecase = CreateLinkUseCase {
        links,
        directory: MockDirectory::new(&[(EntityKind::Centre, 4)]),
    };
    let result = usecase
        .execute(
            &principal(4, Role::Centre),
            key(LinkKind::Employs, 4, 7),
            LinkAttributes::default(),
            today(),
        )
        .await;
    assert!(matches!(
        result,
        Err(ApiError::NotFound(EntityKind::Therapist))
    ));
    assert!(handle.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_without_touching_payload() {
    let links = MockLinkRepo::new(vec![link(
        LinkKind::Employs,
        4,
        7,
        LinkPayload::Contract("part-time".into()),
    )]);
    let handle = links.links_handle();
    let usecase = CreateLinkUseCase {
        links,
        directory: MockDirectory::new(&[(EntityKind::Centre, 4), (EntityKind::Therapist, 7)]),
    };
    let result = usecase
        .execute(
            &principal(4, Role::Centre),
            key(LinkKind::Employs, 4, 7),
            LinkAttributes {
                text: Some("full-time".into()),
                date: None,
            },
            today(),
        )
        .await;
    assert!(matches!(result, Err(ApiError::LinkExists(LinkKind::Employs))));

    let rows = handle.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].payload, LinkPayload::Contract("part-time".into()));
}

#[tokio::test]
async fn should_require_employer_posting_before_buying() {
    let directory = || {
        MockDirectory::new(&[
            (EntityKind::Centre, 4),
            (EntityKind::Therapist, 7),
            (EntityKind::Course, 10),
        ])
    };

    let unrelated = CreateLinkUseCase {
        links: MockLinkRepo::new(vec![link(LinkKind::Posts, 4, 10, LinkPayload::Dated(today()))]),
        directory: directory(),
    };
    let result = unrelated
        .execute(
            &principal(7, Role::Therapist),
            key(LinkKind::Buys, 7, 10),
            LinkAttributes::default(),
            today(),
        )
        .await;
    assert!(matches!(result, Err(ApiError::CourseNotOffered)));

    let employed = CreateLinkUseCase {
        links: MockLinkRepo::new(vec![
            link(LinkKind::Posts, 4, 10, LinkPayload::Dated(today())),
            link(LinkKind::Employs, 4, 7, LinkPayload::Contract("x".into())),
        ]),
        directory: directory(),
    };
    let created = employed
        .execute(
            &principal(7, Role::Therapist),
            key(LinkKind::Buys, 7, 10),
            LinkAttributes::default(),
            today(),
        )
        .await
        .unwrap();
    assert_eq!(created.payload, LinkPayload::Dated(today()));
}

// ── UpdateLink / DeleteLink ──────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_update_with_wrong_attribute() {
    let usecase = UpdateLinkUseCase {
        links: MockLinkRepo::new(vec![link(
            LinkKind::Employs,
            4,
            7,
            LinkPayload::Contract("x".into()),
        )]),
    };
    let result = usecase
        .execute(
            &principal(4, Role::Centre),
            key(LinkKind::Employs, 4, 7),
            LinkAttributes {
                text: None,
                date: Some(today()),
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::EmptyUpdate)));
}

#[tokio::test]
async fn should_report_missing_row_on_update_and_delete() {
    let update = UpdateLinkUseCase {
        links: MockLinkRepo::default(),
    };
    let result = update
        .execute(
            &principal(7, Role::Therapist),
            key(LinkKind::Treats, 7, 9),
            LinkAttributes {
                text: Some("better".into()),
                date: None,
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::LinkNotFound(LinkKind::Treats))));

    let delete = DeleteLinkUseCase {
        links: MockLinkRepo::default(),
    };
    let result = delete
        .execute(&principal(9, Role::Patient), key(LinkKind::Consume, 9, 3))
        .await;
    assert!(matches!(result, Err(ApiError::LinkNotFound(LinkKind::Consume))));
}

// ── ListLinked ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_far_side_in_link_order() {
    let usecase = ListLinkedUseCase {
        links: MockLinkRepo::new(vec![
            link(LinkKind::Buys, 7, 12, LinkPayload::Dated(today())),
            link(LinkKind::Buys, 8, 10, LinkPayload::Dated(today())),
            link(LinkKind::Buys, 7, 10, LinkPayload::Dated(today())),
            link(LinkKind::Buys, 7, 99, LinkPayload::Dated(today())),
        ]),
        lookup: MockCourses {
            courses: vec![course(10, "Signing"), course(12, "Phonics")],
        },
        directory: MockDirectory::new(&[(EntityKind::Therapist, 7)]),
    };
    let linked = usecase
        .execute::<Course>(Side::Left, LinkKind::Buys, EntityId::new(7))
        .await
        .unwrap();
    let names: Vec<&str> = linked.iter().map(|l| l.item.name.as_str()).collect();
    assert_eq!(names, vec!["Phonics", "Signing"]);
}

#[tokio::test]
async fn should_distinguish_empty_list_from_missing_anchor() {
    let usecase = ListLinkedUseCase {
        links: MockLinkRepo::default(),
        lookup: MockCourses { courses: vec![] },
        directory: MockDirectory::new(&[(EntityKind::Centre, 4)]),
    };
    let empty = usecase
        .execute::<Course>(Side::Left, LinkKind::Posts, EntityId::new(4))
        .await
        .unwrap();
    assert!(empty.is_empty());

    let missing = usecase
        .execute::<Course>(Side::Left, LinkKind::Posts, EntityId::new(5))
        .await;
    assert!(matches!(missing, Err(ApiError::NotFound(EntityKind::Centre))));
}

// ── AvailableCourses ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_offer_posted_minus_bought_across_employers() {
    let usecase = AvailableCoursesUseCase {
        links: MockLinkRepo::new(vec![
            link(LinkKind::Employs, 4, 7, LinkPayload::Contract("x".into())),
            link(LinkKind::Employs, 5, 7, LinkPayload::Contract("y".into())),
            link(LinkKind::Posts, 4, 10, LinkPayload::Dated(today())),
            link(LinkKind::Posts, 5, 11, LinkPayload::Dated(today())),
            link(LinkKind::Posts, 6, 12, LinkPayload::Dated(today())),
            link(LinkKind::Buys, 7, 11, LinkPayload::Dated(today())),
        ]),
        courses: MockCourses {
            courses: vec![course(10, "A"), course(11, "B"), course(12, "C")],
        },
        directory: MockDirectory::new(&[(EntityKind::Therapist, 7)]),
    };
    let available = usecase.execute(EntityId::new(7)).await.unwrap();
    let ids: Vec<i32> = available.iter().map(|c| c.id.get()).collect();
    assert_eq!(ids, vec![10]);

    let missing = usecase.execute(EntityId::new(8)).await;
    assert!(matches!(
        missing,
        Err(ApiError::NotFound(EntityKind::Therapist))
    ));
}
