use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use cisne_core::health::healthz;
use cisne_core::middleware::{cors_layer, propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth, centre, course, health, invoice, patient, resource, service, therapist, user,
};
use crate::state::AppState;

pub fn build_router(state: AppState, cors_origins: &str) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Users (admin)
        .route("/users", get(user::list_users))
        .route("/users/{id}", get(user::get_user).delete(user::delete_user))
        .route("/users/{id}/profile-kind", get(user::get_profile_kind))
        // Centres
        .route(
            "/centres",
            get(centre::list_centres).post(centre::create_centre),
        )
        .route(
            "/centres/me",
            get(centre::get_my_centre)
                .put(centre::update_my_centre)
                .delete(centre::delete_my_centre),
        )
        .route(
            "/centres/me/therapists",
            get(centre::list_my_employees).post(centre::employ_mine),
        )
        .route(
            "/centres/me/therapists/{therapist_id}",
            put(centre::update_my_contract).delete(centre::dismiss_mine),
        )
        .route(
            "/centres/me/courses",
            get(centre::list_my_posted_courses).post(centre::post_my_course),
        )
        .route(
            "/centres/me/courses/{course_id}",
            delete(centre::unpost_my_course),
        )
        .route(
            "/centres/{id}",
            get(centre::get_centre)
                .put(centre::update_centre)
                .delete(centre::delete_centre),
        )
        .route(
            "/centres/{id}/therapists",
            get(centre::list_employees).post(centre::employ),
        )
        .route(
            "/centres/{id}/therapists/{therapist_id}",
            put(centre::update_contract).delete(centre::dismiss),
        )
        .route(
            "/centres/{id}/courses",
            get(centre::list_posted_courses).post(centre::post_course),
        )
        .route(
            "/centres/{id}/courses/{course_id}",
            delete(centre::unpost_course),
        )
        // Therapists
        .route(
            "/therapists",
            get(therapist::list_therapists).post(therapist::create_therapist),
        )
        .route(
            "/therapists/me",
            get(therapist::get_my_therapist)
                .put(therapist::update_my_therapist)
                .delete(therapist::delete_my_therapist),
        )
        .route("/therapists/me/centres", get(therapist::list_my_employers))
        .route(
            "/therapists/me/patients",
            get(therapist::list_my_patients).post(therapist::treat_mine),
        )
        .route(
            "/therapists/me/patients/{patient_id}",
            put(therapist::update_my_report).delete(therapist::discharge_mine),
        )
        .route(
            "/therapists/me/courses",
            get(therapist::list_my_courses).post(therapist::buy_my_course),
        )
        .route(
            "/therapists/me/courses/available",
            get(therapist::list_my_available_courses),
        )
        .route(
            "/therapists/me/courses/{course_id}",
            delete(therapist::drop_my_course),
        )
        .route(
            "/therapists/me/resources",
            get(resource::list_my_publications).post(therapist::publish_mine),
        )
        .route(
            "/therapists/me/resources/{resource_id}",
            delete(therapist::unpublish_mine),
        )
        .route(
            "/therapists/{id}",
            get(therapist::get_therapist)
                .put(therapist::update_therapist)
                .delete(therapist::delete_therapist),
        )
        .route("/therapists/{id}/centres", get(therapist::list_employers))
        .route(
            "/therapists/{id}/patients",
            get(therapist::list_patients).post(therapist::treat),
        )
        .route(
            "/therapists/{id}/patients/{patient_id}",
            put(therapist::update_report).delete(therapist::discharge),
        )
        .route(
            "/therapists/{id}/courses",
            get(therapist::list_courses).post(therapist::buy_course),
        )
        .route(
            "/therapists/{id}/courses/available",
            get(therapist::list_available_courses),
        )
        .route(
            "/therapists/{id}/courses/{course_id}",
            delete(therapist::drop_course),
        )
        .route(
            "/therapists/{id}/resources",
            get(therapist::list_publications).post(therapist::publish),
        )
        .route(
            "/therapists/{id}/resources/{resource_id}",
            delete(therapist::unpublish),
        )
        // Patients
        .route(
            "/patients",
            get(patient::list_patients).post(patient::create_patient),
        )
        .route(
            "/patients/me",
            get(patient::get_my_patient)
                .put(patient::update_my_patient)
                .delete(patient::delete_my_patient),
        )
        .route("/patients/me/therapists", get(patient::list_my_therapists))
        .route("/patients/me/feed", get(resource::get_my_feed))
        .route(
            "/patients/me/services",
            get(patient::list_my_services).post(patient::pay_my_service),
        )
        .route(
            "/patients/me/services/{service_id}",
            delete(patient::cancel_my_payment),
        )
        .route(
            "/patients/me/resources",
            get(patient::list_my_resources).post(patient::consume_my_resource),
        )
        .route(
            "/patients/me/resources/{resource_id}",
            delete(patient::release_my_resource),
        )
        .route(
            "/patients/{id}",
            get(patient::get_patient)
                .put(patient::update_patient)
                .delete(patient::delete_patient),
        )
        .route("/patients/{id}/therapists", get(patient::list_therapists))
        .route("/patients/{id}/feed", get(resource::get_patient_feed))
        .route(
            "/patients/{id}/services",
            get(patient::list_services).post(patient::pay_service),
        )
        .route(
            "/patients/{id}/services/{service_id}",
            delete(patient::cancel_payment),
        )
        .route(
            "/patients/{id}/resources",
            get(patient::list_resources).post(patient::consume_resource),
        )
        .route(
            "/patients/{id}/resources/{resource_id}",
            delete(patient::release_resource),
        )
        // Courses
        .route(
            "/courses",
            get(course::list_courses).post(course::create_course),
        )
        .route("/courses/available", get(course::list_upcoming_courses))
        .route(
            "/courses/{id}",
            get(course::get_course)
                .put(course::update_course)
                .delete(course::delete_course),
        )
        .route("/courses/{id}/centres", get(course::list_posting_centres))
        .route("/courses/{id}/therapists", get(course::list_buyers))
        // Resources
        .route(
            "/resources",
            get(resource::list_resources).post(resource::create_resource),
        )
        .route("/resources/mine", get(resource::list_my_publications))
        .route("/resources/feed", get(resource::get_my_feed))
        .route("/resources/popular", get(resource::list_popular_resources))
        .route(
            "/resources/{id}",
            get(resource::get_resource)
                .put(resource::update_resource)
                .delete(resource::delete_resource),
        )
        .route("/resources/{id}/publishers", get(resource::list_publishers))
        .route("/resources/{id}/consumers", get(resource::list_consumers))
        // Services
        .route(
            "/services",
            get(service::list_services).post(service::create_service),
        )
        .route("/services/available", get(service::list_available_services))
        .route(
            "/services/{id}",
            get(service::get_service)
                .put(service::update_service)
                .delete(service::delete_service),
        )
        .route("/services/{id}/patients", get(service::list_payers))
        // Invoices (admin)
        .route(
            "/invoices",
            get(invoice::list_invoices).post(invoice::create_invoice),
        )
        .route("/invoices/pending", get(invoice::list_pending_invoices))
        .route("/invoices/services", post(invoice::create_service_invoice))
        .route("/invoices/courses", post(invoice::create_course_invoice))
        .route(
            "/invoices/{id}",
            get(invoice::get_invoice)
                .put(invoice::update_invoice)
                .delete(invoice::delete_invoice),
        )
        .route(
            "/invoices/{id}/payment-status",
            patch(invoice::set_payment_status),
        );

    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(health::readyz))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
