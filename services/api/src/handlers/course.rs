use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::{JsonBody, PathParams, QueryString};
use cisne_domain::id::EntityId;
use cisne_domain::link::LinkKind;

use crate::domain::types::{Course, CourseFilter};
use crate::error::ApiError;
use crate::handlers::centre::CentreResponse;
use crate::handlers::link::{LinkedResponse, list_linked};
use crate::handlers::therapist::TherapistResponse;
use crate::handlers::{IdPath, today};
use crate::state::AppState;
use crate::usecase::course::{
    CourseInput, CreateCourseUseCase, DeleteCourseUseCase, GetCourseUseCase, ListCoursesUseCase,
    UpdateCourseUseCase,
};
use crate::usecase::link::Side;

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: EntityId,
    pub invoice_id: Option<EntityId>,
    pub name: String,
    pub teacher: Option<String>,
    pub price: Option<f64>,
    pub course_type: Option<String>,
    pub description: Option<String>,
    pub course_date: Option<NaiveDate>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            invoice_id: course.invoice_id,
            name: course.name,
            teacher: course.teacher,
            price: course.price,
            course_type: course.course_type,
            description: course.description,
            course_date: course.date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseRequest {
    pub invoice_id: Option<EntityId>,
    pub name: Option<String>,
    pub teacher: Option<String>,
    pub price: Option<f64>,
    pub course_type: Option<String>,
    pub description: Option<String>,
    pub course_date: Option<NaiveDate>,
}

impl From<CourseRequest> for CourseInput {
    fn from(body: CourseRequest) -> Self {
        Self {
            invoice_id: body.invoice_id,
            name: body.name,
            teacher: body.teacher,
            price: body.price,
            course_type: body.course_type,
            description: body.description,
            date: body.course_date,
        }
    }
}

// ── GET /api/courses and /api/courses/available ──────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub name: Option<String>,
    pub teacher: Option<String>,
    pub course_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl From<CourseQuery> for CourseFilter {
    fn from(query: CourseQuery) -> Self {
        Self {
            name: query.name,
            teacher: query.teacher,
            course_type: query.course_type,
            min_price: query.min_price,
            max_price: query.max_price,
            available_from: None,
        }
    }
}

pub async fn list_courses(
    State(state): State<AppState>,
    QueryString(query): QueryString<CourseQuery>,
) -> Result<Reply<Vec<CourseResponse>>, ApiError> {
    let usecase = ListCoursesUseCase {
        repo: state.course_repo(),
    };
    let courses = usecase.execute(&query.into()).await?;
    Ok(Reply::list(courses.into_iter().map(CourseResponse::from).collect()))
}

pub async fn list_upcoming_courses(
    State(state): State<AppState>,
    QueryString(query): QueryString<CourseQuery>,
) -> Result<Reply<Vec<CourseResponse>>, ApiError> {
    let usecase = ListCoursesUseCase {
        repo: state.course_repo(),
    };
    let courses = usecase.available(query.into(), today()).await?;
    Ok(Reply::list(courses.into_iter().map(CourseResponse::from).collect()))
}

// ── GET /api/courses/{id} ────────────────────────────────────────────────────

pub async fn get_course(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<CourseResponse>, ApiError> {
    let usecase = GetCourseUseCase {
        repo: state.course_repo(),
    };
    Ok(Reply::ok(usecase.execute(path.id).await?.into()))
}

// ── POST /api/courses ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    /// Posting centre when an admin creates the course; ignored for centres.
    pub centre_id: Option<EntityId>,
    #[serde(flatten)]
    pub course: CourseRequest,
}

pub async fn create_course(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateCourseRequest>,
) -> Result<Reply<CourseResponse>, ApiError> {
    let usecase = CreateCourseUseCase {
        repo: state.course_repo(),
        directory: state.directory(),
    };
    let course = usecase
        .execute(&principal, body.course.into(), body.centre_id, today())
        .await?;
    Ok(Reply::created(course.into()))
}

// ── PUT /api/courses/{id} ────────────────────────────────────────────────────

pub async fn update_course(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<CourseRequest>,
) -> Result<Reply<CourseResponse>, ApiError> {
    let usecase = UpdateCourseUseCase {
        repo: state.course_repo(),
        links: state.link_repo(),
        directory: state.directory(),
    };
    let course = usecase.execute(&principal, path.id, body.into()).await?;
    Ok(Reply::ok(course.into()))
}

// ── DELETE /api/courses/{id} ─────────────────────────────────────────────────

pub async fn delete_course(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeleteCourseUseCase {
        repo: state.course_repo(),
        links: state.link_repo(),
    };
    usecase.execute(&principal, path.id).await?;
    Ok(Reply::message("course deleted"))
}

// ── GET /api/courses/{id}/centres and /api/courses/{id}/therapists ───────────

pub async fn list_posting_centres(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<CentreResponse>>>, ApiError> {
    let lookup = state.centre_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Posts, path.id).await
}

pub async fn list_buyers(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<TherapistResponse>>>, ApiError> {
    let lookup = state.therapist_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Buys, path.id).await
}
