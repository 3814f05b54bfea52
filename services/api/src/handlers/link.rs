//! Shared plumbing for relationship endpoints.
//!
//! Every `/{id}/...` route and its `/me/...` twin call the helpers here with
//! the owner id taken from the path or from the caller, so both variants run
//! the same use case.

use chrono::NaiveDate;
use serde::Serialize;

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_domain::id::EntityId;
use cisne_domain::link::{Link, LinkAttributes, LinkKey, LinkKind, LinkPayload};

use crate::domain::repository::BatchLookup;
use crate::domain::types::{Identified, Linked};
use crate::error::ApiError;
use crate::handlers::today;
use crate::state::AppState;
use crate::usecase::link::{
    CreateLinkUseCase, DeleteLinkUseCase, ListLinkedUseCase, Side, UpdateLinkUseCase,
};

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub relationship: &'static str,
    pub left_id: EntityId,
    pub right_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        let (contract, report, date) = match link.payload {
            LinkPayload::Contract(text) => (Some(text), None, None),
            LinkPayload::Report(text) => (None, Some(text), None),
            LinkPayload::Dated(date) => (None, None, Some(date)),
            LinkPayload::Bare => (None, None, None),
        };
        Self {
            relationship: link.key.kind.as_str(),
            left_id: link.key.left,
            right_id: link.key.right,
            contract,
            report,
            date,
        }
    }
}

/// A far-side row with the relationship that connects it.
#[derive(Debug, Serialize)]
pub struct LinkedResponse<R> {
    #[serde(flatten)]
    pub item: R,
    pub relationship: LinkResponse,
}

impl<T, R: From<T>> From<Linked<T>> for LinkedResponse<R> {
    fn from(linked: Linked<T>) -> Self {
        Self {
            item: linked.item.into(),
            relationship: linked.link.into(),
        }
    }
}

pub(crate) async fn list_linked<T, R, B>(
    state: &AppState,
    lookup: B,
    side: Side,
    kind: LinkKind,
    id: EntityId,
) -> Result<Reply<Vec<LinkedResponse<R>>>, ApiError>
where
    T: Identified,
    R: From<T> + Serialize,
    B: BatchLookup<T>,
{
    let usecase = ListLinkedUseCase {
        links: state.link_repo(),
        lookup,
        directory: state.directory(),
    };
    let rows = usecase.execute::<T>(side, kind, id).await?;
    Ok(Reply::list(rows.into_iter().map(LinkedResponse::from).collect()))
}

pub(crate) async fn create_link(
    state: &AppState,
    principal: &Principal,
    key: LinkKey,
    attrs: LinkAttributes,
) -> Result<Reply<LinkResponse>, ApiError> {
    let usecase = CreateLinkUseCase {
        links: state.link_repo(),
        directory: state.directory(),
    };
    let link = usecase.execute(principal, key, attrs, today()).await?;
    Ok(Reply::created(link.into()))
}

pub(crate) async fn update_link(
    state: &AppState,
    principal: &Principal,
    key: LinkKey,
    attrs: LinkAttributes,
) -> Result<Reply<LinkResponse>, ApiError> {
    let usecase = UpdateLinkUseCase {
        links: state.link_repo(),
    };
    let link = usecase.execute(principal, key, attrs).await?;
    Ok(Reply::ok(link.into()))
}

pub(crate) async fn delete_link(
    state: &AppState,
    principal: &Principal,
    key: LinkKey,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeleteLinkUseCase {
        links: state.link_repo(),
    };
    usecase.execute(principal, key).await?;
    Ok(Reply::message(format!("{} relationship deleted", key.kind)))
}
