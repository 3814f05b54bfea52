use axum::extract::State;

use cisne_core::envelope::Reply;

use crate::error::ApiError;
use crate::infra::internal;
use crate::state::AppState;

/// `GET /readyz`: the database answers a ping.
pub async fn readyz(State(state): State<AppState>) -> Result<Reply<()>, ApiError> {
    state
        .db
        .ping()
        .await
        .map_err(|e| internal(e, "database ping"))?;
    Ok(Reply::message("ready"))
}
