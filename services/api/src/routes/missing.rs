//! Lost-and-found routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    live::{Change, Table, sse_snapshots},
    models::{
        missing::{MissingQuery, MissingReport},
        pet::PetPayload,
    },
    session::Session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/missing", get(list_reports).post(create_report))
        .route("/missing/live", get(live_reports))
        .route("/missing/:id/found", post(mark_found))
        .route("/missing/:id", delete(delete_report))
}

async fn modifiable_report(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> ApiResult<MissingReport> {
    let report = state
        .missing
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load missing-pet report"))?
        .ok_or(ApiError::NotFound("Missing-pet report"))?;

    session.ensure_can_modify(report.owner_id, "report")?;
    Ok(report)
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<MissingQuery>,
) -> ApiResult<impl IntoResponse> {
    let reports = state
        .missing
        .list(query.filter)
        .await
        .map_err(internal("Failed to list missing-pet reports"))?;

    Ok(Json(reports))
}

pub async fn live_reports(
    State(state): State<AppState>,
    Query(query): Query<MissingQuery>,
) -> impl IntoResponse {
    let missing = state.missing.clone();
    let filter = query.filter;

    sse_snapshots(
        &state.live,
        |change| change.touches(Table::Missing),
        move || {
            let missing = missing.clone();
            async move { missing.list(filter).await }
        },
    )
}

pub async fn create_report(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<PetPayload>,
) -> ApiResult<impl IntoResponse> {
    let payload = payload.validate().map_err(ApiError::BadRequest)?;

    let report = state
        .missing
        .create(session.user_id, &payload)
        .await
        .map_err(internal("Failed to create missing-pet report"))?;

    state.live.publish(Change::table(Table::Missing));
    Ok((StatusCode::CREATED, Json(report)))
}

/// One-way for owners; only the admin toggle can undo it
pub async fn mark_found(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    modifiable_report(&state, &session, id).await?;

    let report = state
        .missing
        .mark_found(id)
        .await
        .map_err(internal("Failed to mark report as found"))?
        .ok_or(ApiError::NotFound("Missing-pet report"))?;

    info!("Report {} marked as found by {}", id, session.user_id);
    state.live.publish(Change::table(Table::Missing));
    Ok(Json(report))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    modifiable_report(&state, &session, id).await?;

    if !state
        .missing
        .delete(id)
        .await
        .map_err(internal("Failed to delete missing-pet report"))?
    {
        return Err(ApiError::NotFound("Missing-pet report"));
    }

    state.live.publish(Change::table(Table::Missing));
    Ok(StatusCode::NO_CONTENT)
}
