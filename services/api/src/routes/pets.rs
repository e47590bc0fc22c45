//! Pet profile routes; every list is scoped to the caller

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    live::{Change, Table, sse_snapshots},
    models::pet::{Pet, PetPayload},
    session::Session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pets", get(list_pets).post(create_pet))
        .route("/pets/live", get(live_pets))
        .route(
            "/pets/:id",
            get(get_pet).put(update_pet).delete(delete_pet),
        )
}

async fn owned_pet(state: &AppState, session: &Session, id: Uuid) -> ApiResult<Pet> {
    let pet = state
        .pets
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load pet"))?
        .ok_or(ApiError::NotFound("Pet"))?;

    session.ensure_can_modify(pet.owner_id, "pet")?;
    Ok(pet)
}

pub async fn list_pets(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    let pets = state
        .pets
        .list_by_owner(session.user_id)
        .await
        .map_err(internal("Failed to list pets"))?;

    Ok(Json(pets))
}

pub async fn live_pets(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> impl IntoResponse {
    let pets = state.pets.clone();
    let owner_id = session.user_id;

    sse_snapshots(
        &state.live,
        |change| change.touches(Table::Pets),
        move || {
            let pets = pets.clone();
            async move { pets.list_by_owner(owner_id).await }
        },
    )
}

pub async fn create_pet(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<PetPayload>,
) -> ApiResult<impl IntoResponse> {
    let payload = payload.validate().map_err(ApiError::BadRequest)?;

    let pet = state
        .pets
        .create(session.user_id, &payload)
        .await
        .map_err(internal("Failed to create pet"))?;

    state.live.publish(Change::table(Table::Pets));
    Ok((StatusCode::CREATED, Json(pet)))
}

pub async fn get_pet(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(owned_pet(&state, &session, id).await?))
}

pub async fn update_pet(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PetPayload>,
) -> ApiResult<impl IntoResponse> {
    let payload = payload.validate().map_err(ApiError::BadRequest)?;
    owned_pet(&state, &session, id).await?;

    let pet = state
        .pets
        .update(id, &payload)
        .await
        .map_err(internal("Failed to update pet"))?
        .ok_or(ApiError::NotFound("Pet"))?;

    state.live.publish(Change::table(Table::Pets));
    Ok(Json(pet))
}

pub async fn delete_pet(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    owned_pet(&state, &session, id).await?;

    if !state
        .pets
        .delete(id)
        .await
        .map_err(internal("Failed to delete pet"))?
    {
        return Err(ApiError::NotFound("Pet"));
    }

    state.live.publish(Change::table(Table::Pets));
    Ok(StatusCode::NO_CONTENT)
}
