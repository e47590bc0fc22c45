//! Community chat routes
//!
//! Opening a group joins it. Sending also joins, inside the send
//! transaction, so a sender is always a member.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    live::{Change, Table, sse_snapshots},
    models::chat::{
        ChatGroup, MessageQuery, MessagesResponse, NewChatGroup, SendMessage,
        validate_message_text,
    },
    repositories::chat::SendOutcome,
    session::Session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat/groups", get(list_groups).post(create_group))
        .route("/chat/groups/live", get(live_groups))
        .route("/chat/groups/:id", get(open_group))
        .route(
            "/chat/groups/:id/messages",
            get(list_messages).post(send_message),
        )
        .route("/chat/groups/:id/messages/live", get(live_messages))
}

/// Admins may still read inactive groups
async fn readable_group(state: &AppState, session: &Session, id: Uuid) -> ApiResult<ChatGroup> {
    let group = state
        .chat
        .find_group(id)
        .await
        .map_err(internal("Failed to load chat group"))?
        .ok_or(ApiError::NotFound("Chat group"))?;

    if !group.active && !session.is_admin() {
        return Err(ApiError::Forbidden("This group is inactive".to_string()));
    }

    Ok(group)
}

pub async fn list_groups(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let groups = state
        .chat
        .list_active_groups()
        .await
        .map_err(internal("Failed to list chat groups"))?;

    Ok(Json(groups))
}

pub async fn live_groups(State(state): State<AppState>) -> impl IntoResponse {
    let chat = state.chat.clone();

    sse_snapshots(
        &state.live,
        |change| change.touches_group_list(),
        move || {
            let chat = chat.clone();
            async move { chat.list_active_groups().await }
        },
    )
}

pub async fn create_group(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<NewChatGroup>,
) -> ApiResult<impl IntoResponse> {
    let group = payload.validate().map_err(ApiError::BadRequest)?;

    let group = state
        .chat
        .create_group(&session, &group)
        .await
        .map_err(internal("Failed to create chat group"))?;

    state.live.publish(Change::table(Table::ChatGroups));
    Ok((StatusCode::CREATED, Json(group)))
}

/// Group detail; the caller becomes a member if not one already
pub async fn open_group(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let group = readable_group(&state, &session, id).await?;

    if group.is_member(session.user_id) {
        return Ok(Json(group));
    }

    let joined = state
        .chat
        .join(id, session.user_id)
        .await
        .map_err(internal("Failed to join chat group"))?;

    if joined {
        debug!("User {} joined group {}", session.user_id, id);
        state.live.publish(Change::table(Table::ChatGroups));
    }

    let group = state
        .chat
        .find_group(id)
        .await
        .map_err(internal("Failed to load chat group"))?
        .ok_or(ApiError::NotFound("Chat group"))?;

    Ok(Json(group))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Query(query): Query<MessageQuery>,
) -> ApiResult<impl IntoResponse> {
    let offset = query.offset().map_err(ApiError::BadRequest)?;
    readable_group(&state, &session, id).await?;

    let messages = state
        .chat
        .list_messages(id)
        .await
        .map_err(internal("Failed to list messages"))?;

    Ok(Json(MessagesResponse::new(messages, offset, Utc::now())))
}

pub async fn live_messages(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Query(query): Query<MessageQuery>,
) -> ApiResult<impl IntoResponse> {
    let offset = query.offset().map_err(ApiError::BadRequest)?;
    readable_group(&state, &session, id).await?;

    let chat = state.chat.clone();

    Ok(sse_snapshots(
        &state.live,
        move |change| change.touches_group(Table::Messages, id),
        move || {
            let chat = chat.clone();
            async move {
                let messages = chat.list_messages(id).await?;
                Ok::<_, anyhow::Error>(MessagesResponse::new(messages, offset, Utc::now()))
            }
        },
    ))
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessage>,
) -> ApiResult<impl IntoResponse> {
    let text = validate_message_text(&payload.text).map_err(ApiError::BadRequest)?;

    let outcome = state
        .chat
        .send_message(id, &session, &text)
        .await
        .map_err(internal("Failed to send message"))?;

    let message = match outcome {
        SendOutcome::Sent(message) => message,
        SendOutcome::GroupNotFound => return Err(ApiError::NotFound("Chat group")),
        SendOutcome::GroupInactive => {
            return Err(ApiError::Forbidden("This group is inactive".to_string()));
        }
    };

    info!("Message {} sent to group {}", message.id, id);
    state.live.publish(Change::group(Table::Messages, id));
    state.live.publish(Change::table(Table::ChatGroups));

    Ok((StatusCode::CREATED, Json(message)))
}
