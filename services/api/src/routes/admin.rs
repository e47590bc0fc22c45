//! Administration routes
//!
//! Mounted behind [`crate::middleware::admin_middleware`], so every handler
//! here can assume an admin [`Session`].

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    live::{Change, Table},
    models::{
        blog::BlogPostPayload,
        news::{VisibilityUpdate, moderated},
        user::{RoleUpdate, UserSearch},
    },
    session::Session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/role", put(set_user_role))
        .route("/admin/missing", get(list_missing))
        .route("/admin/missing/:id/toggle-found", post(toggle_found))
        .route("/admin/products", get(list_products))
        .route("/admin/products/:id/toggle-active", post(toggle_product))
        .route("/admin/blog", post(create_post))
        .route("/admin/blog/:id", put(update_post).delete(delete_post))
        .route("/admin/blog/:id/toggle-active", post(toggle_post))
        .route("/admin/chat/groups", get(list_groups))
        .route("/admin/chat/groups/:id", delete(delete_group))
        .route("/admin/chat/groups/:id/toggle-active", post(toggle_group))
        .route("/admin/news", get(list_news))
        .route("/admin/news/:article_id", put(set_news_visibility))
}

// Users

pub async fn list_users(
    State(state): State<AppState>,
    Query(search): Query<UserSearch>,
) -> ApiResult<impl IntoResponse> {
    let users = state
        .users
        .list(search.pattern().as_deref())
        .await
        .map_err(internal("Failed to list users"))?;

    Ok(Json(users))
}

pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(update): Json<RoleUpdate>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .set_role(id, update.role)
        .await
        .map_err(internal("Failed to update role"))?
        .ok_or(ApiError::NotFound("User"))?;

    info!(
        "Role of {} set to {} by {}",
        id,
        update.role.as_str(),
        session.user_id
    );
    Ok(Json(user))
}

// Lost and found

pub async fn list_missing(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let reports = state
        .missing
        .list_with_owner_email()
        .await
        .map_err(internal("Failed to list missing-pet reports"))?;

    Ok(Json(reports))
}

pub async fn toggle_found(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let report = state
        .missing
        .toggle_found(id)
        .await
        .map_err(internal("Failed to toggle report"))?
        .ok_or(ApiError::NotFound("Missing-pet report"))?;

    state.live.publish(Change::table(Table::Missing));
    Ok(Json(report))
}

// Marketplace

pub async fn list_products(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let products = state
        .products
        .list_all()
        .await
        .map_err(internal("Failed to list products"))?;

    Ok(Json(products))
}

pub async fn toggle_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .products
        .toggle_active(id)
        .await
        .map_err(internal("Failed to toggle product"))?
        .ok_or(ApiError::NotFound("Product"))?;

    state.live.publish(Change::table(Table::Products));
    Ok(Json(product))
}

// Blog

pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<BlogPostPayload>,
) -> ApiResult<impl IntoResponse> {
    let post = payload.validate(Utc::now()).map_err(ApiError::BadRequest)?;

    let post = state
        .blog
        .create(&post)
        .await
        .map_err(internal("Failed to create blog post"))?;

    state.live.publish(Change::table(Table::Blog));
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BlogPostPayload>,
) -> ApiResult<impl IntoResponse> {
    let post = payload.validate(Utc::now()).map_err(ApiError::BadRequest)?;

    let post = state
        .blog
        .update(id, &post)
        .await
        .map_err(internal("Failed to update blog post"))?
        .ok_or(ApiError::NotFound("Blog post"))?;

    state.live.publish(Change::table(Table::Blog));
    Ok(Json(post))
}

pub async fn toggle_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .blog
        .toggle_active(id)
        .await
        .map_err(internal("Failed to toggle blog post"))?
        .ok_or(ApiError::NotFound("Blog post"))?;

    state.live.publish(Change::table(Table::Blog));
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state
        .blog
        .delete(id)
        .await
        .map_err(internal("Failed to delete blog post"))?
    {
        return Err(ApiError::NotFound("Blog post"));
    }

    state.live.publish(Change::table(Table::Blog));
    Ok(StatusCode::NO_CONTENT)
}

// Chat

pub async fn list_groups(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let groups = state
        .chat
        .list_all_groups()
        .await
        .map_err(internal("Failed to list chat groups"))?;

    Ok(Json(groups))
}

pub async fn toggle_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let group = state
        .chat
        .toggle_active(id)
        .await
        .map_err(internal("Failed to toggle chat group"))?
        .ok_or(ApiError::NotFound("Chat group"))?;

    state.live.publish(Change::table(Table::ChatGroups));
    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state
        .chat
        .delete_group(id)
        .await
        .map_err(internal("Failed to delete chat group"))?
    {
        return Err(ApiError::NotFound("Chat group"));
    }

    info!("Chat group {} deleted by {}", id, session.user_id);
    state.live.publish(Change::table(Table::ChatGroups));
    state.live.publish(Change::group(Table::Messages, id));
    Ok(StatusCode::NO_CONTENT)
}

// News

pub async fn list_news(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let hidden = state
        .news
        .hidden_ids()
        .await
        .map_err(internal("Failed to load hidden articles"))?;

    let articles = state.aggregator.fetch_all().await;
    Ok(Json(moderated(articles, &hidden)))
}

pub async fn set_news_visibility(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(article_id): Path<String>,
    Json(update): Json<VisibilityUpdate>,
) -> ApiResult<impl IntoResponse> {
    state
        .news
        .set_hidden(
            &article_id,
            update.hidden,
            update.title.as_deref(),
            session.user_id,
        )
        .await
        .map_err(internal("Failed to update article visibility"))?;

    Ok(Json(serde_json::json!({
        "article_id": article_id,
        "hidden": update.hidden,
    })))
}
