//! Blog reading routes; writing lives under `/admin/blog`

use axum::{
    Extension, Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};

use crate::{
    AppState,
    error::{ApiResult, internal},
    live::{Table, sse_snapshots},
    session::Session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog", get(list_posts))
        .route("/blog/live", get(live_posts))
}

/// Admins also see inactive posts
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    let posts = state
        .blog
        .list(session.is_admin())
        .await
        .map_err(internal("Failed to list blog posts"))?;

    Ok(Json(posts))
}

pub async fn live_posts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> impl IntoResponse {
    let blog = state.blog.clone();
    let include_inactive = session.is_admin();

    sse_snapshots(
        &state.live,
        |change| change.touches(Table::Blog),
        move || {
            let blog = blog.clone();
            async move { blog.list(include_inactive).await }
        },
    )
}
