use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    AppState,
    error::{ApiResult, internal},
    models::news::visible,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/news", get(list_news))
}

/// Aggregated feed minus the articles an admin has hidden
pub async fn list_news(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let hidden = state
        .news
        .hidden_ids()
        .await
        .map_err(internal("Failed to load hidden articles"))?;

    let articles = state.aggregator.fetch_all().await;
    Ok(Json(visible(articles, &hidden)))
}
