//! Marketplace routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    live::{Change, Table, sse_snapshots},
    models::product::{NewProduct, Product, ProductDetail, ProductQuery, QuantityQuery},
    session::Session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/mine", get(my_products))
        .route("/products/live", get(live_products))
        .route("/products/:id", get(get_product).delete(delete_product))
        .route("/products/:id/toggle-active", post(toggle_product))
        .route("/products/:id/purchase", post(purchase_product))
}

/// Inactive products are invisible to everyone but their owner and admins
async fn visible_product(state: &AppState, session: &Session, id: Uuid) -> ApiResult<Product> {
    let product = state
        .products
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load product"))?
        .filter(|p| p.active || session.can_modify(p.owner_id))
        .ok_or(ApiError::NotFound("Product"))?;

    Ok(product)
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<impl IntoResponse> {
    let products = state
        .products
        .list_active(query.category())
        .await
        .map_err(internal("Failed to list products"))?;

    Ok(Json(products))
}

pub async fn my_products(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    let products = state
        .products
        .list_by_owner(session.user_id)
        .await
        .map_err(internal("Failed to list own products"))?;

    Ok(Json(products))
}

pub async fn live_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> impl IntoResponse {
    let products = state.products.clone();
    let category = query.category().map(str::to_string);

    sse_snapshots(
        &state.live,
        |change| change.touches(Table::Products),
        move || {
            let products = products.clone();
            let category = category.clone();
            async move { products.list_active(category.as_deref()).await }
        },
    )
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<NewProduct>,
) -> ApiResult<impl IntoResponse> {
    let product = payload.validate().map_err(ApiError::BadRequest)?;

    let product = state
        .products
        .create(session.user_id, &product)
        .await
        .map_err(internal("Failed to create product"))?;

    state.live.publish(Change::table(Table::Products));
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Query(query): Query<QuantityQuery>,
) -> ApiResult<impl IntoResponse> {
    let product = visible_product(&state, &session, id).await?;
    Ok(Json(ProductDetail::new(product, query.quantity)))
}

pub async fn purchase_product(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Query(query): Query<QuantityQuery>,
) -> ApiResult<impl IntoResponse> {
    let product = visible_product(&state, &session, id).await?;

    let quote = product
        .quote(query.quantity)
        .map_err(|refusal| ApiError::Conflict(refusal.to_string()))?;

    info!(
        "Purchase quote for {}x {} by {}: R$ {}",
        quote.quantity, product.id, session.user_id, quote.total
    );
    Ok(Json(quote))
}

pub async fn toggle_product(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .products
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load product"))?
        .ok_or(ApiError::NotFound("Product"))?;
    session.ensure_can_modify(product.owner_id, "product")?;

    let product = state
        .products
        .toggle_active(id)
        .await
        .map_err(internal("Failed to toggle product"))?
        .ok_or(ApiError::NotFound("Product"))?;

    state.live.publish(Change::table(Table::Products));
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .products
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load product"))?
        .ok_or(ApiError::NotFound("Product"))?;
    session.ensure_can_modify(product.owner_id, "product")?;

    if !state
        .products
        .delete(id)
        .await
        .map_err(internal("Failed to delete product"))?
    {
        return Err(ApiError::NotFound("Product"));
    }

    state.live.publish(Change::table(Table::Products));
    Ok(StatusCode::NO_CONTENT)
}
