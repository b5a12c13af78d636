use crate::extract::{AuthUser, JsonBody, QueryParams, parse_id};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;
use serde_json::json;
use tracing::info;
use ucrud_core::Error;
use ucrud_core::models::{NewProduct, ProductChanges, ProductQuery};
use ucrud_core::pagination::Pagination;
use ucrud_core::validation::Validate;

const RESOURCE: &str = "product";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(find).put(update).delete(delete))
}

fn not_found() -> Error {
    Error::NotFound("Product not found".to_string())
}

async fn check_category(state: &AppState, category_id: Option<i64>) -> ApiResult<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    if !state.categories.exists(category_id).await? {
        return Err(Error::Validation(vec!["Category not found".to_string()]).into());
    }
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProductQuery>,
) -> ApiResult {
    query.validate()?;

    let request = query.page_request();
    let (products, total) = state.products.list(&query.filter(), request).await?;
    let pagination = Pagination::new(request, total);

    Ok(ApiResponse::ok(
        json!({ "products": products, "pagination": pagination }),
    ))
}

async fn find(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = parse_id(&id, RESOURCE)?;
    let product = state.products.find(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::ok(json!({ "product": product })))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(product): JsonBody<NewProduct>,
) -> ApiResult {
    product.validate()?;
    check_category(&state, product.category_id).await?;

    let id = state.products.create(&product).await?;
    let product = state.products.find(id).await?.ok_or_else(not_found)?;
    info!("user {} created product {id}", user.username);

    Ok(ApiResponse::created(json!({ "product": product }))
        .with_message("Product created successfully"))
}

async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    JsonBody(changes): JsonBody<ProductChanges>,
) -> ApiResult {
    let id = parse_id(&id, RESOURCE)?;
    if !state.products.exists(id).await? {
        return Err(not_found().into());
    }
    changes.validate()?;
    check_category(&state, changes.category_id).await?;

    state.products.update(id, &changes).await?;
    let product = state.products.find(id).await?.ok_or_else(not_found)?;
    info!("user {} updated product {id}", user.username);

    Ok(ApiResponse::ok(json!({ "product": product }))
        .with_message("Product updated successfully"))
}

async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, RESOURCE)?;
    let product = state.products.find(id).await?.ok_or_else(not_found)?;

    state.products.delete(id).await?;
    info!("user {} deleted product {id}", user.username);

    Ok(ApiResponse::ok(json!({ "deleted_product": product }))
        .with_message("Product deleted successfully"))
}
