use crate::extract::{AdminUser, JsonBody, QueryParams, parse_id};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;
use serde_json::json;
use tracing::info;
use ucrud_core::Error;
use ucrud_core::models::{CategoryChanges, DEFAULT_STATUS, NewCategory, PageQuery, ProductFilter};
use ucrud_core::pagination::Pagination;
use ucrud_core::validation::Validate;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(find).put(update).delete(delete))
        .route("/:id/products", get(products))
}

const RESOURCE: &str = "category";

fn not_found() -> Error {
    Error::NotFound("Category not found".to_string())
}

fn name_conflict() -> Error {
    Error::Conflict("Category with this name already exists".to_string())
}

async fn list(State(state): State<AppState>) -> ApiResult {
    let categories = state.categories.list().await?;
    Ok(ApiResponse::ok(json!({ "categories": categories })))
}

async fn find(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = parse_id(&id, RESOURCE)?;
    let category = state.categories.find(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::ok(json!({ "category": category })))
}

async fn create(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    JsonBody(category): JsonBody<NewCategory>,
) -> ApiResult {
    let category = NewCategory {
        name: category.name.trim().to_string(),
        ..category
    };
    category.validate()?;

    if state.categories.name_taken(&category.name).await? {
        return Err(name_conflict().into());
    }

    let category = state.categories.create(&category).await?;
    info!("user {} created a category", user.username);

    Ok(ApiResponse::created(json!({ "category": category }))
        .with_message("Category created successfully"))
}

async fn products(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult {
    let id = parse_id(&id, RESOURCE)?;
    query.validate()?;
    let category = state.categories.find(id).await?.ok_or_else(not_found)?;

    let filter = ProductFilter {
        category_id: Some(id),
        status: Some(DEFAULT_STATUS.to_string()),
        search: None,
    };
    let request = query.page_request();
    let (products, total) = state.products.list(&filter, request).await?;
    let pagination = Pagination::new(request, total);

    Ok(ApiResponse::ok(json!({
        "category": category,
        "products": products,
        "pagination": pagination,
    })))
}

async fn update(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    JsonBody(changes): JsonBody<CategoryChanges>,
) -> ApiResult {
    changes.validate()?;
    let id = parse_id(&id, RESOURCE)?;
    if !state.categories.exists(id).await? {
        return Err(not_found().into());
    }
    if let Some(name) = &changes.name {
        if state.categories.name_taken_by_other(name.trim(), id).await? {
            return Err(name_conflict().into());
        }
    }

    state.categories.update(id, &changes).await?;
    let category = state.categories.find(id).await?.ok_or_else(not_found)?;
    info!("user {} updated category {id}", user.username);

    Ok(ApiResponse::ok(json!({ "category": category }))
        .with_message("Category updated successfully"))
}

async fn delete(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, RESOURCE)?;
    let category = state.categories.find(id).await?.ok_or_else(not_found)?;
    if state.categories.product_count(id).await? > 0 {
        return Err(Error::Conflict(
            "Cannot delete category that has products. Please remove or reassign products first."
                .to_string(),
        )
        .into());
    }

    state.categories.delete(id).await?;
    info!("user {} deleted category {id}", user.username);

    Ok(ApiResponse::ok(json!({ "deleted_category": category }))
        .with_message("Category deleted successfully"))
}
