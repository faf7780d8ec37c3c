use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::categories::{
        CategoryAdminList, CategoryList, CategoryWithCount, CreateCategoryRequest,
        UpdateCategoryRequest,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CatCol, Entity as Categories},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    slug::{SLUG_MAX_ATTEMPTS, slug_candidate, slugify},
    state::AppState,
};

use super::category_from_entity;

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CatCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}

/// Admin listing, with the number of products referencing each category.
pub async fn list_categories_admin(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CategoryAdminList>> {
    ensure_admin(user)?;

    let categories = Categories::find()
        .order_by_asc(CatCol::Name)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(categories.len());
    for category in categories {
        let product_count = Products::find()
            .filter(ProdCol::CategoryId.eq(category.id))
            .count(&state.orm)
            .await? as i64;
        items.push(CategoryWithCount {
            category: category_from_entity(category),
            product_count,
        });
    }

    Ok(ApiResponse::success(
        "Categories",
        CategoryAdminList { items },
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("category name is required".into()));
    }

    let base = slugify(payload.slug.as_deref().unwrap_or(&name));
    if base.is_empty() {
        return Err(AppError::BadRequest("cannot derive a slug".into()));
    }
    let slug = unique_category_slug(state, &base, None).await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description.map(|d| d.trim().to_string())),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id, "slug": category.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id} not found")))?;

    let mut active: CategoryActive = existing.clone().into();

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("category name is required".into()));
        }
        // Renaming regenerates the slug, dodging collisions the same way
        // creation does.
        if name != existing.name {
            let base = slugify(&name);
            if base.is_empty() {
                return Err(AppError::BadRequest("cannot derive a slug".into()));
            }
            let slug = unique_category_slug(state, &base, Some(id)).await?;
            active.name = Set(name);
            active.slug = Set(slug);
        }
    }
    if let Some(description) = payload.description {
        let trimmed = description.trim().to_string();
        active.description = Set(if trimmed.is_empty() { None } else { Some(trimmed) });
    }

    let category = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

/// Hard delete, refused while any product still references the category.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id} not found")))?;

    let product_count = Products::find()
        .filter(ProdCol::CategoryId.eq(category.id))
        .count(&state.orm)
        .await?;
    if product_count > 0 {
        return Err(AppError::Conflict(
            "category still has products associated with it".into(),
        ));
    }

    Categories::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// First free slug among `base`, `base-2`, ... `base-50`; Conflict when the
/// whole range is taken.
async fn unique_category_slug(
    state: &AppState,
    base: &str,
    exclude: Option<Uuid>,
) -> AppResult<String> {
    for attempt in 0..SLUG_MAX_ATTEMPTS {
        let candidate = slug_candidate(base, attempt);
        let mut finder = Categories::find().filter(CatCol::Slug.eq(candidate.as_str()));
        if let Some(id) = exclude {
            finder = finder.filter(CatCol::Id.ne(id));
        }
        if finder.one(&state.orm).await?.is_none() {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict(format!(
        "no free slug for '{base}' after {SLUG_MAX_ATTEMPTS} attempts"
    )))
}
