use sea_orm::ActiveValue::{self, NotSet};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{
        CreateProductRequest, ProductDetail, ProductList, SearchHit, SearchResults,
        UpdateProductRequest,
    },
    entity::{
        categories::{Column as CatCol, Entity as Categories},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{AdminProductQuery, ProductQuery},
    slug::{SLUG_MAX_ATTEMPTS, slug_candidate, slugify},
    state::AppState,
};

use super::{category_from_entity, product_from_entity};

const RELATED_SAME_CATEGORY: u64 = 4;
const RELATED_MAX: u64 = 6;
const SEARCH_MIN_CHARS: usize = 2;
const SEARCH_MAX_HITS: u64 = 8;

/// Public storefront listing: active products only, optionally narrowed by
/// category slug (`todos` means all), sale flag and featured flag.
pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let mut condition = Condition::all().add(ProdCol::IsActive.eq(true));

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty() && s.as_str() != "todos") {
        let category = Categories::find()
            .filter(CatCol::Slug.eq(slug.clone()))
            .one(&state.orm)
            .await?;
        match category {
            Some(c) => condition = condition.add(ProdCol::CategoryId.eq(c.id)),
            None => {
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: Vec::new() },
                    None,
                ));
            }
        }
    }

    if query.on_sale.unwrap_or(false) {
        condition = condition.add(ProdCol::IsOnSale.eq(true));
    }
    if query.featured.unwrap_or(false) {
        condition = condition.add(ProdCol::IsFeatured.eq(true));
    }

    let mut finder = Products::find()
        .filter(condition)
        .order_by_asc(ProdCol::Name);
    if let Some(limit) = query.limit {
        finder = finder.limit(limit);
    }

    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success("Products", ProductList { items }, None))
}

pub async fn get_product_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .filter(ProdCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}' not found")))?;

    let category = Categories::find_by_id(product.category_id)
        .one(&state.orm)
        .await?
        .map(category_from_entity);

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product: product_from_entity(product),
            category,
        },
        None,
    ))
}

/// Up to six active, in-stock products to show next to a product page:
/// newest from the same category first, topped up from other categories.
pub async fn related_products(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let current = Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}' not found")))?;

    let mut related = Products::find()
        .filter(ProdCol::CategoryId.eq(current.category_id))
        .filter(ProdCol::Id.ne(current.id))
        .filter(ProdCol::IsActive.eq(true))
        .filter(ProdCol::Stock.gt(0.0))
        .order_by_desc(ProdCol::CreatedAt)
        .limit(RELATED_SAME_CATEGORY)
        .all(&state.orm)
        .await?;

    if (related.len() as u64) < RELATED_MAX {
        let fill = Products::find()
            .filter(ProdCol::CategoryId.ne(current.category_id))
            .filter(ProdCol::Id.ne(current.id))
            .filter(ProdCol::IsActive.eq(true))
            .filter(ProdCol::Stock.gt(0.0))
            .order_by_desc(ProdCol::CreatedAt)
            .limit(RELATED_MAX - related.len() as u64)
            .all(&state.orm)
            .await?;
        related.extend(fill);
    }

    let items = related.into_iter().map(product_from_entity).collect();
    Ok(ApiResponse::success("Related products", ProductList { items }, None))
}

/// Search-as-you-type over name and slug. Queries shorter than two
/// characters return nothing rather than scanning the whole catalog.
pub async fn search_products(
    state: &AppState,
    q: &str,
) -> AppResult<ApiResponse<SearchResults>> {
    let q = q.trim();
    if q.chars().count() < SEARCH_MIN_CHARS {
        return Ok(ApiResponse::success(
            "Search",
            SearchResults { items: Vec::new() },
            None,
        ));
    }

    let pattern = format!("%{q}%");
    let items = Products::find()
        .filter(ProdCol::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(Expr::col(ProdCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Slug).ilike(pattern)),
        )
        .order_by_asc(ProdCol::Name)
        .limit(SEARCH_MAX_HITS)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| SearchHit {
            id: p.id,
            name: p.name,
            slug: p.slug,
            price: p.price,
            image: p.image,
        })
        .collect();

    Ok(ApiResponse::success("Search", SearchResults { items }, None))
}

/// Admin listing: inactive products included, optional category/active
/// filters, newest first.
pub async fn list_products_admin(
    state: &AppState,
    user: &AuthUser,
    query: AdminProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty() && s.as_str() != "todos") {
        let category = Categories::find()
            .filter(CatCol::Slug.eq(slug.clone()))
            .one(&state.orm)
            .await?;
        match category {
            Some(c) => condition = condition.add(ProdCol::CategoryId.eq(c.id)),
            None => {
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: Vec::new() },
                    Some(Meta::new(page, limit, 0)),
                ));
            }
        }
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(ProdCol::IsActive.eq(is_active));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("product name is required".into()));
    }
    if payload.price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    if payload.stock < 0.0 || !payload.stock.is_finite() {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }

    Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!("category {} does not exist", payload.category_id))
        })?;

    let base = slugify(payload.slug.as_deref().unwrap_or(&name));
    if base.is_empty() {
        return Err(AppError::BadRequest("cannot derive a slug".into()));
    }
    let slug = unique_product_slug(state, &base, None).await?;

    let discount = discount_percent(payload.is_on_sale, payload.price, payload.sale_price);

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        image: Set(payload.image_url),
        unit_type: Set(payload.unit_type.as_str().to_string()),
        price: Set(payload.price),
        stock: Set(payload.stock),
        is_active: Set(true),
        is_featured: Set(payload.is_featured),
        is_on_sale: Set(payload.is_on_sale),
        sale_price: Set(payload.sale_price),
        sale_end_date: Set(payload.sale_end_date.map(Into::into)),
        discount_percent: Set(discount),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "slug": product.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    let mut active: ProductActive = existing.clone().into();

    if let Some(slug) = payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
        let base = slugify(slug);
        if base.is_empty() {
            return Err(AppError::BadRequest("cannot derive a slug".into()));
        }
        if base != existing.slug {
            active.slug = Set(unique_product_slug(state, &base, Some(id)).await?);
        }
    }
    if let Some(name) = payload.name.filter(|n| !n.trim().is_empty()) {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image_url) = payload.image_url {
        active.image = Set(Some(image_url));
    }
    if let Some(category_id) = payload.category_id {
        Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("category {category_id} does not exist"))
            })?;
        active.category_id = Set(category_id);
    }
    if let Some(unit_type) = payload.unit_type {
        active.unit_type = Set(unit_type.as_str().to_string());
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price cannot be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        if stock < 0.0 || !stock.is_finite() {
            return Err(AppError::BadRequest("stock cannot be negative".into()));
        }
        active.stock = Set(stock);
    }
    if let Some(is_on_sale) = payload.is_on_sale {
        active.is_on_sale = Set(is_on_sale);
    }
    if let Some(sale_price) = payload.sale_price {
        active.sale_price = Set(sale_price);
    }
    if let Some(sale_end_date) = payload.sale_end_date {
        active.sale_end_date = Set(sale_end_date.map(Into::into));
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    // Re-derive the promotional discount from the effective values.
    let effective_price = match &active.price {
        ActiveValue::Set(p) => *p,
        _ => existing.price,
    };
    let effective_sale = match &active.sale_price {
        ActiveValue::Set(p) => *p,
        _ => existing.sale_price,
    };
    let effective_on_sale = match &active.is_on_sale {
        ActiveValue::Set(f) => *f,
        _ => existing.is_on_sale,
    };
    active.discount_percent = Set(discount_percent(
        effective_on_sale,
        effective_price,
        effective_sale,
    ));

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Soft delete: the row stays for historical order items, the storefront
/// stops showing it.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    let mut active: ProductActive = existing.into();
    active.is_active = Set(false);
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product deactivated",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn discount_percent(is_on_sale: bool, price: i64, sale_price: Option<i64>) -> Option<i32> {
    match (is_on_sale, sale_price) {
        (true, Some(sale)) if price > 0 && sale < price => {
            Some((((price - sale) as f64 / price as f64) * 100.0).round() as i32)
        }
        _ => None,
    }
}

async fn unique_product_slug(
    state: &AppState,
    base: &str,
    exclude: Option<Uuid>,
) -> AppResult<String> {
    for attempt in 0..SLUG_MAX_ATTEMPTS {
        let candidate = slug_candidate(base, attempt);
        let mut finder = Products::find().filter(ProdCol::Slug.eq(candidate.as_str()));
        if let Some(id) = exclude {
            finder = finder.filter(ProdCol::Id.ne(id));
        }
        if finder.one(&state.orm).await?.is_none() {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict(format!(
        "no free slug for '{base}' after {SLUG_MAX_ATTEMPTS} attempts"
    )))
}

#[cfg(test)]
mod tests {
    use super::discount_percent;

    #[test]
    fn discount_only_when_sale_is_cheaper() {
        assert_eq!(discount_percent(true, 100_000, Some(75_000)), Some(25));
        assert_eq!(discount_percent(true, 100_000, Some(120_000)), None);
        assert_eq!(discount_percent(false, 100_000, Some(75_000)), None);
        assert_eq!(discount_percent(true, 0, Some(0)), None);
    }

    #[test]
    fn discount_rounds_to_whole_percent() {
        assert_eq!(discount_percent(true, 90_000, Some(60_000)), Some(33));
        assert_eq!(discount_percent(true, 300, Some(100)), Some(67));
    }
}
