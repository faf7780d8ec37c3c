use carniceria_api::{
    dto::{
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        products::{CreateProductRequest, UpdateProductRequest},
    },
    error::AppError,
    models::UnitType,
    routes::params::ProductQuery,
    services::{category_service, product_service},
};

mod common;

fn create_product_request(name: &str, category_id: uuid::Uuid) -> CreateProductRequest {
    CreateProductRequest {
        name: name.into(),
        slug: None,
        description: None,
        image_url: None,
        category_id,
        unit_type: UnitType::PerKg,
        price: 980_000,
        stock: 10.0,
        is_on_sale: false,
        sale_price: None,
        sale_end_date: None,
        is_featured: false,
    }
}

// Admin catalog flow: slug collision handling, category lifecycle, soft
// deletes and storefront search.
#[tokio::test]
async fn catalog_admin_flow() -> anyhow::Result<()> {
    let state = match common::setup_state().await? {
        Some(state) => state,
        None => return Ok(()),
    };
    let admin = common::create_admin(&state).await?;

    // Category creation derives the slug from the accented name.
    let category = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Carnes Ahumadas".into(),
            slug: None,
            description: Some("Ahumados artesanales".into()),
        },
    )
    .await?
    .data
    .expect("category");
    assert_eq!(category.slug, "carnes-ahumadas");

    // The same product name twice: the second write gets a -2 suffix
    // instead of colliding.
    let first = product_service::create_product(
        &state,
        &admin,
        create_product_request("Bife de Chorizo", category.id),
    )
    .await?
    .data
    .expect("product");
    assert_eq!(first.slug, "bife-de-chorizo");

    let second = product_service::create_product(
        &state,
        &admin,
        create_product_request("Bife de Chorizo", category.id),
    )
    .await?
    .data
    .expect("product");
    assert_eq!(second.slug, "bife-de-chorizo-2");

    // A category with products refuses deletion.
    let err = category_service::delete_category(&state, &admin, category.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A blank rename is rejected instead of silently ignored.
    let err = category_service::update_category(
        &state,
        &admin,
        category.id,
        UpdateCategoryRequest {
            name: Some("   ".into()),
            description: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Renaming a category regenerates its slug.
    let renamed = category_service::update_category(
        &state,
        &admin,
        category.id,
        UpdateCategoryRequest {
            name: Some("Ahumados y Curados".into()),
            description: None,
        },
    )
    .await?
    .data
    .expect("category");
    assert_eq!(renamed.slug, "ahumados-y-curados");

    // Putting a product on sale derives the discount percent.
    let on_sale = product_service::update_product(
        &state,
        &admin,
        first.id,
        UpdateProductRequest {
            is_on_sale: Some(true),
            sale_price: Some(Some(735_000)),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("product");
    assert!(on_sale.is_on_sale);
    assert_eq!(on_sale.discount_percent, Some(25));

    // Soft delete hides the product from the storefront but keeps the row.
    product_service::delete_product(&state, &admin, second.id).await?;
    let listed = product_service::list_products(
        &state,
        ProductQuery {
            category: None,
            on_sale: None,
            featured: None,
            limit: None,
        },
    )
    .await?
    .data
    .expect("products");
    assert!(listed.items.iter().all(|p| p.id != second.id));
    assert!(listed.items.iter().any(|p| p.id == first.id));

    // Search needs two characters and matches by name.
    let hits = product_service::search_products(&state, "bife")
        .await?
        .data
        .expect("hits");
    assert!(hits.items.iter().any(|h| h.id == first.id));

    let empty = product_service::search_products(&state, "b")
        .await?
        .data
        .expect("hits");
    assert!(empty.items.is_empty());

    // Product detail by slug, active products only.
    let detail = product_service::get_product_by_slug(&state, "bife-de-chorizo")
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.product.id, first.id);
    assert!(detail.category.is_some());

    let err = product_service::get_product_by_slug(&state, "bife-de-chorizo-2")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}
