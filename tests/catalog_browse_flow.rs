use std::collections::HashSet;

use carniceria_api::{
    dto::products::UpdateProductRequest,
    routes::params::ProductQuery,
    services::product_service,
};
use uuid::Uuid;

mod common;

fn query(
    category: Option<&str>,
    on_sale: Option<bool>,
    featured: Option<bool>,
    limit: Option<u64>,
) -> ProductQuery {
    ProductQuery {
        category: category.map(Into::into),
        on_sale,
        featured,
        limit,
    }
}

// Storefront browsing: category/sale/featured/limit filters and the
// related-products selection next to a product page.
#[tokio::test]
async fn catalog_browse_flow() -> anyhow::Result<()> {
    let state = match common::setup_state().await? {
        Some(state) => state,
        None => return Ok(()),
    };
    let admin = common::create_admin(&state).await?;

    let carnes = common::seed_category(&state, "Carnes Rojas").await?;
    let pollo = common::seed_category(&state, "Pollo").await?;

    let asado = common::seed_product(&state, carnes, "Asado de Tira", 850_000, 50.0).await?;
    let bife = common::seed_product(&state, carnes, "Bife de Chorizo", 980_000, 30.0).await?;
    let vacio = common::seed_product(&state, carnes, "Vacío", 890_000, 25.0).await?;
    let matambre = common::seed_product(&state, carnes, "Matambre", 790_000, 20.0).await?;
    let entrana = common::seed_product(&state, carnes, "Entraña", 1_050_000, 15.0).await?;
    let picanha = common::seed_product(&state, carnes, "Picanha", 1_200_000, 10.0).await?;
    // Out of stock stays listed in the catalog but never shows up as related.
    let falda = common::seed_product(&state, carnes, "Falda", 600_000, 0.0).await?;
    let lomo = common::seed_product(&state, carnes, "Lomo", 1_400_000, 12.0).await?;
    product_service::delete_product(&state, &admin, lomo).await?;

    let entero = common::seed_product(&state, pollo, "Pollo Entero", 450_000, 40.0).await?;
    common::seed_product(&state, pollo, "Pata Muslo", 320_000, 35.0).await?;
    common::seed_product(&state, pollo, "Suprema", 480_000, 30.0).await?;

    // Category filter: only active rows from the named category.
    let listed = product_service::list_products(&state, query(Some("carnes-rojas"), None, None, None))
        .await?
        .data
        .expect("products");
    assert_eq!(listed.items.len(), 7);
    assert!(listed.items.iter().all(|p| p.category_id == carnes));
    assert!(listed.items.iter().all(|p| p.id != lomo));

    // `todos` behaves like no filter at all.
    let todos = product_service::list_products(&state, query(Some("todos"), None, None, None))
        .await?
        .data
        .expect("products");
    assert_eq!(todos.items.len(), 10);

    // A category slug that matches nothing yields an empty list, not 404.
    let nothing = product_service::list_products(&state, query(Some("pescados"), None, None, None))
        .await?
        .data
        .expect("products");
    assert!(nothing.items.is_empty());

    // Sale and featured flags narrow the listing to the flagged rows.
    product_service::update_product(
        &state,
        &admin,
        bife,
        UpdateProductRequest {
            is_on_sale: Some(true),
            sale_price: Some(Some(735_000)),
            ..Default::default()
        },
    )
    .await?;
    product_service::update_product(
        &state,
        &admin,
        entero,
        UpdateProductRequest {
            is_featured: Some(true),
            ..Default::default()
        },
    )
    .await?;

    let on_sale = product_service::list_products(&state, query(None, Some(true), None, None))
        .await?
        .data
        .expect("products");
    assert_eq!(on_sale.items.len(), 1);
    assert_eq!(on_sale.items[0].id, bife);

    let featured = product_service::list_products(&state, query(None, None, Some(true), None))
        .await?
        .data
        .expect("products");
    assert_eq!(featured.items.len(), 1);
    assert_eq!(featured.items[0].id, entero);

    let limited = product_service::list_products(&state, query(None, None, None, Some(3)))
        .await?
        .data
        .expect("products");
    assert_eq!(limited.items.len(), 3);

    // Related products: four slots for the same category, topped up to six
    // from the rest, never the product itself, never inactive or empty rows.
    let related = product_service::related_products(&state, "asado-de-tira")
        .await?
        .data
        .expect("products");
    assert_eq!(related.items.len(), 6);

    let ids: HashSet<Uuid> = related.items.iter().map(|p| p.id).collect();
    assert!(!ids.contains(&asado));
    assert!(!ids.contains(&falda));
    assert!(!ids.contains(&lomo));

    let same_category = related
        .items
        .iter()
        .filter(|p| p.category_id == carnes)
        .count();
    assert_eq!(same_category, 4);
    let filled = related
        .items
        .iter()
        .filter(|p| p.category_id == pollo)
        .count();
    assert_eq!(filled, 2);

    // Five same-category candidates compete for the four slots.
    let candidates: HashSet<Uuid> = [bife, vacio, matambre, entrana, picanha].into();
    assert!(
        related
            .items
            .iter()
            .filter(|p| p.category_id == carnes)
            .all(|p| candidates.contains(&p.id))
    );

    Ok(())
}
