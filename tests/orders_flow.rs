use carniceria_api::{
    dto::orders::{OrderLineRequest, PlaceOrderRequest, UpdateOrderStatusRequest},
    entity::products::Entity as Products,
    error::AppError,
    models::DeliveryMethod,
    services::{admin_service, order_service},
    state::AppState,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

mod common;

fn order_request(
    method: DeliveryMethod,
    address: Option<&str>,
    items: Vec<OrderLineRequest>,
) -> PlaceOrderRequest {
    PlaceOrderRequest {
        customer_name: "Juan Pérez".into(),
        phone: "+54 11 5555-0000".into(),
        email: Some("juan@example.com".into()),
        delivery_method: method,
        address: address.map(Into::into),
        address_details: None,
        city: None,
        postal_code: None,
        notes: None,
        items,
    }
}

async fn stock_of(state: &AppState, id: Uuid) -> f64 {
    Products::find_by_id(id)
        .one(&state.orm)
        .await
        .expect("query product")
        .expect("product exists")
        .stock
}

// Full checkout flow: pickup order, delivery order, validation and stock
// rejections, duplicate submissions, admin status updates.
#[tokio::test]
async fn order_placement_flow() -> anyhow::Result<()> {
    let state = match common::setup_state().await? {
        Some(state) => state,
        None => return Ok(()),
    };

    let category_id = common::seed_category(&state, "Carnes Rojas").await?;
    let asado = common::seed_product(&state, category_id, "Asado de Tira", 850_000, 50.0).await?;
    let vacio = common::seed_product(&state, category_id, "Vacío", 890_000, 3.0).await?;

    // Pickup order: no delivery fee, stock decremented.
    let resp = order_service::place_order(
        &state,
        order_request(
            DeliveryMethod::Pickup,
            None,
            vec![OrderLineRequest {
                product_id: asado,
                quantity: 2.0,
            }],
        ),
    )
    .await?;
    let placed = resp.data.expect("order data");
    assert_eq!(placed.order.subtotal, 1_700_000);
    assert_eq!(placed.order.delivery_cost, 0);
    assert_eq!(placed.order.total, 1_700_000);
    assert_eq!(placed.order.status, "PENDING");
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].item.unit_price, 850_000);
    assert_eq!(stock_of(&state, asado).await, 48.0);

    // Home delivery adds the flat fee and requires an address.
    let resp = order_service::place_order(
        &state,
        order_request(
            DeliveryMethod::Delivery,
            Some("Av. Corrientes 1234"),
            vec![OrderLineRequest {
                product_id: vacio,
                quantity: 1.5,
            }],
        ),
    )
    .await?;
    let delivered = resp.data.expect("order data");
    assert_eq!(delivered.order.subtotal, 1_335_000);
    assert_eq!(delivered.order.delivery_cost, 50_000);
    assert_eq!(delivered.order.total, 1_385_000);
    assert_eq!(stock_of(&state, vacio).await, 1.5);

    // Missing address fails before any product is touched.
    let err = order_service::place_order(
        &state,
        order_request(
            DeliveryMethod::Delivery,
            None,
            vec![OrderLineRequest {
                product_id: asado,
                quantity: 1.0,
            }],
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(stock_of(&state, asado).await, 48.0);

    // Empty cart is incomplete data.
    let err = order_service::place_order(
        &state,
        order_request(DeliveryMethod::Pickup, None, vec![]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Unknown product aborts the whole order, valid sibling lines included.
    let ghost = Uuid::new_v4();
    let err = order_service::place_order(
        &state,
        order_request(
            DeliveryMethod::Pickup,
            None,
            vec![
                OrderLineRequest {
                    product_id: asado,
                    quantity: 1.0,
                },
                OrderLineRequest {
                    product_id: ghost,
                    quantity: 1.0,
                },
            ],
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(stock_of(&state, asado).await, 48.0);

    // Over-stock line rejects all-or-nothing: the valid first line must not
    // leave a partial decrement behind.
    let err = order_service::place_order(
        &state,
        order_request(
            DeliveryMethod::Pickup,
            None,
            vec![
                OrderLineRequest {
                    product_id: asado,
                    quantity: 1.0,
                },
                OrderLineRequest {
                    product_id: vacio,
                    quantity: 10.0,
                },
            ],
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(stock_of(&state, asado).await, 48.0);
    assert_eq!(stock_of(&state, vacio).await, 1.5);

    // No idempotency key: an identical resubmission creates a second order
    // and decrements stock again.
    let make = || {
        order_request(
            DeliveryMethod::Pickup,
            None,
            vec![OrderLineRequest {
                product_id: asado,
                quantity: 1.0,
            }],
        )
    };
    let first = order_service::place_order(&state, make())
        .await?
        .data
        .expect("order data");
    let second = order_service::place_order(&state, make())
        .await?
        .data
        .expect("order data");
    assert_ne!(first.order.id, second.order.id);
    assert_eq!(stock_of(&state, asado).await, 46.0);

    // Admin walks the order through its lifecycle.
    let admin = common::create_admin(&state).await?;
    let updated = admin_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "PROCESSING".into(),
        },
    )
    .await?;
    assert_eq!(updated.data.expect("order").status, "PROCESSING");

    let err = admin_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "SHIPPED_TO_MARS".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Order lookup returns the snapshot prices with product details.
    let fetched = order_service::get_order(&state, placed.order.id)
        .await?
        .data
        .expect("order data");
    assert_eq!(fetched.order.total, 1_700_000);
    assert_eq!(fetched.items[0].item.unit_price, 850_000);
    assert!(fetched.items[0].product.is_some());

    // Admin listing sees every order.
    let all = admin_service::list_orders(
        &state,
        &admin,
        carniceria_api::routes::params::OrderListQuery {
            pagination: carniceria_api::routes::params::Pagination {
                page: Some(1),
                per_page: Some(20),
            },
            status: None,
            sort_order: None,
        },
    )
    .await?;
    assert_eq!(all.data.expect("orders").items.len(), 4);

    Ok(())
}
