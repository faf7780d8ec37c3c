use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderItemDetail, OrderWithItems, PlaceOrderRequest},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::DeliveryMethod,
    response::{ApiResponse, Meta},
    state::AppState,
};

use super::{order_from_entity, order_item_from_entity, product_from_entity};

/// Flat fee for home delivery, in minor currency units ($500).
pub const DELIVERY_COST: i64 = 50_000;

/// Line total in minor units, rounded half-up. Weight-based products carry
/// fractional quantities, so the product of price and quantity can land
/// between two centavos.
pub fn line_total(unit_price: i64, quantity: f64) -> i64 {
    (unit_price as f64 * quantity + 0.5).floor() as i64
}

pub fn delivery_cost(method: DeliveryMethod) -> i64 {
    match method {
        DeliveryMethod::Delivery => DELIVERY_COST,
        DeliveryMethod::Pickup => 0,
    }
}

/// Places an order from a client-held cart.
///
/// Validation is fail-fast and ordered: contact fields, then the delivery
/// address, then each cart line in the order it was submitted. Pricing always
/// comes from the catalog row, never from the client. The order insert, its
/// items and every stock decrement commit as one transaction; any failure
/// rolls the whole thing back.
pub async fn place_order(
    state: &AppState,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.customer_name.trim().is_empty()
        || payload.phone.trim().is_empty()
        || payload.items.is_empty()
    {
        return Err(AppError::BadRequest("incomplete order data".into()));
    }

    let address_given = payload
        .address
        .as_deref()
        .map(|a| !a.trim().is_empty())
        .unwrap_or(false);
    if payload.delivery_method == DeliveryMethod::Delivery && !address_given {
        return Err(AppError::BadRequest(
            "address is required for home delivery".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    // Resolve every line against the live catalog before writing anything.
    // Row locks keep a concurrent checkout from passing the same stock check.
    let mut lines: Vec<(ProductModel, f64, i64)> = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        if !line.quantity.is_finite() || line.quantity <= 0.0 {
            return Err(AppError::BadRequest(format!(
                "invalid quantity for product {}",
                line.product_id
            )));
        }

        let product = Products::find()
            .filter(ProdCol::Id.eq(line.product_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {} not found", line.product_id)))?;

        if product.stock < line.quantity {
            return Err(AppError::Conflict(format!(
                "insufficient stock for {}",
                product.name
            )));
        }

        // Snapshot of the base catalog price. A product on sale still
        // charges `price` here; `sale_price` stays a display attribute.
        let total = line_total(product.price, line.quantity);
        lines.push((product, line.quantity, total));
    }

    let subtotal: i64 = lines.iter().map(|(_, _, total)| total).sum();
    let delivery = delivery_cost(payload.delivery_method);

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_name: Set(payload.customer_name),
        phone: Set(payload.phone),
        email: Set(payload.email),
        delivery_method: Set(payload.delivery_method.as_str().to_string()),
        address: Set(payload.address),
        address_details: Set(payload.address_details),
        city: Set(payload.city),
        postal_code: Set(payload.postal_code),
        notes: Set(payload.notes),
        subtotal: Set(subtotal),
        delivery_cost: Set(delivery),
        total: Set(subtotal + delivery),
        status: Set("PENDING".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (product, quantity, total) in &lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(*quantity),
            unit_price: Set(product.price),
            line_total: Set(*total),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        // Conditional decrement: the stock guard is re-stated in the WHERE
        // clause, so a racing order that already took the stock makes this
        // touch zero rows and the whole transaction is rolled back.
        let result = Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(*quantity))
            .filter(ProdCol::Id.eq(product.id))
            .filter(ProdCol::Stock.gte(*quantity))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "insufficient stock for {}",
                product.name
            )));
        }

        items.push(OrderItemDetail {
            item: order_item_from_entity(item),
            product: Some(product_from_entity(product.clone())),
        });
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "order_place",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    tracing::info!(order_id = %order.id, total = order.total, "order placed");

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    let items = load_order_items(state, order.id).await?;

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Order lines together with the (possibly since-deactivated) products they
/// reference.
pub(crate) async fn load_order_items(
    state: &AppState,
    order_id: Uuid,
) -> AppResult<Vec<OrderItemDetail>> {
    let item_models = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = item_models.iter().map(|i| i.product_id).collect();
    let products: Vec<ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?;

    Ok(item_models
        .into_iter()
        .map(|item| {
            let product = products
                .iter()
                .find(|p| p.id == item.product_id)
                .cloned()
                .map(product_from_entity);
            OrderItemDetail {
                item: order_item_from_entity(item),
                product,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_multiplies_in_minor_units() {
        // 2 units at $8500.00
        assert_eq!(line_total(850_000, 2.0), 1_700_000);
    }

    #[test]
    fn line_total_rounds_half_up_on_fractional_weight() {
        // 0.5 kg at 333 centavos/kg = 166.5 -> 167
        assert_eq!(line_total(333, 0.5), 167);
        // 0.25 kg at 333 = 83.25 -> 83
        assert_eq!(line_total(333, 0.25), 83);
        assert_eq!(line_total(850_000, 1.5), 1_275_000);
    }

    #[test]
    fn delivery_fee_applies_only_to_home_delivery() {
        assert_eq!(delivery_cost(DeliveryMethod::Delivery), 50_000);
        assert_eq!(delivery_cost(DeliveryMethod::Pickup), 0);
    }
}
