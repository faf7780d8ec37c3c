use chrono::Utc;

use crate::entity::{
    categories::Model as CategoryModel, order_items::Model as OrderItemModel,
    orders::Model as OrderModel, products::Model as ProductModel, users::Model as UserModel,
};
use crate::models::{Category, Order, OrderItem, Product, User};

pub mod admin_service;
pub mod auth_service;
pub mod category_service;
pub mod order_service;
pub mod product_service;

pub(crate) fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        image: model.image,
        unit_type: model.unit_type,
        price: model.price,
        stock: model.stock,
        is_active: model.is_active,
        is_featured: model.is_featured,
        is_on_sale: model.is_on_sale,
        sale_price: model.sale_price,
        sale_end_date: model.sale_end_date.map(|dt| dt.with_timezone(&Utc)),
        discount_percent: model.discount_percent,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_name: model.customer_name,
        phone: model.phone,
        email: model.email,
        delivery_method: model.delivery_method,
        address: model.address,
        address_details: model.address_details,
        city: model.city,
        postal_code: model.postal_code,
        notes: model.notes,
        subtotal: model.subtotal,
        delivery_cost: model.delivery_cost,
        total: model.total,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        line_total: model.line_total,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
