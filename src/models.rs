use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// How a product is priced: per discrete unit or per kilogram.
/// Weight-based products allow fractional quantities and stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    PerUnit,
    PerKg,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::PerUnit => "PER_UNIT",
            UnitType::PerKg => "PER_KG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMethod {
    Pickup,
    Delivery,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "PICKUP",
            DeliveryMethod::Delivery => "DELIVERY",
        }
    }
}

/// Admin-mutable order lifecycle, flat with no automatic transitions.
pub const ORDER_STATUSES: [&str; 5] =
    ["PENDING", "PROCESSING", "READY", "DELIVERED", "CANCELLED"];

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog item. Prices are integers in minor currency units (centavos);
/// `sale_price` is a promotional display attribute and is not what checkout
/// charges.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub unit_type: String,
    pub price: i64,
    pub stock: f64,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_on_sale: bool,
    pub sale_price: Option<i64>,
    pub sale_end_date: Option<DateTime<Utc>>,
    pub discount_percent: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub delivery_method: String,
    pub address: Option<String>,
    pub address_details: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub subtotal: i64,
    pub delivery_cost: i64,
    pub total: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order. `unit_price` is the catalog price captured when the
/// order was placed and never changes afterwards, even if the product does.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: f64,
    pub unit_price: i64,
    pub line_total: i64,
    pub created_at: DateTime<Utc>,
}
