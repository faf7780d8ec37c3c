use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Product, UnitType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    /// Optional explicit slug; derived from the name when omitted.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub unit_type: UnitType,
    /// Minor currency units (centavos).
    pub price: i64,
    #[serde(default)]
    pub stock: f64,
    #[serde(default)]
    pub is_on_sale: bool,
    pub sale_price: Option<i64>,
    pub sale_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit_type: Option<UnitType>,
    pub price: Option<i64>,
    pub stock: Option<f64>,
    pub is_on_sale: Option<bool>,
    // Double options distinguish "leave alone" from an explicit null.
    #[serde(default)]
    pub sale_price: Option<Option<i64>>,
    #[serde(default)]
    pub sale_end_date: Option<Option<DateTime<Utc>>>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
}

/// Compact search-as-you-type payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchHit {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: i64,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub items: Vec<SearchHit>,
}
