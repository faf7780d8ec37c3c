use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        categories::{
            CategoryAdminList, CategoryList, CategoryWithCount, CreateCategoryRequest,
            UpdateCategoryRequest,
        },
        orders::{
            OrderItemDetail, OrderLineRequest, OrderList, OrderWithItems, PlaceOrderRequest,
            UpdateOrderStatusRequest,
        },
        products::{
            CreateProductRequest, ProductDetail, ProductList, SearchHit, SearchResults,
            UpdateProductRequest,
        },
    },
    models::{Category, DeliveryMethod, Order, OrderItem, Product, UnitType, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, categories, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        categories::list_categories,
        products::list_products,
        products::get_product,
        products::related_products,
        products::search_products,
        orders::place_order,
        orders::get_order,
        admin::list_products,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::list_categories,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_orders,
        admin::get_order,
        admin::update_order_status,
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            Order,
            OrderItem,
            UnitType,
            DeliveryMethod,
            CategoryList,
            CategoryWithCount,
            CategoryAdminList,
            ProductList,
            ProductDetail,
            SearchHit,
            SearchResults,
            OrderList,
            OrderWithItems,
            OrderItemDetail,
            health::HealthData,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateProductRequest,
            UpdateProductRequest,
            PlaceOrderRequest,
            OrderLineRequest,
            UpdateOrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<Category>,
            ApiResponse<Product>,
            ApiResponse<Order>,
            ApiResponse<LoginResponse>,
            ApiResponse<CategoryList>,
            ApiResponse<CategoryAdminList>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<SearchResults>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<health::HealthData>,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Categories", description = "Public category endpoints"),
        (name = "Products", description = "Public catalog endpoints"),
        (name = "Orders", description = "Order placement and lookup"),
        (name = "Admin", description = "Back-office endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
