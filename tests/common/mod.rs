#![allow(dead_code)]

use carniceria_api::{
    db::{create_orm_conn, create_pool},
    entity::{
        categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    slug::slugify,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// Returns None (and prints a notice) when no database is configured, so
/// integration tests can skip instead of failing on dev machines.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    sqlx::query(
        "TRUNCATE TABLE order_items, orders, products, categories, audit_logs, users \
         RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    let orm = create_orm_conn(&database_url).await?;
    Ok(Some(AppState::new(pool, orm)))
}

pub async fn create_admin(state: &AppState) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set("Admin".into()),
        email: Set(format!("admin-{}@example.com", Uuid::new_v4())),
        password_hash: Set("dummy".into()),
        role: Set("ADMIN".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

pub async fn seed_category(state: &AppState, name: &str) -> anyhow::Result<Uuid> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(slugify(name)),
        description: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(category.id)
}

pub async fn seed_product(
    state: &AppState,
    category_id: Uuid,
    name: &str,
    price: i64,
    stock: f64,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name: Set(name.to_string()),
        slug: Set(slugify(name)),
        description: Set(None),
        image: Set(None),
        unit_type: Set("PER_KG".into()),
        price: Set(price),
        stock: Set(stock),
        is_active: Set(true),
        is_featured: Set(false),
        is_on_sale: Set(false),
        sale_price: Set(None),
        sale_end_date: Set(None),
        discount_percent: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}
