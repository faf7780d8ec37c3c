use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use uuid::Uuid;

use carniceria_api::{config::AppConfig, db::create_pool, slug::slugify};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@carniceria.local".into());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    ensure_admin(&pool, &admin_email, &admin_password).await?;

    seed_catalog(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<()> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, 'Administrador', $2, $3, 'ADMIN')
        ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash,
                                          role = EXCLUDED.role
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await?;

    println!("Ensured admin user {email}");
    Ok(())
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [
        ("Carnes Rojas", "Cortes premium de carne vacuna"),
        ("Pollo", "Pollo fresco y congelado"),
        ("Embutidos", "Embutidos caseros de primera calidad"),
        ("Congelados", "Productos congelados listos para cocinar"),
    ];

    for (name, description) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .bind(description)
        .execute(pool)
        .await?;
    }
    println!("Seeded categories");

    // (name, category slug, unit type, price in centavos, stock)
    let products: [(&str, &str, &str, i64, f64); 6] = [
        ("Asado de Tira", "carnes-rojas", "PER_KG", 850_000, 50.0),
        ("Bife de Chorizo", "carnes-rojas", "PER_KG", 980_000, 30.0),
        ("Vacío", "carnes-rojas", "PER_KG", 890_000, 25.0),
        ("Pollo Entero", "pollo", "PER_UNIT", 450_000, 40.0),
        ("Chorizo Casero", "embutidos", "PER_KG", 520_000, 35.0),
        ("Hamburguesas Caseras x4", "congelados", "PER_UNIT", 380_000, 60.0),
    ];

    for (name, category_slug, unit_type, price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, slug, unit_type, price, stock)
            SELECT $1, c.id, $2, $3, $4, $5, $6
            FROM categories c
            WHERE c.slug = $7
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .bind(unit_type)
        .bind(price)
        .bind(stock)
        .bind(category_slug)
        .execute(pool)
        .await?;
    }
    println!("Seeded products");

    Ok(())
}
