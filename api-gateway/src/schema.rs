//! Relational schema and sample data.
//!
//! The gateway only needs `user_interactions`; the seeding tool also
//! provisions the product catalogue and analytics tables with their
//! indexes and a handful of sample rows.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

const CREATE_USER_INTERACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS user_interactions (
    id BIGSERIAL PRIMARY KEY,
    user_id TEXT NOT NULL,
    product_id BIGINT,
    interaction_type TEXT NOT NULL,
    "timestamp" TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_PRODUCTS: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price DOUBLE PRECISION NOT NULL,
    category TEXT NOT NULL,
    tags TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_ANALYTICS: &str = r#"
CREATE TABLE IF NOT EXISTS analytics (
    id BIGSERIAL PRIMARY KEY,
    date TIMESTAMPTZ NOT NULL DEFAULT now(),
    total_views BIGINT NOT NULL DEFAULT 0,
    total_purchases BIGINT NOT NULL DEFAULT 0,
    top_categories TEXT[] NOT NULL DEFAULT '{}'
)"#;

const INTERACTION_INDEXES: &[&str] = &[
    r#"CREATE INDEX IF NOT EXISTS idx_user_interactions_user_time ON user_interactions (user_id, "timestamp" DESC)"#,
];

const CATALOGUE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products (category)",
    "CREATE INDEX IF NOT EXISTS idx_products_fulltext ON products USING GIN (to_tsvector('english', name || ' ' || description))",
    "CREATE INDEX IF NOT EXISTS idx_analytics_date ON analytics (date)",
];

pub struct SampleProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub category: &'static str,
    pub tags: &'static [&'static str],
}

pub const SAMPLE_PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        name: "Sample Product 1",
        description: "This is a sample product for testing purposes",
        price: 29.99,
        category: "Electronics",
        tags: &["sample", "electronics"],
    },
    SampleProduct {
        name: "Sample Product 2",
        description: "Another sample product for demonstration",
        price: 49.99,
        category: "Books",
        tags: &["sample", "books"],
    },
];

/// (user_id, interaction_type)，按顺序对应 SAMPLE_PRODUCTS
pub const SAMPLE_INTERACTIONS: &[(&str, &str)] = &[("user123", "view"), ("user456", "purchase")];

pub const SAMPLE_ANALYTICS_VIEWS: i64 = 150;
pub const SAMPLE_ANALYTICS_PURCHASES: i64 = 25;
pub const SAMPLE_TOP_CATEGORIES: &[&str] = &["Electronics", "Books"];

/// Rows inserted by [`seed_sample_data`]; zero means the table already had data.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub products: u64,
    pub interactions: u64,
    pub analytics: u64,
}

/// Creates the table the gateway writes to. Safe to run on every start.
pub async fn ensure_gateway_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_USER_INTERACTIONS).execute(pool).await?;
    for statement in INTERACTION_INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Creates every table and index.
pub async fn provision_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    ensure_gateway_schema(pool).await?;

    for statement in [CREATE_PRODUCTS, CREATE_ANALYTICS] {
        sqlx::query(statement).execute(pool).await?;
    }
    for statement in CATALOGUE_INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Schema provisioned");
    Ok(())
}

/// Inserts the sample rows into each table that is still empty.
pub async fn seed_sample_data(pool: &PgPool) -> Result<SeedReport, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();

    let mut product_ids = Vec::new();
    if table_is_empty(&mut tx, "products").await? {
        for product in SAMPLE_PRODUCTS {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO products (name, description, price, category, tags) VALUES ($1, $2, $3, $4, $5) RETURNING id",
            )
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .bind(product.category)
            .bind(to_owned_tags(product.tags))
            .fetch_one(&mut *tx)
            .await?;
            product_ids.push(id);
        }
        report.products = product_ids.len() as u64;
    }

    // 只看样例用户，网关自己写入的 system 记录不算
    let has_sample_interactions: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM user_interactions WHERE user_id <> 'system')",
    )
    .fetch_one(&mut *tx)
    .await?;

    if !has_sample_interactions {
        for (i, (user_id, interaction_type)) in SAMPLE_INTERACTIONS.iter().enumerate() {
            sqlx::query(
                "INSERT INTO user_interactions (user_id, product_id, interaction_type) VALUES ($1, $2, $3)",
            )
            .bind(*user_id)
            .bind(product_ids.get(i).copied())
            .bind(*interaction_type)
            .execute(&mut *tx)
            .await?;
            report.interactions += 1;
        }
    }

    if table_is_empty(&mut tx, "analytics").await? {
        sqlx::query(
            "INSERT INTO analytics (total_views, total_purchases, top_categories) VALUES ($1, $2, $3)",
        )
        .bind(SAMPLE_ANALYTICS_VIEWS)
        .bind(SAMPLE_ANALYTICS_PURCHASES)
        .bind(to_owned_tags(SAMPLE_TOP_CATEGORIES))
        .execute(&mut *tx)
        .await?;
        report.analytics = 1;
    }

    tx.commit().await?;
    info!("Sample data seeded: {:?}", report);
    Ok(report)
}

async fn table_is_empty(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(&format!("SELECT EXISTS (SELECT 1 FROM {})", table))
        .fetch_one(&mut **tx)
        .await?;
    Ok(!exists)
}

fn to_owned_tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}
