// 数据库初始化工具：建表、建索引、写入样例数据
use anyhow::Result;
use atlas_api_gateway::{init_tracing, schema, storage::RelationalStore};
use atlas_shared::load_config;
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "atlas-seed", about = "Provision the Atlas database with tables, indexes and sample data")]
struct Args {
    /// Only create tables and indexes, skip sample rows
    #[arg(long)]
    schema_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = load_config()?;
    let store = RelationalStore::connect(&config.database).await?;

    schema::provision_schema(store.pool()).await?;

    if args.schema_only {
        info!("Skipping sample data (--schema-only)");
    } else {
        let report = schema::seed_sample_data(store.pool()).await?;
        info!(
            "Inserted {} products, {} interactions, {} analytics rows",
            report.products, report.interactions, report.analytics
        );
    }

    store.close().await;
    info!("Database initialization completed successfully");
    Ok(())
}
