use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::questions::store::PgQuestionStore;

/// Connects to PostgreSQL and makes sure the questions table exists.
pub async fn create_store(database_url: &str) -> Result<PgQuestionStore> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");

    let store = PgQuestionStore::new(pool);
    store.ensure_schema().await?;
    Ok(store)
}
