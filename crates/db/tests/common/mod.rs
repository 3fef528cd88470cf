use sqlx::sqlite::SqlitePoolOptions;
use webcheck_db::DbPool;

/// Fresh in-memory database with the schema applied.
///
/// A single never-recycled connection keeps the in-memory database alive for
/// the whole test.
pub async fn memory_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should open");
    webcheck_db::run_migrations(&pool)
        .await
        .expect("migrations should apply");
    pool
}
