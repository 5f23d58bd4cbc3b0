pub mod tufe;

use sqlx::migrate::Migrator;

/**
 * Schema migrations embedded at compile time.
 */
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/**
 * Creates an in-memory database with the schema applied.
 *
 * A single connection is kept alive for the lifetime of the pool, every new
 * connection to `sqlite::memory:` would otherwise open an empty database.
 */
#[cfg(test)]
pub async fn init_test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new().max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None).connect("sqlite::memory:").await.unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    pool
}
